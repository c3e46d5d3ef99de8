// Copyright 2025 Cowboy AI, LLC.

//! Pipe - a fluent, deferred composition builder
//!
//! A [`Pipe`] wraps exactly one unary transformation `A -> B`. Chaining with
//! [`Pipe::pipe`] never runs anything: it returns a *new* pipe wrapping
//! `x ↦ g(f(x))` and leaves the original untouched. Work only happens on
//! [`Pipe::invoke`].
//!
//! # Laws
//!
//! 1. Left Identity: `Pipe::identity().pipe(f) ≡ pipe(f)`
//! 2. Right Identity: `pipe(f).pipe(|x| x) ≡ pipe(f)`
//! 3. Associativity: `pipe(f).pipe(g).pipe(h) ≡ pipe(f).pipe(|x| h(g(x)))`
//!
//! # Example
//! ```rust
//! use cim_pipe::pipe;
//!
//! let increment_then_quote = pipe(|x: i32| x + 1).pipe(|x| format!("\"{x}\""));
//! assert_eq!(increment_then_quote.invoke(6), "\"7\"");
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::trace;

type Transform<A, B> = Arc<dyn Fn(A) -> B + Send + Sync>;

/// Label used when a stage's type is not a named function
const ANONYMOUS_STAGE: &str = "stage";
const CLOSURE_STAGE: &str = "{{closure}}";

/// Stage labels, shared between a pipe and every pipe chained from it
///
/// Chaining adds one node on top of the parent's list, so earlier labels are
/// never copied.
enum StageNode {
    Stage {
        label: String,
        parent: Option<Arc<StageNode>>,
    },
    Join {
        first: Arc<StageNode>,
        second: Arc<StageNode>,
    },
}

impl StageNode {
    fn stage(label: String, parent: Option<Arc<StageNode>>) -> Arc<Self> {
        Arc::new(StageNode::Stage { label, parent })
    }

    /// Copy of `node` with its last stage renamed; only the right spine is rebuilt
    fn relabel(node: &Arc<StageNode>, label: String) -> Arc<StageNode> {
        match node.as_ref() {
            StageNode::Stage { parent, .. } => StageNode::stage(label, parent.clone()),
            StageNode::Join { first, second } => Arc::new(StageNode::Join {
                first: Arc::clone(first),
                second: StageNode::relabel(second, label),
            }),
        }
    }

    /// Labels from last registered to first
    fn labels_rev(node: &Arc<StageNode>) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut pending = vec![node.as_ref()];
        while let Some(current) = pending.pop() {
            match current {
                StageNode::Stage { label, parent } => {
                    labels.push(label.as_str());
                    if let Some(parent) = parent {
                        pending.push(parent.as_ref());
                    }
                }
                StageNode::Join { first, second } => {
                    pending.push(first.as_ref());
                    pending.push(second.as_ref());
                }
            }
        }
        labels
    }
}

/// An immutable handle around one (possibly composed) transformation
///
/// Cloning is a reference-count bump; clones share the wrapped function.
pub struct Pipe<A, B> {
    run: Transform<A, B>,
    stages: Arc<StageNode>,
    len: usize,
}

/// Wrap a transformation in a [`Pipe`]
pub fn pipe<A, B, F>(f: F) -> Pipe<A, B>
where
    F: Fn(A) -> B + Send + Sync + 'static,
    A: 'static,
    B: 'static,
{
    Pipe::new(f)
}

/// Split a type name on `::` outside of `<..>`, `(..)` and `[..]`
fn top_level_segments(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'>') => {
                i += 2;
                continue;
            }
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&name[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&name[start..]);
    segments
}

/// Label for a transformation type
///
/// Named functions (`parse_date`, `Type::method`) keep their own name,
/// closures become `{{closure}}`, anything else (fn pointers, boxed
/// trait objects, references) becomes `stage`.
fn stage_label<F>() -> String {
    let full = std::any::type_name::<F>();
    let last = top_level_segments(full).pop().unwrap_or(full);
    if last == CLOSURE_STAGE {
        return CLOSURE_STAGE.to_string();
    }

    let name = last.split('<').next().unwrap_or(last);
    let is_fn_item = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if is_fn_item {
        name.to_string()
    } else {
        ANONYMOUS_STAGE.to_string()
    }
}

impl<A: 'static, B: 'static> Pipe<A, B> {
    /// Create a pipe wrapping `f`
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let label = stage_label::<F>();
        trace!(stage = %label, "created pipe");
        Self {
            run: Arc::new(f),
            stages: StageNode::stage(label, None),
            len: 1,
        }
    }

    /// Apply the wrapped transformation to `input`
    ///
    /// Failures of the wrapped function are not intercepted.
    pub fn invoke(&self, input: A) -> B {
        trace!(stages = self.len, "invoking pipe");
        (self.run)(input)
    }

    /// Chain `g` after this pipe, producing a new `Pipe<A, C>`
    ///
    /// `self` is not modified and nothing is invoked.
    #[doc(alias = "chain")]
    pub fn pipe<C, G>(&self, g: G) -> Pipe<A, C>
    where
        G: Fn(B) -> C + Send + Sync + 'static,
        C: 'static,
    {
        self.extend(stage_label::<G>(), g)
    }

    /// Chain a whole existing pipe after this one
    pub fn then<C: 'static>(&self, other: &Pipe<B, C>) -> Pipe<A, C> {
        let prev = Arc::clone(&self.run);
        let next = Arc::clone(&other.run);
        let len = self.len + other.len;
        trace!(stages = len, "joined pipes");
        Pipe {
            run: Arc::new(move |a: A| next(prev(a))),
            stages: Arc::new(StageNode::Join {
                first: Arc::clone(&self.stages),
                second: Arc::clone(&other.stages),
            }),
            len,
        }
    }

    /// Replace the label of the most recently registered stage
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.stages = StageNode::relabel(&self.stages, label.into());
        self
    }

    /// Stage labels in registration (execution) order
    pub fn stages(&self) -> Vec<String> {
        let mut labels: Vec<String> = StageNode::labels_rev(&self.stages)
            .into_iter()
            .map(str::to_owned)
            .collect();
        labels.reverse();
        labels
    }

    /// Number of registered stages
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the pipe has no stages
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Human-readable composition, last stage first: `g ∘ f`
    pub fn description(&self) -> String {
        StageNode::labels_rev(&self.stages).join(" ∘ ")
    }

    /// Turn the pipe into a plain closure
    pub fn into_fn(self) -> impl Fn(A) -> B + Send + Sync {
        let run = self.run;
        move |a: A| run(a)
    }

    fn extend<C, G>(&self, label: String, g: G) -> Pipe<A, C>
    where
        G: Fn(B) -> C + Send + Sync + 'static,
        C: 'static,
    {
        let prev = Arc::clone(&self.run);
        let len = self.len + 1;
        trace!(stage = %label, stages = len, "chained pipe");
        Pipe {
            run: Arc::new(move |a: A| g(prev(a))),
            stages: StageNode::stage(label, Some(Arc::clone(&self.stages))),
            len,
        }
    }
}

impl<A: 'static> Pipe<A, A> {
    /// The pipe that returns its input unchanged
    pub fn identity() -> Self {
        Self {
            run: Arc::new(|a: A| a),
            stages: StageNode::stage("identity".to_string(), None),
            len: 1,
        }
    }
}

/// Chaining for pipes whose stages can fail
///
/// An `Err` from an earlier stage skips every later stage and is returned as-is.
impl<A: 'static, B: 'static, E: 'static> Pipe<A, Result<B, E>> {
    /// Chain a fallible step; runs only on `Ok`
    pub fn and_then<C, G>(&self, g: G) -> Pipe<A, Result<C, E>>
    where
        G: Fn(B) -> Result<C, E> + Send + Sync + 'static,
        C: 'static,
    {
        self.extend(stage_label::<G>(), move |r: Result<B, E>| r.and_then(&g))
    }

    /// Chain an infallible step on the success value
    pub fn map_ok<C, G>(&self, g: G) -> Pipe<A, Result<C, E>>
    where
        G: Fn(B) -> C + Send + Sync + 'static,
        C: 'static,
    {
        self.extend(stage_label::<G>(), move |r: Result<B, E>| r.map(&g))
    }
}

impl<A, B> Clone for Pipe<A, B> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
            stages: Arc::clone(&self.stages),
            len: self.len,
        }
    }
}

impl<A, B> fmt::Debug for Pipe<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels = StageNode::labels_rev(&self.stages);
        labels.reverse();
        f.debug_struct("Pipe").field("stages", &labels).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn increment(x: i32) -> i32 {
        x + 1
    }

    fn quote(x: i32) -> String {
        format!("\"{x}\"")
    }

    #[test]
    fn test_invoke_applies_wrapped_function() {
        let p = pipe(increment);
        assert_eq!(p.invoke(2), 3);
    }

    #[test]
    fn test_chain_runs_left_to_right() {
        let p = pipe(increment).pipe(|x| x * 10);
        // (2 + 1) * 10, not 2 * 10 + 1
        assert_eq!(p.invoke(2), 30);
    }

    #[test]
    fn test_chain_changes_output_type() {
        let p = pipe(increment).pipe(quote);
        assert_eq!(p.invoke(6), "\"7\"");
    }

    #[test]
    fn test_chain_leaves_original_untouched() {
        let base = pipe(increment);
        let extended = base.pipe(|x| x * 100);

        assert_eq!(base.invoke(1), 2);
        assert_eq!(extended.invoke(1), 200);
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(!base.is_empty());
    }

    #[test]
    fn test_chain_does_not_invoke() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let p = pipe(move |x: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            x
        });

        let chained = p.pipe(increment).pipe(increment);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(chained.invoke(0), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_identity() {
        let id = Pipe::<i32, i32>::identity();
        assert_eq!(id.invoke(42), 42);
        assert_eq!(id.pipe(increment).invoke(1), pipe(increment).invoke(1));
    }

    #[test]
    fn test_then_joins_pipes() {
        let first = pipe(increment);
        let second = pipe(quote);

        let joined = first.then(&second);
        assert_eq!(joined.invoke(1), "\"2\"");
        assert_eq!(joined.stages(), ["increment", "quote"]);
    }

    #[test]
    fn test_description_in_composition_order() {
        let p = pipe(increment).pipe(quote);
        assert_eq!(p.description(), "quote ∘ increment");
    }

    #[test]
    fn test_with_label_renames_last_stage() {
        let p = pipe(increment).pipe(|x| x * 2).with_label("double");
        assert_eq!(p.stages(), ["increment", "double"]);
    }

    #[test]
    fn test_closure_label() {
        let p = pipe(|x: i32| x);
        assert_eq!(p.stages(), ["{{closure}}"]);
    }

    #[test]
    fn test_and_then_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let p = pipe(|x: i32| if x < 0 { Err("negative") } else { Ok(x) }).and_then(
            move |x: i32| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(x * 2)
            },
        );

        assert_eq!(p.invoke(-1), Err("negative"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(p.invoke(4), Ok(8));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_map_ok() {
        let p = pipe(|s: &'static str| s.parse::<i32>()).map_ok(increment);
        assert_eq!(p.invoke("41"), Ok(42));
        assert!(p.invoke("x").is_err());
    }

    #[test]
    fn test_into_fn() {
        let f = pipe(increment).pipe(quote).into_fn();
        let out: Vec<String> = (0..3).map(f).collect();
        assert_eq!(out, vec!["\"1\"", "\"2\"", "\"3\""]);
    }

    #[test]
    fn test_clone_shares_function() {
        let p = pipe(increment);
        let q = p.clone();
        assert_eq!(p.invoke(1), q.invoke(1));
        assert_eq!(format!("{q:?}"), "Pipe { stages: [\"increment\"] }");
    }

    fn stage_parent(p: &Pipe<i32, i32>) -> Option<Arc<StageNode>> {
        match p.stages.as_ref() {
            StageNode::Stage { parent, .. } => parent.clone(),
            StageNode::Join { .. } => None,
        }
    }

    #[test]
    fn test_chain_shares_parent_labels() {
        let base = pipe(increment).pipe(increment);
        let extended = base.pipe(increment);

        let parent = stage_parent(&extended).expect("chained stage has a parent");
        assert!(Arc::ptr_eq(&parent, &base.stages));
    }

    #[test]
    fn test_long_chain_builds_in_linear_time() {
        let started = std::time::Instant::now();
        let mut p = pipe(|x: u64| x);
        for _ in 0..3_000 {
            p = p.pipe(|x| x + 1);
        }
        assert_eq!(p.len(), 3_001);
        assert_eq!(p.stages().len(), 3_001);
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_with_label_after_then() {
        let joined = pipe(increment).then(&pipe(increment).pipe(quote));
        let renamed = joined.clone().with_label("render");

        assert_eq!(joined.stages(), ["increment", "increment", "quote"]);
        assert_eq!(renamed.stages(), ["increment", "increment", "render"]);
    }

    fn count_chars(s: String) -> usize {
        s.chars().count()
    }

    fn passthrough<T>(x: T) -> T {
        x
    }

    fn scaled<T>() -> impl Fn(i32) -> i32 + Send + Sync {
        |x| x * 3
    }

    #[test]
    fn test_fn_pointer_label() {
        let p = pipe(count_chars as fn(String) -> usize);
        assert_eq!(p.stages(), ["stage"]);
        assert_eq!(p.invoke("abc".to_string()), 3);
    }

    #[test]
    fn test_boxed_closure_label() {
        let boxed: Box<dyn Fn(i32) -> i32 + Send + Sync> = Box::new(|x| x - 1);
        let p = pipe(boxed);
        assert_eq!(p.stages(), ["stage"]);
        assert_eq!(p.invoke(1), 0);
    }

    #[test]
    fn test_generic_context_labels() {
        assert_eq!(pipe(scaled::<u8>()).stages(), ["{{closure}}"]);
        assert_eq!(pipe(passthrough::<i32>).stages(), ["passthrough"]);
        assert_eq!(
            pipe(Option::<i32>::unwrap_or_default).stages(),
            ["unwrap_or_default"]
        );
    }
}
