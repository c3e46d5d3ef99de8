// Copyright 2025 Cowboy AI, LLC.

//! Free-function composition
//!
//! `compose` reads in mathematical order (`f ∘ g`, right to left) while
//! `sequence` reads in pipe order (left to right). Both return plain closures,
//! so they can be handed straight to [`Pipe::pipe`](crate::Pipe::pipe).

/// `compose(f, g)` is `x ↦ f(g(x))`
///
/// # Example
/// ```rust
/// use cim_pipe::compose::compose;
///
/// let increment = |x: i32| x + 1;
/// let to_string = |x: i32| format!("\"{x}\"");
///
/// let increment_then_to_string = compose(to_string, increment);
/// assert_eq!(increment_then_to_string(8), "\"9\"");
/// ```
pub fn compose<A, B, C, F, G>(f: F, g: G) -> impl Fn(A) -> C
where
    F: Fn(B) -> C,
    G: Fn(A) -> B,
{
    move |x| f(g(x))
}

/// `sequence(f, g)` is `x ↦ g(f(x))`; `f` runs first
pub fn sequence<A, B, C, F, G>(f: F, g: G) -> impl Fn(A) -> C
where
    F: Fn(A) -> B,
    G: Fn(B) -> C,
{
    move |x| g(f(x))
}

/// `x ↦ x`
pub fn identity<A>() -> impl Fn(A) -> A + Copy {
    |x| x
}
