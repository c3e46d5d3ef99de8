// Copyright 2025 Cowboy AI, LLC.

//! # CIM Pipe
//!
//! Fluent, lazily evaluated function composition for the Composable Information Machine.
//!
//! - **Pipe**: an immutable builder wrapping one transformation; chaining returns a new pipe
//! - **Compose**: plain `compose` / `sequence` / `identity` combinators
//! - **Datetime**: reference transformations turning `"Jan 1, 2024"` into `{date, time}`
//!
//! ## Design Principles
//!
//! 1. **Deferred**: chaining never runs a transformation; only `invoke` does
//! 2. **Immutable**: a pipe is never modified after construction
//! 3. **Transparent**: failures of wrapped functions reach the caller unchanged
//!
//! ```rust
//! use cim_pipe::pipe;
//!
//! let p = pipe(|s: String| s.len()).pipe(|n| n * 2);
//! assert_eq!(p.invoke("abc".to_string()), 6);
//! ```

#![warn(missing_docs)]

mod errors;
mod pipe;
pub mod compose;
pub mod datetime;

pub use errors::{TransformError, TransformResult};
pub use pipe::{pipe, Pipe};
pub use datetime::{string_to_date_and_time, DateAndTime};
