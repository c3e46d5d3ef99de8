//! Fluent pipe demonstration
//!
//! This example shows:
//! - Composing plain functions with `compose`
//! - Building a pipe step by step and invoking it later
//! - The date pipeline turning "Jan 1, 2024" into a `{date, time}` record

use cim_pipe::compose::compose;
use cim_pipe::{pipe, string_to_date_and_time};

fn increment(x: i32) -> i32 {
    x + 1
}

fn to_quoted(x: i32) -> String {
    format!("\"{x}\"")
}

fn main() -> anyhow::Result<()> {
    println!("=== Function composition ===");
    let increment_then_quote = compose(to_quoted, increment);
    println!("compose(to_quoted, increment)(8) = {}", increment_then_quote(8));

    println!("\n=== Fluent pipe ===");
    let p = pipe(increment).pipe(to_quoted);
    println!("{} applied to 6 = {}", p.description(), p.invoke(6));

    println!("\n=== Date pipeline ===");
    let string_to_date = string_to_date_and_time();
    println!("stages: {}", string_to_date.description());

    let result = string_to_date.invoke("Jan 1, 2024".to_string())?;
    println!("{}", result.to_json()?);

    match string_to_date.invoke("someday".to_string()) {
        Ok(unexpected) => println!("unexpected success: {unexpected:?}"),
        Err(e) => println!("rejected: {e}"),
    }

    Ok(())
}
