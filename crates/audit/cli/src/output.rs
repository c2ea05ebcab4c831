//! Output formatting utilities

use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a one-line status message
pub fn print_status(ok: bool, message: &str) {
    let mark = if ok { "✓" } else { "✗" };
    println!("{mark} {message}");
}
