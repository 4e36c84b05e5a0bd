//! JSON output formatting.

use serde::Serialize;
use std::io;

/// Print any report in pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}
