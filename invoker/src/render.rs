//! Human-readable rendering of input values for the diagnostic lines.
//!
//! Strings print bare, arrays print as `[a, b]` and objects as `{k=v}`.
//! A JSON `null` and a missing key both render as the empty string.

use serde_json::Value;
use std::fmt::{self, Write};

/// Render an optional value. `None` stands for a key absent from the input.
pub fn render(value: Option<&Value>) -> String {
    let mut out = String::new();
    if let Some(value) = value {
        // writing into a String never fails
        let _ = write_value(&mut out, value);
    }
    out
}

fn write_value<W: Write>(out: &mut W, value: &Value) -> fmt::Result {
    match value {
        Value::Null => Ok(()),
        Value::Bool(b) => write!(out, "{}", b),
        Value::Number(n) => write!(out, "{}", n),
        Value::String(s) => out.write_str(s),
        Value::Array(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_value(out, item)?;
            }
            out.write_char(']')
        }
        Value::Object(map) => {
            out.write_char('{')?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{}=", key)?;
                write_value(out, item)?;
            }
            out.write_char('}')
        }
    }
}
