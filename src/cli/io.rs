//! JSON output for CLI commands
//!
//! One JSON object per command on stdout, UTF-8.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a JSON value to stdout followed by a newline
pub fn write_json(value: &Value) -> CliResult<()> {
    let stdout = io::stdout();
    write_json_to(&mut stdout.lock(), value)
}

pub(crate) fn write_json_to(out: &mut impl Write, value: &Value) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_is_newline_terminated() {
        let mut out = Vec::new();
        write_json_to(&mut out, &json!({"token": "abc"})).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap()["token"], "abc");
    }
}
