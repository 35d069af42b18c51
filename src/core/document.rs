//! Outer document loading
//!
//! YAML is a superset of JSON, so one deserializer covers both input formats.
//! Syntax errors keep the 1-based line the deserializer reports.

use crate::core::error::{Error, Result};
use serde_yaml::Value;
use std::path::Path;
use tracing::debug;

/// Parses document text into a generic tree.
///
/// Empty text yields `Value::Null`, which the validator then rejects.
pub fn load(text: &str) -> Result<Value> {
    let value = serde_yaml::from_str::<Value>(text).map_err(|e| Error::Parse {
        line: e.location().map(|loc| loc.line()),
        message: strip_location(&e.to_string()),
    })?;
    debug!(bytes = text.len(), "loaded document");
    Ok(value)
}

/// Reads and parses a document file; `-` reads standard input.
pub fn load_path(path: &Path) -> Result<Value> {
    let text = crate::utils::read_input(&path.to_string_lossy())?;
    load(&text)
}

/// serde_yaml appends " at line N column M"; the line is carried separately.
fn strip_location(message: &str) -> String {
    match message.find(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_yaml_and_json() {
        let yaml = load("zones:\n  public:\n    services: [ssh]\n").unwrap();
        let json = load(r#"{"zones": {"public": {"services": ["ssh"]}}}"#).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_syntax_error_carries_line() {
        let err = load("zones:\n  public:\n    services: [ssh\n  dmz: {}\n").unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert!(line.is_some_and(|l| l >= 3), "line {line:?}");
                assert!(!message.contains(" at line "));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_empty_text_is_null() {
        assert_eq!(load("").unwrap(), Value::Null);
    }

    #[test]
    fn test_strip_location() {
        assert_eq!(
            strip_location("did not find expected ',' at line 3 column 5"),
            "did not find expected ','"
        );
        assert_eq!(strip_location("plain"), "plain");
    }
}
