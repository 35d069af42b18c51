use std::fmt;
use thiserror::Error;

/// Core error types for dfwc
///
/// Only the I/O-facing layer (document loading, config files, the CLI) returns
/// these. The translation stages report problems as [`Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The outer document could not be parsed at all
    #[error("{}", format_parse_error(*.line, .message))]
    Parse {
        line: Option<usize>,
        message: String,
    },

    /// A validated tree could not be converted into the typed model
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },
}

fn format_parse_error(line: Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("Parse error at line {line}: {message}"),
        None => format!("Parse error: {message}"),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A located, non-exceptional finding produced by a translation stage.
///
/// Used for fatal validator errors and for warnings alike; severity is
/// carried by which list a diagnostic lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Dotted path into the document, e.g. `zones.public.ports[2]`
    pub path: String,
    pub message: String,
    /// Nearest valid key for misspellings
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (did you mean '{suggestion}'?)")?;
        }
        Ok(())
    }
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        match err {
            Error::Parse { line, message } => Diagnostic::new(
                line.map_or_else(String::new, |l| format!("line {l}")),
                message,
            ),
            Error::Validation { field, message } => Diagnostic::new(field, message),
            other => Diagnostic::new("", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_with_line() {
        let err = Error::Parse {
            line: Some(7),
            message: "did not find expected key".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at line 7: did not find expected key"
        );
    }

    #[test]
    fn test_parse_error_without_line() {
        let err = Error::Parse {
            line: None,
            message: "empty".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error: empty");
    }

    #[test]
    fn test_diagnostic_display_with_suggestion() {
        let diag = Diagnostic::new("zones.public.servics", "unknown zone key")
            .with_suggestion("services");
        assert_eq!(
            diag.to_string(),
            "zones.public.servics: unknown zone key (did you mean 'services'?)"
        );
    }

    #[test]
    fn test_diagnostic_from_parse_error_keeps_line() {
        let diag: Diagnostic = Error::Parse {
            line: Some(3),
            message: "bad indent".to_string(),
        }
        .into();
        assert_eq!(diag.path, "line 3");
        assert_eq!(diag.message, "bad indent");
    }

    #[test]
    fn test_diagnostic_from_validation_error() {
        let diag: Diagnostic = Error::Validation {
            field: "direct.rules[0].priority".to_string(),
            message: "expected an integer".to_string(),
        }
        .into();
        assert_eq!(diag.path, "direct.rules[0].priority");
    }

    #[test]
    fn test_diagnostic_from_io_error_is_unlocated() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "zones.yaml");
        let diag: Diagnostic = Error::from(io).into();
        assert_eq!(diag.path, "");
        assert_eq!(diag.to_string(), "I/O error: zones.yaml");
    }
}
