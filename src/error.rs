//! Error types for the annotator

use std::path::PathBuf;
use thiserror::Error;

/// Source location information for error messages
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub file: Option<PathBuf>,
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file.display(), self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Whole-pass failure of a rewrite.
///
/// Failures scoped to one function (an uninferable return type, an unparsable
/// type string) are recovered inside the pass and never show up here.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("SyntaxError: {message} at {location}")]
    SyntaxError {
        message: String,
        location: SourceLocation,
    },

    #[error("ConfigError: {message}")]
    Config { message: String },

    #[error("IoError: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnnotateError {
    pub fn syntax_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        AnnotateError::SyntaxError {
            message: message.into(),
            location: SourceLocation {
                file: None,
                line,
                column,
                length: 1,
            },
        }
    }

    /// Create a syntax error without location info (for internal use during parsing)
    pub fn syntax_error_simple(message: impl Into<String>) -> Self {
        AnnotateError::SyntaxError {
            message: message.into(),
            location: SourceLocation {
                file: None,
                line: 0,
                column: 0,
                length: 0,
            },
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AnnotateError::Config {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnnotateError::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a file name to the location of a syntax error.
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            AnnotateError::SyntaxError {
                message,
                mut location,
            } => {
                location.file = Some(path.into());
                AnnotateError::SyntaxError { message, location }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = AnnotateError::syntax_error("Unexpected token", 3, 7);
        assert_eq!(err.to_string(), "SyntaxError: Unexpected token at 3:7");
    }

    #[test]
    fn test_syntax_error_with_file() {
        let err = AnnotateError::syntax_error("Expected ')'", 1, 12).with_file("input.ts");
        assert_eq!(err.to_string(), "SyntaxError: Expected ')' at input.ts:1:12");
    }
}
