//! Options for one rewrite.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checker::CheckOptions;
use crate::error::AnnotateError;

/// Line ending written to the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewLine {
    #[default]
    Lf,
    Crlf,
}

impl NewLine {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLine::Lf => "\n",
            NewLine::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnnotateOptions {
    /// Keep `null` and `undefined` apart from other types when inferring.
    pub strict_null_checks: bool,
    pub new_line: NewLine,
    /// Resolve global names against the embedded declaration library.
    pub include_lib: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            strict_null_checks: false,
            new_line: NewLine::Lf,
            include_lib: true,
        }
    }
}

impl AnnotateOptions {
    pub fn from_json(text: &str) -> Result<Self, AnnotateError> {
        serde_json::from_str(text).map_err(|e| AnnotateError::config(e.to_string()))
    }

    /// Read options from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AnnotateError> {
        let text = std::fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e))?;
        Self::from_json(&text).map_err(|err| match err {
            AnnotateError::Config { message } => {
                AnnotateError::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            strict_null_checks: self.strict_null_checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let options = AnnotateOptions::from_json(r#"{ "newLine": "crlf" }"#).ok();
        assert_eq!(
            options,
            Some(AnnotateOptions {
                new_line: NewLine::Crlf,
                ..AnnotateOptions::default()
            })
        );
        assert_eq!(AnnotateOptions::from_json("{}").ok(), Some(AnnotateOptions::default()));
    }

    #[test]
    fn reads_every_field() {
        let options = AnnotateOptions::from_json(
            r#"{ "strictNullChecks": true, "newLine": "lf", "includeLib": false }"#,
        )
        .ok();
        assert_eq!(
            options,
            Some(AnnotateOptions {
                strict_null_checks: true,
                new_line: NewLine::Lf,
                include_lib: false,
            })
        );
    }

    #[test]
    fn rejects_unknown_fields_and_bad_values() {
        let unknown = AnnotateOptions::from_json(r#"{ "strict": true }"#);
        assert!(matches!(unknown, Err(AnnotateError::Config { .. })));
        let bad = AnnotateOptions::from_json(r#"{ "newLine": "cr" }"#);
        assert!(matches!(bad, Err(AnnotateError::Config { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = AnnotateOptions::load(Path::new("/nonexistent/tsannotate.json"));
        assert!(matches!(result, Err(AnnotateError::Io { .. })));
    }

    #[test]
    fn load_reads_a_file_and_names_it_in_errors() {
        let dir = std::env::temp_dir();
        let good = dir.join(format!("tsannotate-options-{}.json", std::process::id()));
        let bad = dir.join(format!("tsannotate-bad-options-{}.json", std::process::id()));
        let written = std::fs::write(&good, r#"{ "includeLib": false }"#)
            .and_then(|()| std::fs::write(&bad, r#"{ "newLine": "cr" }"#));
        assert!(written.is_ok());

        let loaded = AnnotateOptions::load(&good).ok();
        assert_eq!(loaded.map(|o| o.include_lib), Some(false));

        let message = match AnnotateOptions::load(&bad) {
            Err(AnnotateError::Config { message }) => message,
            other => format!("{other:?}"),
        };
        assert!(message.starts_with(&format!("{}: ", bad.display())));

        let _ = std::fs::remove_file(&good);
        let _ = std::fs::remove_file(&bad);
    }
}
