//! Template error types.
//!
//! Defined in `psyreport-core` so the store, the parser, and the renderer
//! facade all share one error vocabulary and callers can match on the kind
//! without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while locating or parsing a report template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Neither the requested version nor the version 0 fallback exists.
    #[error("template not found: version {requested} and fallback version 0 are both missing")]
    NotFound { requested: u32 },

    /// Reading a template resource failed for a reason other than absence.
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template text has unbalanced or mismatched block markers.
    #[error("template syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl TemplateError {
    /// Returns `true` if no template text could be produced at all.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TemplateError::NotFound { .. })
    }

    /// Returns the `(line, column)` of a syntax error, if applicable.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            TemplateError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_both_versions() {
        let err = TemplateError::NotFound { requested: 3 };
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "template not found: version 3 and fallback version 0 are both missing"
        );
    }

    #[test]
    fn syntax_error_exposes_position() {
        let err = TemplateError::Syntax {
            line: 4,
            column: 12,
            message: "unclosed block `sections`".into(),
        };
        assert_eq!(err.position(), Some((4, 12)));
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("line 4, column 12"));
    }
}
