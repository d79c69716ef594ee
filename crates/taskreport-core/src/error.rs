//! Error types for the report engine.

use thiserror::Error;

use crate::schema::AttributeType;

/// A specialized Result type for report engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration or building reports.
///
/// Every definition error (schema, filter, sort, columns) is raised when a
/// report is constructed. Evaluating a filter or sorting tasks never fails.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced attribute is not declared in the schema.
    #[error("unknown attribute '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownAttribute {
        /// The attribute name as written.
        name: String,
        /// The closest declared name, if one is close enough.
        suggestion: Option<String>,
    },

    /// An abbreviated attribute name matches more than one attribute.
    #[error("ambiguous attribute '{name}' (matches {})", .candidates.join(", "))]
    AmbiguousAttribute {
        /// The abbreviation as written.
        name: String,
        /// All attributes starting with the abbreviation.
        candidates: Vec<String>,
    },

    /// A literal cannot be converted to the attribute's declared type.
    #[error("type mismatch for '{attribute}': expected {expected}, got '{value}'")]
    TypeMismatch {
        /// The attribute being assigned or compared.
        attribute: String,
        /// The declared type.
        expected: AttributeType,
        /// The offending literal.
        value: String,
    },

    /// A value is outside the declared set of an enumerated attribute.
    #[error("invalid value '{value}' for '{attribute}' (allowed: {})", .allowed.join(", "))]
    InvalidEnumValue {
        /// The enumerated attribute.
        attribute: String,
        /// The offending value.
        value: String,
        /// The declared values.
        allowed: Vec<String>,
    },

    /// A filter modifier is unknown or not applicable to the attribute type.
    #[error("invalid modifier '{modifier}' for attribute '{attribute}'")]
    InvalidModifier {
        /// The attribute the modifier was applied to.
        attribute: String,
        /// The modifier as written.
        modifier: String,
    },

    /// The expression could not be parsed.
    #[error("malformed expression: {reason} at position {position}")]
    MalformedExpression {
        /// What went wrong.
        reason: String,
        /// Byte offset into the expression.
        position: usize,
    },

    /// A report declares a different number of labels than columns.
    #[error("report has {labels} labels but {columns} columns")]
    ColumnLabelMismatch {
        /// Number of labels.
        labels: usize,
        /// Number of columns.
        columns: usize,
    },

    /// A column format is not supported for the attribute's type.
    #[error("unsupported format '{format}' for column '{attribute}'")]
    UnsupportedFormat {
        /// The column attribute.
        attribute: String,
        /// The format as written.
        format: String,
    },

    /// A report definition failed to build.
    #[error("report '{report}': {source}")]
    InvalidReport {
        /// The report name.
        report: String,
        /// The underlying definition error.
        #[source]
        source: Box<Error>,
    },

    /// A task record could not be imported.
    #[error("task '{task}': {source}")]
    InvalidTask {
        /// The task uuid, or its index in the input when it has none.
        task: String,
        /// The underlying conversion error.
        #[source]
        source: Box<Error>,
    },

    /// The requested report is not defined.
    #[error("unknown report '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownReport {
        /// The report name as requested.
        name: String,
        /// The closest defined report name.
        suggestion: Option<String>,
    },

    /// Invalid configuration content.
    #[error("configuration error{}: {message}", line_suffix(.line))]
    Config {
        /// 1-based line number, or 0 when the error is not tied to a line.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// I/O error while reading configuration or task data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Task data is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(". Did you mean '{s}'?"),
        None => String::new(),
    }
}

fn line_suffix(line: &usize) -> String {
    match line {
        0 => String::new(),
        n => format!(" (line {n})"),
    }
}

impl Error {
    /// Creates a malformed expression error at a byte offset.
    pub fn malformed(reason: impl Into<String>, position: usize) -> Self {
        Error::MalformedExpression {
            reason: reason.into(),
            position,
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(
        attribute: impl Into<String>,
        expected: AttributeType,
        value: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            attribute: attribute.into(),
            expected,
            value: value.into(),
        }
    }

    /// Creates an invalid modifier error.
    pub fn invalid_modifier(attribute: impl Into<String>, modifier: impl Into<String>) -> Self {
        Error::InvalidModifier {
            attribute: attribute.into(),
            modifier: modifier.into(),
        }
    }

    /// Creates a configuration error tied to a line.
    pub fn config(line: usize, message: impl Into<String>) -> Self {
        Error::Config {
            line,
            message: message.into(),
        }
    }

    /// Wraps this error with the report it occurred in.
    pub fn in_report(self, report: impl Into<String>) -> Self {
        Error::InvalidReport {
            report: report.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping report/task wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::InvalidReport { source, .. } | Error::InvalidTask { source, .. } => {
                source.root()
            }
            other => other,
        }
    }

    /// Returns true for errors found while building a report definition.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self.root(),
            Error::UnknownAttribute { .. }
                | Error::AmbiguousAttribute { .. }
                | Error::TypeMismatch { .. }
                | Error::InvalidEnumValue { .. }
                | Error::InvalidModifier { .. }
                | Error::MalformedExpression { .. }
                | Error::ColumnLabelMismatch { .. }
                | Error::UnsupportedFormat { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_attribute_display_with_suggestion() {
        let err = Error::UnknownAttribute {
            name: "prio".to_string(),
            suggestion: Some("priority".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "unknown attribute 'prio'. Did you mean 'priority'?"
        );
    }

    #[test]
    fn test_malformed_display_with_position() {
        let err = Error::malformed("unclosed parenthesis", 4);
        assert_eq!(
            err.to_string(),
            "malformed expression: unclosed parenthesis at position 4"
        );
    }

    #[test]
    fn test_root_unwraps_report_context() {
        let err = Error::ColumnLabelMismatch {
            labels: 4,
            columns: 3,
        }
        .in_report("main");
        assert!(err.to_string().starts_with("report 'main': "));
        assert!(matches!(err.root(), Error::ColumnLabelMismatch { .. }));
        assert!(err.is_definition_error());
    }

    #[test]
    fn test_config_error_is_not_definition_error() {
        let err = Error::config(3, "missing '='");
        assert!(!err.is_definition_error());
        assert_eq!(
            err.to_string(),
            "configuration error (line 3): missing '='"
        );
        assert_eq!(
            Error::config(0, "uda 'x' has no type").to_string(),
            "configuration error: uda 'x' has no type"
        );
    }
}
