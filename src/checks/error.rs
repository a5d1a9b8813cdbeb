//! Check document error types

use thiserror::Error;

/// Errors raised while parsing a check document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    /// A line is neither a section header nor a check item
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A check item could not be parsed
    #[error("Line {line}: invalid check '{definition}': {message}")]
    InvalidCheck {
        line: usize,
        definition: String,
        message: String,
    },

    /// The document contains no checks at all
    #[error("Check document defines no checks")]
    Empty,
}

/// Result type for check document operations
pub type CheckResult<T> = Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CheckError::Syntax {
            line: 3,
            message: "check outside of a section".to_string(),
        };
        assert_eq!(err.to_string(), "Line 3: check outside of a section");

        let err = CheckError::InvalidCheck {
            line: 2,
            definition: "row_count >".to_string(),
            message: "expected a threshold".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Line 2: invalid check 'row_count >': expected a threshold"
        );
    }
}
