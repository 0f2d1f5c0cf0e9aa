use crate::parser::ParseError;
use thiserror::Error;

/// Coarse classification of a [`PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller broke an API contract (wrong value kind, too few operands).
    ContractViolation,
    /// The input is structurally malformed (stack underflow, unknown operator).
    Structural,
    /// The byte sink or an external codec failed.
    External,
}

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("No write transformer can handle a {0} object")]
    NoTransformer(&'static str),

    #[error("Invalid object handle: {0}")]
    InvalidHandle(u32),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Circular reference detected through inline object {0}")]
    CircularReference(u32),

    #[error("Stack underflow: Q operator was applied to an empty stack")]
    GraphicsStateUnderflow,

    #[error("Marked content underflow: EMC without a matching BMC or BDC")]
    MarkedContentUnderflow,

    #[error("Unbalanced marked content: {0} sequence(s) still open at end of stream")]
    UnbalancedMarkedContent(usize),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Operator {operator} requires {expected} operand(s), found {found}")]
    MissingOperands {
        operator: String,
        expected: usize,
        found: usize,
    },

    #[error("Operand {index} of {operator} must be {expected}")]
    InvalidOperand {
        operator: String,
        index: usize,
        expected: &'static str,
    },

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Compression error: {0}")]
    CompressionError(String),
}

impl PdfError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PdfError::ContractViolation(_)
            | PdfError::NoTransformer(_)
            | PdfError::InvalidHandle(_)
            | PdfError::MissingOperands { .. }
            | PdfError::InvalidOperand { .. } => ErrorCategory::ContractViolation,
            PdfError::Parse(_)
            | PdfError::InvalidStructure(_)
            | PdfError::CircularReference(_)
            | PdfError::GraphicsStateUnderflow
            | PdfError::MarkedContentUnderflow
            | PdfError::UnbalancedMarkedContent(_)
            | PdfError::UnknownOperator(_) => ErrorCategory::Structural,
            PdfError::Io(_) | PdfError::UnsupportedFilter(_) | PdfError::CompressionError(_) => {
                ErrorCategory::External
            }
        }
    }

    pub(crate) fn invalid_operand(operator: &str, index: usize, expected: &'static str) -> Self {
        PdfError::InvalidOperand {
            operator: operator.to_string(),
            index,
            expected,
        }
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_pdf_error_display() {
        let error = PdfError::InvalidStructure("test message".to_string());
        assert_eq!(error.to_string(), "Invalid PDF structure: test message");
    }

    #[test]
    fn test_pdf_error_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let pdf_error = PdfError::from(io_error);

        match pdf_error {
            PdfError::Io(ref err) => {
                assert_eq!(err.kind(), ErrorKind::NotFound);
            }
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_error_chain_display() {
        let errors = [
            (
                "Stack underflow: Q operator was applied to an empty stack",
                PdfError::GraphicsStateUnderflow,
            ),
            ("Unknown operator: Xyz", PdfError::UnknownOperator("Xyz".to_string())),
            (
                "Operator scn requires 4 operand(s), found 3",
                PdfError::MissingOperands {
                    operator: "scn".to_string(),
                    expected: 4,
                    found: 3,
                },
            ),
            (
                "Operand 0 of Tc must be a number",
                PdfError::invalid_operand("Tc", 0, "a number"),
            ),
            (
                "Circular reference detected through inline object 7",
                PdfError::CircularReference(7),
            ),
        ];

        for (expected, error) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            PdfError::ContractViolation("no context".to_string()).category(),
            ErrorCategory::ContractViolation
        );
        assert_eq!(
            PdfError::MissingOperands {
                operator: "k".to_string(),
                expected: 4,
                found: 1
            }
            .category(),
            ErrorCategory::ContractViolation
        );
        assert_eq!(
            PdfError::MarkedContentUnderflow.category(),
            ErrorCategory::Structural
        );
        assert_eq!(
            PdfError::UnknownOperator("zz".to_string()).category(),
            ErrorCategory::Structural
        );
        assert_eq!(
            PdfError::UnsupportedFilter("LZWDecode".to_string()).category(),
            ErrorCategory::External
        );
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PdfError>();
    }
}
