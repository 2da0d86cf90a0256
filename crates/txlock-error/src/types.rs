// Types-specific error types
// These errors are specifically for the txlock-types crate

use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, TxLockError};

/// Types-specific error codes
pub mod codes {
    use crate::ErrorCode;

    // Types error codes start with 2000
    pub const PARSE_ERROR: ErrorCode = ErrorCode(2001);
}

/// Types-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl TxLockError for TypesError {
    fn code(&self) -> ErrorCode {
        match self {
            TypesError::ParseError(_) => codes::PARSE_ERROR,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Types
    }
}

/// Convenient Result type for types operations
pub type TypesResult<T> = Result<T, TypesError>;

/// Convert from types error to boxed error
impl From<TypesError> for Box<dyn TxLockError> {
    fn from(err: TypesError) -> Self {
        Box::new(err)
    }
}

// Helper methods for creating types errors
impl TypesError {
    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        TypesError::ParseError(message.into())
    }
}
