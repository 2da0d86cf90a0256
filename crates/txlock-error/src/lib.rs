// txlock Error Handling Framework
// Central location for error types, traits, and handling utilities

use std::error::Error as StdError;
use std::fmt;

// Re-export for downstream derive use
pub use thiserror;

// Module structure
mod macros;

// Per-domain error types
mod config;
mod lock;
mod types;

pub use config::{ConfigError, ConfigResult};
pub use lock::{LockError, LockResult};
pub use types::{TypesError, TypesResult};

/// Error domains representing different components of the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorDomain {
    Types,
    Concurrency,
    Config,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Types => write!(f, "types"),
            ErrorDomain::Concurrency => write!(f, "concurrency"),
            ErrorDomain::Config => write!(f, "config"),
        }
    }
}

/// Error code structure for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Standard error message format for serialization
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub domain: ErrorDomain,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Base trait for all errors raised by the txlock crates.
pub trait TxLockError: StdError + fmt::Debug + Send + Sync + 'static {
    /// Numeric code, unique within the workspace.
    fn code(&self) -> ErrorCode;

    /// Component the error originates from.
    fn domain(&self) -> ErrorDomain;

    /// Indicates if the error is temporary and retrying might succeed.
    fn is_transient(&self) -> bool {
        false
    }

    /// Structured form of the error, suitable for logging as JSON.
    fn to_message(&self) -> ErrorMessage {
        ErrorMessage {
            code: self.code(),
            domain: self.domain(),
            message: self.to_string(),
            details: None,
        }
    }
}

/// Shorthand for a boxed TxLockError
pub type BoxError = Box<dyn TxLockError>;

/// Standard Result type using BoxError
pub type Result<T> = std::result::Result<T, BoxError>;
