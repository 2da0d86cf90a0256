// Configuration error types

use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, TxLockError};

/// Configuration error codes
pub mod codes {
    use crate::ErrorCode;

    // Config error codes start with 7000
    pub const IO_ERROR: ErrorCode = ErrorCode(7001);
    pub const PARSE_ERROR: ErrorCode = ErrorCode(7002);
    pub const INVALID_VALUE: ErrorCode = ErrorCode(7003);
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("I/O error: {0}")]
    IoError(String),

    /// The configuration text is not valid TOML for the expected schema
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A field has a value outside its allowed range
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

impl TxLockError for ConfigError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            ConfigError::IoError(_) => IO_ERROR,
            ConfigError::ParseError(_) => PARSE_ERROR,
            ConfigError::InvalidValue(_) => INVALID_VALUE,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Config
    }
}

/// Convenient Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for Box<dyn TxLockError> {
    fn from(err: ConfigError) -> Self {
        Box::new(err)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl ConfigError {
    /// Create a new invalid value error
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::InvalidValue(message.into())
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        ConfigError::ParseError(message.into())
    }
}
