// Lock table error types
// Raised by txlock-core when a request is rejected before any state changes

use thiserror::Error;
use crate::{ErrorCode, ErrorDomain, TxLockError};

/// Lock table error codes
pub mod codes {
    use crate::ErrorCode;

    // Concurrency error codes start with 6000
    pub const DUPLICATE_LOCK: ErrorCode = ErrorCode(6001);
    pub const NO_LOCK_HELD: ErrorCode = ErrorCode(6002);
    pub const INVALID_LOCK: ErrorCode = ErrorCode(6003);
    pub const TABLE_UNAVAILABLE: ErrorCode = ErrorCode(6004);
}

/// Errors returned by lock table operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The transaction already holds a lock that conflicts with the request
    #[error("Duplicate lock request: {0}")]
    DuplicateLock(String),

    /// The operation refers to a lock the transaction does not hold
    #[error("No lock held: {0}")]
    NoLockHeld(String),

    /// The requested lock type is not a valid promotion
    #[error("Invalid lock: {0}")]
    InvalidLock(String),

    /// A lock context was used after its lock table was dropped
    #[error("Lock table unavailable: {0}")]
    TableUnavailable(String),
}

impl TxLockError for LockError {
    fn code(&self) -> ErrorCode {
        use codes::*;
        match self {
            LockError::DuplicateLock(_) => DUPLICATE_LOCK,
            LockError::NoLockHeld(_) => NO_LOCK_HELD,
            LockError::InvalidLock(_) => INVALID_LOCK,
            LockError::TableUnavailable(_) => TABLE_UNAVAILABLE,
        }
    }

    fn domain(&self) -> ErrorDomain {
        ErrorDomain::Concurrency
    }
}

/// Convenient Result type for lock table operations
pub type LockResult<T> = Result<T, LockError>;

/// Convert from lock error to boxed error
impl From<LockError> for Box<dyn TxLockError> {
    fn from(err: LockError) -> Self {
        Box::new(err)
    }
}

impl LockError {
    /// Create a new duplicate lock error
    pub fn duplicate_lock(message: impl Into<String>) -> Self {
        LockError::DuplicateLock(message.into())
    }

    /// Create a new no lock held error
    pub fn no_lock_held(message: impl Into<String>) -> Self {
        LockError::NoLockHeld(message.into())
    }

    /// Create a new invalid lock error
    pub fn invalid_lock(message: impl Into<String>) -> Self {
        LockError::InvalidLock(message.into())
    }

    /// Create a new table unavailable error
    pub fn table_unavailable(message: impl Into<String>) -> Self {
        LockError::TableUnavailable(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            LockError::duplicate_lock("a"),
            LockError::no_lock_held("b"),
            LockError::invalid_lock("c"),
            LockError::table_unavailable("d"),
        ];
        let codes: Vec<u32> = errors.iter().map(|e| e.code().0).collect();
        let distinct: HashSet<u32> = codes.iter().copied().collect();
        assert_eq!(distinct.len(), errors.len());
        assert_eq!(codes, vec![6001, 6002, 6003, 6004]);
    }

    #[test]
    fn test_display() {
        let err = LockError::no_lock_held("T3 on database/orders");
        assert_eq!(err.to_string(), "No lock held: T3 on database/orders");
        assert!(!err.is_transient());
    }
}
