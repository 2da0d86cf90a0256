// Lock records

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LockType, ResourceName, TransactionId};

/// A lock of type `lock_type` on `name`, held by `transaction`
///
/// Two locks describe the same grant when resource and transaction match;
/// the type may change in place without that counting as a new grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lock {
    /// Resource the lock is on
    pub name: ResourceName,

    /// Type of lock
    pub lock_type: LockType,

    /// Transaction holding the lock
    pub transaction: TransactionId,
}

impl Lock {
    /// Create a new lock record
    pub fn new(name: ResourceName, lock_type: LockType, transaction: TransactionId) -> Self {
        Self {
            name,
            lock_type,
            transaction,
        }
    }

    /// Whether `other` refers to the same (resource, transaction) grant
    pub fn same_grant(&self, other: &Lock) -> bool {
        self.transaction == other.transaction && self.name == other.name
    }
}

impl fmt::Display for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}({})", self.transaction, self.lock_type, self.name)
    }
}
