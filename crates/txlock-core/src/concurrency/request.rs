// Pending lock requests

use std::fmt;

use txlock_types::{Lock, TransactionId};

use super::transaction::SharedTransaction;

/// A request for a lock that could not be granted when it was made
///
/// `release_on_grant` is only non-empty for queued acquire-and-release
/// requests; those locks are released as part of committing the grant.
#[derive(Clone)]
pub struct LockRequest {
    /// Transaction that made the request, woken once it is granted
    pub transaction: SharedTransaction,

    /// The lock being asked for
    pub lock: Lock,

    /// Locks to release, in order, once `lock` is granted
    pub release_on_grant: Vec<Lock>,
}

impl LockRequest {
    /// Create a plain acquire or promote request
    pub fn new(transaction: SharedTransaction, lock: Lock) -> Self {
        Self::with_releases(transaction, lock, Vec::new())
    }

    /// Create a request that releases `release_on_grant` once granted
    pub fn with_releases(
        transaction: SharedTransaction,
        lock: Lock,
        release_on_grant: Vec<Lock>,
    ) -> Self {
        Self {
            transaction,
            lock,
            release_on_grant,
        }
    }

    /// Identifier of the requesting transaction
    pub fn transaction_id(&self) -> TransactionId {
        self.lock.transaction
    }
}

impl fmt::Display for LockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request for {}", self.lock)?;
        if !self.release_on_grant.is_empty() {
            let released: Vec<String> = self.release_on_grant.iter().map(|l| l.to_string()).collect();
            write!(f, " (releasing {})", released.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRequest")
            .field("lock", &self.lock)
            .field("release_on_grant", &self.release_on_grant)
            .finish()
    }
}
