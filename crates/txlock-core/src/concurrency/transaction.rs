// Transaction handles
//
// The lock table never parks a thread itself. It asks the transaction to
// prepare for suspension while holding the table lock, and the caller then
// suspends after the table lock has been released. Waking always happens
// from inside the table lock, during queue draining.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::trace;
use txlock_types::TransactionId;

/// Scheduling handle for one transaction
pub trait TransactionHandle: fmt::Debug + Send + Sync {
    /// The transaction's identifier
    fn id(&self) -> TransactionId;

    /// Mark the transaction as about to block. Called inside the table lock.
    fn prepare_suspend(&self);

    /// Block the calling context until `wake` is called. Called outside the
    /// table lock; returns immediately if `wake` already happened.
    fn suspend(&self);

    /// Release a suspended (or about to suspend) transaction. Called inside
    /// the table lock.
    fn wake(&self);
}

/// A transaction handle that can be cloned and stored in wait queues
pub type SharedTransaction = Arc<dyn TransactionHandle>;

/// Transaction handle for thread-per-transaction callers
///
/// Suspension parks the calling thread on a condition variable.
pub struct ThreadTransaction {
    id: TransactionId,
    blocked: Mutex<bool>,
    unblocked: Condvar,
}

impl ThreadTransaction {
    /// Create a new handle
    pub fn new(id: TransactionId) -> Self {
        Self {
            id,
            blocked: Mutex::new(false),
            unblocked: Condvar::new(),
        }
    }

    /// Create a new handle ready to be passed to the lock table
    pub fn shared(id: TransactionId) -> SharedTransaction {
        Arc::new(Self::new(id))
    }

    /// Whether the transaction is currently marked as blocked
    pub fn is_blocked(&self) -> bool {
        *self.blocked.lock()
    }
}

impl TransactionHandle for ThreadTransaction {
    fn id(&self) -> TransactionId {
        self.id
    }

    fn prepare_suspend(&self) {
        *self.blocked.lock() = true;
    }

    fn suspend(&self) {
        let mut blocked = self.blocked.lock();
        while *blocked {
            trace!(txn = %self.id, "suspending");
            self.unblocked.wait(&mut blocked);
        }
    }

    fn wake(&self) {
        let mut blocked = self.blocked.lock();
        *blocked = false;
        self.unblocked.notify_all();
    }
}

impl fmt::Debug for ThreadTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadTransaction")
            .field("id", &self.id)
            .field("blocked", &self.is_blocked())
            .finish()
    }
}
