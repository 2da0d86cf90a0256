// Per-resource lock state
//
// A ResourceEntry holds the locks currently granted on one resource, in
// acquisition order, and the FIFO queue of requests waiting for it. It owns
// the compatibility check used both for new requests and for draining the
// queue. Changes that also touch the per-transaction index go through
// `LockTableState`, which keeps the two views in step.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;
use txlock_types::{Lock, LockType, TransactionId};

use super::request::LockRequest;

/// Where a blocked request is placed in a resource's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePosition {
    /// Ahead of every waiting request (promotions, acquire-and-release)
    Front,
    /// Behind every waiting request (plain acquires)
    Back,
}

/// Outcome of recording a grant on a resource entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grant {
    /// The transaction had no lock here; the grant was appended
    New,
    /// The transaction's existing lock was changed in place
    Updated { previous: LockType },
}

/// Active locks and waiting requests for a single resource
#[derive(Debug, Default)]
pub struct ResourceEntry {
    /// Currently granted locks, in acquisition order
    locks: Vec<Lock>,
    /// Requests that could not be granted yet
    waiting_queue: VecDeque<LockRequest>,
}

impl ResourceEntry {
    /// Create an empty entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `lock_type` is compatible with every lock held here by a
    /// transaction other than `except`.
    pub fn check_compatible(&self, lock_type: LockType, except: TransactionId) -> bool {
        let conflict = self
            .locks
            .iter()
            .filter(|held| held.transaction != except)
            .find(|held| !LockType::compatible(lock_type, held.lock_type));

        if let Some(held) = conflict {
            trace!(requested = %lock_type, conflicting = %held, "incompatible with active lock");
            return false;
        }
        true
    }

    /// Record `lock` as granted. An existing lock of the same transaction is
    /// updated in place so its acquisition position is kept.
    pub(crate) fn grant_or_update(&mut self, lock: Lock) -> Grant {
        match self
            .locks
            .iter_mut()
            .find(|held| held.transaction == lock.transaction)
        {
            Some(held) => {
                let previous = held.lock_type;
                held.lock_type = lock.lock_type;
                Grant::Updated { previous }
            }
            None => {
                self.locks.push(lock);
                Grant::New
            }
        }
    }

    /// Remove the lock held by `transaction`, if any
    pub(crate) fn remove(&mut self, transaction: TransactionId) -> Option<Lock> {
        let position = self
            .locks
            .iter()
            .position(|held| held.transaction == transaction)?;
        Some(self.locks.remove(position))
    }

    /// Add `request` to the front or back of the queue
    pub(crate) fn add_to_queue(&mut self, request: LockRequest, position: QueuePosition) {
        match position {
            QueuePosition::Front => self.waiting_queue.push_front(request),
            QueuePosition::Back => self.waiting_queue.push_back(request),
        }
    }

    /// Remove and return the request at the head of the queue if it can be
    /// granted against the current locks. Never looks past the head.
    pub(crate) fn pop_grantable(&mut self) -> Option<LockRequest> {
        let head = self.waiting_queue.front()?;
        if !self.check_compatible(head.lock.lock_type, head.transaction_id()) {
            return None;
        }
        self.waiting_queue.pop_front()
    }

    /// Get the type of lock `transaction` holds here, or NL
    pub fn transaction_lock_type(&self, transaction: TransactionId) -> LockType {
        self.locks
            .iter()
            .find(|held| held.transaction == transaction)
            .map(|held| held.lock_type)
            .unwrap_or(LockType::NL)
    }

    /// Currently granted locks, in acquisition order
    pub fn locks(&self) -> &[Lock] {
        &self.locks
    }

    /// Waiting requests, front first
    pub fn waiting(&self) -> impl Iterator<Item = &LockRequest> {
        self.waiting_queue.iter()
    }

    /// Number of waiting requests
    pub fn queue_len(&self) -> usize {
        self.waiting_queue.len()
    }

    /// Whether any request is waiting
    pub fn has_waiters(&self) -> bool {
        !self.waiting_queue.is_empty()
    }

    /// Whether `transaction` has a request waiting here
    pub fn is_waiting(&self, transaction: TransactionId) -> bool {
        self.waiting_queue
            .iter()
            .any(|request| request.transaction_id() == transaction)
    }

    /// Whether the entry holds nothing and can be dropped
    pub fn is_idle(&self) -> bool {
        self.locks.is_empty() && self.waiting_queue.is_empty()
    }
}

impl fmt::Display for ResourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let locks: Vec<String> = self.locks.iter().map(|l| l.to_string()).collect();
        let queue: Vec<String> = self.waiting_queue.iter().map(|r| r.to_string()).collect();
        write!(
            f,
            "Active Locks: [{}], Queue: [{}]",
            locks.join(", "),
            queue.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::transaction::ThreadTransaction;
    use txlock_types::ResourceName;

    fn lock(txn: u64, lock_type: LockType) -> Lock {
        Lock::new(ResourceName::new("database").unwrap(), lock_type, TransactionId::new(txn))
    }

    fn request(txn: u64, lock_type: LockType) -> LockRequest {
        LockRequest::new(
            ThreadTransaction::shared(TransactionId::new(txn)),
            lock(txn, lock_type),
        )
    }

    #[test]
    fn test_check_compatible_exempts_own_locks() {
        let mut entry = ResourceEntry::new();
        entry.grant_or_update(lock(1, LockType::S));

        assert!(entry.check_compatible(LockType::X, TransactionId::new(1)));
        assert!(!entry.check_compatible(LockType::X, TransactionId::new(2)));
        assert!(entry.check_compatible(LockType::IS, TransactionId::new(2)));
    }

    #[test]
    fn test_grant_or_update_keeps_position() {
        let mut entry = ResourceEntry::new();
        assert_eq!(entry.grant_or_update(lock(1, LockType::IS)), Grant::New);
        assert_eq!(entry.grant_or_update(lock(2, LockType::IS)), Grant::New);

        let outcome = entry.grant_or_update(lock(1, LockType::IX));
        assert_eq!(outcome, Grant::Updated { previous: LockType::IS });
        assert_eq!(entry.locks(), &[lock(1, LockType::IX), lock(2, LockType::IS)]);
        assert_eq!(entry.transaction_lock_type(TransactionId::new(1)), LockType::IX);
        assert_eq!(entry.transaction_lock_type(TransactionId::new(3)), LockType::NL);
    }

    #[test]
    fn test_pop_grantable_stops_at_blocked_head() {
        let mut entry = ResourceEntry::new();
        entry.grant_or_update(lock(1, LockType::S));
        entry.add_to_queue(request(2, LockType::X), QueuePosition::Back);
        entry.add_to_queue(request(3, LockType::S), QueuePosition::Back);

        // T3 would fit, but T2 is ahead of it
        assert!(entry.pop_grantable().is_none());
        assert_eq!(entry.queue_len(), 2);

        entry.remove(TransactionId::new(1));
        let granted = entry.pop_grantable().unwrap();
        assert_eq!(granted.transaction_id(), TransactionId::new(2));
    }

    #[test]
    fn test_front_insertion() {
        let mut entry = ResourceEntry::new();
        entry.add_to_queue(request(1, LockType::S), QueuePosition::Back);
        entry.add_to_queue(request(2, LockType::X), QueuePosition::Front);

        let order: Vec<u64> = entry
            .waiting()
            .map(|r| r.transaction_id().as_u64())
            .collect();
        assert_eq!(order, vec![2, 1]);
        assert!(entry.is_waiting(TransactionId::new(1)));
        assert!(!entry.is_idle());
    }

    #[test]
    fn test_display() {
        let mut entry = ResourceEntry::new();
        entry.grant_or_update(lock(1, LockType::X));
        entry.add_to_queue(request(2, LockType::S), QueuePosition::Back);

        assert_eq!(
            entry.to_string(),
            "Active Locks: [T1: X(database)], Queue: [Request for T2: S(database)]"
        );
    }
}
