// Transactional lock table
//
// The LockTable keeps track of which transactions hold which locks on which
// resources and queues the requests that cannot be granted yet. It knows
// nothing about lock hierarchies; that is left to the callers.
//
// Every resource has a FIFO queue of pending requests. The queue is drained
// whenever a lock on that resource is released, from the front, stopping at
// the first request that still cannot be granted. With a queue of
// `S(A) X(A) S(A)` behind an exclusive lock, releasing that lock grants only
// the first request.
//
// All state lives behind one mutex. Decisions that span several resources
// (acquire-and-release) are therefore atomic, and a transaction is only ever
// suspended after that mutex has been released.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};
use txlock_error::{bail, ensure, ConfigResult, LockError, LockResult, TypesResult};
use txlock_types::{Lock, LockType, ResourceName, TransactionId};

use super::context::LockContext;
use super::request::LockRequest;
use super::resource_entry::{Grant, QueuePosition, ResourceEntry};
use super::snapshot::ResourceSnapshot;
use super::transaction::{SharedTransaction, TransactionHandle};
use crate::config::LockTableConfig;

/// A lock table that can be shared between transaction threads
pub type SharedLockTable = Arc<LockTable>;

/// Bookkeeping guarded by the table mutex
///
/// `transaction_locks` and the entries' lock lists are two views of the same
/// set of grants and are only ever changed together.
#[derive(Debug, Default)]
struct LockTableState {
    /// Locks held by each transaction, in acquisition order
    transaction_locks: HashMap<TransactionId, Vec<Lock>>,
    /// Granted locks and wait queue of each resource
    resource_entries: HashMap<ResourceName, ResourceEntry>,
}

impl LockTableState {
    fn held_lock(&self, transaction: TransactionId, name: &ResourceName) -> Option<&Lock> {
        self.transaction_locks
            .get(&transaction)?
            .iter()
            .find(|held| &held.name == name)
    }

    fn entry_mut(&mut self, name: &ResourceName) -> &mut ResourceEntry {
        self.resource_entries.entry(name.clone()).or_default()
    }

    /// Whether `lock` has to wait. New acquisitions also wait behind any
    /// queued request so that later arrivals never overtake earlier ones.
    fn must_wait(&self, lock: &Lock, behind_queue: bool) -> bool {
        match self.resource_entries.get(&lock.name) {
            Some(entry) => {
                !entry.check_compatible(lock.lock_type, lock.transaction)
                    || (behind_queue && entry.has_waiters())
            }
            None => false,
        }
    }

    /// Give `lock` to its transaction, replacing in place any lock the
    /// transaction already holds on the resource.
    fn grant_or_update(&mut self, lock: Lock) {
        let outcome = self.entry_mut(&lock.name).grant_or_update(lock.clone());
        match outcome {
            Grant::New => {
                debug!(txn = %lock.transaction, resource = %lock.name, lock_type = %lock.lock_type, "lock granted");
                self.transaction_locks
                    .entry(lock.transaction)
                    .or_default()
                    .push(lock);
            }
            Grant::Updated { previous } => {
                debug!(
                    txn = %lock.transaction,
                    resource = %lock.name,
                    from = %previous,
                    to = %lock.lock_type,
                    "lock replaced in place"
                );
                if let Some(held) = self
                    .transaction_locks
                    .get_mut(&lock.transaction)
                    .and_then(|locks| locks.iter_mut().find(|held| held.name == lock.name))
                {
                    held.lock_type = lock.lock_type;
                }
            }
        }
    }

    /// Remove `transaction`'s lock on `name` and drain that resource's queue
    fn release(&mut self, transaction: TransactionId, name: &ResourceName) -> Option<Lock> {
        let removed = self
            .resource_entries
            .get_mut(name)
            .and_then(|entry| entry.remove(transaction));

        if let Some(locks) = self.transaction_locks.get_mut(&transaction) {
            locks.retain(|held| &held.name != name);
            if locks.is_empty() {
                self.transaction_locks.remove(&transaction);
            }
        }

        if let Some(lock) = &removed {
            debug!(txn = %transaction, resource = %name, lock_type = %lock.lock_type, "lock released");
        }
        self.drain_queue(name);
        removed
    }

    /// Grant requests from the front of `name`'s queue until one cannot be
    /// granted. Each request is fully committed (grant, deferred releases,
    /// wake) before the next one is considered.
    fn drain_queue(&mut self, name: &ResourceName) {
        while let Some(request) = self
            .resource_entries
            .get_mut(name)
            .and_then(|entry| entry.pop_grantable())
        {
            let transaction = request.transaction_id();
            self.grant_or_update(request.lock.clone());

            for held in &request.release_on_grant {
                if self.held_lock(held.transaction, &held.name).is_some() {
                    self.release(held.transaction, &held.name);
                } else {
                    warn!(txn = %transaction, resource = %held.name, "deferred release of a lock no longer held");
                }
            }

            debug!(txn = %transaction, resource = %name, "queued request granted");
            request.transaction.wake();
        }
        self.prune(name);
    }

    fn prune(&mut self, name: &ResourceName) {
        if self
            .resource_entries
            .get(name)
            .map_or(false, ResourceEntry::is_idle)
        {
            self.resource_entries.remove(name);
        }
    }
}

/// The lock table shared by all transactions of a database
#[derive(Debug)]
pub struct LockTable {
    config: LockTableConfig,
    state: Mutex<LockTableState>,
    /// Top-level contexts handed out so far, by name
    contexts: Mutex<HashMap<String, Arc<LockContext>>>,
    this: Weak<LockTable>,
}

impl LockTable {
    /// Create a lock table with the default configuration
    pub fn new() -> SharedLockTable {
        Self::build(LockTableConfig::default())
    }

    /// Create a lock table from a validated configuration
    pub fn with_config(config: LockTableConfig) -> ConfigResult<SharedLockTable> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: LockTableConfig) -> SharedLockTable {
        Arc::new_cyclic(|this| LockTable {
            config,
            state: Mutex::new(LockTableState::default()),
            contexts: Mutex::new(HashMap::new()),
            this: this.clone(),
        })
    }

    /// The configuration this table was built with
    pub fn config(&self) -> &LockTableConfig {
        &self.config
    }

    /// Acquire a `lock_type` lock on `name` for `transaction`.
    ///
    /// If the lock conflicts with another transaction's lock, or anyone is
    /// already waiting on `name`, the request goes to the back of the queue
    /// and the calling transaction is suspended until it is granted.
    ///
    /// Fails with `DuplicateLock` if `transaction` already holds a lock on
    /// `name`.
    pub fn acquire(
        &self,
        transaction: &SharedTransaction,
        name: &ResourceName,
        lock_type: LockType,
    ) -> LockResult<()> {
        let txn = transaction.id();
        let should_block = {
            let mut state = self.state.lock();
            ensure!(
                state.held_lock(txn, name).is_none(),
                LockError::duplicate_lock(format!("{} already holds a lock on {}", txn, name))
            );

            let lock = Lock::new(name.clone(), lock_type, txn);
            let should_block = state.must_wait(&lock, true);
            if should_block {
                transaction.prepare_suspend();
                self.enqueue(&mut state, LockRequest::new(transaction.clone(), lock), QueuePosition::Back);
            } else {
                state.grant_or_update(lock);
            }
            should_block
        };

        if should_block {
            transaction.suspend();
        }
        Ok(())
    }

    /// Acquire a `lock_type` lock on `name` and, in the same atomic step,
    /// release the transaction's locks on `release_names` (in that order).
    ///
    /// If the new lock conflicts, or anyone is already waiting on `name`,
    /// the request goes to the front of the queue and the releases happen
    /// when it is granted. A request that only waited behind the queue is
    /// granted at once from the front, so the caller does not stay
    /// suspended.
    ///
    /// Fails with `DuplicateLock` if `transaction` already holds a lock on
    /// `name`, and with `NoLockHeld` if it does not hold a lock on one of
    /// `release_names`. Nothing changes when either error is returned.
    pub fn acquire_and_release(
        &self,
        transaction: &SharedTransaction,
        name: &ResourceName,
        lock_type: LockType,
        release_names: &[ResourceName],
    ) -> LockResult<()> {
        let txn = transaction.id();
        let should_block = {
            let mut state = self.state.lock();
            ensure!(
                state.held_lock(txn, name).is_none(),
                LockError::duplicate_lock(format!("{} already holds a lock on {}", txn, name))
            );

            let mut released: Vec<Lock> = Vec::with_capacity(release_names.len());
            for release_name in release_names {
                ensure!(
                    !released.iter().any(|held| &held.name == release_name),
                    LockError::no_lock_held(format!(
                        "{} is listed more than once for release by {}",
                        release_name, txn
                    ))
                );
                match state.held_lock(txn, release_name) {
                    Some(held) => released.push(held.clone()),
                    None => bail!(LockError::no_lock_held(format!(
                        "{} holds no lock on {}",
                        txn, release_name
                    ))),
                }
            }

            let lock = Lock::new(name.clone(), lock_type, txn);
            let should_block = state.must_wait(&lock, true);
            if should_block {
                transaction.prepare_suspend();
                let request = LockRequest::with_releases(transaction.clone(), lock, released);
                self.enqueue(&mut state, request, QueuePosition::Front);
                // Queued only because others were waiting: as the new head it
                // may be grantable right away, in which case this wakes it.
                state.drain_queue(name);
            } else {
                state.grant_or_update(lock);
                for held in &released {
                    state.release(txn, &held.name);
                }
            }
            should_block
        };

        if should_block {
            transaction.suspend();
        }
        Ok(())
    }

    /// Release `transaction`'s lock on `name` and process the queue.
    ///
    /// Fails with `NoLockHeld` if `transaction` holds no lock on `name`.
    pub fn release(&self, transaction: &SharedTransaction, name: &ResourceName) -> LockResult<()> {
        let txn = transaction.id();
        let mut state = self.state.lock();
        ensure!(
            state.held_lock(txn, name).is_some(),
            LockError::no_lock_held(format!("{} holds no lock on {}", txn, name))
        );
        state.release(txn, name);
        Ok(())
    }

    /// Change `transaction`'s lock on `name` to `new_type`, keeping its
    /// acquisition position.
    ///
    /// If the new type conflicts with another transaction's lock the request
    /// goes to the front of the queue and the transaction is suspended.
    ///
    /// Fails with `NoLockHeld` if there is no lock to promote,
    /// `DuplicateLock` if it already has type `new_type`, and `InvalidLock`
    /// if `new_type` cannot substitute the current type.
    pub fn promote(
        &self,
        transaction: &SharedTransaction,
        name: &ResourceName,
        new_type: LockType,
    ) -> LockResult<()> {
        let txn = transaction.id();
        let should_block = {
            let mut state = self.state.lock();
            let current = match state.held_lock(txn, name) {
                Some(held) => held.lock_type,
                None => bail!(LockError::no_lock_held(format!("{} holds no lock on {}", txn, name))),
            };
            ensure!(
                current != new_type,
                LockError::duplicate_lock(format!("{} already holds {} on {}", txn, new_type, name))
            );
            ensure!(
                LockType::substitutable(new_type, current),
                LockError::invalid_lock(format!(
                    "{} is not a promotion of {} on {}",
                    new_type, current, name
                ))
            );

            let lock = Lock::new(name.clone(), new_type, txn);
            let should_block = state.must_wait(&lock, false);
            if should_block {
                transaction.prepare_suspend();
                self.enqueue(&mut state, LockRequest::new(transaction.clone(), lock), QueuePosition::Front);
            } else {
                state.grant_or_update(lock);
            }
            should_block
        };

        if should_block {
            transaction.suspend();
        }
        Ok(())
    }

    fn enqueue(&self, state: &mut LockTableState, request: LockRequest, position: QueuePosition) {
        let txn = request.transaction_id();
        let name = request.lock.name.clone();
        debug!(
            txn = %txn,
            resource = %name,
            lock_type = %request.lock.lock_type,
            ?position,
            "request queued"
        );

        let entry = state.entry_mut(&name);
        entry.add_to_queue(request, position);

        let threshold = self.config.queue_warning_threshold;
        if threshold > 0 && entry.queue_len() >= threshold {
            warn!(resource = %name, queued = entry.queue_len(), "long lock queue");
        }
    }

    /// Type of lock `transaction` holds on `name`, or NL
    pub fn lock_type(&self, transaction: TransactionId, name: &ResourceName) -> LockType {
        let state = self.state.lock();
        state
            .resource_entries
            .get(name)
            .map_or(LockType::NL, |entry| entry.transaction_lock_type(transaction))
    }

    /// Locks held on `name`, in order of acquisition
    pub fn locks_on(&self, name: &ResourceName) -> Vec<Lock> {
        let state = self.state.lock();
        state
            .resource_entries
            .get(name)
            .map(|entry| entry.locks().to_vec())
            .unwrap_or_default()
    }

    /// Locks held by `transaction`, in order of acquisition
    pub fn locks_held_by(&self, transaction: TransactionId) -> Vec<Lock> {
        let state = self.state.lock();
        state
            .transaction_locks
            .get(&transaction)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of requests waiting on `name`
    pub fn queue_len(&self, name: &ResourceName) -> usize {
        let state = self.state.lock();
        state
            .resource_entries
            .get(name)
            .map_or(0, ResourceEntry::queue_len)
    }

    /// Whether `transaction` has a request waiting on any resource
    pub fn is_waiting(&self, transaction: TransactionId) -> bool {
        let state = self.state.lock();
        state
            .resource_entries
            .values()
            .any(|entry| entry.is_waiting(transaction))
    }

    /// Copy of the active locks and queue of `name`
    pub fn resource_snapshot(&self, name: &ResourceName) -> ResourceSnapshot {
        let state = self.state.lock();
        ResourceSnapshot::capture(name, state.resource_entries.get(name))
    }

    /// Top-level lock context called `name`, created on first use
    ///
    /// `name` is a single path segment; nested resources are reached with
    /// [`LockContext::child`]. Fails if it is empty or contains the separator.
    pub fn context(&self, name: &str) -> TypesResult<Arc<LockContext>> {
        let mut contexts = self.contexts.lock();
        if let Some(context) = contexts.get(name) {
            return Ok(context.clone());
        }
        let context = Arc::new(LockContext::new(
            self.this.clone(),
            None,
            ResourceName::new(name)?,
        ));
        contexts.insert(name.to_string(), context.clone());
        Ok(context)
    }

    /// Lock context for the whole database
    ///
    /// Only fails for a root name that was never validated, which
    /// [`LockTable::with_config`] rules out.
    pub fn database_context(&self) -> TypesResult<Arc<LockContext>> {
        self.context(&self.config.root_name)
    }
}
