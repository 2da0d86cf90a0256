// TxLock Core Library
//
// In-memory lock table for a transactional database: shared and exclusive
// locks with intent modes, per-resource FIFO wait queues, and named lock
// contexts on top.

// Lock table, wait queues and transaction handles
pub mod concurrency;

// TOML-backed table configuration
pub mod config;

// Tracing subscriber setup
pub mod logging;

pub use txlock_error as error;
pub use txlock_types as types;

pub use concurrency::{
    LockContext, LockRequest, LockTable, QueuePosition, QueuedRequest, ResourceEntry,
    ResourceSnapshot, SharedLockTable, SharedTransaction, ThreadTransaction, TransactionHandle,
};
pub use config::LockTableConfig;
pub use logging::init_tracing;
pub use txlock_error::{LockError, LockResult};
pub use txlock_types::{Lock, LockType, ResourceName, TransactionId};
