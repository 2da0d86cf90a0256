// Lock table and the pieces it is built from
//
// Transactions park on their own handle while they wait, so the table never
// holds its mutex across a suspension.

pub mod context;
pub mod lock_table;
pub mod request;
pub mod resource_entry;
pub mod snapshot;
pub mod transaction;

pub use context::LockContext;
pub use lock_table::{LockTable, SharedLockTable};
pub use request::LockRequest;
pub use resource_entry::{QueuePosition, ResourceEntry};
pub use snapshot::{QueuedRequest, ResourceSnapshot};
pub use transaction::{SharedTransaction, ThreadTransaction, TransactionHandle};
