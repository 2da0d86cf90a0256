// Named lock contexts
//
// A LockContext is a handle on one resource of the hierarchy. Contexts are
// memoized: asking a table or a parent context for the same name twice
// returns the same object. They forward to the lock table and add no
// locking rules of their own.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use txlock_error::{LockError, LockResult, TypesResult};
use txlock_types::{LockType, ResourceName, TransactionId};

use super::lock_table::{LockTable, SharedLockTable};
use super::transaction::{SharedTransaction, TransactionHandle};

/// Handle on a single named resource
pub struct LockContext {
    table: Weak<LockTable>,
    parent: Option<Weak<LockContext>>,
    name: ResourceName,
    children: Mutex<HashMap<String, Arc<LockContext>>>,
}

impl LockContext {
    pub(crate) fn new(
        table: Weak<LockTable>,
        parent: Option<Weak<LockContext>>,
        name: ResourceName,
    ) -> Self {
        Self {
            table,
            parent,
            name,
            children: Mutex::new(HashMap::new()),
        }
    }

    /// Name of the resource this context locks
    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Enclosing context, if any
    ///
    /// Parents are kept alive by the table, so this is `None` only for
    /// top-level contexts or once the table has been dropped.
    pub fn parent(&self) -> Option<Arc<LockContext>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Child context called `name`, created on first use
    ///
    /// Fails if `name` is empty or contains the separator.
    pub fn child(self: &Arc<Self>, name: &str) -> TypesResult<Arc<LockContext>> {
        let mut children = self.children.lock();
        if let Some(child) = children.get(name) {
            return Ok(child.clone());
        }
        let child = Arc::new(LockContext::new(
            self.table.clone(),
            Some(Arc::downgrade(self)),
            self.name.child(name)?,
        ));
        children.insert(name.to_string(), child.clone());
        Ok(child)
    }

    /// Number of children created so far
    pub fn child_count(&self) -> usize {
        self.children.lock().len()
    }

    /// Acquire a `lock_type` lock on this context's resource
    pub fn acquire(&self, transaction: &SharedTransaction, lock_type: LockType) -> LockResult<()> {
        self.table()?.acquire(transaction, &self.name, lock_type)
    }

    /// Release the transaction's lock on this context's resource
    pub fn release(&self, transaction: &SharedTransaction) -> LockResult<()> {
        self.table()?.release(transaction, &self.name)
    }

    /// Promote the transaction's lock on this context's resource
    pub fn promote(&self, transaction: &SharedTransaction, new_type: LockType) -> LockResult<()> {
        self.table()?.promote(transaction, &self.name, new_type)
    }

    /// Type of lock `transaction` holds on this context's resource
    pub fn lock_type(&self, transaction: TransactionId) -> LockResult<LockType> {
        Ok(self.table()?.lock_type(transaction, &self.name))
    }

    fn table(&self) -> LockResult<SharedLockTable> {
        self.table.upgrade().ok_or_else(|| {
            LockError::table_unavailable(format!("lock table behind context {} was dropped", self.name))
        })
    }
}

impl fmt::Debug for LockContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockContext")
            .field("name", &self.name)
            .field("children", &self.child_count())
            .finish()
    }
}
