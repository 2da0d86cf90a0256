//! Shared helpers for the lock table integration tests

#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};
use txlock_core::{ResourceName, SharedTransaction, TransactionHandle, TransactionId};

static INIT: Once = Once::new();

/// Initialize test logging once per test binary
pub fn init_test_logging() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("txlock_core=debug"));
        let subscriber = Registry::default()
            .with(env_filter)
            .with(tracing_fmt::layer().with_test_writer());
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Transaction handle that records suspension instead of parking
///
/// A blocked call returns straight away, which lets a single test thread
/// drive several transactions and inspect the queues in between.
pub struct DummyTransaction {
    id: TransactionId,
    blocked: AtomicBool,
    suspensions: AtomicUsize,
}

impl DummyTransaction {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id: TransactionId::new(id),
            blocked: AtomicBool::new(false),
            suspensions: AtomicUsize::new(0),
        })
    }

    /// Handle to pass to the lock table
    pub fn handle(self: &Arc<Self>) -> SharedTransaction {
        self.clone()
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Number of times the table asked this transaction to suspend
    pub fn suspensions(&self) -> usize {
        self.suspensions.load(Ordering::SeqCst)
    }
}

impl TransactionHandle for DummyTransaction {
    fn id(&self) -> TransactionId {
        self.id
    }

    fn prepare_suspend(&self) {
        self.blocked.store(true, Ordering::SeqCst);
    }

    fn suspend(&self) {
        self.suspensions.fetch_add(1, Ordering::SeqCst);
    }

    fn wake(&self) {
        self.blocked.store(false, Ordering::SeqCst);
    }
}

impl fmt::Debug for DummyTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyTransaction")
            .field("id", &self.id)
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// Parse a resource path such as `database/orders`
pub fn name(path: &str) -> ResourceName {
    path.parse().unwrap()
}

pub fn tid(id: u64) -> TransactionId {
    TransactionId::new(id)
}
