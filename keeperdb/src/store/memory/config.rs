use crate::common::DEFAULT_MAX_TRANSACTION_ATTEMPTS;
use crate::errors::{DbError, DbResult, ErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Configuration for an in-memory store.
///
/// # Characteristics
/// - **Lightweight Cloning**: uses `Arc` internally, clones share settings
/// - **Thread-Safe**: settings can be changed through any clone
///
/// # Usage
/// ```text
/// let config = InMemoryStoreConfig::new();
/// config.set_max_transaction_attempts(3)?;
/// let store = InMemoryStore::new(config);
/// ```
#[derive(Default, Clone)]
pub struct InMemoryStoreConfig {
    inner: Arc<InMemoryStoreConfigInner>,
}

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig {
            inner: Arc::new(InMemoryStoreConfigInner::new()),
        }
    }

    /// How many times a conflicting transaction is attempted before the
    /// store gives up with a transaction conflict.
    pub fn max_transaction_attempts(&self) -> usize {
        self.inner.max_transaction_attempts.load(Ordering::Relaxed)
    }

    /// Sets the transaction attempt limit. Zero is rejected.
    pub fn set_max_transaction_attempts(&self, attempts: usize) -> DbResult<()> {
        if attempts == 0 {
            log::error!("Max transaction attempts must be at least 1");
            return Err(DbError::new(
                "Max transaction attempts must be at least 1",
                ErrorKind::InvalidArgument,
            ));
        }
        self.inner
            .max_transaction_attempts
            .store(attempts, Ordering::Relaxed);
        Ok(())
    }
}

struct InMemoryStoreConfigInner {
    max_transaction_attempts: AtomicUsize,
}

impl InMemoryStoreConfigInner {
    fn new() -> InMemoryStoreConfigInner {
        InMemoryStoreConfigInner {
            max_transaction_attempts: AtomicUsize::new(DEFAULT_MAX_TRANSACTION_ATTEMPTS),
        }
    }
}

impl Default for InMemoryStoreConfigInner {
    fn default() -> Self {
        Self::new()
    }
}
