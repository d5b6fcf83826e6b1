//! Configuration of a [`Database`](crate::database::Database) handle.

use crate::errors::{DbError, DbResult, ErrorKind};
use crate::store::memory::InMemoryStore;
use crate::store::DocumentStore;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Settings shared by a database handle and every repository it creates.
///
/// Settings can only be changed until the configuration is applied by
/// [`DbBuilder::open`](crate::db_builder::DbBuilder::open); afterwards every
/// setter fails.
#[derive(Clone, Default)]
pub struct DbConfig {
    inner: Arc<DbConfigInner>,
}

impl DbConfig {
    pub fn new() -> Self {
        DbConfig {
            inner: Arc::new(DbConfigInner::new()),
        }
    }
}

impl Deref for DbConfig {
    type Target = DbConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct DbConfigInner {
    configured: AtomicBool,
    store: OnceLock<DocumentStore>,
    ignore_null_fields: AtomicBool,
}

impl DbConfigInner {
    fn new() -> Self {
        DbConfigInner {
            configured: AtomicBool::new(false),
            store: OnceLock::new(),
            ignore_null_fields: AtomicBool::new(true),
        }
    }

    fn ensure_not_configured(&self, setting: &str) -> DbResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after the database is opened", setting);
            return Err(DbError::new(
                &format!("{} cannot be changed after the database is opened", setting),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(())
    }

    /// The injected store, once one is set.
    pub fn store(&self) -> Option<DocumentStore> {
        self.store.get().cloned()
    }

    /// Injects the store every repository of the database talks to. The
    /// store can be set only once.
    pub fn set_store(&self, store: DocumentStore) -> DbResult<()> {
        self.ensure_not_configured("Store")?;
        if self.store.set(store).is_err() {
            log::error!("Store is already set");
            return Err(DbError::new("Store is already set", ErrorKind::InvalidArgument));
        }
        Ok(())
    }

    /// Whether top-level `null` fields are dropped from encoded writes.
    pub fn ignore_null_fields(&self) -> bool {
        self.ignore_null_fields.load(Ordering::Relaxed)
    }

    pub fn set_ignore_null_fields(&self, ignore: bool) -> DbResult<()> {
        self.ensure_not_configured("Ignore null fields")?;
        self.ignore_null_fields.store(ignore, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    /// Fills in defaults, currently a fresh in-memory store when none was
    /// injected, and freezes the configuration.
    pub(crate) fn auto_configure(&self) -> DbResult<DocumentStore> {
        if self.configured.swap(true, Ordering::Relaxed) {
            log::error!("Database configuration is already applied");
            return Err(DbError::new(
                "Database configuration is already applied",
                ErrorKind::InvalidArgument,
            ));
        }
        let store = self.store.get_or_init(|| {
            log::debug!("No store configured, using an in-memory store");
            DocumentStore::new(InMemoryStore::default())
        });
        Ok(store.clone())
    }
}

impl Default for DbConfigInner {
    fn default() -> Self {
        Self::new()
    }
}
