use crate::database::Database;
use crate::db_config::DbConfig;
use crate::errors::{DbError, DbResult};
use crate::store::{DocumentStore, DocumentStoreProvider};

/// Builder for a [`Database`] handle.
///
/// Errors raised while configuring are captured and returned by
/// [`open`](DbBuilder::open), so the chain never has to be interrupted.
///
/// # Examples
///
/// ```rust
/// use keeperdb::database::Database;
/// use keeperdb::store::memory::InMemoryStore;
///
/// let db = Database::builder()
///     .store(InMemoryStore::default())
///     .ignore_null_fields(false)
///     .open()
///     .unwrap();
/// assert!(!db.config().ignore_null_fields());
/// ```
#[derive(Default)]
pub struct DbBuilder {
    error: Option<DbError>,
    config: DbConfig,
}

impl DbBuilder {
    pub fn new() -> Self {
        DbBuilder {
            error: None,
            config: DbConfig::new(),
        }
    }

    /// Injects the store the database talks to. Defaults to a fresh
    /// in-memory store.
    pub fn store<P: DocumentStoreProvider + 'static>(self, store: P) -> Self {
        self.store_handle(DocumentStore::new(store))
    }

    /// Injects an already shared store handle.
    pub fn store_handle(mut self, store: DocumentStore) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_store(store) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Whether top-level `null` fields are dropped from writes. Defaults to
    /// `true`.
    pub fn ignore_null_fields(mut self, ignore: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_ignore_null_fields(ignore) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Applies the configuration and opens the database.
    pub fn open(self) -> DbResult<Database> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let store = self.config.auto_configure()?;
        Ok(Database::new(self.config, store))
    }
}
