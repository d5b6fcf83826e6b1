use crate::collection::Collection;
use crate::common::CodecRef;
use crate::db_builder::DbBuilder;
use crate::db_config::DbConfig;
use crate::repository::CollectionRepository;
use crate::store::{DocumentStore, FieldValue, WriteBatch};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Number;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Entry point of the crate: a configured handle to one document store.
///
/// A `Database` is created once at process start and handed to whatever
/// needs repositories; clones share the same store and configuration.
///
/// # Examples
///
/// ```rust
/// use keeperdb::collection::Collection;
/// use keeperdb::database::Database;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Pricing {
///     tier: String,
///     price: i64,
/// }
///
/// const PRICING: Collection<Pricing> = Collection::new("pricing");
///
/// let db = Database::builder().open().unwrap();
/// let repo = db.repository(&PRICING);
/// assert_eq!(repo.collection().name(), "pricing");
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DbBuilder {
        DbBuilder::new()
    }

    pub(crate) fn new(config: DbConfig, store: DocumentStore) -> Self {
        Database {
            inner: Arc::new(DatabaseInner { config, store }),
        }
    }

    /// Binds a declared collection to this database's store.
    pub fn repository<T>(&self, collection: &Collection<T>) -> CollectionRepository<T>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        CollectionRepository::new(self.inner.store.clone(), collection)
            .ignore_null_fields(self.inner.config.ignore_null_fields())
    }

    /// Binds a declared collection with a custom codec.
    pub fn repository_with_codec<T>(
        &self,
        collection: &Collection<T>,
        codec: CodecRef<T>,
    ) -> CollectionRepository<T> {
        CollectionRepository::with_codec(self.inner.store.clone(), collection, codec)
            .ignore_null_fields(self.inner.config.ignore_null_fields())
    }

    /// Binds a collection whose name is only known at runtime.
    pub fn collection<T>(&self, name: &str) -> CollectionRepository<T>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.repository(&Collection::named(name))
    }

    /// Starts an empty write batch against this database's store.
    pub fn create_batch(&self) -> WriteBatch {
        WriteBatch::new(self.inner.store.clone())
    }

    /// The store's current time.
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.store.now()
    }

    /// Sentinel removing a field when used in field updates.
    pub fn delete_field() -> FieldValue {
        FieldValue::Delete
    }

    /// Sentinel adding `delta` to a numeric field.
    pub fn increment(delta: impl Into<Number>) -> FieldValue {
        FieldValue::increment(delta)
    }

    /// Sentinel resolved to the commit time by the store.
    pub fn server_timestamp() -> FieldValue {
        FieldValue::ServerTimestamp
    }

    pub fn store(&self) -> DocumentStore {
        self.inner.store.clone()
    }

    pub fn config(&self) -> DbConfig {
        self.inner.config.clone()
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("ignore_null_fields", &self.inner.config.ignore_null_fields())
            .finish()
    }
}

struct DatabaseInner {
    config: DbConfig,
    store: DocumentStore,
}
