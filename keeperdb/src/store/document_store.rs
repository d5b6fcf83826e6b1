use crate::collection::{DocumentPath, DocumentSnapshot, QuerySnapshot};
use crate::errors::DbResult;
use crate::query::Query;
use crate::store::Write;
use crate::transaction::TransactionFn;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::ops::Deref;
use std::sync::Arc;

/// The contract a remote (or local) document store fulfils for this crate.
///
/// # Purpose
/// Everything above this trait is store agnostic: repositories, query
/// builders, batches and transactions only ever talk to a
/// `DocumentStoreProvider`. Implementations own transport, consistency and
/// security rules.
///
/// # Failure
/// Failures are surfaced as they happen; callers do not retry. Conflicting
/// transactions are the one exception, which the store itself retries inside
/// [`run_transaction`](DocumentStoreProvider::run_transaction).
///
/// # Implementations
/// - [`InMemoryStore`](crate::store::memory::InMemoryStore): complete
///   in-process implementation used for tests and local tooling
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Reads one document. A missing document is a snapshot without data,
    /// not an error.
    async fn get_document(&self, path: &DocumentPath) -> DbResult<DocumentSnapshot>;

    /// Executes a query and returns matching documents in query order.
    async fn run_query(&self, query: &Query) -> DbResult<QuerySnapshot>;

    /// Applies all writes atomically, in order.
    async fn commit(&self, writes: Vec<Write>) -> DbResult<()>;

    /// Runs `work` inside a store managed read-modify-write transaction,
    /// retrying it on write conflicts. An error returned by `work` aborts the
    /// transaction without committing anything.
    async fn run_transaction(&self, work: &TransactionFn<'_>) -> DbResult<()>;

    /// Generates an identifier for a document that does not exist yet.
    fn new_document_id(&self) -> String;

    /// The store's clock, used for server timestamps.
    fn now(&self) -> DateTime<Utc>;
}

/// Cheaply cloneable handle to a store.
///
/// The handle is created once at process start and passed explicitly to
/// every repository that needs it.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<Arc<dyn DocumentStoreProvider>> for DocumentStore {
    fn from(inner: Arc<dyn DocumentStoreProvider>) -> Self {
        DocumentStore { inner }
    }
}
