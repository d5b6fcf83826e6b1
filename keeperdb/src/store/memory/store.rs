use crate::collection::{DocumentPath, DocumentSnapshot, QuerySnapshot};
use crate::common::{
    add_numbers, deep_merge, get_field, remove_field, set_field, RawDocument, AUTO_ID_ALPHABET,
    AUTO_ID_LENGTH,
};
use crate::errors::{DbError, DbResult, ErrorKind};
use crate::query::Query;
use crate::store::memory::query_engine;
use crate::store::memory::transaction::InMemoryTransaction;
use crate::store::memory::InMemoryStoreConfig;
use crate::store::{DocumentStoreProvider, FieldTransform, FieldValue, SetOptions, Write};
use crate::transaction::{Transaction, TransactionFn};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use rand::Rng;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// In-process implementation of the document store.
///
/// `InMemoryStore` keeps every collection in an ordered map guarded by a
/// single read-write lock, so commits are atomic and queries observe a
/// consistent state. Each stored document carries the version of the commit
/// that last wrote it, which is what transactions validate against.
///
/// # Characteristics
/// - **Thread-Safe**: all operations can be called concurrently
/// - **Cloneable**: clones share the same data
/// - **Non-persistent**: data is lost when the last clone is dropped
///
/// # Usage
/// ```rust
/// use keeperdb::store::memory::InMemoryStore;
/// use keeperdb::store::DocumentStore;
///
/// let store = DocumentStore::new(InMemoryStore::default());
/// assert_eq!(store.new_document_id().len(), 20);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new(config: InMemoryStoreConfig) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new(config)),
        }
    }

    pub fn config(&self) -> &InMemoryStoreConfig {
        &self.inner.config
    }

    /// Closes the store. Every later operation fails with a store closed
    /// error; the data is dropped with the last clone.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            log::debug!("In-memory store closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Names of the collections currently holding at least one document.
    pub fn collection_names(&self) -> Vec<String> {
        let state = self.inner.state.read();
        let mut names: Vec<String> = state
            .collections
            .iter()
            .filter(|(_, documents)| !documents.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl DocumentStoreProvider for InMemoryStore {
    async fn get_document(&self, path: &DocumentPath) -> DbResult<DocumentSnapshot> {
        let (snapshot, _) = self.inner.read_versioned(path)?;
        Ok(snapshot)
    }

    async fn run_query(&self, query: &Query) -> DbResult<QuerySnapshot> {
        self.inner.ensure_open()?;
        query_engine::validate(query)?;

        let state = self.inner.state.read();
        let docs = match state.collections.get(query.collection()) {
            Some(documents) => query_engine::execute(
                query,
                documents.iter().map(|(id, stored)| (id, &stored.data)),
            ),
            None => Vec::new(),
        };
        Ok(QuerySnapshot::new(docs))
    }

    async fn commit(&self, writes: Vec<Write>) -> DbResult<()> {
        self.inner.commit_versioned(&HashMap::new(), writes)
    }

    async fn run_transaction(&self, work: &TransactionFn<'_>) -> DbResult<()> {
        let attempts = self.inner.config.max_transaction_attempts();
        for attempt in 1..=attempts {
            self.inner.ensure_open()?;
            let transaction = InMemoryTransaction::new(self.inner.next_transaction_id(), self.inner.clone());

            if let Err(err) = work(Transaction::new(transaction.clone())).await {
                transaction.discard();
                log::debug!("Transaction aborted on attempt {}: {}", attempt, err);
                return Err(err);
            }

            match transaction.commit() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == &ErrorKind::TransactionConflict => {
                    log::warn!(
                        "Transaction conflict on attempt {} of {}: {}",
                        attempt,
                        attempts,
                        err.message()
                    );
                }
                Err(err) => return Err(err),
            }
        }

        log::error!("Transaction failed after {} attempts", attempts);
        Err(DbError::new(
            &format!("Transaction failed after {} attempts", attempts),
            ErrorKind::TransactionConflict,
        ))
    }

    fn new_document_id(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..AUTO_ID_LENGTH)
            .map(|_| AUTO_ID_ALPHABET[rng.gen_range(0..AUTO_ID_ALPHABET.len())] as char)
            .collect()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub(crate) struct InMemoryStoreInner {
    config: InMemoryStoreConfig,
    state: RwLock<StoreState>,
    closed: AtomicBool,
    transaction_counter: AtomicU64,
}

impl InMemoryStoreInner {
    fn new(config: InMemoryStoreConfig) -> InMemoryStoreInner {
        InMemoryStoreInner {
            config,
            state: RwLock::new(StoreState::default()),
            closed: AtomicBool::new(false),
            transaction_counter: AtomicU64::new(0),
        }
    }

    fn ensure_open(&self) -> DbResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            log::error!("In-memory store is closed");
            return Err(DbError::new("Store is closed", ErrorKind::StoreClosed));
        }
        Ok(())
    }

    fn next_transaction_id(&self) -> String {
        let id = self.transaction_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("tx-{}", id)
    }

    /// Reads a document along with the version it was last written at.
    /// Missing documents have version zero.
    pub(crate) fn read_versioned(&self, path: &DocumentPath) -> DbResult<(DocumentSnapshot, u64)> {
        self.ensure_open()?;
        let state = self.state.read();
        match state.document(path) {
            Some(stored) => Ok((
                DocumentSnapshot::new(path.clone(), Some(stored.data.clone())),
                stored.version,
            )),
            None => Ok((DocumentSnapshot::missing(path.clone()), 0)),
        }
    }

    /// Validates the expected versions and applies the writes under one
    /// lock, so either everything lands or nothing does.
    pub(crate) fn commit_versioned(
        &self,
        expected: &HashMap<DocumentPath, u64>,
        writes: Vec<Write>,
    ) -> DbResult<()> {
        self.ensure_open()?;
        let mut state = self.state.write();

        for (path, version) in expected {
            let current = state.document(path).map(|stored| stored.version).unwrap_or(0);
            if current != *version {
                return Err(DbError::new(
                    &format!("Document {} changed since it was read", path),
                    ErrorKind::TransactionConflict,
                ));
            }
        }

        if writes.is_empty() {
            return Ok(());
        }
        state.apply(writes, Utc::now());
        Ok(())
    }
}

impl Default for InMemoryStoreInner {
    fn default() -> Self {
        Self::new(InMemoryStoreConfig::default())
    }
}

struct StoredDocument {
    data: RawDocument,
    version: u64,
}

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, BTreeMap<String, StoredDocument>>,
    version: u64,
}

impl StoreState {
    fn document(&self, path: &DocumentPath) -> Option<&StoredDocument> {
        self.collections.get(path.collection())?.get(path.id())
    }

    fn apply(&mut self, writes: Vec<Write>, commit_time: DateTime<Utc>) {
        self.version += 1;
        let version = self.version;
        let timestamp = commit_time.to_rfc3339_opts(SecondsFormat::Millis, true);

        for write in writes {
            match write {
                Write::Set {
                    path,
                    data,
                    options,
                    transforms,
                } => {
                    let documents = self
                        .collections
                        .entry(path.collection().to_string())
                        .or_default();
                    let mut document = match options {
                        SetOptions::Overwrite => data,
                        SetOptions::Merge => {
                            let mut base = documents
                                .get(path.id())
                                .map(|stored| stored.data.clone())
                                .unwrap_or_default();
                            deep_merge(&mut base, data);
                            base
                        }
                    };
                    for transform in transforms {
                        apply_transform(&mut document, transform, &timestamp);
                    }
                    documents.insert(path.into_id(), StoredDocument { data: document, version });
                }
                Write::Delete { path } => {
                    if let Some(documents) = self.collections.get_mut(path.collection()) {
                        documents.remove(path.id());
                    }
                }
            }
        }
    }
}

fn apply_transform(document: &mut RawDocument, transform: FieldTransform, timestamp: &str) {
    match transform.value {
        FieldValue::Delete => {
            remove_field(document, &transform.field);
        }
        FieldValue::Increment(delta) => {
            let sum = add_numbers(get_field(document, &transform.field), &delta);
            set_field(document, &transform.field, sum);
        }
        FieldValue::ServerTimestamp => {
            set_field(document, &transform.field, Value::String(timestamp.to_string()));
        }
    }
}
