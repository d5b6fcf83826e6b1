use crate::collection::{DocumentPath, DocumentSnapshot};
use crate::errors::{DbError, DbResult, ErrorKind};
use crate::store::memory::store::InMemoryStoreInner;
use crate::store::Write;
use crate::transaction::TransactionProvider;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One attempt of an in-memory transaction.
///
/// Reads record the version they saw, writes are buffered. Commit checks
/// every recorded version against the store and fails with a conflict when
/// any of them moved.
#[derive(Clone)]
pub(crate) struct InMemoryTransaction {
    inner: Arc<InMemoryTransactionInner>,
}

impl InMemoryTransaction {
    pub(crate) fn new(id: String, store: Arc<InMemoryStoreInner>) -> Self {
        InMemoryTransaction {
            inner: Arc::new(InMemoryTransactionInner {
                id,
                store,
                reads: Mutex::new(HashMap::new()),
                writes: Mutex::new(Vec::new()),
                completed: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn commit(&self) -> DbResult<()> {
        self.inner.completed.store(true, Ordering::SeqCst);
        let reads = std::mem::take(&mut *self.inner.reads.lock());
        let writes = std::mem::take(&mut *self.inner.writes.lock());
        log::debug!(
            "Committing transaction {} with {} reads and {} writes",
            self.inner.id,
            reads.len(),
            writes.len()
        );
        self.inner.store.commit_versioned(&reads, writes)
    }

    pub(crate) fn discard(&self) {
        self.inner.completed.store(true, Ordering::SeqCst);
        self.inner.writes.lock().clear();
    }

    fn ensure_active(&self) -> DbResult<()> {
        if self.inner.completed.load(Ordering::SeqCst) {
            log::error!("Transaction {} is already completed", self.inner.id);
            return Err(DbError::new(
                &format!("Transaction {} is already completed", self.inner.id),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionProvider for InMemoryTransaction {
    fn id(&self) -> &str {
        &self.inner.id
    }

    async fn get(&self, path: &DocumentPath) -> DbResult<DocumentSnapshot> {
        self.ensure_active()?;
        if !self.inner.writes.lock().is_empty() {
            log::error!("Read of {} after a write in transaction {}", path, self.inner.id);
            return Err(DbError::new(
                "Transactions must perform all reads before any writes",
                ErrorKind::InvalidArgument,
            ));
        }

        let (snapshot, version) = self.inner.store.read_versioned(path)?;
        // the first version seen is the one validated at commit
        self.inner.reads.lock().entry(path.clone()).or_insert(version);
        Ok(snapshot)
    }

    fn write(&self, write: Write) -> DbResult<()> {
        self.ensure_active()?;
        self.inner.writes.lock().push(write);
        Ok(())
    }
}

struct InMemoryTransactionInner {
    id: String,
    store: Arc<InMemoryStoreInner>,
    reads: Mutex<HashMap<DocumentPath, u64>>,
    writes: Mutex<Vec<Write>>,
    completed: AtomicBool,
}
