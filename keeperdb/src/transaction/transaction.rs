use crate::collection::{Document, DocumentPath, DocumentRef, DocumentSnapshot};
use crate::errors::DbResult;
use crate::store::{FieldUpdates, SetOptions, Write};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// The work a store runs inside a transaction. It may be invoked more than
/// once when the store retries after a conflict.
pub type TransactionFn<'a> =
    dyn Fn(Transaction) -> BoxFuture<'static, DbResult<()>> + Send + Sync + 'a;

/// Store side of one transaction attempt.
///
/// Reads see committed data and are remembered for conflict detection.
/// Writes are buffered and only become visible when the attempt commits.
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn get(&self, path: &DocumentPath) -> DbResult<DocumentSnapshot>;

    fn write(&self, write: Write) -> DbResult<()>;
}

/// Handle passed to transaction functions.
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<dyn TransactionProvider>,
}

impl Transaction {
    pub fn new<P: TransactionProvider + 'static>(inner: P) -> Self {
        Transaction {
            inner: Arc::new(inner),
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    /// Reads and decodes a document as part of the transaction.
    pub async fn get<T>(&self, reference: &DocumentRef<T>) -> DbResult<Option<Document<T>>> {
        let snapshot = self.inner.get(reference.path()).await?;
        snapshot.decode(reference.codec().as_ref())
    }

    /// Reads the raw document as part of the transaction.
    pub async fn get_snapshot(&self, path: &DocumentPath) -> DbResult<DocumentSnapshot> {
        self.inner.get(path).await
    }

    /// Overwrites the document with `value`.
    pub fn set<T>(&self, reference: &DocumentRef<T>, value: &T) -> DbResult<()> {
        let data = reference.encode(value)?;
        self.inner
            .write(reference.set_write(data, SetOptions::Overwrite, vec![]))
    }

    /// Merges a partial record into the document, creating it when absent.
    pub fn merge<T, P>(&self, reference: &DocumentRef<T>, partial: &P) -> DbResult<()>
    where
        P: Serialize + ?Sized,
    {
        let data = reference.encode_partial(partial)?;
        self.inner
            .write(reference.set_write(data, SetOptions::Merge, vec![]))
    }

    /// Merges field level updates, sentinels included.
    pub fn update_fields<T>(&self, reference: &DocumentRef<T>, updates: FieldUpdates) -> DbResult<()> {
        let (data, transforms) = reference.encode_updates(updates)?;
        self.inner
            .write(reference.set_write(data, SetOptions::Merge, transforms))
    }

    pub fn delete<T>(&self, reference: &DocumentRef<T>) -> DbResult<()> {
        self.inner.write(Write::Delete {
            path: reference.path().clone(),
        })
    }
}

impl Debug for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Transaction").field(&self.inner.id()).finish()
    }
}
