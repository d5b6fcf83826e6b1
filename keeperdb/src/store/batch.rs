use crate::collection::DocumentRef;
use crate::errors::DbResult;
use crate::store::{DocumentStore, FieldUpdates, SetOptions, Write};
use serde::Serialize;

/// Collects writes to any number of documents and commits them atomically.
///
/// Nothing reaches the store until [`commit`](WriteBatch::commit); a batch
/// that is dropped uncommitted has no effect.
///
/// ```text
/// let mut batch = db.create_batch();
/// batch.set(&pricing_ref, &pricing)?.delete(&stale_ref);
/// batch.commit().await?;
/// ```
pub struct WriteBatch {
    store: DocumentStore,
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new(store: DocumentStore) -> Self {
        WriteBatch {
            store,
            writes: Vec::new(),
        }
    }

    /// Overwrites the referenced document with `value`.
    pub fn set<T>(&mut self, reference: &DocumentRef<T>, value: &T) -> DbResult<&mut Self> {
        let data = reference.encode(value)?;
        self.writes
            .push(reference.set_write(data, SetOptions::Overwrite, vec![]));
        Ok(self)
    }

    /// Merges a partial record into the referenced document.
    pub fn merge<T, P>(&mut self, reference: &DocumentRef<T>, partial: &P) -> DbResult<&mut Self>
    where
        P: Serialize + ?Sized,
    {
        let data = reference.encode_partial(partial)?;
        self.writes
            .push(reference.set_write(data, SetOptions::Merge, vec![]));
        Ok(self)
    }

    pub fn update_fields<T>(
        &mut self,
        reference: &DocumentRef<T>,
        updates: FieldUpdates,
    ) -> DbResult<&mut Self> {
        let (data, transforms) = reference.encode_updates(updates)?;
        self.writes
            .push(reference.set_write(data, SetOptions::Merge, transforms));
        Ok(self)
    }

    pub fn delete<T>(&mut self, reference: &DocumentRef<T>) -> &mut Self {
        self.writes.push(Write::Delete {
            path: reference.path().clone(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub async fn commit(self) -> DbResult<()> {
        log::debug!("Committing batch of {} writes", self.writes.len());
        self.store.commit(self.writes).await
    }
}
