use crate::collection::{Collection, Document, DocumentPath, DocumentRef};
use crate::common::{passthrough_codec, CodecRef, PATH_SEPARATOR};
use crate::errors::{DbError, DbResult, ErrorKind};
use crate::query::{IntoFilter, QueryBuilder};
use crate::store::{DocumentStore, FieldUpdates, SetOptions, Write};
use crate::transaction::Transaction;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::future::Future;

/// Typed access to one collection of the document store.
///
/// # Purpose
///
/// `CollectionRepository` binds a [`Collection`] to an explicitly injected
/// [`DocumentStore`] and to the codec that maps `T` to and from raw
/// documents. It exposes point operations keyed by document id, ad-hoc
/// conjunctive filtering, and hands out [`QueryBuilder`]s for anything more
/// involved.
///
/// # Characteristics
///
/// - **Owns its codec**: the codec is private to the repository and shared
///   only with the builders and references it creates
/// - **Absent is not an error**: lookups return `Ok(None)` for missing
///   documents
/// - **Pass-through errors**: store failures are returned as they are, no
///   retry and no translation
/// - **Cheap to clone**: every field is reference counted
///
/// # Examples
///
/// ```rust,ignore
/// const PRICING: Collection<Pricing> = Collection::new("pricing");
///
/// let repo = db.repository(&PRICING);
/// let gold = repo.get(vec![where_field("tier", FilterOperator::Equal, "gold")]).await?;
/// ```
pub struct CollectionRepository<T> {
    collection: Collection<T>,
    store: DocumentStore,
    codec: CodecRef<T>,
    ignore_null_fields: bool,
}

impl<T> CollectionRepository<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Creates a repository that encodes and decodes `T` through serde.
    pub fn new(store: DocumentStore, collection: &Collection<T>) -> Self {
        CollectionRepository::with_codec(store, collection, passthrough_codec::<T>())
    }
}

impl<T> CollectionRepository<T> {
    /// Creates a repository with a custom codec.
    pub fn with_codec(store: DocumentStore, collection: &Collection<T>, codec: CodecRef<T>) -> Self {
        CollectionRepository {
            collection: collection.clone(),
            store,
            codec,
            ignore_null_fields: true,
        }
    }

    /// Controls whether top-level `null` fields are dropped from writes.
    pub fn ignore_null_fields(mut self, ignore: bool) -> Self {
        self.ignore_null_fields = ignore;
        self
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Returns a fresh query builder bound to this collection and codec.
    pub fn query_builder(&self) -> QueryBuilder<T> {
        QueryBuilder::with_codec_for(self.store.clone(), &self.collection, self.codec.clone())
    }

    /// Finds every document matching all of the given filters.
    ///
    /// # Arguments
    ///
    /// * `clauses` - Filters combined with AND: prepared
    ///   [`WhereClause`](crate::query::WhereClause)s or `(field, operator, value)`
    ///   tuples, where the field is a [`Field<T>`](crate::query::Field) or a
    ///   string path
    ///
    /// # Returns
    ///
    /// The decoded documents with their ids attached, in document id order.
    /// No filters returns the whole collection.
    pub async fn get<I>(&self, clauses: I) -> DbResult<Vec<Document<T>>>
    where
        I: IntoIterator,
        I::Item: IntoFilter<T>,
    {
        self.query_builder().filters(clauses).query().await
    }

    /// Returns every document of the collection.
    pub async fn get_all(&self) -> DbResult<Vec<Document<T>>> {
        self.query_builder().query().await
    }

    /// Finds the first document matching all of the given filters.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing matches.
    pub async fn get_single<I>(&self, clauses: I) -> DbResult<Option<Document<T>>>
    where
        I: IntoIterator,
        I::Item: IntoFilter<T>,
    {
        let results = self.query_builder().filters(clauses).limit(1).query().await?;
        Ok(results.into_iter().next())
    }

    /// Point lookup by document id.
    ///
    /// # Returns
    ///
    /// The decoded document with its id attached, or `Ok(None)` when it does
    /// not exist.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty id or one containing a path separator.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Document<T>>> {
        let path = self.document_path(id)?;
        let snapshot = self.store.get_document(&path).await?;
        snapshot.decode(self.codec.as_ref())
    }

    /// Returns a reference to a document that may or may not exist.
    pub fn get_ref(&self, id: &str) -> DbResult<DocumentRef<T>> {
        let path = self.document_path(id)?;
        Ok(self.reference(path))
    }

    /// Returns a reference to a document that does not exist yet, under a
    /// fresh store generated id.
    pub fn add_ref(&self) -> DocumentRef<T> {
        let path = DocumentPath::new(self.collection.name(), self.store.new_document_id());
        self.reference(path)
    }

    /// Inserts a new document under a store generated id.
    ///
    /// # Arguments
    ///
    /// * `value` - The record to store
    ///
    /// # Returns
    ///
    /// A reference to the new document; its [`id`](DocumentRef::id) is the
    /// one later lookups use.
    pub async fn add(&self, value: &T) -> DbResult<DocumentRef<T>> {
        let reference = self.add_ref();
        let data = reference.encode(value)?;
        self.store
            .commit(vec![reference.set_write(data, SetOptions::Overwrite, vec![])])
            .await?;
        Ok(reference)
    }

    /// Merges `partial` into document `id`, creating it when absent.
    ///
    /// # Behavior
    ///
    /// - Fields present in `partial` overwrite the stored ones
    /// - Nested maps merge key by key
    /// - Fields missing from `partial` are preserved
    pub async fn upsert<P>(&self, id: &str, partial: &P) -> DbResult<()>
    where
        P: Serialize + ?Sized,
    {
        self.write_partial(id, partial, SetOptions::Merge).await
    }

    /// Overwrites document `id` with exactly the fields of `partial`. Fields
    /// not present in `partial` are not preserved.
    pub async fn replace<P>(&self, id: &str, partial: &P) -> DbResult<()>
    where
        P: Serialize + ?Sized,
    {
        self.write_partial(id, partial, SetOptions::Overwrite).await
    }

    /// Merges field level updates, including sentinels such as
    /// increments, deletes and server timestamps, into document `id`.
    pub async fn upsert_fields(&self, id: &str, updates: FieldUpdates) -> DbResult<()> {
        let reference = self.get_ref(id)?;
        let (data, transforms) = reference.encode_updates(updates)?;
        self.store
            .commit(vec![reference.set_write(data, SetOptions::Merge, transforms)])
            .await
    }

    /// Deletes document `id`. Deleting a missing document succeeds.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let path = self.document_path(id)?;
        self.store.commit(vec![Write::Delete { path }]).await
    }

    /// Runs a read-modify-write function against document `id` inside a
    /// store managed transaction.
    ///
    /// # Arguments
    ///
    /// * `id` - The document the transaction is scoped to
    /// * `update` - Receives a reference to the document and the transaction
    ///   handle; all reads must go through the handle before any write
    ///
    /// # Behavior
    ///
    /// - Writes made through the handle commit atomically when `update`
    ///   returns `Ok`
    /// - An error returned by `update` aborts the transaction and is
    ///   returned unchanged; nothing is written
    /// - On a write conflict the store runs `update` again, so it must be
    ///   safe to call more than once
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// repo.transaction("p1", |doc, tx| async move {
    ///     let current = tx.get(&doc).await?;
    ///     let price = current.map(|p| p.price).unwrap_or(0);
    ///     tx.update_fields(&doc, FieldUpdates::new().set("price", price + 1))
    /// })
    /// .await?;
    /// ```
    pub async fn transaction<F, Fut>(&self, id: &str, update: F) -> DbResult<()>
    where
        F: Fn(DocumentRef<T>, Transaction) -> Fut + Send + Sync,
        Fut: Future<Output = DbResult<()>> + Send + 'static,
    {
        let reference = self.get_ref(id)?;
        let work = move |tx: Transaction| update(reference.clone(), tx).boxed();
        self.store.run_transaction(&work).await
    }

    async fn write_partial<P>(&self, id: &str, partial: &P, options: SetOptions) -> DbResult<()>
    where
        P: Serialize + ?Sized,
    {
        let reference = self.get_ref(id)?;
        let data = reference.encode_partial(partial)?;
        self.store
            .commit(vec![reference.set_write(data, options, vec![])])
            .await
    }

    fn reference(&self, path: DocumentPath) -> DocumentRef<T> {
        DocumentRef::new(
            path,
            self.store.clone(),
            self.codec.clone(),
            self.ignore_null_fields,
        )
    }

    fn document_path(&self, id: &str) -> DbResult<DocumentPath> {
        if id.is_empty() || id.contains(PATH_SEPARATOR) {
            log::error!("Invalid document id '{}' for {}", id, self.collection);
            return Err(DbError::new(
                &format!("Invalid document id '{}'", id),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(DocumentPath::new(self.collection.name(), id))
    }
}

impl<T> Clone for CollectionRepository<T> {
    fn clone(&self) -> Self {
        CollectionRepository {
            collection: self.collection.clone(),
            store: self.store.clone(),
            codec: self.codec.clone(),
            ignore_null_fields: self.ignore_null_fields,
        }
    }
}

impl<T> Debug for CollectionRepository<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRepository")
            .field("collection", &self.collection.name())
            .field("ignore_null_fields", &self.ignore_null_fields)
            .finish()
    }
}
