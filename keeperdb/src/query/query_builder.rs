use crate::collection::{Collection, Document, QuerySnapshot};
use crate::common::{passthrough_codec, CodecRef, DocumentCodec, OrderDirection};
use crate::errors::DbResult;
use crate::query::{Clause, CursorPosition, FieldPath, FilterOperator, IntoFilter, LimitType, Query, WhereClause};
use crate::store::DocumentStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Fluent builder accumulating clauses against one collection.
///
/// Every clause method borrows the builder and returns a new one, leaving the
/// receiver untouched. A partially built query can therefore be captured and
/// extended in several directions without the branches seeing each other's
/// clauses:
///
/// ```rust,ignore
/// let active = repo.query_builder().filter("active", FilterOperator::Equal, true);
/// let newest = active.order_by_with("created", OrderDirection::Descending).limit(10);
/// let oldest = active.order_by("created").limit(10);
/// ```
///
/// Nothing reaches the store until [`get`](QueryBuilder::get) or
/// [`query`](QueryBuilder::query) runs. Clause sequences are not validated
/// here; a malformed one (for example cursor values that do not line up with
/// the ordering fields) is rejected by the store at execution time.
pub struct QueryBuilder<T> {
    store: DocumentStore,
    query: Query,
    codec: CodecRef<T>,
}

impl<T> QueryBuilder<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Creates a builder decoding through the pass-through codec.
    pub fn new(store: DocumentStore, collection: &Collection<T>) -> Self {
        QueryBuilder::with_codec_for(store, collection, passthrough_codec::<T>())
    }
}

impl<T> QueryBuilder<T> {
    pub(crate) fn with_codec_for(
        store: DocumentStore,
        collection: &Collection<T>,
        codec: CodecRef<T>,
    ) -> Self {
        QueryBuilder {
            store,
            query: Query::new(collection.name()),
            codec,
        }
    }

    fn extend(&self, query: Query) -> Self {
        QueryBuilder {
            store: self.store.clone(),
            query,
            codec: self.codec.clone(),
        }
    }

    /// Adds a filter clause. Filters combine with AND.
    ///
    /// `field` is either a [`Field<T>`](crate::query::Field) constant or a
    /// plain string path.
    pub fn filter(
        &self,
        field: impl FieldPath<T>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters([WhereClause::new(field.into_path(), operator, value)])
    }

    /// Adds several filter clauses in order.
    pub fn filters<I>(&self, clauses: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoFilter<T>,
    {
        let query = clauses.into_iter().fold(self.query.clone(), |query, clause| {
            query.with_clause(Clause::Filter(clause.into_filter()))
        });
        self.extend(query)
    }

    /// Adds an ascending ordering clause. Repeated calls build a compound
    /// sort key in call order.
    pub fn order_by(&self, field: impl FieldPath<T>) -> Self {
        self.order_by_with(field, OrderDirection::Ascending)
    }

    pub fn order_by_with(&self, field: impl FieldPath<T>, direction: OrderDirection) -> Self {
        self.extend(self.query.with_clause(Clause::OrderBy {
            field: field.into_path(),
            direction,
        }))
    }

    /// Keeps only the first `count` matches. Replaces any earlier cap.
    pub fn limit(&self, count: usize) -> Self {
        self.extend(self.query.with_page_cap(LimitType::First, count))
    }

    /// Keeps only the last `count` matches. Replaces any earlier cap.
    pub fn limit_to_last(&self, count: usize) -> Self {
        self.extend(self.query.with_page_cap(LimitType::Last, count))
    }

    pub fn start_at<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.cursor(CursorPosition::StartAt, values)
    }

    pub fn start_after<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.cursor(CursorPosition::StartAfter, values)
    }

    pub fn end_at<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.cursor(CursorPosition::EndAt, values)
    }

    pub fn end_before<I, V>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.cursor(CursorPosition::EndBefore, values)
    }

    fn cursor<I, V>(&self, position: CursorPosition, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.extend(self.query.with_cursor(position, values))
    }

    /// Replaces the codec applied when results are decoded.
    pub fn with_codec(&self, codec: CodecRef<T>) -> Self {
        QueryBuilder {
            store: self.store.clone(),
            query: self.query.clone(),
            codec,
        }
    }

    /// Finalizes the query without executing it.
    pub fn build(&self) -> TypedQuery<T> {
        TypedQuery {
            query: self.query.clone(),
            codec: self.codec.clone(),
        }
    }

    /// Executes the query and returns the raw, undecoded result set.
    pub async fn get(&self) -> DbResult<QuerySnapshot> {
        log::debug!("Running query {}", self.query);
        self.store.run_query(&self.query).await
    }

    /// Executes the query, decodes every result and attaches its id.
    pub async fn query(&self) -> DbResult<Vec<Document<T>>> {
        let snapshot = self.get().await?;
        snapshot.decode(self.codec.as_ref())
    }
}

impl<T> Clone for QueryBuilder<T> {
    fn clone(&self) -> Self {
        self.extend(self.query.clone())
    }
}

impl<T> Debug for QueryBuilder<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("query", &self.query)
            .finish()
    }
}

/// A finalized query with the codec its results decode through, for use with
/// the lower level store API.
pub struct TypedQuery<T> {
    query: Query,
    codec: CodecRef<T>,
}

impl<T> TypedQuery<T> {
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn codec(&self) -> &dyn DocumentCodec<T> {
        self.codec.as_ref()
    }

    /// Decodes a snapshot produced by running [`TypedQuery::query`].
    pub fn decode(&self, snapshot: QuerySnapshot) -> DbResult<Vec<Document<T>>> {
        snapshot.decode(self.codec.as_ref())
    }

    pub fn into_parts(self) -> (Query, CodecRef<T>) {
        (self.query, self.codec)
    }
}

impl<T> Clone for TypedQuery<T> {
    fn clone(&self) -> Self {
        TypedQuery {
            query: self.query.clone(),
            codec: Arc::clone(&self.codec),
        }
    }
}
