use crate::collection::Document;
use crate::common::{encode_partial, strip_nulls, CodecRef, RawDocument, PATH_SEPARATOR};
use crate::errors::{DbError, DbResult, ErrorKind};
use crate::store::{DocumentStore, FieldTransform, FieldUpdates, SetOptions, Write};
use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Address of one document: collection name plus document id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: String,
    id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        DocumentPath {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn into_id(self) -> String {
        self.id
    }
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.collection, PATH_SEPARATOR, self.id)
    }
}

impl FromStr for DocumentPath {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(PATH_SEPARATOR) {
            Some((collection, id))
                if !collection.is_empty() && !id.is_empty() && !id.contains(PATH_SEPARATOR) =>
            {
                Ok(DocumentPath::new(collection, id))
            }
            _ => {
                log::error!("Invalid document path {}", s);
                Err(DbError::new(
                    &format!("Invalid document path '{}'", s),
                    ErrorKind::InvalidArgument,
                ))
            }
        }
    }
}

/// A typed, addressable handle to a document that may or may not exist yet.
///
/// References are handed out by repositories (`get_ref`, `add_ref`, `add`)
/// and compose with [`WriteBatch`](crate::store::WriteBatch) and
/// [`Transaction`](crate::transaction::Transaction).
pub struct DocumentRef<T> {
    path: DocumentPath,
    store: DocumentStore,
    codec: CodecRef<T>,
    ignore_null_fields: bool,
}

impl<T> DocumentRef<T> {
    pub(crate) fn new(
        path: DocumentPath,
        store: DocumentStore,
        codec: CodecRef<T>,
        ignore_null_fields: bool,
    ) -> Self {
        DocumentRef {
            path,
            store,
            codec,
            ignore_null_fields,
        }
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub(crate) fn codec(&self) -> &CodecRef<T> {
        &self.codec
    }

    pub(crate) fn encode(&self, value: &T) -> DbResult<RawDocument> {
        self.codec.to_document(value)
    }

    /// Encodes a partial record and hands it to the codec's partial mapping.
    pub(crate) fn encode_partial<P>(&self, partial: &P) -> DbResult<RawDocument>
    where
        P: Serialize + ?Sized,
    {
        self.codec.partial_to_document(encode_partial(partial)?)
    }

    /// Splits field updates into merge data, mapped by the codec, and
    /// transforms. Transform paths are used as given.
    pub(crate) fn encode_updates(&self, updates: FieldUpdates) -> DbResult<(RawDocument, Vec<FieldTransform>)> {
        let (data, transforms) = updates.into_parts();
        Ok((self.codec.partial_to_document(data)?, transforms))
    }

    /// Builds a set write for this document, dropping top-level nulls when
    /// the database is configured to ignore them.
    pub(crate) fn set_write(
        &self,
        mut data: RawDocument,
        options: SetOptions,
        transforms: Vec<FieldTransform>,
    ) -> Write {
        if self.ignore_null_fields {
            strip_nulls(&mut data);
        }
        Write::Set {
            path: self.path.clone(),
            data,
            options,
            transforms,
        }
    }

    /// Reads and decodes the referenced document outside of any transaction.
    pub async fn get(&self) -> DbResult<Option<Document<T>>> {
        let snapshot = self.store.get_document(&self.path).await?;
        snapshot.decode(self.codec.as_ref())
    }
}

impl<T> Clone for DocumentRef<T> {
    fn clone(&self) -> Self {
        DocumentRef {
            path: self.path.clone(),
            store: self.store.clone(),
            codec: self.codec.clone(),
            ignore_null_fields: self.ignore_null_fields,
        }
    }
}

impl<T> Debug for DocumentRef<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DocumentRef").field(&self.path.to_string()).finish()
    }
}

impl<T> PartialEq for DocumentRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}
