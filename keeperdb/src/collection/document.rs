use crate::collection::DocumentPath;
use crate::common::{get_field, DocumentCodec, RawDocument};
use crate::errors::DbResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{Deref, DerefMut};

/// A decoded record together with the identifier the store assigned to it.
///
/// The id is metadata attached on read; it is never part of `T`'s own stored
/// fields. When serialized, the id sits next to the record's fields:
///
/// ```rust
/// use keeperdb::collection::Document;
/// use serde_json::json;
///
/// let doc = Document::new("p1", json!({"tier": "gold"}));
/// assert_eq!(serde_json::to_value(&doc).unwrap(), json!({"id": "p1", "tier": "gold"}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Document<T> {
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Document {
            id: id.into(),
            data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T> Deref for Document<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> DerefMut for Document<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

/// Raw result of reading one document. `data` is `None` when the document
/// does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    path: DocumentPath,
    data: Option<RawDocument>,
}

impl DocumentSnapshot {
    pub fn new(path: DocumentPath, data: Option<RawDocument>) -> Self {
        DocumentSnapshot { path, data }
    }

    pub fn missing(path: DocumentPath) -> Self {
        DocumentSnapshot { path, data: None }
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&RawDocument> {
        self.data.as_ref()
    }

    /// Reads a possibly nested field (`geocoding.hash`).
    pub fn get(&self, field_path: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| get_field(data, field_path))
    }

    /// Decodes the snapshot and attaches its id. Missing documents decode to
    /// `None`.
    pub fn decode<T>(self, codec: &dyn DocumentCodec<T>) -> DbResult<Option<Document<T>>> {
        match self.data {
            Some(data) => {
                let record = codec.from_document(data)?;
                Ok(Some(Document::new(self.path.into_id(), record)))
            }
            None => Ok(None),
        }
    }
}

/// Raw result set of a query, in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySnapshot {
    docs: Vec<DocumentSnapshot>,
}

impl QuerySnapshot {
    pub fn new(docs: Vec<DocumentSnapshot>) -> Self {
        QuerySnapshot { docs }
    }

    pub fn docs(&self) -> &[DocumentSnapshot] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentSnapshot> {
        self.docs.iter()
    }

    /// Decodes every document and attaches its id.
    pub fn decode<T>(self, codec: &dyn DocumentCodec<T>) -> DbResult<Vec<Document<T>>> {
        let mut results = Vec::with_capacity(self.docs.len());
        for snapshot in self.docs {
            if let Some(document) = snapshot.decode(codec)? {
                results.push(document);
            }
        }
        Ok(results)
    }
}

impl IntoIterator for QuerySnapshot {
    type Item = DocumentSnapshot;
    type IntoIter = std::vec::IntoIter<DocumentSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}
