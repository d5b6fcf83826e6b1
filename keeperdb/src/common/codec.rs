use crate::common::RawDocument;
use crate::errors::{DbError, DbResult, ErrorKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Bidirectional mapping between a typed record and the store's raw,
/// schema-less document.
///
/// The store enforces no schema, so a codec is the trust boundary of the
/// crate: whatever the store hands back is reinterpreted as `T` without any
/// further shape validation than `T`'s own deserializer performs.
pub trait DocumentCodec<T>: Send + Sync {
    /// Converts a record into the raw fields written to the store.
    fn to_document(&self, value: &T) -> DbResult<RawDocument>;

    /// Reinterprets raw fields read from the store as a record.
    fn from_document(&self, document: RawDocument) -> DbResult<T>;

    /// Maps the raw fields of a partial record, as written by merges,
    /// replaces and field updates, into their stored shape.
    ///
    /// Codecs that rename or reshape fields in [`to_document`](Self::to_document)
    /// must apply the same mapping here, otherwise partial writes store a
    /// different shape than full ones. The default leaves the fields as they
    /// are.
    fn partial_to_document(&self, document: RawDocument) -> DbResult<RawDocument> {
        Ok(document)
    }
}

/// Shared handle to a codec, attached to repositories, builders and refs.
pub type CodecRef<T> = Arc<dyn DocumentCodec<T>>;

/// The default codec: a serde round trip with no extra rules.
///
/// Unknown stored fields are ignored and `T`'s serde attributes decide how
/// missing ones are handled.
pub struct PassthroughCodec<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> PassthroughCodec<T> {
    pub fn new() -> Self {
        PassthroughCodec {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for PassthroughCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DocumentCodec<T> for PassthroughCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn to_document(&self, value: &T) -> DbResult<RawDocument> {
        encode_partial(value)
    }

    fn from_document(&self, document: RawDocument) -> DbResult<T> {
        serde_json::from_value(Value::Object(document)).map_err(|err| {
            log::error!("Failed to decode document: {}", err);
            DbError::from(err)
        })
    }
}

/// Creates the default codec for `T` behind a shared handle.
pub fn passthrough_codec<T>() -> CodecRef<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    Arc::new(PassthroughCodec::<T>::new())
}

/// Encodes any serializable partial view of a record as raw fields.
///
/// The value must serialize to a map; anything else cannot be stored as a
/// document.
pub fn encode_partial<P>(partial: &P) -> DbResult<RawDocument>
where
    P: Serialize + ?Sized,
{
    match serde_json::to_value(partial)? {
        Value::Object(map) => Ok(map),
        other => {
            log::error!("Expected a map when encoding a document, got {}", other);
            Err(DbError::new(
                "Documents must serialize to a map of fields",
                ErrorKind::ObjectMappingError,
            ))
        }
    }
}
