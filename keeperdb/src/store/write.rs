use crate::collection::DocumentPath;
use crate::common::{set_field, RawDocument};
use serde_json::{Number, Value};

/// How a set write treats fields already stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetOptions {
    /// Merge the written fields into the stored document; maps merge key by
    /// key and fields left out are preserved.
    Merge,
    /// Replace the whole document with exactly the written fields.
    #[default]
    Overwrite,
}

/// Sentinel values resolved by the store while applying a write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Removes the field.
    Delete,
    /// Adds to the stored number, treating a missing or non-numeric field as
    /// zero.
    Increment(Number),
    /// Sets the field to the store's commit time.
    ServerTimestamp,
}

impl FieldValue {
    pub fn increment(delta: impl Into<Number>) -> FieldValue {
        FieldValue::Increment(delta.into())
    }

    /// Float increment. Non-finite deltas increment by zero.
    pub fn increment_f64(delta: f64) -> FieldValue {
        FieldValue::Increment(Number::from_f64(delta).unwrap_or_else(|| Number::from(0)))
    }
}

/// A sentinel bound to a (possibly nested) field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTransform {
    pub field: String,
    pub value: FieldValue,
}

/// One mutation of one document, applied by the store as part of a commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set {
        path: DocumentPath,
        data: RawDocument,
        options: SetOptions,
        transforms: Vec<FieldTransform>,
    },
    Delete {
        path: DocumentPath,
    },
}

impl Write {
    pub fn path(&self) -> &DocumentPath {
        match self {
            Write::Set { path, .. } => path,
            Write::Delete { path } => path,
        }
    }
}

/// Field level changes for a merge write: plain values plus sentinels.
///
/// ```rust
/// use keeperdb::store::FieldUpdates;
///
/// let updates = FieldUpdates::new()
///     .set("status", "done")
///     .set("stats.lastRun", "2024-01-01")
///     .increment("stats.runs", 1)
///     .delete("lock")
///     .server_timestamp("updatedAt");
/// let (data, transforms) = updates.into_parts();
/// assert_eq!(data.len(), 2);
/// assert_eq!(transforms.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    data: RawDocument,
    transforms: Vec<FieldTransform>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        FieldUpdates::default()
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        set_field(&mut self.data, field, value.into());
        self
    }

    pub fn sentinel(mut self, field: &str, value: FieldValue) -> Self {
        self.transforms.push(FieldTransform {
            field: field.to_string(),
            value,
        });
        self
    }

    pub fn delete(self, field: &str) -> Self {
        self.sentinel(field, FieldValue::Delete)
    }

    pub fn increment(self, field: &str, delta: impl Into<Number>) -> Self {
        self.sentinel(field, FieldValue::increment(delta))
    }

    pub fn server_timestamp(self, field: &str) -> Self {
        self.sentinel(field, FieldValue::ServerTimestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.transforms.is_empty()
    }

    pub fn into_parts(self) -> (RawDocument, Vec<FieldTransform>) {
        (self.data, self.transforms)
    }
}
