use crate::query::{FilterOperator, WhereClause};
use serde_json::Value;
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;

/// A field path of record type `T`.
///
/// Fields are declared as constants next to the record, so a typo or a
/// field of another record type is a compile error rather than a query
/// that silently matches nothing:
///
/// ```rust
/// use keeperdb::query::{Field, FilterOperator, IntoFilter, WhereClause};
///
/// struct Pricing;
///
/// impl Pricing {
///     const TIER: Field<Pricing> = Field::new("tier");
///     const CURRENCY_CODE: Field<Pricing> = Field::new("currency.code");
/// }
///
/// let clause: WhereClause =
///     IntoFilter::<Pricing>::into_filter((Pricing::TIER, FilterOperator::Equal, "gold"));
/// assert_eq!(clause.field, "tier");
/// assert_eq!(Pricing::CURRENCY_CODE.path(), "currency.code");
/// ```
///
/// Plain string paths are still accepted everywhere a field is, for
/// schema-less collections and fields that are not part of `T`.
pub struct Field<T> {
    path: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub const fn new(path: &'static str) -> Self {
        Field {
            path,
            _phantom: PhantomData,
        }
    }

    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Builds a filter clause on this field.
    pub fn filter(&self, operator: FilterOperator, value: impl Into<Value>) -> WhereClause {
        WhereClause::new(self.path, operator, value)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<T> Eq for Field<T> {}

impl<T> Debug for Field<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Field").field(&self.path).finish()
    }
}

impl<T> Display for Field<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Anything usable as a field path in a query against records of type `T`.
pub trait FieldPath<T> {
    fn into_path(self) -> String;
}

impl<T> FieldPath<T> for Field<T> {
    fn into_path(self) -> String {
        self.path.to_string()
    }
}

impl<T> FieldPath<T> for &Field<T> {
    fn into_path(self) -> String {
        self.path.to_string()
    }
}

impl<T> FieldPath<T> for &str {
    fn into_path(self) -> String {
        self.to_string()
    }
}

impl<T> FieldPath<T> for String {
    fn into_path(self) -> String {
        self
    }
}

impl<T> FieldPath<T> for &String {
    fn into_path(self) -> String {
        self.clone()
    }
}

/// Anything usable as a filter in a query against records of type `T`:
/// a prepared [`WhereClause`] or a `(field, operator, value)` tuple whose
/// field is a [`FieldPath<T>`].
pub trait IntoFilter<T> {
    fn into_filter(self) -> WhereClause;
}

impl<T> IntoFilter<T> for WhereClause {
    fn into_filter(self) -> WhereClause {
        self
    }
}

impl<T, F, V> IntoFilter<T> for (F, FilterOperator, V)
where
    F: FieldPath<T>,
    V: Into<Value>,
{
    fn into_filter(self) -> WhereClause {
        let (field, operator, value) = self;
        WhereClause::new(field.into_path(), operator, value)
    }
}
