use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;

/// An immutable binding between a record type `T` and a collection name.
///
/// Collections are meant to be declared once, usually as constants, and used
/// for the lifetime of the process:
///
/// ```rust
/// use keeperdb::collection::Collection;
///
/// struct Pricing;
///
/// pub const PRICING: Collection<Pricing> = Collection::new("pricing");
/// assert_eq!(PRICING.name(), "pricing");
/// ```
pub struct Collection<T> {
    name: Cow<'static, str>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Collection<T> {
    /// Declares a collection with a static name.
    pub const fn new(name: &'static str) -> Self {
        Collection {
            name: Cow::Borrowed(name),
            _phantom: PhantomData,
        }
    }

    /// Declares a collection whose name is only known at runtime.
    pub fn named(name: impl Into<String>) -> Self {
        Collection {
            name: Cow::Owned(name.into()),
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            name: self.name.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for Collection<T> {}

impl<T> Debug for Collection<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Collection").field(&self.name).finish()
    }
}

impl<T> Display for Collection<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
