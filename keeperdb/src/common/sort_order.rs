use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Direction of one `order_by` clause.
///
/// `Ascending` sorts from the smallest to the largest value under the store's
/// value ordering, `Descending` the other way around. Ascending is what an
/// `order_by` without an explicit direction uses.
///
/// ```text
/// let builder = repo.query_builder().order_by_with("price", OrderDirection::Descending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    /// Applies this direction to an ascending comparison result.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        }
    }

    pub fn reverse(&self) -> OrderDirection {
        match self {
            OrderDirection::Ascending => OrderDirection::Descending,
            OrderDirection::Descending => OrderDirection::Ascending,
        }
    }
}

impl Display for OrderDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderDirection::Ascending => write!(f, "asc"),
            OrderDirection::Descending => write!(f, "desc"),
        }
    }
}
