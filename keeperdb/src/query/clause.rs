use crate::common::OrderDirection;
use crate::errors::{DbError, ErrorKind};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Comparison operators the store accepts in a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    ArrayContainsAny,
    In,
    NotIn,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "==",
            FilterOperator::NotEqual => "!=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEqual => "<=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::ArrayContains => "array-contains",
            FilterOperator::ArrayContainsAny => "array-contains-any",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not-in",
        }
    }

    /// Operators whose operand must be a list of candidate values.
    pub fn takes_list(&self) -> bool {
        matches!(
            self,
            FilterOperator::ArrayContainsAny | FilterOperator::In | FilterOperator::NotIn
        )
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "==" => FilterOperator::Equal,
            "!=" => FilterOperator::NotEqual,
            "<" => FilterOperator::LessThan,
            "<=" => FilterOperator::LessThanOrEqual,
            ">" => FilterOperator::GreaterThan,
            ">=" => FilterOperator::GreaterThanOrEqual,
            "array-contains" => FilterOperator::ArrayContains,
            "array-contains-any" => FilterOperator::ArrayContainsAny,
            "in" => FilterOperator::In,
            "not-in" => FilterOperator::NotIn,
            _ => {
                log::error!("Unknown filter operator {}", s);
                return Err(DbError::new(
                    &format!("Unknown filter operator '{}'", s),
                    ErrorKind::InvalidArgument,
                ));
            }
        };
        Ok(op)
    }
}

/// One `field operator value` filter.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl WhereClause {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        WhereClause {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl Display for WhereClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field, self.operator, self.value)
    }
}

impl<F, V> From<(F, FilterOperator, V)> for WhereClause
where
    F: Into<String>,
    V: Into<Value>,
{
    fn from((field, operator, value): (F, FilterOperator, V)) -> Self {
        WhereClause::new(field, operator, value)
    }
}

/// Shorthand for building a [`WhereClause`].
///
/// ```rust
/// use keeperdb::query::{where_field, FilterOperator};
///
/// let clause = where_field("tier", FilterOperator::Equal, "gold");
/// assert_eq!(clause.to_string(), "(tier == \"gold\")");
/// ```
pub fn where_field(
    field: impl Into<String>,
    operator: FilterOperator,
    value: impl Into<Value>,
) -> WhereClause {
    WhereClause::new(field, operator, value)
}

/// Which side of the result window a cursor bounds, and whether the anchor
/// itself is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorPosition {
    StartAt,
    StartAfter,
    EndAt,
    EndBefore,
}

impl CursorPosition {
    pub fn is_start(&self) -> bool {
        matches!(self, CursorPosition::StartAt | CursorPosition::StartAfter)
    }

    pub fn is_inclusive(&self) -> bool {
        matches!(self, CursorPosition::StartAt | CursorPosition::EndAt)
    }
}

/// A pagination anchor: one value per active ordering field, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub position: CursorPosition,
    pub values: Vec<Value>,
}

/// Whether a page cap keeps the first or the last matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitType {
    First,
    Last,
}

/// The single result cap of a query. Setting a new cap replaces the old one,
/// so `limit` and `limit_to_last` can never both be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageCap {
    pub kind: LimitType,
    pub count: usize,
}

/// One accumulated query clause, kept in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Filter(WhereClause),
    OrderBy {
        field: String,
        direction: OrderDirection,
    },
    Cursor(Cursor),
}
