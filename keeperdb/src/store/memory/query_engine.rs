use crate::collection::{DocumentPath, DocumentSnapshot};
use crate::common::{compare_values, get_field, is_comparable, values_equal, OrderDirection, RawDocument};
use crate::errors::{DbError, DbResult, ErrorKind};
use crate::query::{Clause, Cursor, CursorPosition, FilterOperator, LimitType, PageCap, Query, WhereClause};
use serde_json::Value;
use std::cmp::Ordering;

/// Rejects clause sequences the store cannot execute.
pub(crate) fn validate(query: &Query) -> DbResult<()> {
    let order_count = query.orderings().count();

    for clause in query.clauses() {
        match clause {
            Clause::Filter(filter) if filter.operator.takes_list() => {
                if !matches!(filter.value, Value::Array(_)) {
                    return Err(invalid(format!(
                        "Filter {} on '{}' needs a list operand",
                        filter.operator, filter.field
                    )));
                }
            }
            Clause::Cursor(cursor) if cursor.values.len() > order_count => {
                return Err(invalid(format!(
                    "{:?} has {} values but the query orders by {} fields",
                    cursor.position,
                    cursor.values.len(),
                    order_count
                )));
            }
            _ => {}
        }
    }

    if let Some(PageCap { kind: LimitType::Last, .. }) = query.page_cap() {
        if order_count == 0 {
            return Err(invalid(
                "limit_to_last requires at least one order_by clause".to_string(),
            ));
        }
    }
    Ok(())
}

fn invalid(message: String) -> DbError {
    log::error!("Rejected query: {}", message);
    DbError::new(&message, ErrorKind::InvalidQuery)
}

/// Evaluates a validated query against the documents of its collection.
pub(crate) fn execute<'a, I>(query: &Query, documents: I) -> Vec<DocumentSnapshot>
where
    I: IntoIterator<Item = (&'a String, &'a RawDocument)>,
{
    let orderings: Vec<(&str, OrderDirection)> = query.orderings().collect();
    let filters: Vec<&WhereClause> = query.filters().collect();

    let mut rows: Vec<Row<'a>> = documents
        .into_iter()
        .filter(|(_, data)| filters.iter().all(|filter| matches(filter, data)))
        .filter_map(|(id, data)| Row::new(id, data, &orderings))
        .collect();

    rows.sort_by(|a, b| compare_rows(a, b, &orderings));

    if let Some(cursor) = query.start_cursor() {
        rows.retain(|row| cursor_admits(row, cursor, &orderings));
    }
    if let Some(cursor) = query.end_cursor() {
        rows.retain(|row| cursor_admits(row, cursor, &orderings));
    }

    match query.page_cap() {
        Some(PageCap { kind: LimitType::First, count }) => rows.truncate(count),
        Some(PageCap { kind: LimitType::Last, count }) => {
            let skip = rows.len().saturating_sub(count);
            rows.drain(..skip);
        }
        None => {}
    }

    rows.into_iter()
        .map(|row| {
            DocumentSnapshot::new(
                DocumentPath::new(query.collection(), row.id.as_str()),
                Some(row.data.clone()),
            )
        })
        .collect()
}

struct Row<'a> {
    id: &'a String,
    data: &'a RawDocument,
    keys: Vec<&'a Value>,
}

impl<'a> Row<'a> {
    // documents missing an ordering field never appear in ordered results
    fn new(id: &'a String, data: &'a RawDocument, orderings: &[(&str, OrderDirection)]) -> Option<Self> {
        let keys = orderings
            .iter()
            .map(|(field, _)| get_field(data, field))
            .collect::<Option<Vec<_>>>()?;
        Some(Row { id, data, keys })
    }
}

fn compare_rows(a: &Row, b: &Row, orderings: &[(&str, OrderDirection)]) -> Ordering {
    for (index, (_, direction)) in orderings.iter().enumerate() {
        let ord = direction.apply(compare_values(a.keys[index], b.keys[index]));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    let tiebreak = orderings
        .last()
        .map(|(_, direction)| *direction)
        .unwrap_or_default();
    tiebreak.apply(a.id.cmp(b.id))
}

fn cursor_admits(row: &Row, cursor: &Cursor, orderings: &[(&str, OrderDirection)]) -> bool {
    let mut ord = Ordering::Equal;
    for (index, value) in cursor.values.iter().enumerate() {
        ord = orderings[index].1.apply(compare_values(row.keys[index], value));
        if ord != Ordering::Equal {
            break;
        }
    }
    match cursor.position {
        CursorPosition::StartAt => ord != Ordering::Less,
        CursorPosition::StartAfter => ord == Ordering::Greater,
        CursorPosition::EndAt => ord != Ordering::Greater,
        CursorPosition::EndBefore => ord == Ordering::Less,
    }
}

fn matches(filter: &WhereClause, data: &RawDocument) -> bool {
    let field = match get_field(data, &filter.field) {
        Some(value) => value,
        None => return false,
    };
    let operand = &filter.value;
    let candidates = || operand.as_array().map(|a| a.as_slice()).unwrap_or(&[]);

    match filter.operator {
        FilterOperator::Equal => values_equal(field, operand),
        FilterOperator::NotEqual => !field.is_null() && !values_equal(field, operand),
        FilterOperator::LessThan => {
            is_comparable(field, operand) && compare_values(field, operand) == Ordering::Less
        }
        FilterOperator::LessThanOrEqual => {
            is_comparable(field, operand) && compare_values(field, operand) != Ordering::Greater
        }
        FilterOperator::GreaterThan => {
            is_comparable(field, operand) && compare_values(field, operand) == Ordering::Greater
        }
        FilterOperator::GreaterThanOrEqual => {
            is_comparable(field, operand) && compare_values(field, operand) != Ordering::Less
        }
        FilterOperator::ArrayContains => field
            .as_array()
            .map(|items| items.iter().any(|item| values_equal(item, operand)))
            .unwrap_or(false),
        FilterOperator::ArrayContainsAny => field
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .any(|item| candidates().iter().any(|c| values_equal(item, c)))
            })
            .unwrap_or(false),
        FilterOperator::In => candidates().iter().any(|c| values_equal(field, c)),
        FilterOperator::NotIn => {
            !field.is_null() && !candidates().iter().any(|c| values_equal(field, c))
        }
    }
}
