use crate::common::OrderDirection;
use crate::query::{Clause, Cursor, CursorPosition, LimitType, PageCap, WhereClause};
use im::Vector;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// An executable query: one collection, its clauses in call order and an
/// optional page cap.
///
/// `Query` is a persistent value. Extending it returns a new query that shares
/// the unchanged prefix with the old one, so both can be executed
/// independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    clauses: Vector<Clause>,
    page_cap: Option<PageCap>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Query {
            collection: collection.into(),
            clauses: Vector::new(),
            page_cap: None,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn page_cap(&self) -> Option<PageCap> {
        self.page_cap
    }

    pub fn filters(&self) -> impl Iterator<Item = &WhereClause> {
        self.clauses.iter().filter_map(|clause| match clause {
            Clause::Filter(filter) => Some(filter),
            _ => None,
        })
    }

    pub fn orderings(&self) -> impl Iterator<Item = (&str, OrderDirection)> {
        self.clauses.iter().filter_map(|clause| match clause {
            Clause::OrderBy { field, direction } => Some((field.as_str(), *direction)),
            _ => None,
        })
    }

    /// The effective start cursor; a later start cursor replaces an earlier one.
    pub fn start_cursor(&self) -> Option<&Cursor> {
        self.last_cursor(true)
    }

    /// The effective end cursor; a later end cursor replaces an earlier one.
    pub fn end_cursor(&self) -> Option<&Cursor> {
        self.last_cursor(false)
    }

    fn last_cursor(&self, start: bool) -> Option<&Cursor> {
        self.clauses.iter().rev().find_map(|clause| match clause {
            Clause::Cursor(cursor) if cursor.position.is_start() == start => Some(cursor),
            _ => None,
        })
    }

    pub(crate) fn with_clause(&self, clause: Clause) -> Query {
        let mut next = self.clone();
        next.clauses.push_back(clause);
        next
    }

    pub(crate) fn with_page_cap(&self, kind: LimitType, count: usize) -> Query {
        let mut next = self.clone();
        next.page_cap = Some(PageCap { kind, count });
        next
    }

    pub(crate) fn with_cursor(&self, position: CursorPosition, values: Vec<serde_json::Value>) -> Query {
        self.with_clause(Clause::Cursor(Cursor { position, values }))
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection)?;
        for clause in self.clauses.iter() {
            match clause {
                Clause::Filter(filter) => write!(f, " where {}", filter)?,
                Clause::OrderBy { field, direction } => write!(f, " order by {} {}", field, direction)?,
                Clause::Cursor(cursor) => {
                    write!(f, " {:?} [{}]", cursor.position, cursor.values.iter().join(", "))?
                }
            }
        }
        match self.page_cap {
            Some(PageCap { kind: LimitType::First, count }) => write!(f, " limit {}", count),
            Some(PageCap { kind: LimitType::Last, count }) => write!(f, " limit to last {}", count),
            None => Ok(()),
        }
    }
}
