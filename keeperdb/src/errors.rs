use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for keeperdb operations.
///
/// Each kind describes one category of failure so callers can branch on it
/// without parsing messages.
///
/// # Examples
///
/// ```rust
/// use keeperdb::errors::{DbError, DbResult, ErrorKind};
///
/// fn example() -> DbResult<()> {
///     Err(DbError::new("cursor has too many values", ErrorKind::InvalidQuery))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A caller supplied argument is out of range or malformed
    InvalidArgument,
    /// The store rejected the clause sequence of a query
    InvalidQuery,
    /// Error mapping a typed record to or from a raw document
    ObjectMappingError,
    /// Error encoding or decoding data
    EncodingError,
    /// A store primitive required an existing document
    NotFound,
    /// A store primitive required an absent document
    AlreadyExists,
    /// A transaction kept conflicting with concurrent writers
    TransactionConflict,
    /// The transaction function failed and nothing was committed
    TransactionAborted,
    /// Error from the storage backend
    BackendError,
    /// The store has already been closed
    StoreClosed,
    /// Error from an extension crate (e.g. "geo")
    Extension(String),
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InvalidQuery => write!(f, "Invalid query"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::AlreadyExists => write!(f, "Already exists"),
            ErrorKind::TransactionConflict => write!(f, "Transaction conflict"),
            ErrorKind::TransactionAborted => write!(f, "Transaction aborted"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::StoreClosed => write!(f, "Store closed"),
            ErrorKind::Extension(name) => write!(f, "{} error", name),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type of every fallible keeperdb operation.
///
/// `DbError` carries a message, a kind, an optional cause and the backtrace of
/// the place it was created.
///
/// ```rust
/// use keeperdb::errors::{DbError, ErrorKind};
///
/// let cause = DbError::new("connection reset", ErrorKind::BackendError);
/// let err = DbError::new_with_cause("commit failed", ErrorKind::BackendError, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct DbError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DbError>>,
    backtrace: Backtrace,
}

impl DbError {
    /// Creates a new `DbError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DbError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new(),
        }
    }

    /// Creates a new `DbError` chained to the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DbError) -> Self {
        DbError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DbError> {
        self.cause.as_deref()
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, DbError>`.
pub type DbResult<T> = Result<T, DbError>;

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        let error_kind = if err.is_data() {
            ErrorKind::ObjectMappingError
        } else {
            ErrorKind::EncodingError
        };
        DbError::new(&format!("Serialization error: {}", err), error_kind)
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::new(&format!("IO error: {}", err), ErrorKind::BackendError)
    }
}

impl From<String> for DbError {
    fn from(msg: String) -> Self {
        DbError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DbError {
    fn from(msg: &str) -> Self {
        DbError::new(msg, ErrorKind::InternalError)
    }
}
