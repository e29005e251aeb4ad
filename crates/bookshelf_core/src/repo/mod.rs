//! Persistence contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define the storage operations the services depend on.
//! - Keep SQL text and driver details out of the service layer.
//!
//! # Invariants
//! - Single-record lookups return `Ok(None)` for absent rows; `Err` is reserved
//!   for storage failures, so callers can tell "not found" from "broken".
//! - Mutations that touch zero rows return `RepoError::NotFound`.
//! - Unique-constraint violations surface as `RepoError::Conflict`.

use crate::db::DbError;
use rusqlite::ErrorCode;
use thiserror::Error;

pub mod book_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps a write failure, turning constraint violations into `Conflict`.
pub(crate) fn write_error(err: rusqlite::Error, conflict_message: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::Conflict(conflict_message.to_string())
        }
        _ => err.into(),
    }
}

/// Builds a `LIKE` pattern matching `term` as a literal substring.
///
/// Pair with `ESCAPE '\'` in the SQL text.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Checks that a store-assigned id fits the positive-id invariant.
pub(crate) fn checked_id(entity: &'static str, id: i64) -> RepoResult<i64> {
    if id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "{entity} row has non-positive id `{id}`"
        )));
    }
    Ok(id)
}
