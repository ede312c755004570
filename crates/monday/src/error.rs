//! Error types for board formatting and journal expansion.

use thiserror::Error;

/// Errors that can occur while formatting board items.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Column id is not present in the catalog
    #[error("unknown column id: {0}")]
    UnknownColumn(String),

    /// Item id could not be coerced to a number
    #[error("item id is not numeric: {0}")]
    InvalidItemId(String),
}

/// Errors that can occur while expanding a task record into journal entries.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Owner id has no entry in the user directory
    #[error("no user directory entry for id {0}")]
    UnknownUser(i64),

    /// Neither a completion date nor a status change timestamp is present
    #[error("record has no date completed and no status change timestamp")]
    MissingEndDate,

    /// Timestamp or date field failed to parse
    #[error("invalid date: {0}")]
    InvalidDate(#[from] chrono::ParseError),

    /// Owner list failed to deserialize
    #[error("invalid owner list: {0}")]
    InvalidOwners(#[source] serde_json::Error),

    /// Session list failed to deserialize
    #[error("invalid time sessions: {0}")]
    InvalidSessions(#[source] serde_json::Error),
}
