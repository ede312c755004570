//! Monday.com board formatting and time-tracking journal expansion.
//!
//! This crate provides:
//! - Wire models for the boards/users query payloads
//! - A per-board column catalog mapping column ids to typed definitions
//! - Per-type cell decoders that flatten opaque JSON payloads into
//!   name/value pairs
//! - Item and board formatters that assemble one flat record per item
//! - Time tracking session parsing
//! - Task record validation and per-owner journal expansion
//!
//! The GraphQL transport (query execution, auth) lives outside this crate;
//! everything here is a pure transformation over already-decoded payloads.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error conditions are on the error enums

pub mod columns;
pub mod decode;
pub mod error;
pub mod format;
pub mod journal;
pub mod models;
pub mod sessions;
pub mod value;

pub use columns::{ColumnCatalog, ColumnDef, ColumnType};
pub use error::{FormatError, JournalError};
pub use format::{BoardFormatter, BoardTable, ItemFormatter};
pub use journal::{
    expand_task_record, resolve_task_end_date, validate_task_record, ExpansionRule,
    IntegrationState, JournalRecord, StopReason,
};
pub use models::{Board, BoardsResponse, ColumnValue, Item, User, UserDirectory, UsersResponse};
pub use sessions::{TimeSession, TimeTrackingLog};
pub use value::{FieldMap, FieldValue};
