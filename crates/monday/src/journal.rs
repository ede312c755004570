//! Task record validation and journal expansion.
//!
//! Time-tracking boards carry a handful of well-known columns ([`fields`]).
//! [`validate_task_record`] classifies each flat record as ready or stopped
//! and writes the outcome back into the record; [`expand_task_record`] turns
//! ready records into journal entries, one per owner or per tracked session.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::error::JournalError;
use crate::format::MONDAY_NAME;
use crate::models::UserDirectory;
use crate::value::{FieldMap, FieldValue};

/// Well-known record keys on the time-tracking board.
///
/// The first group are column display titles the board is expected to carry;
/// the second are the keys the validator writes.
pub mod fields {
    /// Hours entered by hand on the item
    pub const ACTUAL_HOURS: &str = "Actual Hours";
    /// Parsed time tracking sessions (see [`crate::sessions::TimeTrackingLog`])
    pub const TIME_SESSIONS: &str = "Time Sessions";
    /// Person assignments the hours are attributed to
    pub const OWNER: &str = "Owner";
    /// Completion date, the preferred end-date source
    pub const DATE_COMPLETED: &str = "Date Completed";
    /// Status message checked for the `Ready` prefix before expansion
    pub const INTEGRATION_MESSAGE: &str = "Integration Message";
    /// Status blob, the fallback end-date source
    pub const STATUS: &str = "Status";

    /// Classification written by the validator (`Ready` or `STOP`)
    pub const INTEGRATION_STATE: &str = "integration_state";
    /// Reason code written by the validator
    pub const INTEGRATION_STATE_RULE: &str = "integration_state_rule";
}

/// Prefix of the `Integration Message` field that lets a record expand.
pub const READY_PREFIX: &str = "Ready";

/// Why the validator stopped a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Both actual hours and session records are present
    ActualHoursAndSessions,
    /// Actual hours without any owner to attribute them to
    ActualHoursAndNoOwners,
    /// Neither actual hours nor session records
    NoActualHoursAndNoSessions,
}

impl StopReason {
    /// Machine-readable reason code, as written into the record.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActualHoursAndSessions => "actual_hours_and_sessions",
            Self::ActualHoursAndNoOwners => "actual_hours_and_no_owners",
            Self::NoActualHoursAndNoSessions => "no_actual_hours_and_no_sessions",
        }
    }
}

/// Validation outcome for one task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationState {
    /// Record can be expanded into journal entries
    Ready,
    /// Record violates a business rule and must not be expanded
    Stop(StopReason),
}

impl IntegrationState {
    /// State label written into the record.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Stop(_) => "STOP",
        }
    }

    /// Rule label written into the record; `Ready` records carry `Ready`.
    #[must_use]
    pub const fn rule(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Stop(reason) => reason.as_str(),
        }
    }

    /// Returns true for `Ready`.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// How a ready record was expanded into journal entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionRule {
    /// Actual hours divided evenly across the owner list
    HoursSplitBetweenOwners,
    /// One entry per tracked session, hours taken from the session
    HoursFromSessionRecords,
}

impl ExpansionRule {
    /// Machine-readable rule tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HoursSplitBetweenOwners => "hours_split_between_owners",
            Self::HoursFromSessionRecords => "hours_from_session_records",
        }
    }
}

/// One journal entry, attributed to a single owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalRecord {
    /// Owner display name resolved through the user directory
    pub owner: String,
    /// Hours attributed to the owner
    pub hours: f64,
    /// When the task ended
    pub task_end_date: DateTime<Utc>,
    /// How this entry was derived
    pub rule: ExpansionRule,
    /// The task record the entry was expanded from
    pub source: FieldMap,
}

/// Classifies one task record and writes the outcome into it.
///
/// Rules, in priority order:
/// 1. actual hours and sessions both present → stop, the two time sources
///    conflict;
/// 2. actual hours without owners → stop, nobody to attribute them to;
/// 3. neither actual hours nor sessions → stop, nothing to journal;
/// 4. otherwise ready.
///
/// Absent fields read as their empty shape (missing hours as not-a-number,
/// missing lists as empty), so classification is total over any record.
pub fn validate_task_record(record: &mut FieldMap) -> IntegrationState {
    let actual_hours = actual_hours_of(record);
    let sessions = list_len(record, fields::TIME_SESSIONS);
    let owners = list_len(record, fields::OWNER);

    let state = if !actual_hours.is_nan() && sessions > 0 {
        IntegrationState::Stop(StopReason::ActualHoursAndSessions)
    } else if !actual_hours.is_nan() && owners == 0 {
        IntegrationState::Stop(StopReason::ActualHoursAndNoOwners)
    } else if actual_hours.is_nan() && sessions == 0 {
        IntegrationState::Stop(StopReason::NoActualHoursAndNoSessions)
    } else {
        IntegrationState::Ready
    };

    if let IntegrationState::Stop(reason) = state {
        let name = record
            .get(MONDAY_NAME)
            .and_then(FieldValue::as_str)
            .unwrap_or_default();
        warn!(rule = reason.as_str(), record = %name, "task record stopped");
    }

    record.insert(
        fields::INTEGRATION_STATE.to_string(),
        FieldValue::from(state.as_str()),
    );
    record.insert(
        fields::INTEGRATION_STATE_RULE.to_string(),
        FieldValue::from(state.rule()),
    );
    state
}

/// Expands one task record into journal entries.
///
/// Records whose `Integration Message` does not start with [`READY_PREFIX`]
/// pass through quietly and yield no entries. Ready records expand in one of
/// two mutually exclusive modes: actual hours split evenly across the owner
/// list, or one entry per tracked session.
pub fn expand_task_record(
    record: &FieldMap,
    users: &UserDirectory,
) -> Result<Vec<JournalRecord>, JournalError> {
    let message = record
        .get(fields::INTEGRATION_MESSAGE)
        .and_then(FieldValue::as_str)
        .unwrap_or_default();
    if !message.starts_with(READY_PREFIX) {
        return Ok(Vec::new());
    }

    let actual_hours = actual_hours_of(record);
    if !actual_hours.is_nan() {
        return expand_hours(record, users, actual_hours);
    }

    let sessions = session_refs(record)?;
    if !sessions.is_empty() {
        return expand_sessions(record, users, &sessions);
    }

    // The validator never marks such a record ready; guard anyway.
    error!("an unknown condition stopped record processing");
    Ok(Vec::new())
}

/// Resolves when a task ended.
///
/// `Date Completed` wins when it holds non-empty text, read as a calendar
/// date at midnight UTC. Otherwise the `Status` blob's `changed_at`
/// timestamp is used; the blob may sit in the record as the raw JSON string
/// or as an already-decoded object. The two columns are unrelated on the
/// board, but this fallback is how the time-tracking flow has always dated
/// tasks, so it lives here under one name.
pub fn resolve_task_end_date(record: &FieldMap) -> Result<DateTime<Utc>, JournalError> {
    if let Some(date) = record
        .get(fields::DATE_COMPLETED)
        .and_then(FieldValue::as_str)
        .map(str::trim)
        .filter(|date| !date.is_empty())
    {
        let date = date.parse::<NaiveDate>()?;
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    let changed_at = status_changed_at(record).ok_or(JournalError::MissingEndDate)?;
    Ok(DateTime::parse_from_rfc3339(&changed_at)?.with_timezone(&Utc))
}

/// Owner reference inside a `personsAndTeams` entry.
#[derive(Deserialize)]
struct PersonRef {
    id: i64,
}

/// The slice of a session record the expander needs.
#[derive(Deserialize)]
struct SessionRef {
    owner_id: i64,
    hours: f64,
}

fn expand_hours(
    record: &FieldMap,
    users: &UserDirectory,
    actual_hours: f64,
) -> Result<Vec<JournalRecord>, JournalError> {
    let owners = owner_refs(record)?;
    let task_end_date = resolve_task_end_date(record)?;
    #[allow(clippy::cast_precision_loss)]
    let split = actual_hours / owners.len() as f64;

    owners
        .iter()
        .map(|owner| {
            Ok(JournalRecord {
                owner: display_name(users, owner.id)?,
                hours: split,
                task_end_date,
                rule: ExpansionRule::HoursSplitBetweenOwners,
                source: record.clone(),
            })
        })
        .collect()
}

fn expand_sessions(
    record: &FieldMap,
    users: &UserDirectory,
    sessions: &[SessionRef],
) -> Result<Vec<JournalRecord>, JournalError> {
    let task_end_date = resolve_task_end_date(record)?;

    sessions
        .iter()
        .map(|session| {
            Ok(JournalRecord {
                owner: display_name(users, session.owner_id)?,
                hours: session.hours,
                task_end_date,
                rule: ExpansionRule::HoursFromSessionRecords,
                source: record.clone(),
            })
        })
        .collect()
}

// Absent or null hours read as the not-a-number sentinel, matching the
// numeric decoder's empty shape.
fn actual_hours_of(record: &FieldMap) -> f64 {
    record
        .get(fields::ACTUAL_HOURS)
        .and_then(FieldValue::as_f64)
        .unwrap_or(f64::NAN)
}

fn list_len(record: &FieldMap, key: &str) -> usize {
    record
        .get(key)
        .and_then(FieldValue::as_list)
        .map_or(0, <[FieldValue]>::len)
}

fn owner_refs(record: &FieldMap) -> Result<Vec<PersonRef>, JournalError> {
    match record.get(fields::OWNER) {
        None | Some(FieldValue::Null) => Ok(Vec::new()),
        Some(value) => {
            serde_json::from_value(value.to_json()).map_err(JournalError::InvalidOwners)
        }
    }
}

fn session_refs(record: &FieldMap) -> Result<Vec<SessionRef>, JournalError> {
    match record.get(fields::TIME_SESSIONS) {
        None | Some(FieldValue::Null) => Ok(Vec::new()),
        Some(value) => {
            serde_json::from_value(value.to_json()).map_err(JournalError::InvalidSessions)
        }
    }
}

fn display_name(users: &UserDirectory, id: i64) -> Result<String, JournalError> {
    users
        .display_name(id)
        .map(str::to_string)
        .ok_or(JournalError::UnknownUser(id))
}

fn status_changed_at(record: &FieldMap) -> Option<String> {
    match record.get(fields::STATUS)? {
        FieldValue::Text(raw) => {
            let blob: Value = serde_json::from_str(raw).ok()?;
            blob.get("changed_at")?.as_str().map(str::to_string)
        }
        FieldValue::Json(blob) => blob.get("changed_at")?.as_str().map(str::to_string),
        _ => None,
    }
}
