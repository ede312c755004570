//! Time tracking session parsing.
//!
//! The duration column's `additional_value` payload holds one entry per
//! tracked time span. `TimeTrackingLog` cracks the blob into typed session
//! records, each attributed to the user who stopped the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::value::FieldValue;

/// One tracked time span from the time tracking column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSession {
    /// User the span is attributed to
    pub owner_id: i64,
    /// True when any boundary of the span was entered by hand
    pub manually_entered: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Span length in fractional hours
    pub hours: f64,
}

/// Raw session entry as the API ships it.
#[derive(Deserialize)]
struct SessionEntry {
    ended_user_id: i64,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    manually_entered_start_date: bool,
    #[serde(default)]
    manually_entered_start_time: bool,
    #[serde(default)]
    manually_entered_end_date: bool,
    #[serde(default)]
    manually_entered_end_time: bool,
}

impl From<SessionEntry> for TimeSession {
    fn from(entry: SessionEntry) -> Self {
        let span = entry.ended_at - entry.started_at;
        #[allow(clippy::cast_precision_loss)]
        let hours = span.num_milliseconds() as f64 / 3_600_000.0;
        Self {
            owner_id: entry.ended_user_id,
            // Any manual boundary marks the whole span as manual
            manually_entered: entry.manually_entered_start_date
                || entry.manually_entered_start_time
                || entry.manually_entered_end_date
                || entry.manually_entered_end_time,
            started_at: entry.started_at,
            ended_at: entry.ended_at,
            created_at: entry.created_at,
            hours,
        }
    }
}

#[derive(Deserialize)]
struct DurationCell {
    #[serde(default)]
    additional_value: Vec<Value>,
}

/// Session records cracked out of one duration cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeTrackingLog {
    sessions: Vec<TimeSession>,
}

impl TimeTrackingLog {
    /// Parses the raw duration cell payload.
    ///
    /// A missing or malformed blob yields an empty log; a malformed single
    /// entry is skipped. Both are logged rather than surfaced as errors.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };
        let cell: DurationCell = match serde_json::from_str(raw) {
            Ok(cell) => cell,
            Err(error) => {
                warn!(error = %error, "time tracking cell held malformed JSON");
                return Self::default();
            }
        };
        let mut sessions = Vec::with_capacity(cell.additional_value.len());
        for entry in cell.additional_value {
            match serde_json::from_value::<SessionEntry>(entry) {
                Ok(entry) => sessions.push(TimeSession::from(entry)),
                Err(error) => {
                    warn!(error = %error, "skipping malformed session entry");
                }
            }
        }
        Self { sessions }
    }

    /// Parsed session records.
    #[must_use]
    pub fn sessions(&self) -> &[TimeSession] {
        &self.sessions
    }

    /// Sum of all session hours.
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.sessions.iter().map(|session| session.hours).sum()
    }

    /// Session list as a record field value, ready to sit under the
    /// `Time Sessions` key of a task record.
    #[must_use]
    pub fn to_field_value(&self) -> FieldValue {
        FieldValue::List(
            self.sessions
                .iter()
                .map(|session| {
                    serde_json::to_value(session).map_or(FieldValue::Null, FieldValue::from)
                })
                .collect(),
        )
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true when no sessions were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
