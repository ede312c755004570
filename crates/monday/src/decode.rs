//! Per-type cell decoders.
//!
//! Each decoder turns one raw cell payload (a JSON-encoded string, or null
//! for an empty cell) into zero or more flat name/value pairs. Decoders are
//! pure functions over their inputs; malformed embedded JSON is logged and
//! degrades to the type's null shape so one bad cell never aborts a board
//! pass.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::columns::ColumnType;
use crate::value::{FieldMap, FieldValue};

/// Placeholder joined into dropdown output when an id has no label entry.
pub const UNRESOLVED_LABEL: &str = "None";

/// Decodes one cell through the decoder registered for its column type.
///
/// `name` is the derived field name (column title, or raw id in debug mode),
/// `settings` the column's settings blob, `value` the JSON-encoded cell
/// payload, `text` the API's pre-rendered display string.
#[must_use]
pub fn decode(
    column_type: ColumnType,
    name: &str,
    settings: Option<&str>,
    value: Option<&str>,
    text: Option<&str>,
) -> FieldMap {
    match column_type {
        ColumnType::Text => decode_text(name, value),
        ColumnType::LongText => decode_long_text(name, value),
        ColumnType::Numeric => decode_numeric(name, text),
        ColumnType::Date => decode_date(name, value, text),
        ColumnType::Tag => decode_tag(name, value),
        ColumnType::Dropdown => decode_dropdown(name, settings, value),
        ColumnType::Color => decode_color(name, value, text),
        ColumnType::MultiplePerson => decode_multi_person(name, value),
        ColumnType::BoardRelation | ColumnType::Dependency => decode_linked_items(name, value),
        ColumnType::Subtasks => decode_subtasks(name, value),
        ColumnType::Formula => single(format!("{name}__formula"), FieldValue::Null),
        ColumnType::Lookup => single(format!("{name}__mirror"), FieldValue::Null),
        ColumnType::Timerange | ColumnType::Duration => decode_flatten(name, value),
        ColumnType::Boolean => decode_boolean(name, value),
        ColumnType::Unknown => decode_default(name, value),
    }
}

/// Parses display text as an integer, then a float, then the not-a-number
/// sentinel. Total over any input string.
#[must_use]
pub fn convert_numeric(text: &str) -> FieldValue {
    let trimmed = text.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return FieldValue::Int(integer);
    }
    match trimmed.parse::<f64>() {
        Ok(float) => FieldValue::Float(float),
        Err(_) => FieldValue::Float(f64::NAN),
    }
}

// ============================================================================
// Cell payload shapes
// ============================================================================

#[derive(Deserialize)]
struct LongTextCell {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct TagCell {
    tag_ids: Vec<i64>,
}

#[derive(Deserialize)]
struct DropdownCell {
    ids: Vec<i64>,
}

#[derive(Deserialize)]
struct DropdownSettings {
    #[serde(default)]
    labels: Vec<DropdownLabel>,
}

#[derive(Deserialize)]
struct DropdownLabel {
    id: i64,
    name: String,
}

/// Shared shape for cells that only contribute a change timestamp.
#[derive(Deserialize)]
struct ChangeStamp {
    #[serde(default)]
    changed_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonsCell {
    #[serde(default)]
    persons_and_teams: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedCell {
    #[serde(default)]
    linked_pulse_ids: Vec<LinkedPulse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedPulse {
    linked_pulse_id: i64,
}

// ============================================================================
// Decoders
// ============================================================================

fn decode_text(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(decoded) => single(name, FieldValue::from(decoded)),
        Err(error) => {
            warn!(column = %name, error = %error, "text cell held malformed JSON");
            single(name, FieldValue::Null)
        }
    }
}

fn decode_long_text(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    match serde_json::from_str::<LongTextCell>(raw) {
        Ok(cell) => {
            let trimmed = cell
                .text
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty());
            single(name, trimmed.map_or(FieldValue::Null, FieldValue::from))
        }
        Err(error) => {
            warn!(column = %name, error = %error, "long text cell held malformed JSON");
            single(name, FieldValue::Null)
        }
    }
}

fn decode_numeric(name: &str, text: Option<&str>) -> FieldMap {
    single(
        name,
        text.map_or(FieldValue::Float(f64::NAN), convert_numeric),
    )
}

// The API renders dates into `text`; the raw value only signals emptiness.
fn decode_date(name: &str, value: Option<&str>, text: Option<&str>) -> FieldMap {
    if value.is_none() {
        return single(name, FieldValue::Null);
    }
    single(name, text.map_or(FieldValue::Null, FieldValue::from))
}

fn decode_tag(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    match serde_json::from_str::<TagCell>(raw) {
        Ok(cell) => single(
            name,
            FieldValue::List(cell.tag_ids.into_iter().map(FieldValue::Int).collect()),
        ),
        Err(error) => {
            warn!(column = %name, error = %error, "tag cell held malformed JSON");
            single(name, FieldValue::Null)
        }
    }
}

fn decode_dropdown(name: &str, settings: Option<&str>, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    match serde_json::from_str::<DropdownCell>(raw) {
        Ok(cell) => {
            let labels = dropdown_labels(name, settings);
            let resolved: Vec<&str> = cell
                .ids
                .iter()
                .map(|id| labels.get(id).map_or(UNRESOLVED_LABEL, String::as_str))
                .collect();
            single(name, FieldValue::Text(resolved.join(", ")))
        }
        Err(error) => {
            warn!(column = %name, error = %error, "dropdown cell held malformed JSON");
            single(name, FieldValue::Null)
        }
    }
}

fn dropdown_labels(name: &str, settings: Option<&str>) -> HashMap<i64, String> {
    let Some(raw) = settings else {
        warn!(column = %name, "dropdown column has no settings; labels unavailable");
        return HashMap::new();
    };
    match serde_json::from_str::<DropdownSettings>(raw) {
        Ok(parsed) => parsed
            .labels
            .into_iter()
            .map(|label| (label.id, label.name))
            .collect(),
        Err(error) => {
            warn!(column = %name, error = %error, "dropdown settings held malformed JSON");
            HashMap::new()
        }
    }
}

// Status columns fan out into suffixed entries; absent parts are omitted
// rather than emitted as nulls.
fn decode_color(name: &str, value: Option<&str>, text: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    let mut fields = FieldMap::new();
    if let Some(text) = text.filter(|text| !text.is_empty()) {
        fields.insert(format!("{name}__text"), FieldValue::from(text));
    }
    match serde_json::from_str::<ChangeStamp>(raw) {
        Ok(stamp) => {
            if let Some(changed_at) = stamp.changed_at {
                fields.insert(format!("{name}__changed_at"), FieldValue::Text(changed_at));
            }
        }
        Err(error) => {
            warn!(column = %name, error = %error, "status cell held malformed JSON");
        }
    }
    fields
}

fn decode_multi_person(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::List(Vec::new()));
    };
    match serde_json::from_str::<PersonsCell>(raw) {
        Ok(cell) => single(
            name,
            FieldValue::List(
                cell.persons_and_teams
                    .into_iter()
                    .map(FieldValue::from)
                    .collect(),
            ),
        ),
        Err(error) => {
            warn!(column = %name, error = %error, "people cell held malformed JSON");
            single(name, FieldValue::List(Vec::new()))
        }
    }
}

// Board relations and dependencies share the linkedPulseIds walk.
fn decode_linked_items(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    match linked_pulse_ids(raw) {
        Ok(ids) => single(
            name,
            FieldValue::List(ids.into_iter().map(FieldValue::Int).collect()),
        ),
        Err(error) => {
            warn!(column = %name, error = %error, "linked items cell held malformed JSON");
            single(name, FieldValue::Null)
        }
    }
}

// Same walk as linked items, but an empty result collapses to null.
fn decode_subtasks(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    match linked_pulse_ids(raw) {
        Ok(ids) if ids.is_empty() => single(name, FieldValue::Null),
        Ok(ids) => single(
            name,
            FieldValue::List(ids.into_iter().map(FieldValue::Int).collect()),
        ),
        Err(error) => {
            warn!(column = %name, error = %error, "subtasks cell held malformed JSON");
            single(name, FieldValue::Null)
        }
    }
}

fn linked_pulse_ids(raw: &str) -> Result<Vec<i64>, serde_json::Error> {
    let cell: LinkedCell = serde_json::from_str(raw)?;
    Ok(cell
        .linked_pulse_ids
        .into_iter()
        .map(|pulse| pulse.linked_pulse_id)
        .collect())
}

// Time range and duration cells flatten every top-level key into a suffixed
// entry, preserving document key order.
fn decode_flatten(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(name, FieldValue::Null);
    };
    match serde_json::from_str::<IndexMap<String, Value>>(raw) {
        Ok(cell) => cell
            .into_iter()
            .map(|(key, value)| (format!("{name}__{key}"), FieldValue::from(value)))
            .collect(),
        Err(error) => {
            warn!(column = %name, error = %error, "cell held malformed JSON");
            single(name, FieldValue::Null)
        }
    }
}

fn decode_boolean(name: &str, value: Option<&str>) -> FieldMap {
    let Some(raw) = value else {
        return single(format!("{name}__checked"), FieldValue::Bool(false));
    };
    let mut fields = single(format!("{name}__checked"), FieldValue::Bool(true));
    match serde_json::from_str::<ChangeStamp>(raw) {
        Ok(stamp) => {
            if let Some(changed_at) = stamp.changed_at {
                fields.insert(format!("{name}__changed_at"), FieldValue::Text(changed_at));
            }
        }
        Err(error) => {
            warn!(column = %name, error = %error, "checkbox cell held malformed JSON");
        }
    }
    fields
}

// Unknown types keep the raw payload and a visible marker instead of
// failing silently.
fn decode_default(name: &str, value: Option<&str>) -> FieldMap {
    debug!(column = %name, "no dedicated decoder; using default formatter");
    let mut fields = single(name, value.map_or(FieldValue::Null, FieldValue::from));
    fields.insert(format!("{name}__default_formatter"), FieldValue::Bool(true));
    fields
}

fn single(name: impl Into<String>, value: FieldValue) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(name.into(), value);
    fields
}
