//! End-to-end tests over a captured boards-query payload.
//!
//! These tests drive the whole pipeline: catalog construction from the
//! response, per-item formatting, the column-name union, session parsing,
//! validation, and journal expansion.

use chrono::{DateTime, TimeZone, Utc};
use monday_board::journal::fields;
use monday_board::{
    expand_task_record, validate_task_record, BoardFormatter, BoardsResponse, ColumnCatalog,
    ExpansionRule, FieldMap, FieldValue, IntegrationState, Item, StopReason, TimeTrackingLog,
    UserDirectory, UsersResponse,
};

const BOARD_FIXTURE: &str = include_str!("fixtures/board.json");

const USERS_FIXTURE: &str = r#"{
    "users": [
        {"id": 3457079, "name": "Pat Example"},
        {"id": 19163657, "name": "Sam Tester"},
        {"id": 25810257, "name": "Ray Fixture"}
    ]
}"#;

// =============================================================================
// Fixture plumbing
// =============================================================================

/// Parse the captured boards response.
fn fixture_response() -> BoardsResponse {
    serde_json::from_str(BOARD_FIXTURE).unwrap()
}

/// Raw cell value for one column of an item.
fn cell_value<'a>(item: &'a Item, column_id: &str) -> Option<&'a str> {
    item.column_values
        .iter()
        .find(|cell| cell.id == column_id)
        .and_then(|cell| cell.value.as_deref())
}

/// Format the fixture board and attach the inputs the journal flow consumes:
/// parsed time sessions and the raw status blob.
fn task_records() -> Vec<FieldMap> {
    let response = fixture_response();
    let catalog = ColumnCatalog::from_response(&response);
    let board = &response.boards[0];

    let mut table = BoardFormatter::new(&catalog)
        .format_board(&board.items)
        .unwrap();
    for (record, item) in table.records_mut().iter_mut().zip(&board.items) {
        let log = TimeTrackingLog::parse(cell_value(item, "time_tracking"));
        record.insert(fields::TIME_SESSIONS.to_string(), log.to_field_value());
        if let Some(raw) = cell_value(item, "status") {
            record.insert(fields::STATUS.to_string(), FieldValue::from(raw));
        }
    }
    table.into_records()
}

/// Validate every record in place, returning the typed states alongside.
fn validated_records() -> (Vec<FieldMap>, Vec<IntegrationState>) {
    let mut records = task_records();
    let states = records.iter_mut().map(validate_task_record).collect();
    (records, states)
}

fn users() -> UserDirectory {
    let response: UsersResponse = serde_json::from_str(USERS_FIXTURE).unwrap();
    UserDirectory::from_response(response)
}

// =============================================================================
// Formatting
// =============================================================================

/// Every decoder's key names land in the union, in first-seen order.
#[test]
fn test_column_union_covers_every_decoder() {
    let response = fixture_response();
    let catalog = ColumnCatalog::from_response(&response);
    let table = BoardFormatter::new(&catalog)
        .format_board(&response.boards[0].items)
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(
        table.column_names(),
        vec![
            "monday_id",
            "monday_name",
            "Subitems",
            "Owner",
            "Status__text",
            "Status__changed_at",
            "Date Completed",
            "Timeline__to",
            "Timeline__from",
            "Timeline__changed_at",
            "Actual Hours",
            "Notes",
            "Long Notes",
            "Time Tracking",
            "Hour",
            "Hour__default_formatter",
            "Formula__formula",
            "Dependency",
            "Test Board",
            "A Mirror Column__mirror",
            "Tags",
            "Platform",
            "Check__checked",
            "Check__changed_at",
            "Integration Message",
            "Timeline",
            "Time Tracking__running",
            "Time Tracking__duration",
            "Time Tracking__additional_value",
            "Status",
        ]
    );
}

/// Spot checks across the three fixture items.
#[test]
fn test_records_carry_decoded_values() {
    let response = fixture_response();
    let catalog = ColumnCatalog::from_response(&response);
    let table = BoardFormatter::new(&catalog)
        .format_board(&response.boards[0].items)
        .unwrap();
    let records = table.records();

    let first = &records[0];
    assert_eq!(first.get("monday_id"), Some(&FieldValue::Int(881_106_441)));
    assert_eq!(
        first.get("monday_name"),
        Some(&FieldValue::Text("Refit booster valve".to_string()))
    );
    assert_eq!(first.get("Actual Hours"), Some(&FieldValue::Int(15)));
    assert_eq!(
        first.get("Platform"),
        Some(&FieldValue::Text("iOS, Android".to_string()))
    );
    assert_eq!(
        first.get("Subitems"),
        Some(&FieldValue::List(vec![FieldValue::Int(2_621_588_113)]))
    );
    assert_eq!(first.get("Check__checked"), Some(&FieldValue::Bool(true)));
    assert_eq!(first.get("Time Tracking"), Some(&FieldValue::Null));
    assert_eq!(
        first.get("Hour"),
        Some(&FieldValue::Text(
            r#"{"hour": 16, "minute": 30}"#.to_string()
        ))
    );
    assert_eq!(
        first.get("Long Notes"),
        Some(&FieldValue::Text(
            "Valve seat relapped; torque within limits.".to_string()
        ))
    );
    assert_eq!(
        first.get("Status__text"),
        Some(&FieldValue::Text("Done".to_string()))
    );

    let second = &records[1];
    assert!(second.get("Actual Hours").unwrap().is_nan());
    assert_eq!(second.get("Subitems"), Some(&FieldValue::Null));
    assert_eq!(
        second.get("Test Board"),
        Some(&FieldValue::List(Vec::new()))
    );
    assert_eq!(
        second.get("Platform"),
        Some(&FieldValue::Text("iOS, None".to_string()))
    );
    assert_eq!(second.get("Check__checked"), Some(&FieldValue::Bool(false)));
    assert_eq!(
        second.get("Time Tracking__duration"),
        Some(&FieldValue::Int(9_000))
    );

    let third = &records[2];
    assert_eq!(third.get("Status"), Some(&FieldValue::Null));
    assert_eq!(third.get("Owner"), Some(&FieldValue::List(Vec::new())));
    assert_eq!(third.get("Actual Hours"), Some(&FieldValue::Int(4)));
}

// =============================================================================
// Validation
// =============================================================================

/// The fixture covers both ready modes and a stopped record.
#[test]
fn test_validation_classifies_fixture_items() {
    let (records, states) = validated_records();

    assert_eq!(states[0], IntegrationState::Ready);
    assert_eq!(states[1], IntegrationState::Ready);
    assert_eq!(
        states[2],
        IntegrationState::Stop(StopReason::ActualHoursAndSessions)
    );

    assert_eq!(
        records[0].get(fields::INTEGRATION_STATE),
        Some(&FieldValue::Text("Ready".to_string()))
    );
    assert_eq!(
        records[2].get(fields::INTEGRATION_STATE),
        Some(&FieldValue::Text("STOP".to_string()))
    );
    assert_eq!(
        records[2].get(fields::INTEGRATION_STATE_RULE),
        Some(&FieldValue::Text("actual_hours_and_sessions".to_string()))
    );
}

// =============================================================================
// Journal expansion
// =============================================================================

/// Manually entered hours split evenly across the owner list.
#[test]
fn test_hours_record_expands_per_owner() {
    let (records, _) = validated_records();
    let entries = expand_task_record(&records[0], &users()).unwrap();

    assert_eq!(entries.len(), 3);
    let owners: Vec<&str> = entries.iter().map(|entry| entry.owner.as_str()).collect();
    assert_eq!(owners, vec!["Pat Example", "Sam Tester", "Ray Fixture"]);
    for entry in &entries {
        assert!((entry.hours - 5.0).abs() < f64::EPSILON);
        assert_eq!(entry.rule, ExpansionRule::HoursSplitBetweenOwners);
        assert_eq!(
            entry.task_end_date,
            Utc.with_ymd_and_hms(2021, 2, 17, 0, 0, 0).unwrap()
        );
        assert_eq!(
            entry.source.get("monday_id"),
            Some(&FieldValue::Int(881_106_441))
        );
    }
}

/// Tracked sessions expand one entry each, dated from the status change.
#[test]
fn test_sessions_record_expands_per_session() {
    let (records, _) = validated_records();
    let entries = expand_task_record(&records[1], &users()).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].owner, "Sam Tester");
    assert!((entries[0].hours - 1.0).abs() < f64::EPSILON);
    assert_eq!(entries[1].owner, "Pat Example");
    assert!((entries[1].hours - 1.5).abs() < f64::EPSILON);

    let changed_at = DateTime::parse_from_rfc3339("2021-02-19T17:24:57.321Z")
        .unwrap()
        .with_timezone(&Utc);
    for entry in &entries {
        assert_eq!(entry.rule, ExpansionRule::HoursFromSessionRecords);
        assert_eq!(entry.task_end_date, changed_at);
    }
}

/// Stopped records pass through expansion without entries.
#[test]
fn test_stopped_record_yields_no_entries() {
    let (records, _) = validated_records();
    let entries = expand_task_record(&records[2], &users()).unwrap();
    assert!(entries.is_empty());
}
