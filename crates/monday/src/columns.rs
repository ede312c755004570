//! Column definitions and the per-board column catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::models::BoardsResponse;

/// Column type tags exported by the monday.com API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    /// Plain text cell
    Text,
    /// Multi-line text cell (wire tag `long-text`)
    LongText,
    /// Number cell
    Numeric,
    /// Calendar date cell
    Date,
    /// Tag id list
    Tag,
    /// Dropdown with a per-column label table
    Dropdown,
    /// Status column (wire tag `color`)
    Color,
    /// People assignments (wire tag `multiple-person`)
    MultiplePerson,
    /// Links to items on another board (wire tag `board-relation`)
    BoardRelation,
    /// Links to items on the same board
    Dependency,
    /// Computed column, never exported with a value
    Formula,
    /// Mirror column, never exported with a value
    Lookup,
    /// Start/end date pair (wire tag `timerange`)
    Timerange,
    /// Time tracking column with session log
    Duration,
    /// Subitem links
    Subtasks,
    /// Checkbox
    Boolean,
    /// Unknown type (catch-all to avoid parse failures)
    #[serde(other)]
    Unknown,
}

/// One column definition from a board's `columns` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column id, unique within the board
    pub id: String,
    /// Display title shown to users; derived field names start from this
    pub title: String,
    /// Declared column type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Type-specific settings blob (dropdown/status label tables)
    #[serde(default)]
    pub settings_str: Option<String>,
}

impl ColumnDef {
    /// Creates a definition without settings. Mostly useful in tests.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_type,
            settings_str: None,
        }
    }

    /// Attaches a settings blob.
    #[must_use]
    pub fn with_settings(mut self, settings_str: impl Into<String>) -> Self {
        self.settings_str = Some(settings_str.into());
        self
    }
}

/// Index of column definitions keyed by column id.
///
/// Built once per board fetch and borrowed by the formatters.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    columns: HashMap<String, ColumnDef>,
}

impl ColumnCatalog {
    /// Builds a catalog from a list of column definitions.
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|column| (column.id.clone(), column))
                .collect(),
        }
    }

    /// Builds the catalog from the first board of a boards query response.
    #[must_use]
    pub fn from_response(response: &BoardsResponse) -> Self {
        let columns = response
            .boards
            .first()
            .map(|board| board.columns.clone())
            .unwrap_or_default();
        Self::new(columns)
    }

    /// Looks up a column definition by id.
    pub fn get(&self, column_id: &str) -> Result<&ColumnDef, FormatError> {
        self.columns
            .get(column_id)
            .ok_or_else(|| FormatError::UnknownColumn(column_id.to_string()))
    }

    /// Number of columns in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the catalog holds no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
