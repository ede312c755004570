//! Item and board formatters.
//!
//! `ItemFormatter` turns one raw cell into flat name/value pairs through the
//! column catalog; `BoardFormatter` merges those pairs into one record per
//! item and collects records into a `BoardTable`.

use indexmap::IndexSet;

use crate::columns::ColumnCatalog;
use crate::decode;
use crate::error::FormatError;
use crate::models::{ColumnValue, Item};
use crate::value::{FieldMap, FieldValue};

/// Record key holding the numeric item id.
pub const MONDAY_ID: &str = "monday_id";
/// Record key holding the item display name.
pub const MONDAY_NAME: &str = "monday_name";

/// Formats single cells through the column catalog.
///
/// Derived names default to the column's display title. Boards with
/// duplicate titles merge last-write-wins downstream; `use_column_ids`
/// switches naming to the raw column id when that matters.
#[derive(Debug, Clone, Copy)]
pub struct ItemFormatter<'a> {
    catalog: &'a ColumnCatalog,
    use_column_ids: bool,
}

impl<'a> ItemFormatter<'a> {
    /// Creates a formatter over a borrowed catalog.
    #[must_use]
    pub fn new(catalog: &'a ColumnCatalog) -> Self {
        Self {
            catalog,
            use_column_ids: false,
        }
    }

    /// Keys results by raw column id instead of display title.
    #[must_use]
    pub fn use_column_ids(mut self) -> Self {
        self.use_column_ids = true;
        self
    }

    /// Formats one raw cell into flat name/value pairs.
    pub fn format(&self, cell: &ColumnValue) -> Result<FieldMap, FormatError> {
        self.format_value(&cell.id, cell.value.as_deref(), cell.text.as_deref())
    }

    /// Formats one cell given as its parts.
    pub fn format_value(
        &self,
        column_id: &str,
        value: Option<&str>,
        text: Option<&str>,
    ) -> Result<FieldMap, FormatError> {
        let column = self.catalog.get(column_id)?;
        let name = if self.use_column_ids {
            &column.id
        } else {
            &column.title
        };
        Ok(decode::decode(
            column.column_type,
            name,
            column.settings_str.as_deref(),
            value,
            text,
        ))
    }
}

/// Assembles one flat record per item.
#[derive(Debug, Clone, Copy)]
pub struct BoardFormatter<'a> {
    formatter: ItemFormatter<'a>,
}

impl<'a> BoardFormatter<'a> {
    /// Creates a board formatter over a borrowed catalog.
    #[must_use]
    pub fn new(catalog: &'a ColumnCatalog) -> Self {
        Self {
            formatter: ItemFormatter::new(catalog),
        }
    }

    /// Keys record fields by raw column id instead of display title.
    #[must_use]
    pub fn use_column_ids(mut self) -> Self {
        self.formatter = self.formatter.use_column_ids();
        self
    }

    /// Formats one item into a record seeded with `monday_id` and
    /// `monday_name`, merging each cell's pairs last-write-wins.
    pub fn format_item(&self, item: &Item) -> Result<FieldMap, FormatError> {
        let monday_id: i64 = item
            .id
            .parse()
            .map_err(|_| FormatError::InvalidItemId(item.id.clone()))?;

        let mut record = FieldMap::new();
        record.insert(MONDAY_ID.to_string(), FieldValue::Int(monday_id));
        record.insert(
            MONDAY_NAME.to_string(),
            FieldValue::Text(item.name.clone()),
        );
        for cell in &item.column_values {
            record.extend(self.formatter.format(cell)?);
        }
        Ok(record)
    }

    /// Formats every item into a table.
    pub fn format_board(&self, items: &[Item]) -> Result<BoardTable, FormatError> {
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            records.push(self.format_item(item)?);
        }
        Ok(BoardTable { records })
    }
}

/// Flat records for a whole board.
#[derive(Debug, Clone, Default)]
pub struct BoardTable {
    records: Vec<FieldMap>,
}

impl BoardTable {
    /// Union of record keys in first-seen order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut names = IndexSet::new();
        for record in &self.records {
            for key in record.keys() {
                names.insert(key.clone());
            }
        }
        names.into_iter().collect()
    }

    /// Formatted records, one per item.
    #[must_use]
    pub fn records(&self) -> &[FieldMap] {
        &self.records
    }

    /// Mutable records, for in-place validation passes.
    pub fn records_mut(&mut self) -> &mut [FieldMap] {
        &mut self.records
    }

    /// Consumes the table into its records.
    #[must_use]
    pub fn into_records(self) -> Vec<FieldMap> {
        self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
