//! The translator-facing table.
//!
//! Row 0 is the header (`KEY`, then one column per language). Row positions
//! are the durable identity that [`crate::KeyIndex`] points at, so rows are
//! only ever appended while indexing and only individual cells change later.

use serde::{Deserialize, Serialize};

pub const KEY_HEADER: &str = "KEY";

/// Header of the column holding the default language.
pub const DEFAULT_LANGUAGE: &str = "default";

/// Formatting carried by a cell. Storage formats that cannot express styling
/// drop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    #[default]
    Plain,
    Title,
    Key,
    Text,
    Comment,
    PluralGroup,
    /// The key has no value in this language.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Cell {
    pub value: String,
    #[serde(default, skip_serializing_if = "is_plain")]
    pub style: CellStyle,
}

fn is_plain(style: &CellStyle) -> bool {
    *style == CellStyle::Plain
}

impl Cell {
    pub fn new(value: impl Into<String>, style: CellStyle) -> Self {
        Self {
            value: value.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,

    /// The first cell spans the whole row (comment rows).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub merged: bool,
}

impl Row {
    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Value at `column`, empty when the cell was never written.
    pub fn value(&self, column: usize) -> &str {
        self.cells.get(column).map_or("", |c| c.value.as_str())
    }

    pub fn set_cell(&mut self, column: usize, cell: Cell) {
        if self.cells.len() <= column {
            self.cells.resize_with(column + 1, Cell::default);
        }
        self.cells[column] = cell;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Sheet name, usually the project directory name.
    pub name: String,
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table holding only the `KEY` header cell.
    pub fn new(name: impl Into<String>) -> Self {
        let mut header = Row::default();
        header.set_cell(0, Cell::new(KEY_HEADER, CellStyle::Title));
        Self {
            name: name.into(),
            rows: vec![header],
        }
    }

    /// Builds a table from raw rows; the first row must be a `KEY` header.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Row>) -> Result<Self, crate::Error> {
        match rows.first() {
            Some(header) if header.value(0) == KEY_HEADER => Ok(Self {
                name: name.into(),
                rows,
            }),
            Some(header) => Err(crate::Error::InvalidTable(format!(
                "first header cell is '{}', expected '{KEY_HEADER}'",
                header.value(0)
            ))),
            None => Err(crate::Error::InvalidTable("table has no header row".to_string())),
        }
    }

    pub fn header(&self) -> &Row {
        &self.rows[0]
    }

    /// Languages in column order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.header().cells.iter().skip(1).map(|c| c.value.as_str())
    }

    /// Column holding `language`, if one was created.
    pub fn column_of(&self, language: &str) -> Option<usize> {
        self.header()
            .cells
            .iter()
            .skip(1)
            .position(|c| c.value == language)
            .map(|i| i + 1)
    }

    /// Returns the column for `language`, appending one on first use.
    /// Existing columns are never moved.
    pub fn add_language(&mut self, language: &str) -> usize {
        if let Some(column) = self.column_of(language) {
            return column;
        }
        let header = &mut self.rows[0];
        let column = header.cells.len();
        header.set_cell(column, Cell::new(language, CellStyle::Title));
        column
    }

    pub(crate) fn replace_header(&mut self, header: Row) {
        self.rows[0] = header;
    }

    /// Appends a data row and returns its row number.
    pub(crate) fn push_row(&mut self, row: Row) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    /// All rows including the header.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Row] {
        &self.rows[1..]
    }

    /// Total row count including the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.len() <= 1
    }
}
