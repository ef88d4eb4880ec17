pub mod android_strings;
pub mod csv;

use std::path::Path;

use serde::Deserialize;

use crate::{
    error::Error,
    table::{Row, Table},
    traits::Parser,
};

/// On-disk representation of a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Values only.
    Csv,
    /// Values, cell styles and merged rows.
    Json,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Json => "json",
        }
    }

    /// Picks the format from the file extension, falling back to CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::Csv,
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableFormat::Csv => write!(f, "CSV"),
            TableFormat::Json => write!(f, "JSON"),
        }
    }
}

/// JSON wrapper; the header check of [`Table::from_rows`] still applies.
struct JsonTable(Table);

#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    name: String,
    rows: Vec<Row>,
}

impl Parser for JsonTable {
    fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self, Error> {
        let raw: RawTable = serde_json::from_reader(reader).map_err(Error::Parse)?;
        Table::from_rows(raw.name, raw.rows).map(JsonTable)
    }

    fn to_writer<W: std::io::Write>(&self, mut writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut writer, &self.0).map_err(Error::Parse)
    }
}

/// Reads a table, choosing the format by extension.
///
/// CSV tables carry no name, so the file stem is used.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table, Error> {
    let path = path.as_ref();
    match TableFormat::from_path(path) {
        TableFormat::Json => JsonTable::read_from(path).map(|t| t.0),
        TableFormat::Csv => {
            let mut table = Table::read_from(path)?;
            table.name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            Ok(table)
        }
    }
}

/// Writes a table, choosing the format by extension.
pub fn write_table<P: AsRef<Path>>(table: &Table, path: P) -> Result<(), Error> {
    let path = path.as_ref();
    match TableFormat::from_path(path) {
        TableFormat::Json => JsonTable(table.clone()).write_to(path),
        TableFormat::Csv => table.write_to(path),
    }
}
