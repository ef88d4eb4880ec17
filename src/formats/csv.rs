// Note: CSV keeps cell values only; styles are re-derived on read and
// missing-key flags are lost.
use std::io::BufRead;

use crate::{
    error::Error,
    table::{Cell, CellStyle, KEY_HEADER, Row, Table},
    traits::Parser,
};

impl Parser for Table {
    /// Parse from any reader. The first record must be the `KEY` header.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let row = if i == 0 {
                Row {
                    cells: record
                        .iter()
                        .map(|v| Cell::new(v, CellStyle::Title))
                        .collect(),
                    merged: false,
                }
            } else {
                data_row(&record)
            };
            rows.push(row);
        }
        Table::from_rows("", rows)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        let width = self
            .rows()
            .iter()
            .map(|r| r.cells.len())
            .max()
            .unwrap_or(1);
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        for row in self.rows() {
            wtr.write_record((0..width).map(|c| row.value(c)))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn data_row(record: &csv::StringRecord) -> Row {
    let first = record.get(0).unwrap_or_default();
    if first.starts_with("/** ") && first.ends_with(" **/") {
        let mut row = Row {
            merged: true,
            ..Row::default()
        };
        row.set_cell(0, Cell::new(first, CellStyle::Comment));
        return row;
    }
    if first.starts_with("//plurals: ") {
        let mut row = Row::default();
        row.set_cell(0, Cell::new(first, CellStyle::PluralGroup));
        return row;
    }

    let mut row = Row::default();
    for (c, value) in record.iter().enumerate() {
        let style = match (c, value.is_empty()) {
            (_, true) => CellStyle::Plain,
            (0, false) => CellStyle::Key,
            _ => CellStyle::Text,
        };
        row.set_cell(c, Cell::new(value, style));
    }
    // Keep the in-memory row as short as what was written.
    while row.cells.last().is_some_and(|c| c.value.is_empty()) {
        row.cells.pop();
    }
    row
}
