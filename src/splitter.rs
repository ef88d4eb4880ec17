//! Partitions a table into contiguous row ranges.
//!
//! A [`SplitPlan`] lists range starts only; each range ends where the next
//! one starts, and the last one runs to the end of the table. Offsets count
//! data rows from 0, the header is copied into every part.

use std::{
    collections::{BTreeMap, HashMap},
    io::BufRead,
    path::Path,
};

use log::{info, warn};

use crate::{
    config::SplitConfig,
    error::Error,
    formats::{read_table, write_table},
    table::Table,
    traits::Parser,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRange {
    /// First data row of the range.
    pub start: usize,
    /// Destination artifact name, e.g. `common.xlsx`.
    pub destination: String,
    /// Output file name passed on to reconstruction instead of the default.
    pub output_name: Option<String>,
}

impl SplitRange {
    pub fn new(start: usize, destination: impl Into<String>) -> Self {
        Self {
            start,
            destination: destination.into(),
            output_name: None,
        }
    }

    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = Some(output_name.into());
        self
    }

    /// The destination up to its first `.`, used as output directory name.
    pub fn dir_name(&self) -> &str {
        self.destination
            .split_once('.')
            .map_or(self.destination.as_str(), |(stem, _)| stem)
    }
}

/// Ranges ordered by start offset.
///
/// Starts and destination dir names are unique and the first range starts at
/// 0, so every data row falls into exactly one range and every part gets its
/// own intermediate file and output dir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    ranges: BTreeMap<usize, SplitRange>,
}

impl SplitPlan {
    pub fn new(ranges: impl IntoIterator<Item = SplitRange>) -> Result<Self, Error> {
        let mut by_start: BTreeMap<usize, SplitRange> = BTreeMap::new();
        let mut destinations: HashMap<String, String> = HashMap::new();
        for range in ranges {
            let dir_name = range.dir_name().to_string();
            if let Some(other) = destinations.insert(dir_name, range.destination.clone()) {
                return Err(Error::InvalidSplit(format!(
                    "'{}' and '{}' both split into '{}'",
                    other,
                    range.destination,
                    range.dir_name()
                )));
            }
            if let Some(other) = by_start.get(&range.start) {
                return Err(Error::InvalidSplit(format!(
                    "'{}' and '{}' both start at row {}",
                    other.destination, range.destination, range.start
                )));
            }
            by_start.insert(range.start, range);
        }
        match by_start.keys().next() {
            None => Err(Error::InvalidSplit("plan has no ranges".to_string())),
            Some(&first) if first != 0 => Err(Error::InvalidSplit(format!(
                "first range starts at row {first}, rows before it would be dropped"
            ))),
            Some(_) => Ok(Self { ranges: by_start }),
        }
    }

    pub fn ranges(&self) -> impl Iterator<Item = &SplitRange> {
        self.ranges.values()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Half-open data-row bounds of every range for `data_rows` rows.
    fn bounds(&self, data_rows: usize) -> impl Iterator<Item = (&SplitRange, usize, usize)> {
        let mut iter = self.ranges.values().peekable();
        std::iter::from_fn(move || {
            let range = iter.next()?;
            let end = iter.peek().map_or(data_rows, |next| next.start);
            Some((range, range.start.min(data_rows), end.min(data_rows)))
        })
    }
}

impl Parser for SplitPlan {
    /// Reads `offset, destination[, output name]` rows until the first row
    /// with an empty offset or destination.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut ranges = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let (Some(offset), Some(destination)) = (record.get(0), record.get(1)) else {
                break;
            };
            let (offset, destination) = (offset.trim(), destination.trim());
            if offset.is_empty() || destination.is_empty() {
                break;
            }
            let start = parse_offset(offset)?;
            let mut range = SplitRange::new(start, destination);
            if let Some(name) = record.get(2).map(str::trim).filter(|n| !n.is_empty()) {
                range = range.with_output_name(name);
            }
            ranges.push(range);
        }
        SplitPlan::new(ranges)
    }

    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        for range in self.ranges() {
            let start = range.start.to_string();
            match &range.output_name {
                Some(name) => {
                    wtr.write_record([start.as_str(), range.destination.as_str(), name.as_str()])?
                }
                None => wtr.write_record([start.as_str(), range.destination.as_str()])?,
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Spreadsheet exports write whole numbers as `5.0`; both forms are accepted.
fn parse_offset(offset: &str) -> Result<usize, Error> {
    let invalid = || Error::InvalidSplit(format!("'{offset}' is not a row offset"));
    if let Ok(start) = offset.parse::<usize>() {
        return Ok(start);
    }
    let value: f64 = offset.parse().map_err(|_| invalid())?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(invalid());
    }
    Ok(value as usize)
}

/// One part of a split table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart<'a> {
    pub range: &'a SplitRange,
    pub table: Table,
}

/// Cuts `table` along `plan`, in ascending start order.
///
/// Every part gets the header row and the data rows of its range, cell styles
/// and merge flags included. Ranges starting past the end yield header-only
/// parts.
pub fn split<'a>(table: &Table, plan: &'a SplitPlan) -> Vec<SplitPart<'a>> {
    let data = table.data_rows();
    plan.bounds(data.len())
        .map(|(range, start, end)| {
            if range.start > data.len() {
                warn!(
                    "'{}' starts at row {} beyond the last row {}",
                    range.destination,
                    range.start,
                    data.len()
                );
            }
            let mut part = Table::new(table.name.clone());
            part.replace_header(table.header().clone());
            for row in &data[start..end] {
                part.push_row(row.clone());
            }
            SplitPart { range, table: part }
        })
        .collect()
}

/// Turns a table back into resource files. Supplied by the caller.
pub trait Reconstruct {
    /// Handles one table, writing into `output_dir`, optionally under
    /// `output_file` instead of the default file name.
    fn reconstruct(
        &mut self,
        table: &Table,
        output_dir: &str,
        output_file: Option<&str>,
    ) -> Result<(), Error>;
}

impl<F> Reconstruct for F
where
    F: FnMut(&Table, &str, Option<&str>) -> Result<(), Error>,
{
    fn reconstruct(
        &mut self,
        table: &Table,
        output_dir: &str,
        output_file: Option<&str>,
    ) -> Result<(), Error> {
        self(table, output_dir, output_file)
    }
}

/// Splits `table` and hands every part to `reconstruct`.
///
/// Without a plan the whole table goes to `reconstruct` once, under
/// `fallback_dir`.
pub fn split_and_reconstruct<R: Reconstruct + ?Sized>(
    table: &Table,
    plan: Option<&SplitPlan>,
    fallback_dir: &str,
    reconstruct: &mut R,
) -> Result<usize, Error> {
    let Some(plan) = plan else {
        info!("No splitting plan, reconstructing the whole table");
        reconstruct.reconstruct(table, fallback_dir, None)?;
        return Ok(1);
    };
    let parts = split(table, plan);
    for part in &parts {
        info!("Reconstructing part: {}", part.range.destination);
        reconstruct.reconstruct(
            &part.table,
            part.range.dir_name(),
            part.range.output_name.as_deref(),
        )?;
    }
    Ok(parts.len())
}

/// File-based split: reads the table and plan named by `config`, stores every
/// part under the intermediate dir, then reconstructs each part.
///
/// Returns the number of reconstruction passes.
pub fn split_file<R: Reconstruct + ?Sized>(
    config: &SplitConfig,
    reconstruct: &mut R,
) -> Result<usize, Error> {
    let table = read_table(&config.input)?;
    let Some(plan_path) = &config.plan else {
        warn!("Cannot split, missing splitting plan. Reconstructing the whole table instead.");
        return split_and_reconstruct(&table, None, &config.output_dir, reconstruct);
    };
    let plan = SplitPlan::read_from(plan_path)?;

    std::fs::create_dir_all(&config.intermediate_dir)?;
    let parts = split(&table, &plan);
    for part in &parts {
        info!("Splitting into file: {}", part.range.destination);
        write_table(&part.table, intermediate_path(&config.intermediate_dir, part.range))?;
    }
    for part in &parts {
        info!("Reconstructing part: {}", part.range.destination);
        reconstruct.reconstruct(
            &part.table,
            part.range.dir_name(),
            part.range.output_name.as_deref(),
        )?;
    }
    Ok(parts.len())
}

fn intermediate_path(dir: &Path, range: &SplitRange) -> std::path::PathBuf {
    dir.join(format!("{}.json", range.dir_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, CellStyle, Row};

    fn table_with_rows(n: usize) -> Table {
        let mut table = Table::new("app");
        table.add_language("default");
        for i in 0..n {
            let mut row = Row::default();
            row.set_cell(0, Cell::new(format!("key{i}"), CellStyle::Key));
            row.set_cell(1, Cell::new(format!("value{i}"), CellStyle::Text));
            table.push_row(row);
        }
        table
    }

    fn keys(table: &Table) -> Vec<String> {
        table.data_rows().iter().map(|r| r.value(0).to_string()).collect()
    }

    #[test]
    fn test_two_ranges_over_twelve_rows() {
        let table = table_with_rows(12);
        let plan = SplitPlan::new([SplitRange::new(0, "a.xlsx"), SplitRange::new(5, "b.xlsx")]).unwrap();
        let parts = split(&table, &plan);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].range.destination, "a.xlsx");
        assert_eq!(keys(&parts[0].table), (0..5).map(|i| format!("key{i}")).collect::<Vec<_>>());
        assert_eq!(keys(&parts[1].table), (5..12).map(|i| format!("key{i}")).collect::<Vec<_>>());
        assert_eq!(parts[1].table.header(), table.header());
        assert_eq!(parts[1].table.row(1).unwrap(), table.row(6).unwrap());
    }

    #[test]
    fn test_plan_order_does_not_depend_on_input_order() {
        let plan = SplitPlan::new([SplitRange::new(7, "z"), SplitRange::new(0, "y")]).unwrap();
        let starts: Vec<_> = plan.ranges().map(|r| r.start).collect();
        assert_eq!(starts, vec![0, 7]);
    }

    #[test]
    fn test_invalid_plans() {
        assert!(matches!(SplitPlan::new(Vec::new()), Err(Error::InvalidSplit(_))));
        assert!(matches!(
            SplitPlan::new([SplitRange::new(3, "a")]),
            Err(Error::InvalidSplit(_))
        ));
        assert!(matches!(
            SplitPlan::new([SplitRange::new(0, "a"), SplitRange::new(0, "b")]),
            Err(Error::InvalidSplit(_))
        ));
        assert!(matches!(
            SplitPlan::new([SplitRange::new(0, "a"), SplitRange::new(4, "a")]),
            Err(Error::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_destinations_sharing_a_dir_name_are_rejected() {
        let err = SplitPlan::new([SplitRange::new(0, "a.xlsx"), SplitRange::new(4, "a.csv")])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSplit(_)));
        let err = SplitPlan::from_str("0,common.xlsx\n5,common.backup.xlsx\n").unwrap_err();
        assert!(matches!(err, Error::InvalidSplit(_)));
        assert!(SplitPlan::new([SplitRange::new(0, "a.xlsx"), SplitRange::new(4, "b.xlsx")]).is_ok());
    }

    #[test]
    fn test_range_past_the_end_is_header_only() {
        let table = table_with_rows(3);
        let plan = SplitPlan::new([SplitRange::new(0, "a"), SplitRange::new(10, "b")]).unwrap();
        let parts = split(&table, &plan);
        assert_eq!(keys(&parts[0].table).len(), 3);
        assert_eq!(parts[1].table.len(), 1);
    }

    #[test]
    fn test_styles_survive_split() {
        let mut table = table_with_rows(2);
        let column = table.add_language("cs");
        table.row_mut(2).unwrap().set_cell(column, Cell::new("", CellStyle::Missing));
        let plan = SplitPlan::new([SplitRange::new(0, "a"), SplitRange::new(1, "b")]).unwrap();
        let parts = split(&table, &plan);
        assert_eq!(
            parts[1].table.row(1).unwrap().cell(column).unwrap().style,
            CellStyle::Missing
        );
    }

    #[test]
    fn test_plan_from_csv() {
        let csv = "0,common.xlsx\n5.0,settings.xlsx,prefs.xml\n,\n9,ignored.xlsx\n";
        let plan = SplitPlan::from_str(csv).unwrap();
        let ranges: Vec<_> = plan.ranges().cloned().collect();
        assert_eq!(
            ranges,
            vec![
                SplitRange::new(0, "common.xlsx"),
                SplitRange::new(5, "settings.xlsx").with_output_name("prefs.xml"),
            ]
        );
        assert_eq!(ranges[1].dir_name(), "settings");
    }

    #[test]
    fn test_plan_with_bad_offset() {
        let err = SplitPlan::from_str("zero,a.xlsx\n").unwrap_err();
        assert!(matches!(err, Error::InvalidSplit(_)));
        let err = SplitPlan::from_str("1.5,a.xlsx\n").unwrap_err();
        assert!(matches!(err, Error::InvalidSplit(_)));
    }

    #[test]
    fn test_reconstruct_receives_each_part() {
        let table = table_with_rows(4);
        let plan = SplitPlan::new([
            SplitRange::new(0, "a.xlsx").with_output_name("a_strings.xml"),
            SplitRange::new(2, "b.xlsx"),
        ])
        .unwrap();
        let mut calls = Vec::new();
        let mut record = |t: &Table, dir: &str, file: Option<&str>| {
            calls.push((dir.to_string(), file.map(str::to_string), t.len()));
            Ok::<(), Error>(())
        };
        let passes = split_and_reconstruct(&table, Some(&plan), "values", &mut record).unwrap();
        assert_eq!(passes, 2);
        assert_eq!(
            calls,
            vec![
                ("a".to_string(), Some("a_strings.xml".to_string()), 3),
                ("b".to_string(), None, 3),
            ]
        );
    }

    #[test]
    fn test_no_plan_reconstructs_whole_table() {
        let table = table_with_rows(4);
        let mut calls = Vec::new();
        let mut record = |t: &Table, dir: &str, file: Option<&str>| {
            calls.push((dir.to_string(), file.is_none(), t.len()));
            Ok::<(), Error>(())
        };
        let passes = split_and_reconstruct(&table, None, "values", &mut record).unwrap();
        assert_eq!(passes, 1);
        assert_eq!(calls, vec![("values".to_string(), true, 5)]);
    }
}
