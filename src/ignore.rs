//! Keys excluded from both indexing and language writes.

use std::{collections::HashSet, io::BufRead, path::Path};

use log::{debug, warn};

use crate::{error::Error, traits::Parser};

/// An immutable set of keys to skip, built once per run and passed by
/// reference to the indexer and every language pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    keys: HashSet<String>,
}

impl IgnoreSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_ignored_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Loads the ignore list from a table file whose first column holds keys.
    ///
    /// Any failure to read the file yields an empty set: an unreadable ignore
    /// list only means nothing is skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::read_from(path) {
            Ok(set) => {
                debug!("Loaded {} ignored keys from {}", set.len(), path.display());
                set
            }
            Err(e) => {
                warn!("Cannot read ignore list {}: {e}", path.display());
                Self::empty()
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Parser for IgnoreSet {
    /// Reads keys from the first column until the first row with an empty
    /// first cell.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut keys = HashSet::new();
        for record in rdr.records() {
            let record = record?;
            match record.get(0) {
                Some(key) if !key.is_empty() => {
                    keys.insert(key.to_string());
                }
                _ => break,
            }
        }
        Ok(Self { keys })
    }

    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        let mut keys: Vec<_> = self.keys.iter().collect();
        keys.sort();
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        for key in keys {
            wtr.write_record([key])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
