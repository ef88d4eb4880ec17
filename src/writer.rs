//! Writes a non-default language into its column of the table.

use std::collections::HashSet;

use log::{info, warn};

use crate::{
    error::Error,
    ignore::IgnoreSet,
    indexer::KeyIndex,
    table::{Cell, CellStyle, DEFAULT_LANGUAGE, KEY_HEADER, Table},
    types::{Key, ResourceNode, ResourceTree, unescape_android},
};

/// Outcome of one language pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageReport {
    pub language: String,
    /// Indexed keys the language never provided, in row order.
    pub missing_keys: Vec<Key>,
    /// Keys the language provided that the default language does not know.
    pub unknown_keys: Vec<Key>,
}

impl LanguageReport {
    pub fn is_complete(&self) -> bool {
        self.missing_keys.is_empty()
    }
}

/// Writes every tree of `language` into the table rows bound by `index`.
///
/// All trees of the language form one pass: a key counts as missing only if
/// none of them provides it. Unknown keys are reported and skipped. Missing
/// keys get an empty [`CellStyle::Missing`] cell in the language's column.
/// `default` and `KEY` name existing columns and are rejected as languages.
pub fn write_language(
    table: &mut Table,
    index: &KeyIndex,
    ignore: &IgnoreSet,
    language: &str,
    trees: &[ResourceTree],
) -> Result<LanguageReport, Error> {
    if language == DEFAULT_LANGUAGE || language == KEY_HEADER {
        return Err(Error::InvalidTable(format!(
            "'{language}' is a reserved column name and cannot be used as a language"
        )));
    }
    info!("Start processing: '{language}'");
    let column = table.add_language(language);

    let mut pending: HashSet<&Key> = index.keys().collect();
    let mut unknown_keys = Vec::new();

    for tree in trees {
        for node in &tree.nodes {
            if let ResourceNode::Plural(_) | ResourceNode::Array(_) = node {
                if node.name().is_some_and(|name| ignore.is_ignored_key(name)) {
                    continue;
                }
            }
            for unit in node.units()? {
                if ignore.is_ignored_key(unit.key.as_str()) {
                    continue;
                }
                let Some(row_index) = index.get(unit.key.as_str()) else {
                    warn!("\t{} - row does not exist", unit.key);
                    unknown_keys.push(unit.key);
                    continue;
                };
                pending.remove(&unit.key);
                let row = table.row_mut(row_index).ok_or_else(|| {
                    Error::DataMismatch(format!(
                        "key '{}' points at row {row_index} which the table does not have",
                        unit.key
                    ))
                })?;
                row.set_cell(column, Cell::new(unescape_android(unit.value), CellStyle::Text));
            }
        }
    }

    let mut missing: Vec<(usize, Key)> = pending
        .into_iter()
        .filter_map(|key| index.get(key.as_str()).map(|row| (row, key.clone())))
        .collect();
    missing.sort();

    if !missing.is_empty() {
        warn!("  MISSED KEYS:");
    }
    for (row_index, key) in &missing {
        warn!("\t{key}");
        if let Some(row) = table.row_mut(*row_index) {
            row.set_cell(column, Cell::new("", CellStyle::Missing));
        }
    }

    if missing.is_empty() {
        info!("'{language}' was processed");
    } else {
        info!("'{language}' was processed with MISSED KEYS - {}", missing.len());
    }

    Ok(LanguageReport {
        language: language.to_string(),
        missing_keys: missing.into_iter().map(|(_, key)| key).collect(),
        unknown_keys,
    })
}
