//! Builds the key index and the table skeleton from the default language.
//!
//! Rows are assigned strictly in document order, one per translation unit,
//! so the table mirrors the source file rather than key order.

use std::collections::HashMap;

use log::{debug, info};

use crate::{
    error::Error,
    ignore::IgnoreSet,
    table::{Cell, CellStyle, DEFAULT_LANGUAGE, Row, Table},
    types::{Key, ResourceNode, ResourceTree, unescape_android},
};

/// Immutable mapping from key to its row in the table.
///
/// Only [`KeyIndexer`] creates one; every language pass reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndex {
    rows: HashMap<Key, usize>,
}

impl KeyIndex {
    pub fn get(&self, key: &str) -> Option<usize> {
        self.rows.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.rows.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, usize)> {
        self.rows.iter().map(|(k, r)| (k, *r))
    }

    fn bind(&mut self, key: Key, row: usize) -> Result<(), Error> {
        if let Some(&existing_row) = self.rows.get(&key) {
            if existing_row != row {
                return Err(Error::DuplicateKey {
                    key: key.to_string(),
                    existing_row,
                    row,
                });
            }
        }
        self.rows.insert(key, row);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexOptions {
    /// Emit a `//plurals: <name>` row before each plural's variants.
    pub plural_markers: bool,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plural_markers(mut self, plural_markers: bool) -> Self {
        self.plural_markers = plural_markers;
        self
    }
}

/// Accumulates default-language trees into one index and table.
///
/// Several files of the default language may be fed in turn; rows keep
/// counting across them.
#[derive(Debug)]
pub struct KeyIndexer<'a> {
    index: KeyIndex,
    table: Table,
    ignore: &'a IgnoreSet,
    options: IndexOptions,
}

impl<'a> KeyIndexer<'a> {
    pub fn new(table_name: impl Into<String>, ignore: &'a IgnoreSet, options: IndexOptions) -> Self {
        let mut table = Table::new(table_name);
        table.add_language(DEFAULT_LANGUAGE);
        Self {
            index: KeyIndex::default(),
            table,
            ignore,
            options,
        }
    }

    /// Appends the rows of one default-language tree.
    pub fn index_tree(&mut self, tree: &ResourceTree) -> Result<(), Error> {
        for node in &tree.nodes {
            match node {
                ResourceNode::Comment(text) => self.push_comment(text),
                ResourceNode::Plural(plural) => {
                    if self.ignore.is_ignored_key(&plural.name) {
                        continue;
                    }
                    if self.options.plural_markers {
                        let mut row = Row::default();
                        row.set_cell(
                            0,
                            Cell::new(format!("//plurals: {}", plural.name), CellStyle::PluralGroup),
                        );
                        self.table.push_row(row);
                    }
                    self.push_units(node)?;
                }
                ResourceNode::Array(array) => {
                    if self.ignore.is_ignored_key(&array.name) {
                        continue;
                    }
                    self.push_units(node)?;
                }
                ResourceNode::Scalar(_) => self.push_units(node)?,
            }
        }
        Ok(())
    }

    pub fn finish(self) -> (KeyIndex, Table) {
        info!("DEFAULT language was processed, {} keys", self.index.len());
        (self.index, self.table)
    }

    fn push_comment(&mut self, text: &str) {
        let mut row = Row {
            merged: true,
            ..Row::default()
        };
        row.set_cell(0, Cell::new(format!("/** {} **/", text.trim()), CellStyle::Comment));
        self.table.push_row(row);
    }

    fn push_units(&mut self, node: &ResourceNode) -> Result<(), Error> {
        for unit in node.units()? {
            if self.ignore.is_ignored_key(unit.key.as_str()) {
                debug!("Skipping ignored key {}", unit.key);
                continue;
            }
            let mut row = Row::default();
            row.set_cell(0, Cell::new(unit.key.as_str(), CellStyle::Key));
            row.set_cell(1, Cell::new(unescape_android(unit.value), CellStyle::Text));
            let next_row = self.table.len();
            // Bind before appending so a duplicate leaves the table untouched.
            self.index.bind(unit.key, next_row)?;
            self.table.push_row(row);
        }
        Ok(())
    }
}

/// Indexes a single default-language tree without plural marker rows.
pub fn build_index(tree: &ResourceTree, ignore: &IgnoreSet) -> Result<(KeyIndex, Table), Error> {
    info!("Start processing DEFAULT language");
    let mut indexer = KeyIndexer::new("", ignore, IndexOptions::default());
    indexer.index_tree(tree)?;
    Ok(indexer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PluralGroup, Scalar, StringArray};

    fn sample_tree() -> ResourceTree {
        ResourceTree::new(vec![
            ResourceNode::Scalar(Scalar::new("hello", "Hi")),
            ResourceNode::Plural(PluralGroup::new(
                "items",
                [("one", "1 item"), ("other", "%d items")],
            )),
        ])
    }

    #[test]
    fn test_scenario_hello_and_plural() {
        let (index, table) = build_index(&sample_tree(), &IgnoreSet::empty()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get("hello"), Some(1));
        assert_eq!(index.get("items#one"), Some(2));
        assert_eq!(index.get("items#other"), Some(3));
        assert_eq!(table.len(), 4);
        assert_eq!(table.row(3).unwrap().value(0), "items#other");
        assert_eq!(table.row(3).unwrap().value(1), "%d items");
        assert_eq!(table.header().value(1), DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_rows_follow_document_order() {
        let tree = ResourceTree::new(vec![
            ResourceNode::Scalar(Scalar::new("zeta", "z")),
            ResourceNode::Array(StringArray::new("days", ["Mon", "Tue"])),
            ResourceNode::Scalar(Scalar::new("alpha", "a")),
        ]);
        let (index, _) = build_index(&tree, &IgnoreSet::empty()).unwrap();
        assert_eq!(index.get("zeta"), Some(1));
        assert_eq!(index.get("days[0]"), Some(2));
        assert_eq!(index.get("days[1]"), Some(3));
        assert_eq!(index.get("alpha"), Some(4));
    }

    #[test]
    fn test_comments_get_rows_but_no_keys() {
        let tree = ResourceTree::new(vec![
            ResourceNode::Comment(" Main screen ".to_string()),
            ResourceNode::Scalar(Scalar::new("title", "Title")),
        ]);
        let (index, table) = build_index(&tree, &IgnoreSet::empty()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("title"), Some(2));
        let comment = table.row(1).unwrap();
        assert_eq!(comment.value(0), "/** Main screen **/");
        assert_eq!(comment.cell(0).unwrap().style, CellStyle::Comment);
        assert!(comment.merged);
    }

    #[test]
    fn test_plural_markers_take_a_row() {
        let ignore = IgnoreSet::empty();
        let mut indexer = KeyIndexer::new("app", &ignore, IndexOptions::new().with_plural_markers(true));
        indexer.index_tree(&sample_tree()).unwrap();
        let (index, table) = indexer.finish();
        assert_eq!(index.get("items#one"), Some(3));
        assert_eq!(table.row(2).unwrap().value(0), "//plurals: items");
        assert_eq!(table.row(2).unwrap().cell(0).unwrap().style, CellStyle::PluralGroup);
        assert_eq!(table.name, "app");
    }

    #[test]
    fn test_untranslatable_and_ignored_are_excluded() {
        let tree = ResourceTree::new(vec![
            ResourceNode::Scalar(Scalar::untranslatable("api_url", "https://x")),
            ResourceNode::Scalar(Scalar::new("skip_me", "x")),
            ResourceNode::Plural(PluralGroup::new("skipped_plural", [("one", "x")])),
            ResourceNode::Plural(PluralGroup::new("kept", [("one", "a"), ("few", "b")])),
            ResourceNode::Scalar(Scalar::new("kept_scalar", "y")),
        ]);
        let ignore: IgnoreSet = ["skip_me", "skipped_plural", "kept#few"].into_iter().collect();
        let (index, table) = build_index(&tree, &ignore).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("kept#one"), Some(1));
        assert_eq!(index.get("kept_scalar"), Some(2));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_scalar_without_text_is_fatal() {
        let tree = ResourceTree::new(vec![ResourceNode::Scalar(Scalar {
            name: "empty".to_string(),
            value: None,
            cdata: false,
            translatable: true,
        })]);
        let err = build_index(&tree, &IgnoreSet::empty()).unwrap_err();
        assert!(matches!(err, Error::MissingText { .. }));
    }

    #[test]
    fn test_duplicate_key_fails_loudly() {
        let tree = ResourceTree::new(vec![
            ResourceNode::Scalar(Scalar::new("dup", "a")),
            ResourceNode::Scalar(Scalar::new("dup", "b")),
        ]);
        let err = build_index(&tree, &IgnoreSet::empty()).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateKey { existing_row: 1, row: 2, .. }
        ));
    }

    #[test]
    fn test_cdata_and_plain_do_not_collide() {
        let tree = ResourceTree::new(vec![
            ResourceNode::Scalar(Scalar::new("app_name", "App")),
            ResourceNode::Scalar(Scalar::cdata("app_name", "<i>App</i>")),
        ]);
        let (index, _) = build_index(&tree, &IgnoreSet::empty()).unwrap();
        assert_eq!(index.get("app_name"), Some(1));
        assert_eq!(index.get("app_name!cdata"), Some(2));
    }

    #[test]
    fn test_default_values_are_unescaped() {
        let tree = ResourceTree::new(vec![ResourceNode::Scalar(Scalar::new("q", r"Don\'t"))]);
        let (_, table) = build_index(&tree, &IgnoreSet::empty()).unwrap();
        assert_eq!(table.row(1).unwrap().value(1), "Don't");
    }
}
