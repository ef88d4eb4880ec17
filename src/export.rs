//! Export of a whole project into one table.

use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::info;

use crate::{
    config::ExportConfig,
    error::Error,
    formats::write_table,
    ignore::IgnoreSet,
    indexer::{IndexOptions, KeyIndexer},
    project::{ProjectLayout, allowed_files, load_trees},
    table::Table,
    writer::{LanguageReport, write_language},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output: PathBuf,
    /// Number of keys in the default language.
    pub keys: usize,
    /// One report per non-default language, in column order.
    pub reports: Vec<LanguageReport>,
}

/// Builds the table for `config.project` and writes it to the output path.
///
/// Nothing is written unless every language was processed.
pub fn export(config: &ExportConfig) -> Result<ExportSummary, Error> {
    let ignore = match &config.ignore_list {
        Some(path) => IgnoreSet::load(path),
        None => IgnoreSet::empty(),
    };
    let (table, keys, reports) = export_table(config, &ignore)?;

    let output = config.output.clone().unwrap_or_else(default_output);
    write_table(&table, &output)?;
    info!("Exported {} keys to {}", keys, output.display());

    Ok(ExportSummary {
        output,
        keys,
        reports,
    })
}

/// Runs the indexing and language passes without touching the output file.
pub fn export_table(
    config: &ExportConfig,
    ignore: &IgnoreSet,
) -> Result<(Table, usize, Vec<LanguageReport>), Error> {
    let layout = ProjectLayout::discover(&config.project)?;
    let files = allowed_files(&config.additional_resources);

    info!("Start processing DEFAULT language");
    let options = IndexOptions::new().with_plural_markers(config.plural_markers);
    let mut indexer = KeyIndexer::new(project_name(&config.project), ignore, options);
    for tree in load_trees(&layout.default_dir, &files)? {
        indexer.index_tree(&tree)?;
    }
    let (index, mut table) = indexer.finish();

    let mut reports = Vec::new();
    for (language, dir) in &layout.languages {
        let trees = load_trees(dir, &files)?;
        if trees.is_empty() {
            continue;
        }
        reports.push(write_language(&mut table, &index, ignore, language, &trees)?);
    }
    Ok((table, index.len(), reports))
}

fn project_name(project: &Path) -> String {
    project
        .canonicalize()
        .unwrap_or_else(|_| project.to_path_buf())
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn default_output() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    PathBuf::from(format!("exported_strings_{millis}.json"))
}
