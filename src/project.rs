//! Locates the resource directories of an Android project and loads the
//! resource trees of each language.
//!
//! The default language lives in `values/`; every other language in a
//! `values-<qualifier>/` sibling, where the language is everything after the
//! first dash.

use std::path::{Path, PathBuf};

use log::debug;

use crate::{error::Error, traits::Parser, types::ResourceTree};

const DIR_VALUES: &str = "values";
const POTENTIAL_RES_DIRS: [&str; 2] = ["res", "src/main/res"];

/// File read from every values directory, before any additional ones.
pub const DEFAULT_RESOURCE_FILE: &str = "strings.xml";

/// The `values*` directories of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub res_dir: PathBuf,
    pub default_dir: PathBuf,
    /// `(language, dir)` sorted by directory name.
    pub languages: Vec<(String, PathBuf)>,
}

impl ProjectLayout {
    /// Discovers the layout under `project`.
    ///
    /// Fails when there is no resource dir or it lacks `values/`.
    pub fn discover<P: AsRef<Path>>(project: P) -> Result<Self, Error> {
        let project = project.as_ref();
        let res_dir = find_resource_dir(project)
            .ok_or_else(|| Error::ResourceDirNotFound(project.to_path_buf()))?;

        let default_dir = res_dir.join(DIR_VALUES);
        if !default_dir.is_dir() {
            return Err(Error::DefaultLanguageNotFound(res_dir));
        }

        let mut languages = Vec::new();
        for entry in std::fs::read_dir(&res_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let dir_name = entry.file_name();
            let Some(language) = dir_name.to_str().and_then(infer_language_from_dir) else {
                continue;
            };
            languages.push((language.to_string(), entry.path()));
        }
        languages.sort_by(|a, b| a.1.cmp(&b.1));

        debug!(
            "Resource dir {} with {} language dirs",
            res_dir.display(),
            languages.len()
        );
        Ok(Self {
            res_dir,
            default_dir,
            languages,
        })
    }
}

fn find_resource_dir(project: &Path) -> Option<PathBuf> {
    POTENTIAL_RES_DIRS
        .iter()
        .map(|dir| project.join(dir))
        .find(|dir| dir.exists())
}

/// `values-cs` gives `cs`, `values-zh-rCN` gives `zh-rCN`; `values` and
/// unrelated directories give nothing.
pub fn infer_language_from_dir(dir_name: &str) -> Option<&str> {
    dir_name
        .strip_prefix(DIR_VALUES)?
        .strip_prefix('-')
        .filter(|lang| !lang.is_empty())
}

/// Allowed file names: `strings.xml` then `additional`, without repeats.
pub fn allowed_files(additional: &[String]) -> Vec<String> {
    let mut files = vec![DEFAULT_RESOURCE_FILE.to_string()];
    for name in additional {
        if !files.contains(name) {
            files.push(name.clone());
        }
    }
    files
}

/// Parses every allowed file present in `dir`, in allowed-file order.
pub fn load_trees(dir: &Path, files: &[String]) -> Result<Vec<ResourceTree>, Error> {
    let mut trees = Vec::new();
    for name in files {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        debug!("Reading {}", path.display());
        trees.push(ResourceTree::read_from(&path)?);
    }
    Ok(trees)
}
