//! Run configuration for export and split.
//!
//! Both configs deserialize from JSON with every field optional, and offer
//! builder-style setters for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Project directory holding `res/` or `src/main/res/`.
    pub project: PathBuf,

    /// Table to write; `exported_strings_<millis>.json` when absent.
    ///
    /// The format follows the extension. A `.csv` table keeps values only and
    /// loses cell styles, including the [`CellStyle::Missing`] flag.
    ///
    /// [`CellStyle::Missing`]: crate::CellStyle::Missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// File names read from each values dir in addition to `strings.xml`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_resources: Vec<String>,

    /// Table whose first column lists keys to leave out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_list: Option<PathBuf>,

    /// Emit a `//plurals: <name>` row before each plural's variants. On by
    /// default.
    pub plural_markers: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            project: PathBuf::new(),
            output: None,
            additional_resources: Vec::new(),
            ignore_list: None,
            plural_markers: true,
        }
    }
}

impl ExportConfig {
    pub fn new(project: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_additional_resource(mut self, file_name: impl Into<String>) -> Self {
        self.additional_resources.push(file_name.into());
        self
    }

    pub fn with_ignore_list(mut self, ignore_list: impl Into<PathBuf>) -> Self {
        self.ignore_list = Some(ignore_list.into());
        self
    }

    pub fn with_plural_markers(mut self, plural_markers: bool) -> Self {
        self.plural_markers = plural_markers;
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        read_json(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Table to split.
    pub input: PathBuf,

    /// Split plan table; without one the whole table is reconstructed once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PathBuf>,

    /// Where sub-tables are stored before reconstruction.
    pub intermediate_dir: PathBuf,

    /// Output directory name used when there is no plan.
    pub output_dir: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            plan: None,
            intermediate_dir: PathBuf::from("intermediate"),
            output_dir: "values".to_string(),
        }
    }
}

impl SplitConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_plan(mut self, plan: impl Into<PathBuf>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn with_intermediate_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.intermediate_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<String>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        read_json(path)
    }
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, Error> {
    let file = std::fs::File::open(path)?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(Error::Parse)
}
