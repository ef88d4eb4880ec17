#![forbid(unsafe_code)]
//! Synchronize Android string resources with a single translator-facing table.
//!
//! The default language (`values/strings.xml`) fixes the rows: every string,
//! plural variant and array item gets one row, bound to a derived [`Key`].
//! Every other language is then written into the row of each key it
//! provides. Keys a language lacks are flagged, keys the default language
//! does not know are reported and skipped.
//!
//! A finished table can be cut into contiguous row ranges with a
//! [`SplitPlan`], each part being handed to a caller-supplied
//! [`Reconstruct`] implementation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use langsheet::{ExportConfig, export};
//!
//! let summary = export(&ExportConfig::new("app").with_output("strings.json"))?;
//! for report in &summary.reports {
//!     println!("{}: {} missing", report.language, report.missing_keys.len());
//! }
//! # Ok::<(), langsheet::Error>(())
//! ```
//!
//! Progress and translation gaps are reported through the `log` facade;
//! install any logger to see them.

pub mod config;
pub mod error;
pub mod export;
pub mod formats;
pub mod ignore;
pub mod indexer;
pub mod project;
pub mod splitter;
pub mod table;
pub mod traits;
pub mod types;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    config::{ExportConfig, SplitConfig},
    error::Error,
    export::{ExportSummary, export},
    formats::{TableFormat, read_table, write_table},
    ignore::IgnoreSet,
    indexer::{IndexOptions, KeyIndex, KeyIndexer, build_index},
    splitter::{Reconstruct, SplitPart, SplitPlan, SplitRange, split, split_and_reconstruct, split_file},
    table::{Cell, CellStyle, Row, Table},
    traits::Parser,
    types::{Key, PluralGroup, ResourceNode, ResourceTree, Scalar, StringArray},
    writer::{LanguageReport, write_language},
};
