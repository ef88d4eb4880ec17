//! All error types for the langsheet crate.
//!
//! Only structural and I/O failures end up here. Translation gaps (unknown or
//! missing keys) are expected and are reported through [`crate::LanguageReport`]
//! instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("string '{name}' has no text content")]
    MissingText { name: String },

    #[error("key '{key}' is already bound to row {existing_row}, cannot bind it to row {row}")]
    DuplicateKey {
        key: String,
        existing_row: usize,
        row: usize,
    },

    #[error("cannot find resource directory in {0}")]
    ResourceDirNotFound(PathBuf),

    #[error("cannot find default language directory in {0}")]
    DefaultLanguageNotFound(PathBuf),

    #[error("invalid table: {0}")]
    InvalidTable(String),

    #[error("invalid split configuration: {0}")]
    InvalidSplit(String),
}
