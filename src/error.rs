use std::path::PathBuf;

use thiserror::Error;

/// Why a single "Rate vs Range" sheet produced no data.
///
/// These never escape the workbook loader: the sheet is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// No row carries both an `Attenuation` and a `throughput` header cell.
    #[error("no header row with Attenuation and Throughput columns")]
    MissingHeaderRow,

    /// The header row was found but a required column did not resolve.
    #[error("missing required column '{field}'")]
    MissingColumn { field: &'static str },
}

/// Failure to turn one file into a [`LoadedWorkbook`](crate::data::model::LoadedWorkbook).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{name} is not an Excel file")]
    UnsupportedFileType { name: String },

    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {name}: {source}")]
    Workbook {
        name: String,
        #[source]
        source: calamine::Error,
    },

    #[error(
        "No RvR data found in {name}. Please ensure the file contains \"Rate vs Range\" sheets with Attenuation and Throughput columns."
    )]
    EmptyWorkbook { name: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("No valid test configurations were loaded")]
    NothingLoaded,
}

/// Errors raised while resolving files inside the report tree.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("path traversal not allowed: {path}")]
    Forbidden { path: String },

    #[error("file not found: {path}")]
    NotFound { path: String },

    #[error("no PDF report found in {}", dir.display())]
    NoPdf { dir: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
