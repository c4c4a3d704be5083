//! Export of a water-demand calculation into the fixed spreadsheet template.
//!
//! [`plan::plan_export`] decides every cell to write without touching a
//! workbook; [`workbook::write_workbook`] applies that plan to a copy of the
//! template.

pub mod plan;
pub mod workbook;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("the template has room for {max} rows, the table has {rows}")]
    TooManyRows { rows: usize, max: usize },
    #[error("could not read template {path}: {message}")]
    Template { path: PathBuf, message: String },
    #[error("template {0} has no worksheet")]
    NoWorksheet(PathBuf),
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write {path}: {message}")]
    Write { path: PathBuf, message: String },
}
