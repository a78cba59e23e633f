use thiserror::Error;

use crate::data::model::Column;

/// Domain errors raised by the data pipeline.
///
/// File-level plumbing (opening, reading, decoding batches) stays on
/// `anyhow` with context strings; these are the failures the dashboard
/// reports by name.
#[derive(Debug, Error, PartialEq)]
pub enum DashboardError {
    /// A category was selected on a column that has no usable values.
    #[error("cannot filter by {column}: the column has no non-null values")]
    EmptyCategoryColumn { column: Column },

    #[error("invalid year range: {low} is after {high}")]
    InvalidYearRange { low: i32, high: i32 },

    /// A mandatory column is absent from the header row.
    #[error("required column '{0}' not found in file")]
    MissingColumn(Column),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// Cell bytes could not be decoded with the configured encoding.
    #[error("row {row}: {message}")]
    Encoding { row: usize, message: String },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
