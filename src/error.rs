use thiserror::Error;

use crate::data::model::Platform;

/// Failures while turning a selection into charts or a table.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no sheet '{sheet}' loaded for {platform}")]
    MissingTable { platform: Platform, sheet: String },

    #[error("column '{column}' not found")]
    MissingColumn { column: String },
}

/// Failures while serialising the selected sheet to CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no sheet '{sheet}' loaded for {platform}")]
    MissingTable { platform: Platform, sheet: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
