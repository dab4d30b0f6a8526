use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading an input workbook.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported file extension: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Cannot read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Cannot read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON workbook: {0}")]
    JsonShape(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook contains no sheets")]
    NoSheets,
}

/// Failures while writing a result table to disk.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export extension: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Cannot write xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Cannot write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Where a failure sits in the user-facing taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreadable or unusable input file.
    Input,
    /// A request made without what it needs (data, column, query).
    Precondition,
    /// Writing a result failed.
    Output,
}

/// Every error a session operation can report. None of them change state.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("No data loaded. Load a workbook first.")]
    NoData,

    #[error("No client selected or the selected client has no rows.")]
    NoActiveSelection,

    #[error("Enter a serial number to search for.")]
    EmptyQuery,

    #[error("Column '{column}' not found.")]
    MissingColumn { column: String },

    #[error("Column '{column}' clashes with a column the summary adds.")]
    ReservedColumn { column: String },

    #[error("Nothing to export. Run a successful search first.")]
    NothingToExport,
}

impl InventoryError {
    pub fn missing_column(column: &str) -> Self {
        InventoryError::MissingColumn {
            column: column.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::Load(_) => ErrorKind::Input,
            InventoryError::Export(_) => ErrorKind::Output,
            InventoryError::NoData
            | InventoryError::NoActiveSelection
            | InventoryError::EmptyQuery
            | InventoryError::MissingColumn { .. }
            | InventoryError::ReservedColumn { .. }
            | InventoryError::NothingToExport => ErrorKind::Precondition,
        }
    }
}

pub type Result<T, E = InventoryError> = std::result::Result<T, E>;
