//! Equipment inventory browser core.
//!
//! Loads a multi-sheet workbook (one sheet per client), maps the loosely
//! named headers onto a canonical schema, and answers serial searches and
//! brand / model / client summaries over the merged data.

pub mod data;
pub mod error;
pub mod session;

pub use data::loader::{load_workbook, load_workbook_with, LoadOptions, SheetTable, Workbook};
pub use data::model::{CellValue, Table};
pub use error::{ErrorKind, ExportError, InventoryError, LoadError};
pub use session::{DisplayMode, SearchOutcome, Session};
