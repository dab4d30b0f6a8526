use super::model::{CellValue, Table};
use super::schema::ESTADO;

/// `Estado` value marking equipment as retired.
pub const RETIRED_STATUS: &str = "RETIRADA";

/// Whether an `Estado` cell marks the equipment as retired.
/// Comparison is on the trimmed, upper-cased text form.
pub fn is_retired(estado: &CellValue) -> bool {
    estado.to_string().trim().to_uppercase() == RETIRED_STATUS
}

/// Return `table` without retired equipment.
///
/// Rows pass when their `Estado` is anything but `RETIRADA`; a table without
/// an `Estado` column passes unchanged.
pub fn apply_active_filter(table: &Table) -> Table {
    let Some(idx) = table.column_index(ESTADO) else {
        return table.clone();
    };
    table.filter_rows(|row| !is_retired(&row[idx]))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
