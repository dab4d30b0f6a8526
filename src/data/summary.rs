use std::collections::{BTreeMap, HashMap};

use super::filter::apply_active_filter;
use super::model::{CellValue, Table};
use super::schema::{CANTIDAD, PORCENTAJE};
use crate::error::{InventoryError, Result};

/// Label used for the group of rows with no value in the summarized column.
pub const EMPTY_LABEL: &str = "(vacío)";

/// Round to 2 decimals, ties to even.
pub fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn group_key(value: &CellValue) -> CellValue {
    if value.is_empty() {
        CellValue::Empty
    } else {
        value.clone()
    }
}

/// Frequency table of `dimension` over the active (non-retired) rows.
///
/// Columns are `{dimension, Cantidad, Porcentaje}`. Rows are ordered by
/// descending count, ties in order of first appearance; empty cells form
/// their own group. Each percentage is `count / total × 100` rounded
/// half-to-even to 2 decimals, so the column sums to 100 up to rounding.
pub fn summarize_by(table: &Table, dimension: &str) -> Result<Table> {
    if !table.has_column(dimension) {
        return Err(InventoryError::missing_column(dimension));
    }
    reject_reserved(&[dimension], &[CANTIDAD, PORCENTAJE])?;
    let active = apply_active_filter(table);
    let idx = active
        .column_index(dimension)
        .ok_or_else(|| InventoryError::missing_column(dimension))?;

    let mut order: Vec<(CellValue, usize)> = Vec::new();
    let mut slot: HashMap<CellValue, usize> = HashMap::new();
    for row in active.rows() {
        let key = group_key(&row[idx]);
        match slot.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                slot.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }
    // Stable: equal counts keep first-appearance order.
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let total = active.len() as f64;
    let mut summary = Table::with_columns([dimension, CANTIDAD, PORCENTAJE]);
    for (value, count) in order {
        let pct = round_percentage(count as f64 / total * 100.0);
        summary.push_row(vec![
            value,
            CellValue::Integer(count as i64),
            CellValue::Float(pct),
        ]);
    }

    log::debug!(
        "summarize_by({dimension}): {} groups over {} active rows",
        summary.len(),
        active.len()
    );
    Ok(summary)
}

/// Cross tab of `dim_a × dim_b` over the active (non-retired) rows.
///
/// Columns are `{dim_a, dim_b, Cantidad}`, rows ordered by the value pair.
pub fn summarize_cross(table: &Table, dim_a: &str, dim_b: &str) -> Result<Table> {
    for dim in [dim_a, dim_b] {
        if !table.has_column(dim) {
            return Err(InventoryError::missing_column(dim));
        }
    }
    count_pairs(&apply_active_filter(table), dim_a, dim_b)
}

/// Dimensions may not share a name with a column the summary itself adds.
fn reject_reserved(dimensions: &[&str], output: &[&str]) -> Result<()> {
    match dimensions.iter().find(|d| output.contains(*d)) {
        Some(dim) => Err(InventoryError::ReservedColumn {
            column: dim.to_string(),
        }),
        None => Ok(()),
    }
}

/// Count rows per distinct `(dim_a, dim_b)` value pair, with no filtering.
pub fn count_pairs(table: &Table, dim_a: &str, dim_b: &str) -> Result<Table> {
    reject_reserved(&[dim_a, dim_b], &[CANTIDAD])?;
    let ia = table
        .column_index(dim_a)
        .ok_or_else(|| InventoryError::missing_column(dim_a))?;
    let ib = table
        .column_index(dim_b)
        .ok_or_else(|| InventoryError::missing_column(dim_b))?;

    let mut counts: BTreeMap<(CellValue, CellValue), usize> = BTreeMap::new();
    for row in table.rows() {
        *counts
            .entry((group_key(&row[ia]), group_key(&row[ib])))
            .or_default() += 1;
    }

    if ia == ib {
        let mut out = Table::with_columns([dim_a, CANTIDAD]);
        for ((value, _), count) in counts {
            out.push_row(vec![value, CellValue::Integer(count as i64)]);
        }
        return Ok(out);
    }

    let mut out = Table::with_columns([dim_a, dim_b, CANTIDAD]);
    for ((a, b), count) in counts {
        out.push_row(vec![a, b, CellValue::Integer(count as i64)]);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Chart input contract
// ---------------------------------------------------------------------------

/// One slice of a frequency chart.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

/// Read the slices back out of a frequency Summary Table (as built by
/// [`summarize_by`]). Returns `None` for tables of any other shape.
pub fn frequency_rows(summary: &Table) -> Option<Vec<FrequencyRow>> {
    if summary.width() != 3 {
        return None;
    }
    let count_idx = summary.column_index(CANTIDAD)?;
    let pct_idx = summary.column_index(PORCENTAJE)?;
    if count_idx != 1 || pct_idx != 2 {
        return None;
    }

    summary
        .rows()
        .iter()
        .map(|row| {
            let label = if row[0].is_empty() {
                EMPTY_LABEL.to_string()
            } else {
                row[0].to_string()
            };
            Some(FrequencyRow {
                label,
                count: row[count_idx].as_f64()? as usize,
                percentage: row[pct_idx].as_f64()?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
