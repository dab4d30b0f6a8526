use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::model::{CellValue, Row, Table};
use crate::error::ExportError;

/// Suggested file name when exporting a search result.
pub const SEARCH_EXPORT_FILE: &str = "resultado_busqueda.xlsx";
/// Suggested file name when exporting every client at once.
pub const CONSOLIDATED_EXPORT_FILE: &str = "consolidado_clientes.xlsx";

/// Write `table` to `path`.  Dispatch by extension.
///
/// * `.xlsx` – one sheet, header row then one row per record
/// * `.csv`  – header row then one record per row
/// * `.json` – array of `{ column: value }` records in column order
pub fn export_table(table: &Table, path: &Path) -> Result<(), ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" => write_xlsx(table, path)?,
        "csv" => write_csv(table, path)?,
        "json" => write_json(table, path)?,
        other => {
            return Err(ExportError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    }

    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// xlsx
// ---------------------------------------------------------------------------

fn write_xlsx(table: &Table, path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (c, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, name, &bold)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, value) in row.iter().enumerate() {
            let c = c as u16;
            match value {
                CellValue::Text(s) | CellValue::Date(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                CellValue::Integer(i) => {
                    worksheet.write_number(r, c, *i as f64)?;
                }
                CellValue::Float(v) => {
                    worksheet.write_number(r, c, *v)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                CellValue::Empty => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// csv
// ---------------------------------------------------------------------------

fn write_csv(table: &Table, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// json
// ---------------------------------------------------------------------------

/// Serializes a table as records, keeping column order.
struct Records<'a>(&'a Table);

struct Record<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for row in self.0.rows() {
            seq.serialize_element(&Record {
                columns: self.0.columns(),
                row,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn write_json(table: &Table, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &Records(table))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::with_columns(["Serie", "Marca", "Bandeja"]);
        t.push_row(vec!["S1".into(), "HP".into(), CellValue::Integer(2)]);
        t.push_row(vec!["S2".into(), CellValue::Empty, CellValue::Float(1.5)]);
        t
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_table(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Serie,Marca,Bandeja\nS1,HP,2\nS2,,1.5\n");
    }

    #[test]
    fn json_export_keeps_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        export_table(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let serie = text.find("\"Serie\"").unwrap();
        let bandeja = text.find("\"Bandeja\"").unwrap();
        assert!(serie < bandeja);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[1]["Marca"], serde_json::Value::Null);
        assert_eq!(value[0]["Bandeja"], serde_json::json!(2));
    }

    #[test]
    fn xlsx_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SEARCH_EXPORT_FILE);
        export_table(&sample(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_table(&sample(), &dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat { .. }));
    }
}
