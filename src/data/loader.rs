use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value as JsonValue;

use super::model::{CellValue, Row, Table};
use super::schema::{normalize_sheet, Normalizer, PLACEHOLDER_PREFIX};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Workbook – the normalized result of a load
// ---------------------------------------------------------------------------

/// A normalized sheet, named after its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub table: Table,
}

/// All Sheet Tables of one input file, in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<SheetTable>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|s| s.name == name).map(|s| &s.table)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Row-wise concatenation of every sheet, in workbook order.
    pub fn global_table(&self) -> Table {
        Table::concat(self.sheets.iter().map(|s| &s.table))
    }
}

/// Knobs for [`load_workbook_with`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub normalizer: Normalizer,
    /// Drop rows whose cells are all empty (trailing formatting, spacer rows).
    pub skip_blank_rows: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            normalizer: Normalizer::default(),
            skip_blank_rows: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize every sheet of an inventory file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – one Sheet Table per sheet
/// * `.csv`  – a single sheet named after the file stem
/// * `.json` – `{ "Sheet": [ { "Marca": "HP", ... }, ... ], ... }`, or a bare
///   records array treated as a single sheet named after the file stem
pub fn load_workbook(path: &Path) -> Result<Workbook, LoadError> {
    load_workbook_with(path, &LoadOptions::default())
}

pub fn load_workbook_with(path: &Path, options: &LoadOptions) -> Result<Workbook, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw_sheets = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods" => read_spreadsheet(path)?,
        "csv" => vec![(file_stem(path), read_csv(path)?)],
        "json" => read_json(path)?,
        other => {
            return Err(LoadError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    if raw_sheets.is_empty() {
        return Err(LoadError::NoSheets);
    }

    let sheets = raw_sheets
        .into_iter()
        .map(|(name, mut raw)| {
            if options.skip_blank_rows {
                raw.retain_rows(|row| !row.iter().all(CellValue::is_empty));
            }
            let table = normalize_sheet(&name, &raw, &options.normalizer);
            log::debug!("Sheet '{name}': {} rows, columns {:?}", table.len(), table.columns());
            SheetTable { name, table }
        })
        .collect();

    Ok(Workbook { sheets })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

/// Build a header row: blank headers become `Unnamed: <index>`, repeated
/// headers get a `.1`, `.2`… suffix so every column stays addressable.
fn header_row(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = if header.trim().is_empty() {
                format!("{PLACEHOLDER_PREFIX}: {idx}")
            } else {
                header
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}.{n}");
                n += 1;
            }
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader (calamine)
// ---------------------------------------------------------------------------

fn read_spreadsheet(path: &Path) -> Result<Vec<(String, Table)>, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let mut rows = range.rows();

        let mut table = match rows.next() {
            Some(header) => Table::with_columns(header_row(
                header.iter().map(|cell| data_to_value(cell).to_string()),
            )),
            None => Table::new(),
        };
        for row in rows {
            table.push_row(row.iter().map(data_to_value).collect());
        }
        sheets.push((name, table));
    }
    Ok(sheets)
}

/// Map a calamine cell to a [`CellValue`]. Whole floats come back as integers
/// so serial numbers typed as numbers read as `12345`, not `12345.0`.
fn data_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                CellValue::Integer(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::Date(ndt.to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = header_row(reader.headers()?.iter().map(|h| h.to_string()));
    let mut table = Table::with_columns(headers);

    for result in reader.records() {
        let record = result?;
        table.push_row(record.iter().map(CellValue::guess).collect());
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn read_json(path: &Path) -> Result<Vec<(String, Table)>, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    match root {
        JsonValue::Array(records) => Ok(vec![(file_stem(path), records_to_table(&records)?)]),
        JsonValue::Object(sheets) => sheets
            .iter()
            .map(|(name, value)| {
                let records = value.as_array().ok_or_else(|| {
                    LoadError::JsonShape(format!("sheet '{name}' is not an array of records"))
                })?;
                Ok((name.clone(), records_to_table(records)?))
            })
            .collect(),
        _ => Err(LoadError::JsonShape(
            "expected an object of sheets or an array of records".to_string(),
        )),
    }
}

fn records_to_table(records: &[JsonValue]) -> Result<Table, LoadError> {
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::JsonShape(format!("row {i} is not a JSON object")))?;
        objects.push(obj);
    }

    let mut table = Table::with_columns(objects.iter().flat_map(|o| o.keys().cloned()));
    for obj in objects {
        let row: Row = table
            .columns()
            .iter()
            .map(|col| obj.get(col).map(json_to_value).unwrap_or(CellValue::Empty))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn json_to_value(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::schema::{CLIENTE, SERIE};

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn header_row_names_blanks_and_dedupes() {
        let headers = header_row(
            ["Marca", "", "Marca", "Marca"].iter().map(|s| s.to_string()),
        );
        assert_eq!(headers, vec!["Marca", "Unnamed: 1", "Marca.1", "Marca.2"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_workbook(Path::new("/definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".txt", "hello");
        let err = load_workbook(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
    }

    #[test]
    fn csv_loads_as_single_sheet() {
        let file = write_temp(".csv", "N° Serie,MARCA,\nS1,HP,x\n,,\nS2,Dell,y\n");
        let wb = load_workbook(file.path()).unwrap();

        assert_eq!(wb.len(), 1);
        let sheet = &wb.sheets[0];
        assert_eq!(sheet.table.columns(), &["Serie", "Marca", "Cliente"]);
        assert_eq!(sheet.table.len(), 2);
        assert_eq!(sheet.table.value(1, SERIE), Some(&CellValue::from("S2")));
        assert_eq!(
            sheet.table.value(0, CLIENTE),
            Some(&CellValue::Text(sheet.name.clone()))
        );
    }

    #[test]
    fn csv_keeps_zero_padded_serials_as_text() {
        let file = write_temp(".csv", "serie,marca,cantidad\n00123,HP,2\n1E5,Dell,1\n");
        let wb = load_workbook(file.path()).unwrap();
        let table = &wb.sheets[0].table;

        assert_eq!(table.value(0, SERIE), Some(&CellValue::from("00123")));
        assert_eq!(table.value(1, SERIE), Some(&CellValue::from("1E5")));
        assert_eq!(table.value(0, "Cantidad"), Some(&CellValue::Integer(2)));
    }

    #[test]
    fn json_object_loads_one_sheet_per_key() {
        let file = write_temp(
            ".json",
            r#"{
                "ClientA": [{"marca": "HP", "serie": "S1"}, {"marca": "HP", "serie": 42}],
                "ClientB": [{"marca": "Dell", "serie": "S3", "estado": null}]
            }"#,
        );
        let wb = load_workbook(file.path()).unwrap();

        assert_eq!(wb.sheet_names(), vec!["ClientA", "ClientB"]);
        let a = wb.get("ClientA").unwrap();
        assert_eq!(a.value(1, SERIE), Some(&CellValue::Integer(42)));
        let b = wb.get("ClientB").unwrap();
        assert_eq!(b.value(0, "Estado"), Some(&CellValue::Empty));
        assert_eq!(wb.global_table().len(), 3);
    }

    #[test]
    fn json_with_no_sheets_fails() {
        let file = write_temp(".json", "{}");
        let err = load_workbook(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoSheets));
    }

    #[test]
    fn corrupt_spreadsheet_is_an_input_error() {
        let file = write_temp(".xlsx", "this is not a zip archive");
        let err = load_workbook(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet(_)));
    }

    #[test]
    fn whole_floats_become_integers() {
        assert_eq!(data_to_value(&Data::Float(12345.0)), CellValue::Integer(12345));
        assert_eq!(data_to_value(&Data::Float(1.5)), CellValue::Float(1.5));
        assert_eq!(data_to_value(&Data::Empty), CellValue::Empty);
    }
}
