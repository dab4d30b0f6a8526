use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as read from a spreadsheet.
/// Groupings key `BTreeMap` / `HashMap` by value, so `CellValue` must be `Ord + Hash`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date/time kept as text.
    Date(String),
    Empty,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeMap keys --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Empty => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Empty, Empty) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Empty => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl CellValue {
    /// Whether the cell holds no data. Blank text counts as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Guess a typed value from raw text (CSV cells, JSON strings stay text).
    ///
    /// Only plain decimals become numbers. Zero-padded codes (`00123`),
    /// exponents and `nan`/`inf` spellings stay text so serials survive.
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Empty;
        }
        if is_plain_decimal(s) {
            if let Ok(i) = s.parse::<i64>() {
                return CellValue::Integer(i);
            }
            if let Ok(f) = s.parse::<f64>() {
                return CellValue::Float(f);
            }
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::Text(s.to_string())
    }
}

/// `-?digits(.digits)?` with no leading zero on a multi-digit integer part.
fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(int) && !(int.len() > 1 && int.starts_with('0')) && frac.map_or(true, digits)
}

// ---------------------------------------------------------------------------
// Table – ordered columns, ordered rows
// ---------------------------------------------------------------------------

/// One row of a [`Table`]; always as wide as the table's column list.
pub type Row = Vec<CellValue>;

/// An in-memory table: ordered, unique column names plus row-major cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with the given header. Later duplicates of a name are dropped.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for col in columns {
            let col = col.into();
            if !table.columns.contains(&col) {
                table.columns.push(col);
            }
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding with `Empty` or truncating to the table width.
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Cell at `row` in column `column`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterate over one column, or `None` if it does not exist.
    pub fn column_values<'a>(
        &'a self,
        column: &str,
    ) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Add `column` (or overwrite it if present) with `value` on every row.
    pub fn set_column(&mut self, column: &str, value: CellValue) {
        match self.column_index(column) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(column.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// New table made of the columns at the given indices, renamed.
    ///
    /// Names in `columns` must be unique.
    pub fn project(&self, columns: &[(usize, String)]) -> Table {
        Table {
            columns: columns.iter().map(|(_, name)| name.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| columns.iter().map(|(idx, _)| r[*idx].clone()).collect())
                .collect(),
        }
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    /// New table with the same header and only the rows passing `keep`.
    pub fn filter_rows(&self, mut keep: impl FnMut(&Row) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Row-wise concatenation with an outer join on column names.
    ///
    /// Columns appear in first-appearance order across `tables`; cells a
    /// table has no column for are `Empty`.
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Table {
        let tables: Vec<&Table> = tables.into_iter().collect();
        let mut out = Table::with_columns(tables.iter().flat_map(|t| t.columns.iter().cloned()));
        let position: HashMap<&str, usize> = out
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let width = out.columns.len();

        let mut rows = Vec::with_capacity(tables.iter().map(|t| t.len()).sum());
        for table in &tables {
            let mapping: Vec<usize> = table.columns.iter().map(|c| position[c.as_str()]).collect();
            for row in &table.rows {
                let mut merged = vec![CellValue::Empty; width];
                for (value, &dest) in row.iter().zip(&mapping) {
                    merged[dest] = value.clone();
                }
                rows.push(merged);
            }
        }
        out.rows = rows;
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::with_columns(columns.iter().copied());
        for r in rows {
            t.push_row(r.iter().map(|v| CellValue::from(*v)).collect());
        }
        t
    }

    #[test]
    fn push_row_pads_to_width() {
        let mut t = Table::with_columns(["A", "B", "C"]);
        t.push_row(vec!["x".into()]);
        assert_eq!(t.rows()[0].len(), 3);
        assert_eq!(t.value(0, "C"), Some(&CellValue::Empty));
    }

    #[test]
    fn set_column_overwrites_existing() {
        let mut t = table(&["Marca", "Cliente"], &[&["HP", "old"], &["Dell", "old"]]);
        t.set_column("Cliente", "ClientA".into());
        assert_eq!(t.width(), 2);
        assert!(t
            .column_values("Cliente")
            .unwrap()
            .all(|v| v == &CellValue::from("ClientA")));
    }

    #[test]
    fn concat_outer_joins_columns() {
        let a = table(&["Marca", "Serie"], &[&["HP", "S1"]]);
        let b = table(&["Serie", "Estado"], &[&["S2", "Activa"]]);
        let c = Table::concat([&a, &b]);

        assert_eq!(c.columns(), &["Marca", "Serie", "Estado"]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.value(0, "Estado"), Some(&CellValue::Empty));
        assert_eq!(c.value(1, "Marca"), Some(&CellValue::Empty));
        assert_eq!(c.value(1, "Serie"), Some(&CellValue::from("S2")));
    }

    #[test]
    fn display_renders_whole_floats_plainly() {
        assert_eq!(CellValue::Float(3.0).to_string(), "3");
        assert_eq!(CellValue::Float(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn guess_types_csv_text() {
        assert_eq!(CellValue::guess(""), CellValue::Empty);
        assert_eq!(CellValue::guess("42"), CellValue::Integer(42));
        assert_eq!(CellValue::guess("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::guess("SN-01"), CellValue::from("SN-01"));
        assert_eq!(CellValue::guess("-3"), CellValue::Integer(-3));
        assert_eq!(CellValue::guess("0.5"), CellValue::Float(0.5));
    }

    #[test]
    fn guess_keeps_code_like_text() {
        for raw in ["00123", "007", "1E5", "1e5", "nan", "inf", "-inf", "+5", "1.", ".5"] {
            assert_eq!(CellValue::guess(raw), CellValue::from(raw), "{raw}");
        }
    }
}
