use std::path::Path;

use crate::data::export::export_table;
use crate::data::filter::apply_active_filter;
use crate::data::loader::{load_workbook_with, LoadOptions, Workbook};
use crate::data::model::Table;
use crate::data::schema::SERIE;
use crate::data::summary;
use crate::error::{InventoryError, Result};

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Result of a serial-number search that met its preconditions.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Matches(Table),
    /// Valid query, zero rows matched.
    NoMatches,
}

/// Rows of `table` whose `Serie` contains `query`, ignoring case.
///
/// `query` is trimmed first. Rows with no serial never match. Retired rows
/// are not filtered out here.
pub fn find_serial(table: &Table, query: &str) -> Result<Table> {
    let query = query.trim();
    if query.is_empty() {
        return Err(InventoryError::EmptyQuery);
    }
    if table.is_empty() || table.width() == 0 {
        return Err(InventoryError::NoActiveSelection);
    }
    let idx = table
        .column_index(SERIE)
        .ok_or_else(|| InventoryError::missing_column(SERIE))?;

    let needle = query.to_lowercase();
    Ok(table.filter_rows(|row| {
        let serie = &row[idx];
        !serie.is_empty() && serie.to_string().to_lowercase().contains(&needle)
    }))
}

// ---------------------------------------------------------------------------
// Session – the loaded datasets plus what the user has selected
// ---------------------------------------------------------------------------

/// Which rows of the active client a display should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Every row as loaded.
    #[default]
    All,
    /// Retired equipment hidden.
    ActiveOnly,
}

/// All state of one working session. Replaced wholesale on every load.
#[derive(Debug, Clone, Default)]
pub struct Session {
    datasets: Workbook,
    global_table: Table,
    active_client: Option<String>,
    active_client_table: Table,
    last_search_result: Option<Table>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every dataset with `workbook` and rebuild the global table.
    /// Selection and search state are cleared.
    pub fn load(&mut self, workbook: Workbook) {
        self.global_table = workbook.global_table();
        self.datasets = workbook;
        self.active_client = None;
        self.active_client_table = Table::new();
        self.last_search_result = None;
        log::info!(
            "Loaded {} clients, {} rows in total",
            self.datasets.len(),
            self.global_table.len()
        );
    }

    /// Read `path` and [`load`](Self::load) it. On failure the session is untouched.
    pub fn load_file(&mut self, path: &Path, options: &LoadOptions) -> Result<usize> {
        let workbook = load_workbook_with(path, options)?;
        self.load(workbook);
        Ok(self.global_table.len())
    }

    pub fn is_loaded(&self) -> bool {
        !self.datasets.is_empty()
    }

    /// Names of the loaded clients, in workbook order.
    pub fn client_names(&self) -> Vec<String> {
        self.datasets.sheet_names()
    }

    pub fn datasets(&self) -> &Workbook {
        &self.datasets
    }

    pub fn global_table(&self) -> &Table {
        &self.global_table
    }

    /// Make `name` the active client. Unknown names are ignored and leave the
    /// current selection in place.
    pub fn select_client(&mut self, name: &str) -> Option<&Table> {
        let table = self.datasets.get(name)?.clone();
        self.active_client = Some(name.to_string());
        self.active_client_table = table;
        Some(&self.active_client_table)
    }

    pub fn active_client(&self) -> Option<&str> {
        self.active_client.as_deref()
    }

    pub fn active_table(&self) -> &Table {
        &self.active_client_table
    }

    /// The active client's rows for display.
    pub fn active_view(&self, mode: DisplayMode) -> Table {
        match mode {
            DisplayMode::All => self.active_client_table.clone(),
            DisplayMode::ActiveOnly => apply_active_filter(&self.active_client_table),
        }
    }

    /// Search the active client by serial number.
    ///
    /// A match replaces the last search result; `NoMatches` keeps the
    /// previous one.
    pub fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        let found = find_serial(&self.active_client_table, query).inspect_err(|e| {
            log::warn!("Search for '{query}' rejected: {e}");
        })?;
        log::debug!("Search for '{query}': {} matches", found.len());

        if found.is_empty() {
            return Ok(SearchOutcome::NoMatches);
        }
        self.last_search_result = Some(found.clone());
        Ok(SearchOutcome::Matches(found))
    }

    pub fn last_search_result(&self) -> Option<&Table> {
        self.last_search_result.as_ref()
    }

    fn require_data(&self) -> Result<&Table> {
        if self.global_table.is_empty() {
            return Err(InventoryError::NoData);
        }
        Ok(&self.global_table)
    }

    /// Frequency of `dimension` across every client, retired rows excluded.
    pub fn summarize_by(&self, dimension: &str) -> Result<Table> {
        summary::summarize_by(self.require_data()?, dimension)
    }

    /// Cross tab of two columns across every client, retired rows excluded.
    pub fn summarize_cross(&self, dim_a: &str, dim_b: &str) -> Result<Table> {
        summary::summarize_cross(self.require_data()?, dim_a, dim_b)
    }

    pub fn export_search(&self, path: &Path) -> Result<()> {
        match &self.last_search_result {
            Some(table) if !table.is_empty() => Ok(export_table(table, path)?),
            _ => Err(InventoryError::NothingToExport),
        }
    }

    /// Export the global table (every client, unfiltered).
    pub fn export_consolidated(&self, path: &Path) -> Result<()> {
        Ok(export_table(self.require_data()?, path)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::SheetTable;
    use crate::data::model::CellValue;
    use crate::data::schema::{normalize_sheet, Normalizer, CLIENTE, ESTADO, MARCA};

    fn sheet(name: &str, rows: &[(&str, &str, &str)]) -> SheetTable {
        let mut raw = Table::with_columns(["marca", "N° serie", "estado"]);
        for (marca, serie, estado) in rows {
            raw.push_row(vec![(*marca).into(), (*serie).into(), (*estado).into()]);
        }
        SheetTable {
            name: name.to_string(),
            table: normalize_sheet(name, &raw, &Normalizer::default()),
        }
    }

    fn workbook() -> Workbook {
        Workbook {
            sheets: vec![
                sheet("ClientA", &[("HP", "S1", "Activa"), ("HP", "S2", "RETIRADA")]),
                sheet("ClientB", &[("Dell", "S3", "Activa")]),
            ],
        }
    }

    fn loaded() -> Session {
        let mut session = Session::new();
        session.load(workbook());
        session
    }

    #[test]
    fn load_builds_global_table() {
        let session = loaded();
        assert_eq!(session.client_names(), vec!["ClientA", "ClientB"]);
        assert_eq!(session.global_table().len(), 3);

        let clients: Vec<String> = session
            .global_table()
            .column_values(CLIENTE)
            .unwrap()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(clients, vec!["ClientA", "ClientA", "ClientB"]);
    }

    #[test]
    fn reload_replaces_everything() {
        let mut session = loaded();
        session.select_client("ClientA");
        session.search("s1").unwrap();

        session.load(Workbook {
            sheets: vec![sheet("ClientC", &[("Epson", "E1", "")])],
        });

        assert_eq!(session.client_names(), vec!["ClientC"]);
        assert_eq!(session.global_table().len(), 1);
        assert!(session.active_client().is_none());
        assert!(session.last_search_result().is_none());
    }

    #[test]
    fn unknown_client_is_ignored() {
        let mut session = loaded();
        session.select_client("ClientA");
        assert!(session.select_client("Nobody").is_none());
        assert_eq!(session.active_client(), Some("ClientA"));
        assert_eq!(session.active_table().len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut session = loaded();
        session.select_client("ClientA");

        let SearchOutcome::Matches(found) = session.search("s1").unwrap() else {
            panic!("expected a match");
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found.value(0, SERIE), Some(&CellValue::from("S1")));
        assert_eq!(session.last_search_result(), Some(&found));
    }

    #[test]
    fn search_without_matches_is_not_an_error() {
        let mut session = loaded();
        session.select_client("ClientA");
        session.search("S1").unwrap();

        assert_eq!(session.search("zzz").unwrap(), SearchOutcome::NoMatches);
        // The previous result survives an empty search.
        assert_eq!(session.last_search_result().map(Table::len), Some(1));
    }

    #[test]
    fn search_includes_retired_equipment() {
        let mut session = loaded();
        session.select_client("ClientA");
        let SearchOutcome::Matches(found) = session.search("S2").unwrap() else {
            panic!("expected a match");
        };
        assert_eq!(found.value(0, ESTADO), Some(&CellValue::from("RETIRADA")));
    }

    #[test]
    fn search_preconditions() {
        let mut session = loaded();
        assert!(matches!(
            session.search("S1"),
            Err(InventoryError::NoActiveSelection)
        ));

        session.select_client("ClientA");
        assert!(matches!(session.search(""), Err(InventoryError::EmptyQuery)));
        assert!(matches!(session.search("   "), Err(InventoryError::EmptyQuery)));

        let mut no_serie = Table::with_columns(["Marca"]);
        no_serie.push_row(vec!["HP".into()]);
        assert!(matches!(
            find_serial(&no_serie, "X"),
            Err(InventoryError::MissingColumn { .. })
        ));
    }

    #[test]
    fn missing_serial_never_matches() {
        let mut t = Table::with_columns(["Serie"]);
        t.push_row(vec![CellValue::Empty]);
        t.push_row(vec![CellValue::Integer(1234)]);
        let found = find_serial(&t, "23").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn active_view_hides_retired_rows() {
        let mut session = loaded();
        session.select_client("ClientA");
        assert_eq!(session.active_view(DisplayMode::All).len(), 2);
        assert_eq!(session.active_view(DisplayMode::ActiveOnly).len(), 1);
    }

    #[test]
    fn summaries_need_data() {
        let session = Session::new();
        assert!(matches!(session.summarize_by(MARCA), Err(InventoryError::NoData)));
        assert!(matches!(
            session.summarize_cross(CLIENTE, MARCA),
            Err(InventoryError::NoData)
        ));
    }

    #[test]
    fn summarize_by_brand_across_clients() {
        let by_brand = loaded().summarize_by(MARCA).unwrap();
        let rows = summary::frequency_rows(&by_brand).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.count == 1 && r.percentage == 50.0));
    }

    #[test]
    fn export_search_requires_a_result() {
        let session = loaded();
        let dir = tempfile::tempdir().unwrap();
        let err = session
            .export_search(&dir.path().join("out.xlsx"))
            .unwrap_err();
        assert!(matches!(err, InventoryError::NothingToExport));
    }
}
