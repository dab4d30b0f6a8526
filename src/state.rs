use std::path::Path;

use rusty_inventory::data::schema::{CLIENTE, MARCA};
use rusty_inventory::data::summary::{frequency_rows, FrequencyRow};
use rusty_inventory::{
    DisplayMode, ErrorKind, InventoryError, LoadOptions, SearchOutcome, Session, Table,
};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

// ---------------------------------------------------------------------------
// What the central panel shows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ViewKind {
    Client,
    SearchResult,
    Summary,
}

/// The table (and optional pie chart) currently on screen.
#[derive(Debug, Clone)]
pub struct View {
    pub kind: ViewKind,
    pub title: String,
    pub table: Table,
    pub chart: Option<Vec<FrequencyRow>>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub session: Session,

    pub load_options: LoadOptions,

    /// Serial-number search box contents.
    pub query: String,

    /// Hide retired equipment in the client view.
    pub display_mode: DisplayMode,

    pub view: Option<View>,

    /// Slice colours for `view.chart`.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status: Option<StatusMessage>,
}

impl AppState {
    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            level: StatusLevel::Info,
            text: text.into(),
        });
    }

    /// Turn a failed request into a status message; the session is unchanged.
    pub fn report(&mut self, err: &InventoryError) {
        let level = match err.kind() {
            ErrorKind::Precondition => StatusLevel::Warning,
            ErrorKind::Input | ErrorKind::Output => StatusLevel::Error,
        };
        match level {
            StatusLevel::Warning => log::warn!("{err}"),
            _ => log::error!("{err}"),
        }
        self.status = Some(StatusMessage {
            level,
            text: err.to_string(),
        });
    }

    fn show(&mut self, kind: ViewKind, title: String, table: Table) {
        let chart = if kind == ViewKind::Summary {
            frequency_rows(&table)
        } else {
            None
        };
        self.color_map = chart
            .as_ref()
            .map(|rows| ColorMap::new(rows.iter().map(|r| r.label.as_str())));
        self.view = Some(View {
            kind,
            title,
            table,
            chart,
        });
    }

    /// Load a workbook from disk, replacing everything on success.
    pub fn load_path(&mut self, path: &Path) {
        match self.session.load_file(path, &self.load_options) {
            Ok(rows) => {
                self.view = None;
                self.color_map = None;
                self.query.clear();
                self.info(format!(
                    "Loaded {rows} records from {} clients.",
                    self.session.client_names().len()
                ));
            }
            Err(e) => self.report(&e),
        }
    }

    pub fn select_client(&mut self, name: &str) {
        if self.session.select_client(name).is_some() {
            self.refresh_client_view();
        }
    }

    /// Re-render the active client, honouring `display_mode`.
    pub fn refresh_client_view(&mut self) {
        let Some(name) = self.session.active_client().map(str::to_string) else {
            return;
        };
        let table = self.session.active_view(self.display_mode);
        self.show(ViewKind::Client, name, table);
    }

    pub fn run_search(&mut self) {
        let query = self.query.clone();
        match self.session.search(&query) {
            Ok(SearchOutcome::Matches(table)) => {
                let title = format!("Serial contains \"{}\"", query.trim());
                self.info(format!("{} matching rows.", table.len()));
                self.show(ViewKind::SearchResult, title, table);
            }
            Ok(SearchOutcome::NoMatches) => self.info("No equipment with that serial number."),
            Err(e) => self.report(&e),
        }
    }

    /// Frequency summary of one column over every client, with a pie chart.
    pub fn show_summary(&mut self, dimension: &str) {
        match self.session.summarize_by(dimension) {
            Ok(table) => {
                let title = format!("{dimension} distribution (all clients, active equipment)");
                self.show(ViewKind::Summary, title, table);
            }
            Err(e) => self.report(&e),
        }
    }

    /// Equipment per client and brand.
    pub fn show_client_brand_cross(&mut self) {
        match self.session.summarize_cross(CLIENTE, MARCA) {
            Ok(table) => {
                let title = format!("{MARCA} by {CLIENTE} (active equipment)");
                self.show(ViewKind::Summary, title, table);
            }
            Err(e) => self.report(&e),
        }
    }

    pub fn export_search_to(&mut self, path: &Path) {
        match self.session.export_search(path) {
            Ok(()) => self.info(format!("Result saved to {}", path.display())),
            Err(e) => self.report(&e),
        }
    }

    pub fn export_consolidated_to(&mut self, path: &Path) {
        match self.session.export_consolidated(path) {
            Ok(()) => self.info(format!("Consolidated data saved to {}", path.display())),
            Err(e) => self.report(&e),
        }
    }
}
