use eframe::egui::{self, Color32, Key, RichText, Ui};

use rusty_inventory::data::export::{CONSOLIDATED_EXPORT_FILE, SEARCH_EXPORT_FILE};
use rusty_inventory::data::schema::{CLIENTE, MARCA, MODELO};
use rusty_inventory::DisplayMode;

use crate::state::{AppState, StatusLevel};

// ---------------------------------------------------------------------------
// Left side panel – client, search and summaries
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Inventory");
    ui.separator();

    if !state.session.is_loaded() {
        ui.label("No workbook loaded.");
        if ui.button("Open…").clicked() {
            open_file_dialog(state);
        }
        return;
    }

    // ---- Client selector ----
    ui.strong("Client");
    let clients = state.session.client_names();
    let current = state.session.active_client().unwrap_or("—").to_string();
    egui::ComboBox::from_id_salt("client")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for name in &clients {
                if ui.selectable_label(current == *name, name).clicked() {
                    state.select_client(name);
                }
            }
        });

    let mut active_only = state.display_mode == DisplayMode::ActiveOnly;
    if ui.checkbox(&mut active_only, "Hide retired equipment").changed() {
        state.display_mode = if active_only {
            DisplayMode::ActiveOnly
        } else {
            DisplayMode::All
        };
        state.refresh_client_view();
    }
    ui.separator();

    // ---- Serial search ----
    ui.strong("Search by serial number");
    let response = ui.text_edit_singleline(&mut state.query);
    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Search").clicked() || submitted {
            state.run_search();
        }
        if ui.button("Export result").clicked() {
            export_search_dialog(state);
        }
    });
    ui.separator();

    // ---- Summaries over every client ----
    ui.strong("Summaries (all clients)");
    for dimension in [MARCA, MODELO, CLIENTE] {
        if ui.button(format!("By {dimension}")).clicked() {
            state.show_summary(dimension);
        }
    }
    if ui.button(format!("{MARCA} by {CLIENTE}")).clicked() {
        state.show_client_brand_cross();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export search result…").clicked() {
                export_search_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export all clients…").clicked() {
                export_consolidated_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.session.is_loaded() {
            ui.label(format!(
                "{} clients, {} records",
                state.session.client_names().len(),
                state.session.global_table().len()
            ));
            ui.separator();
        }

        if let Some(status) = &state.status {
            let color = match status.level {
                StatusLevel::Info => ui.visuals().text_color(),
                StatusLevel::Warning => Color32::from_rgb(230, 160, 0),
                StatusLevel::Error => Color32::RED,
            };
            ui.label(RichText::new(&status.text).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open inventory workbook")
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.load_path(&path);
    }
}

fn save_dialog(title: &str, default_name: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(default_name)
        .add_filter("Excel", &["xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .save_file()
}

pub fn export_search_dialog(state: &mut AppState) {
    if state.session.last_search_result().is_none() {
        state.report(&rusty_inventory::InventoryError::NothingToExport);
        return;
    }
    if let Some(path) = save_dialog("Export search result", SEARCH_EXPORT_FILE) {
        state.export_search_to(&path);
    }
}

pub fn export_consolidated_dialog(state: &mut AppState) {
    if let Some(path) = save_dialog("Export all clients", CONSOLIDATED_EXPORT_FILE) {
        state.export_consolidated_to(&path);
    }
}
