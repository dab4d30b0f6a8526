use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{chart, grid, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InventoryApp {
    pub state: AppState,
}

impl eframe::App for InventoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: client, search, summaries ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: pie chart for frequency summaries ----
        if let Some(view) = &self.state.view {
            if let Some(rows) = &view.chart {
                egui::TopBottomPanel::bottom("chart_panel")
                    .resizable(true)
                    .default_height(320.0)
                    .show(ctx, |ui| {
                        chart::pie_chart(ui, &view.title, rows, &self.state);
                    });
            }
        }

        // ---- Central panel: table ----
        egui::CentralPanel::default().show(ctx, |ui| match &self.state.view {
            Some(view) => {
                ui.heading(&view.title);
                ui.label(format!("{} rows", view.table.len()));
                ui.separator();
                grid::data_grid(ui, &view.table);
            }
            None => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a workbook to browse equipment  (File → Open…)");
                });
            }
        });
    }
}
