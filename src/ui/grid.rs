use eframe::egui::{self, Align, Layout, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use rusty_inventory::Table;

/// Render a table as a scrollable grid: header row, one line per record.
pub fn data_grid(ui: &mut Ui, table: &Table) {
    if table.width() == 0 {
        ui.label("This table has no columns.");
        return;
    }

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(90.0).clip(true), table.width())
            .header(22.0, |mut header| {
                for name in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, table.len(), |mut row| {
                    let record = &table.rows()[row.index()];
                    for value in record {
                        row.col(|ui: &mut Ui| {
                            ui.add(egui::Label::new(value.to_string()).truncate());
                        });
                    }
                });
            });
    });
}
