use std::f64::consts::TAU;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, Plot, PlotPoint, PlotPoints, Polygon, Text};

use rusty_inventory::data::summary::FrequencyRow;

use crate::state::AppState;

/// Where the first slice starts, counter-clockwise from the x axis.
const START_ANGLE: f64 = 140.0_f64 * TAU / 360.0;
/// Segments per full turn when approximating the arcs.
const ARC_STEPS: f64 = 180.0;

// ---------------------------------------------------------------------------
// Pie chart (bottom panel)
// ---------------------------------------------------------------------------

/// Outline of one slice from `from` to `to` radians on the unit circle.
fn slice_points(from: f64, to: f64) -> Vec<[f64; 2]> {
    let steps = (((to - from) / TAU) * ARC_STEPS).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let a = from + (to - from) * i as f64 / steps as f64;
        points.push([a.cos(), a.sin()]);
    }
    points
}

/// Render a frequency summary as a pie chart, one slice per value.
pub fn pie_chart(ui: &mut Ui, title: &str, rows: &[FrequencyRow], state: &AppState) {
    ui.label(RichText::new(title).strong());

    let total: usize = rows.iter().map(|r| r.count).sum();
    if total == 0 {
        ui.label("Nothing to chart: every row was filtered out.");
        return;
    }

    Plot::new("summary_pie")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let mut angle = START_ANGLE;
            for row in rows {
                let sweep = TAU * row.count as f64 / total as f64;
                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(&row.label))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let polygon = Polygon::new(PlotPoints::from(slice_points(angle, angle + sweep)))
                    .name(&row.label)
                    .fill_color(color)
                    .stroke(Stroke::new(1.0, Color32::WHITE));
                plot_ui.polygon(polygon);

                let mid = angle + sweep / 2.0;
                let label = format!("{}\n{:.1}%", row.label, row.percentage);
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    RichText::new(label).color(Color32::BLACK),
                ));

                angle += sweep;
            }
        });
}
