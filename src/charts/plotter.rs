//! Chart Plotter Module
//! Interactive pressure scatter plots using egui_plot.

use crate::charts::colormap::{coolwarm, ColorScale};
use crate::config::{COLORBAR_LABEL, X_AXIS_LABEL, Y_AXIS_LABEL};
use crate::data::{LapSelector, PreparedData};
use egui::{Color32, RichText};
use egui_plot::{Plot, PlotPoints, Points};

/// Points are grouped into this many color buckets, one series each.
pub const COLOR_BINS: usize = 32;

/// Data for one scatter panel (one pressure port).
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPanel {
    pub port: String,
    pub title: String,
    pub positions: Vec<[f64; 2]>,
    pub values: Vec<f64>,
}

impl HeatmapPanel {
    /// Build the panels for prepared data: the primary port, then the
    /// second port when one was assigned.
    pub fn from_prepared(data: &PreparedData) -> Vec<HeatmapPanel> {
        let positions = data.positions();
        let mut panels = vec![HeatmapPanel {
            port: data.roles.pressure_port.clone(),
            title: panel_title(&data.roles.pressure_port, &data.selector),
            positions: positions.clone(),
            values: data.values(),
        }];

        if let (Some(port), Some(values)) = (&data.roles.second_port, data.second_values()) {
            panels.push(HeatmapPanel {
                port: port.clone(),
                title: panel_title(port, &data.selector),
                positions,
                values,
            });
        }
        panels
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Data bounds as `(x_min..x_max, y_min..y_max)`, `None` when empty.
    pub fn bounds(&self) -> Option<(std::ops::Range<f64>, std::ops::Range<f64>)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut x = f64::INFINITY..f64::NEG_INFINITY;
        let mut y = f64::INFINITY..f64::NEG_INFINITY;
        for [px, py] in &self.positions {
            x.start = x.start.min(*px);
            x.end = x.end.max(*px);
            y.start = y.start.min(*py);
            y.end = y.end.max(*py);
        }
        Some((x, y))
    }
}

/// Panel caption: "{port} – Centered Pressure (Lap N)" or "(All Laps)".
pub fn panel_title(port: &str, selector: &LapSelector) -> String {
    format!("{} – Centered Pressure ({})", port, selector.label())
}

/// Split point indices into color buckets by normalized value.
pub fn bucket_by_color(values: &[f64], scale: &ColorScale, bins: usize) -> Vec<Vec<usize>> {
    let bins = bins.max(1);
    let mut buckets = vec![Vec::new(); bins];
    for (i, &v) in values.iter().enumerate() {
        let t = scale.normalize(v);
        let bin = ((t * bins as f64) as usize).min(bins - 1);
        buckets[bin].push(i);
    }
    buckets
}

fn bin_color(bin: usize, bins: usize) -> Color32 {
    let t = (bin as f64 + 0.5) / bins as f64;
    let [r, g, b] = coolwarm(t);
    Color32::from_rgb(r, g, b)
}

/// Creates interactive pressure heatmaps using egui_plot.
pub struct HeatmapPlotter;

impl HeatmapPlotter {
    /// Draw a scatter panel with equal aspect ratio and grid.
    pub fn draw_scatter(ui: &mut egui::Ui, panel: &HeatmapPanel, scale: &ColorScale, height: f32) {
        ui.label(RichText::new(&panel.title).size(14.0).strong());

        if panel.is_empty() {
            ui.label(
                RichText::new("No data points for this selection")
                    .size(12.0)
                    .color(Color32::GRAY),
            );
        }

        let buckets = bucket_by_color(&panel.values, scale, COLOR_BINS);

        Plot::new(format!("heatmap_{}", panel.port))
            .height(height)
            .data_aspect(1.0)
            .show_grid(true)
            .x_axis_label(X_AXIS_LABEL)
            .y_axis_label(Y_AXIS_LABEL)
            .allow_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .include_x(0.0)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                for (bin, indices) in buckets.iter().enumerate() {
                    if indices.is_empty() {
                        continue;
                    }
                    let points: PlotPoints = indices.iter().map(|&i| panel.positions[i]).collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(2.5)
                            .color(bin_color(bin, COLOR_BINS)),
                    );
                }
            });
    }

    /// Draw a vertical color bar labeled with the pressure unit.
    pub fn draw_colorbar(ui: &mut egui::Ui, scale: &ColorScale, height: f32) {
        const BAR_WIDTH: f32 = 18.0;
        const STEPS: usize = 64;
        const COLORBAR_TICKS: usize = 5;
        const TICK_LABEL_HEIGHT: f32 = 14.0;

        ui.vertical(|ui| {
            ui.label(RichText::new(COLORBAR_LABEL).size(11.0));
            ui.horizontal(|ui| {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(BAR_WIDTH, height), egui::Sense::hover());
                let painter = ui.painter();
                let step_h = rect.height() / STEPS as f32;
                for i in 0..STEPS {
                    // Top of the bar is vmax
                    let t = 1.0 - (i as f64 + 0.5) / STEPS as f64;
                    let [r, g, b] = coolwarm(t);
                    let top = rect.top() + i as f32 * step_h;
                    let slice = egui::Rect::from_min_max(
                        egui::pos2(rect.left(), top),
                        egui::pos2(rect.right(), top + step_h + 0.5),
                    );
                    painter.rect_filled(slice, 0.0, Color32::from_rgb(r, g, b));
                }
                painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, Color32::GRAY));

                // Tick labels top to bottom, vmax first
                ui.vertical(|ui| {
                    ui.set_height(height);
                    let ticks = scale.ticks(COLORBAR_TICKS);
                    let gaps = ticks.len().saturating_sub(1).max(1) as f32;
                    let gap = ((height - TICK_LABEL_HEIGHT * ticks.len() as f32) / gaps).max(0.0);
                    for (i, tick) in ticks.iter().rev().enumerate() {
                        if i > 0 {
                            ui.add_space(gap);
                        }
                        ui.label(RichText::new(format!("{:.0}", tick)).size(11.0));
                    }
                });
            });
        });
    }
}
