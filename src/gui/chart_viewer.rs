//! Chart Viewer Widget
//! Central panel showing the heatmap panels side by side with a shared color bar.

use crate::charts::{ColorScale, HeatmapPanel, HeatmapPlotter};
use crate::data::GeoCenter;
use egui::{Color32, RichText};

const PANEL_SPACING: f32 = 15.0;
const COLORBAR_SPACE: f32 = 90.0;
const MIN_PLOT_HEIGHT: f32 = 300.0;

/// What the viewer currently displays.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapView {
    pub suptitle: String,
    pub panels: Vec<HeatmapPanel>,
    pub scale: ColorScale,
    pub center: Option<GeoCenter>,
}

/// Displays the latest generated heatmap.
#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<HeatmapView>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn set_view(&mut self, view: HeatmapView) {
        self.view = Some(view);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&view.suptitle).size(18.0).strong());
            if let Some(center) = view.center {
                ui.label(
                    RichText::new(format!(
                        "Centered on {:.6}, {:.6}",
                        center.latitude, center.longitude
                    ))
                    .size(11.0)
                    .color(Color32::GRAY),
                );
            }
        });
        ui.add_space(10.0);

        let count = view.panels.len().max(1) as f32;
        let avail = ui.available_size();
        let panel_width =
            ((avail.x - COLORBAR_SPACE - PANEL_SPACING * count) / count).max(200.0);
        let plot_height = (avail.y - 60.0).max(MIN_PLOT_HEIGHT);

        ui.horizontal_top(|ui| {
            for panel in &view.panels {
                ui.vertical(|ui| {
                    ui.set_width(panel_width);
                    HeatmapPlotter::draw_scatter(ui, panel, &view.scale, plot_height);
                });
                ui.add_space(PANEL_SPACING);
            }
            HeatmapPlotter::draw_colorbar(ui, &view.scale, plot_height * 0.8);
        });
    }
}
