//! Pressure Heatmap - desktop viewer
//!
//! Pick a telemetry CSV, assign columns and display pressure heatmaps.

use eframe::egui;
use pressure_heatmap::gui::HeatmapApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 850.0])
            .with_min_inner_size([1100.0, 650.0])
            .with_title("Pressure Heatmap"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Pressure Heatmap",
        options,
        Box::new(|cc| Ok(Box::new(HeatmapApp::new(cc)))),
    )
}
