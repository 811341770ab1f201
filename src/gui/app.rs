//! Pressure Heatmap Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{ColorScale, HeatmapPanel, StaticChartRenderer};
use crate::config::HeatmapConfig;
use crate::data::{DataLoader, DataPreparer, DataPreview, Dataset, LapSelector};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, HeatmapView};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

const PREVIEW_ROWS: usize = 5;

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete {
        dataset: Dataset,
        preview: DataPreview,
        path: PathBuf,
    },
    Error(String),
}

/// Main application window.
pub struct HeatmapApp {
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl HeatmapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Handle CSV file selection; the file is read on a background thread
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.chart_viewer.clear();
            self.control_panel.settings.csv_path = Some(path.clone());
            self.control_panel.set_progress(0.0, "Loading CSV file...");
            self.is_loading = true;

            let (tx, rx) = channel();
            self.load_rx = Some(rx);

            thread::spawn(move || {
                let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));

                match DataLoader::read_csv(&path) {
                    Ok(dataset) => {
                        let preview = dataset.preview(PREVIEW_ROWS);
                        let _ = tx.send(LoadResult::Complete {
                            dataset,
                            preview,
                            path,
                        });
                    }
                    Err(e) => {
                        let _ = tx.send(LoadResult::Error(e.to_string()));
                    }
                }
            });
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_progress(0.0, &status);
                    }
                    LoadResult::Complete {
                        dataset,
                        preview,
                        path,
                    } => {
                        let columns = dataset.columns();
                        let row_count = dataset.height();
                        self.loader.set_dataset(dataset, path);
                        self.control_panel.update_columns(columns.clone(), preview);
                        self.control_panel.set_progress(
                            0.0,
                            &format!("Loaded {} rows, {} columns", row_count, columns.len()),
                        );
                        // A retained lap column needs its options for the new file
                        if !self.control_panel.settings.lap_col.is_empty() {
                            self.handle_lap_column_changed();
                        }
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        log::error!("CSV load failed: {}", error);
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Handle lap column change - update available laps
    fn handle_lap_column_changed(&mut self) {
        let lap_col = self.control_panel.settings.lap_col.clone();
        let Some(dataset) = self.loader.dataset() else {
            return;
        };
        match dataset.lap_options(&lap_col) {
            Ok(laps) => self.control_panel.update_laps(laps),
            Err(e) => {
                self.control_panel.update_laps(Vec::new());
                self.control_panel
                    .set_progress(0.0, &format!("Error: lap column '{}': {}", lap_col, e));
            }
        }
    }

    /// Run the pipeline on the current selection and show the result.
    fn handle_generate(&mut self) {
        self.control_panel.export_enabled = false;

        match self.build_view() {
            Ok(view) => {
                let count = view.panels.first().map(|p| p.values.len()).unwrap_or(0);
                self.chart_viewer.set_view(view);
                self.control_panel.export_enabled = true;
                self.control_panel
                    .set_progress(100.0, &format!("Complete! {} points plotted", count));
            }
            Err(message) => {
                self.chart_viewer.clear();
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", message));
            }
        }
    }

    fn build_view(&self) -> Result<HeatmapView, String> {
        let settings = &self.control_panel.settings;
        let dataset = self.loader.dataset().ok_or("No data loaded")?;
        let roles = settings
            .roles()
            .ok_or("Select latitude, longitude, pressure port and lap columns")?;
        let config = settings.heatmap_config();
        config.validate().map_err(|e| e.to_string())?;

        let prepared = DataPreparer::prepare(dataset, &roles, &settings.selected_lap)
            .map_err(|e| e.to_string())?;
        log::info!(
            "Prepared {} points for {}",
            prepared.len(),
            settings.selected_lap.label()
        );

        let panels = HeatmapPanel::from_prepared(&prepared);
        let suptitle = self.figure_suptitle(&config, &panels, &settings.selected_lap);
        Ok(HeatmapView {
            suptitle,
            panels,
            scale: ColorScale::new(config.vmin, config.vmax),
            center: prepared.center,
        })
    }

    fn figure_suptitle(
        &self,
        config: &HeatmapConfig,
        panels: &[HeatmapPanel],
        selector: &LapSelector,
    ) -> String {
        let source = self
            .loader
            .file_path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let ports: Vec<&str> = panels.iter().map(|p| p.port.as_str()).collect();
        config.figure_suptitle(&source, &ports, &selector.label())
    }

    /// Render the current heatmap to PNG and offer to open it
    fn handle_export_png(&mut self) {
        let Some(view) = &self.chart_viewer.view else {
            self.control_panel.set_progress(0.0, "No heatmap to export");
            return;
        };

        let default_name = self
            .loader
            .file_path()
            .and_then(|p| p.file_stem())
            .map(|s| format!("{}_heatmap.png", s.to_string_lossy()))
            .unwrap_or_else(|| "heatmap.png".to_string());

        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(&default_name)
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        self.control_panel.set_progress(50.0, "Rendering PNG...");
        let config = self.control_panel.settings.heatmap_config();

        match StaticChartRenderer::save_png(&output_path, &view.panels, &config, &view.suptitle) {
            Ok(()) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!("Complete! Saved {}", output_path.display()),
                );
                let open_it = rfd::MessageDialog::new()
                    .set_title("Export complete")
                    .set_description(format!("Saved {}. Open it now?", output_path.display()))
                    .set_buttons(rfd::MessageButtons::YesNo)
                    .show();
                if matches!(open_it, rfd::MessageDialogResult::Yes) {
                    if let Err(e) = open::that(&output_path) {
                        log::warn!("Could not open {}: {}", output_path.display(), e);
                    }
                }
            }
            Err(e) => {
                log::error!("PNG export failed: {}", e);
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn handle_load_preset(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Heatmap preset", &["json"])
            .pick_file()
        else {
            return;
        };

        match HeatmapConfig::from_json_file(&path) {
            Ok(preset) => {
                self.control_panel.settings.apply_preset(preset);
                self.control_panel
                    .set_progress(0.0, &format!("Loaded preset {}", path.display()));
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn handle_save_preset(&mut self) {
        let config = self.control_panel.settings.heatmap_config();
        if let Err(e) = config.validate() {
            self.control_panel.set_progress(0.0, &format!("Error: {}", e));
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Heatmap preset", &["json"])
            .set_file_name("heatmap_preset.json")
            .save_file()
        else {
            return;
        };

        match config.save_json_file(&path) {
            Ok(()) => self
                .control_panel
                .set_progress(0.0, &format!("Saved preset {}", path.display())),
            Err(e) => self
                .control_panel
                .set_progress(0.0, &format!("Error: {}", e)),
        }
    }
}

impl eframe::App for HeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(320.0)
            .max_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::LapColumnChanged => self.handle_lap_column_changed(),
                        ControlPanelAction::Generate => self.handle_generate(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::LoadPreset => self.handle_load_preset(),
                        ControlPanelAction::SavePreset => self.handle_save_preset(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
