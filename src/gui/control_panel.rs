//! Control Panel Widget
//! Left side panel with data source, column roles, lap and display settings.

use crate::config::{HeatmapConfig, ALL_LAPS_LABEL};
use crate::data::{ColumnRoles, DataPreview, LapSelector, LapValue};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

const LABEL_WIDTH: f32 = 110.0;
const COMBO_WIDTH: f32 = 160.0;
const NO_SECOND_PORT: &str = "(none)";

/// Column and display choices made by the user
#[derive(Default, Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub lat_col: String,
    pub lon_col: String,
    pub port_col: String,
    pub second_port_col: Option<String>,
    pub lap_col: String,
    pub selected_lap: LapSelector,
    /// Custom super-title; empty means "{port} Heatmap".
    pub title: String,
    pub config: HeatmapConfig,
}

impl UserSettings {
    /// Column roles as currently selected, or `None` while any required
    /// role is still unassigned.
    pub fn roles(&self) -> Option<ColumnRoles> {
        let required = [&self.lat_col, &self.lon_col, &self.port_col, &self.lap_col];
        if required.iter().any(|c| c.is_empty()) {
            return None;
        }
        let roles = ColumnRoles::new(&self.lat_col, &self.lon_col, &self.port_col, &self.lap_col);
        Some(match &self.second_port_col {
            Some(col) => roles.with_second_port(col),
            None => roles,
        })
    }

    /// Display config with the title field folded in.
    pub fn heatmap_config(&self) -> HeatmapConfig {
        let title = self.title.trim();
        HeatmapConfig {
            title: (!title.is_empty()).then(|| title.to_string()),
            ..self.config.clone()
        }
    }

    /// Take display settings from a loaded preset.
    pub fn apply_preset(&mut self, preset: HeatmapConfig) {
        self.title = preset.title.clone().unwrap_or_default();
        self.config = preset;
    }
}

/// Left side control panel with file selection and heatmap controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub columns: Vec<String>,
    pub lap_options: Vec<LapValue>,
    pub preview: Option<DataPreview>,
    pub progress: f32,
    pub status: String,
    pub generate_enabled: bool,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            columns: Vec::new(),
            lap_options: Vec::new(),
            preview: None,
            progress: 0.0,
            status: "Ready".to_string(),
            generate_enabled: false,
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update available columns after CSV load.
    ///
    /// Previous role choices survive when the new file has the same column.
    pub fn update_columns(&mut self, columns: Vec<String>, preview: DataPreview) {
        let keep = |col: &mut String| {
            if !columns.contains(col) {
                col.clear();
            }
        };
        keep(&mut self.settings.lat_col);
        keep(&mut self.settings.lon_col);
        keep(&mut self.settings.port_col);
        keep(&mut self.settings.lap_col);
        if let Some(col) = &self.settings.second_port_col {
            if !columns.contains(col) {
                self.settings.second_port_col = None;
            }
        }

        self.generate_enabled = !columns.is_empty();
        self.export_enabled = false;
        self.columns = columns;
        self.preview = Some(preview);
        self.lap_options.clear();
        self.settings.selected_lap = LapSelector::All;
    }

    /// Update the lap choices for the selected lap column
    pub fn update_laps(&mut self, laps: Vec<LapValue>) {
        let still_valid = match &self.settings.selected_lap {
            LapSelector::All => true,
            LapSelector::Lap(text) => laps.iter().any(|l| l.to_string() == *text),
        };
        if !still_valid {
            self.settings.selected_lap = LapSelector::All;
        }
        self.lap_options = laps;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌡 Pressure Heatmap")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("GPS telemetry viewer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        if let Some(preview) = &self.preview {
            ui.add_space(8.0);
            egui::CollapsingHeader::new("Data Preview")
                .default_open(true)
                .show(ui, |ui| Self::show_preview(ui, preview));
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Column Configuration Section =====
        ui.label(RichText::new("🔧 Column Configuration").size(14.0).strong());
        ui.add_space(8.0);

        Self::column_combo(ui, "lat_col", "Latitude:", &self.columns, &mut self.settings.lat_col);
        ui.add_space(5.0);
        Self::column_combo(ui, "lon_col", "Longitude:", &self.columns, &mut self.settings.lon_col);
        ui.add_space(5.0);
        Self::column_combo(ui, "port_col", "Pressure Port:", &self.columns, &mut self.settings.port_col);
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Second Port:"));
            let selected = self
                .settings
                .second_port_col
                .clone()
                .unwrap_or_else(|| NO_SECOND_PORT.to_string());
            ComboBox::from_id_salt("second_port_col")
                .width(COMBO_WIDTH)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.settings.second_port_col, None, NO_SECOND_PORT);
                    for col in &self.columns {
                        ui.selectable_value(
                            &mut self.settings.second_port_col,
                            Some(col.clone()),
                            col,
                        );
                    }
                });
        });
        ui.add_space(5.0);

        if Self::column_combo(ui, "lap_col", "Lap Column:", &self.columns, &mut self.settings.lap_col) {
            action = ControlPanelAction::LapColumnChanged;
        }
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Lap:"));
            ComboBox::from_id_salt("selected_lap")
                .width(COMBO_WIDTH)
                .selected_text(match &self.settings.selected_lap {
                    LapSelector::All => ALL_LAPS_LABEL.to_string(),
                    LapSelector::Lap(lap) => lap.clone(),
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.settings.selected_lap, LapSelector::All, ALL_LAPS_LABEL);
                    for lap in &self.lap_options {
                        let text = lap.to_string();
                        ui.selectable_value(
                            &mut self.settings.selected_lap,
                            LapSelector::Lap(text.clone()),
                            text,
                        );
                    }
                });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Display Section =====
        ui.label(RichText::new("🎨 Display").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Title:"));
            let hint = if self.settings.port_col.is_empty() {
                "{port} Heatmap".to_string()
            } else {
                format!("{} Heatmap", self.settings.port_col)
            };
            ui.add(
                egui::TextEdit::singleline(&mut self.settings.title)
                    .hint_text(hint)
                    .desired_width(COMBO_WIDTH),
            );
        });
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Scale Min:"));
            ui.add(egui::DragValue::new(&mut self.settings.config.vmin).speed(1.0));
            ui.label("mbar");
        });
        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Scale Max:"));
            ui.add(egui::DragValue::new(&mut self.settings.config.vmax).speed(1.0));
            ui.label("mbar");
        });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Load Preset").clicked() {
                action = ControlPanelAction::LoadPreset;
            }
            if ui.small_button("Save Preset").clicked() {
                action = ControlPanelAction::SavePreset;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.generate_enabled, |ui| {
                let button = egui::Button::new(RichText::new("▶ Generate Heatmap").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Generate;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.export_enabled, |ui| {
                let png_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Column picker row. Returns true when the selection changed.
    fn column_combo(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        columns: &[String],
        selected: &mut String,
    ) -> bool {
        let mut changed = false;
        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(COMBO_WIDTH)
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for col in columns {
                        if ui.selectable_label(*selected == *col, col).clicked() && *selected != *col {
                            *selected = col.clone();
                            changed = true;
                        }
                    }
                });
        });
        changed
    }

    fn show_preview(ui: &mut egui::Ui, preview: &DataPreview) {
        ScrollArea::horizontal().max_height(140.0).show(ui, |ui| {
            egui::Grid::new("data_preview")
                .striped(true)
                .min_col_width(50.0)
                .show(ui, |ui| {
                    for header in &preview.headers {
                        ui.label(RichText::new(header).size(11.0).strong());
                    }
                    ui.end_row();
                    for row in &preview.rows {
                        for cell in row {
                            ui.label(RichText::new(cell).size(11.0));
                        }
                        ui.end_row();
                    }
                });
        });
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    LapColumnChanged,
    Generate,
    ExportPng,
    LoadPreset,
    SavePreset,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> UserSettings {
        UserSettings {
            lat_col: "lat".into(),
            lon_col: "lon".into(),
            port_col: "P1".into(),
            lap_col: "lap".into(),
            ..Default::default()
        }
    }

    #[test]
    fn roles_need_every_required_column() {
        let mut s = settings();
        assert!(s.roles().is_some());
        s.lap_col.clear();
        assert!(s.roles().is_none());
    }

    #[test]
    fn second_port_flows_into_roles() {
        let s = UserSettings {
            second_port_col: Some("P2".into()),
            ..settings()
        };
        let roles = s.roles().unwrap();
        assert_eq!(roles.second_port.as_deref(), Some("P2"));
    }

    #[test]
    fn blank_title_leaves_config_title_unset() {
        let mut s = settings();
        s.title = "   ".into();
        assert!(s.heatmap_config().title.is_none());
        s.title = "Front wing".into();
        assert_eq!(s.heatmap_config().title.as_deref(), Some("Front wing"));
    }

    #[test]
    fn new_columns_reset_missing_roles() {
        let mut panel = ControlPanel::new();
        panel.settings = settings();
        panel.settings.selected_lap = LapSelector::Lap("2".into());
        let preview = DataPreview {
            headers: vec!["lat".into(), "lon".into()],
            rows: Vec::new(),
        };
        panel.update_columns(vec!["lat".into(), "lon".into()], preview);
        assert_eq!(panel.settings.lat_col, "lat");
        assert!(panel.settings.port_col.is_empty());
        assert_eq!(panel.settings.selected_lap, LapSelector::All);
        assert!(panel.generate_enabled);
    }

    #[test]
    fn stale_lap_selection_falls_back_to_all() {
        let mut panel = ControlPanel::new();
        panel.settings.selected_lap = LapSelector::Lap("9".into());
        panel.update_laps(vec![LapValue::Integer(1), LapValue::Integer(2)]);
        assert_eq!(panel.settings.selected_lap, LapSelector::All);

        panel.settings.selected_lap = LapSelector::Lap("2".into());
        panel.update_laps(vec![LapValue::Integer(2)]);
        assert_eq!(panel.settings.selected_lap, LapSelector::Lap("2".into()));
    }
}
