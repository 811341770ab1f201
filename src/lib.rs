//! Pressure Heatmap - GPS-referenced pressure visualization for telemetry CSVs
//!
//! Reads a telemetry CSV, maps columns to roles (latitude, longitude,
//! pressure port, lap), filters to one lap or all laps, centers the GPS
//! positions and draws the pressure readings as a color-coded scatter.
//!
//! ## Module Structure
//!
//! - [`data`] - CSV loading, column roles and the preparation pipeline
//! - [`config`] - Presentation settings and JSON presets
//! - [`charts`] - Color scale, interactive plots and static PNG rendering
//! - [`gui`] - Desktop viewer built on eframe
//!   - `control_panel` - File, column, lap and display controls
//!   - `chart_viewer` - Heatmap panels with a shared color bar

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
