//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::HeatmapApp;
pub use chart_viewer::{ChartViewer, HeatmapView};
pub use control_panel::{ControlPanel, ControlPanelAction, UserSettings};
