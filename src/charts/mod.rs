//! Charts module - Heatmap rendering

mod colormap;
mod plotter;
mod renderer;

pub use colormap::{coolwarm, ColorScale};
pub use plotter::{bucket_by_color, panel_title, HeatmapPanel, HeatmapPlotter, COLOR_BINS};
pub use renderer::{equal_aspect_ranges, padded_range, RenderError, StaticChartRenderer};
