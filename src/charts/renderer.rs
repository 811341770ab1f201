//! Static Chart Renderer
//! Renders heatmap panels to PNG using plotters.
//!
//! Layout:
//! 1. Super-title centered at the top
//! 2. One panel per pressure port, side by side
//!    - scatter of centered positions colored by pressure, equal aspect
//!    - color bar strip labeled with the pressure unit

use crate::charts::colormap::ColorScale;
use crate::charts::HeatmapPanel;
use crate::config::{ConfigError, HeatmapConfig, COLORBAR_LABEL, X_AXIS_LABEL, Y_AXIS_LABEL};
use image::{ImageError, ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::io::Cursor;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

const FONT_SIZE_SUPTITLE: u32 = 26;
const FONT_SIZE_CHART_TITLE: u32 = 18;
const FONT_SIZE_AXIS_LABEL: u32 = 14;
const FONT_SIZE_MESSAGE: u32 = 20;

const COLORBAR_WIDTH: u32 = 110;
const COLORBAR_STEPS: usize = 100;
const CHART_MARGIN: u32 = 10;
const CAPTION_HEIGHT: u32 = 30;
const X_LABEL_AREA: u32 = 50;
const Y_LABEL_AREA: u32 = 70;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid heatmap settings: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] ImageError),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Nothing to render")]
    NoPanels,
    #[error("Figure of {panels} panels at {width}x{height} is too large to render")]
    TooLarge { panels: usize, width: u32, height: u32 },
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render panels side by side and encode the figure as PNG bytes.
    pub fn render_png(
        panels: &[HeatmapPanel],
        config: &HeatmapConfig,
        suptitle: &str,
    ) -> Result<Vec<u8>, RenderError> {
        config.validate()?;
        if panels.is_empty() {
            return Err(RenderError::NoPanels);
        }

        let height = config.height;
        let too_large = || RenderError::TooLarge {
            panels: panels.len(),
            width: config.width,
            height,
        };
        let width = u32::try_from(panels.len())
            .ok()
            .and_then(|n| config.width.checked_mul(n))
            .ok_or_else(too_large)?;
        let buffer_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(too_large)?;
        let mut buffer = vec![0u8; buffer_len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw_figure(&root, panels, config, suptitle)?;
            root.present().map_err(drawing)?;
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Drawing("pixel buffer size mismatch".to_string()))?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Render and write the PNG to `path`.
    pub fn save_png(
        path: &Path,
        panels: &[HeatmapPanel],
        config: &HeatmapConfig,
        suptitle: &str,
    ) -> Result<(), RenderError> {
        let bytes = Self::render_png(panels, config, suptitle)?;
        fs::write(path, bytes)?;
        log::info!("Heatmap saved as '{}'", path.display());
        Ok(())
    }

    fn draw_figure(
        root: &DrawingArea<BitMapBackend, Shift>,
        panels: &[HeatmapPanel],
        config: &HeatmapConfig,
        suptitle: &str,
    ) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(drawing)?;
        let body = root
            .titled(suptitle, ("sans-serif", FONT_SIZE_SUPTITLE).into_font())
            .map_err(drawing)?;

        let areas = body.split_evenly((1, panels.len()));
        for (area, panel) in areas.iter().zip(panels) {
            Self::draw_panel(area, panel, config)?;
        }
        Ok(())
    }

    fn draw_panel(
        area: &DrawingArea<BitMapBackend, Shift>,
        panel: &HeatmapPanel,
        config: &HeatmapConfig,
    ) -> Result<(), RenderError> {
        let scale = ColorScale::new(config.vmin, config.vmax);
        let (area_w, area_h) = area.dim_in_pixel();
        let (plot_area, bar_area) = area.split_horizontally(area_w.saturating_sub(COLORBAR_WIDTH));

        // Pixel size of the plotting rectangle, used to keep 1:1 aspect
        let (plot_w, _) = plot_area.dim_in_pixel();
        let inner_w = plot_w.saturating_sub(Y_LABEL_AREA + 2 * CHART_MARGIN);
        let inner_h = area_h.saturating_sub(CAPTION_HEIGHT + X_LABEL_AREA + 2 * CHART_MARGIN);

        let (x_range, y_range) = match panel.bounds() {
            Some((x, y)) => equal_aspect_ranges(padded_range(x), padded_range(y), inner_w, inner_h),
            None => equal_aspect_ranges(-1.0..1.0, -1.0..1.0, inner_w, inner_h),
        };

        let mut chart = ChartBuilder::on(&plot_area)
            .caption(&panel.title, ("sans-serif", FONT_SIZE_CHART_TITLE).into_font())
            .margin(CHART_MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing)?;

        chart
            .configure_mesh()
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .x_labels(10)
            .y_labels(10)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| format!("{:.0}", y))
            .light_line_style(BLACK.mix(0.04))
            .bold_line_style(BLACK.mix(0.12))
            .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL).into_font())
            .draw()
            .map_err(drawing)?;

        if panel.is_empty() {
            plot_area
                .draw(&Text::new(
                    "No data points",
                    ((plot_w / 2) as i32 - 60, (area_h / 2) as i32),
                    ("sans-serif", FONT_SIZE_MESSAGE)
                        .into_font()
                        .color(&BLACK.mix(0.6)),
                ))
                .map_err(drawing)?;
        } else {
            chart
                .draw_series(panel.positions.iter().zip(&panel.values).map(|(&[x, y], &v)| {
                    let [r, g, b] = scale.color(v);
                    Circle::new((x, y), config.point_radius, RGBColor(r, g, b).filled())
                }))
                .map_err(drawing)?;
        }

        Self::draw_colorbar(&bar_area, &scale)
    }

    fn draw_colorbar(
        area: &DrawingArea<BitMapBackend, Shift>,
        scale: &ColorScale,
    ) -> Result<(), RenderError> {
        let mut bar = ChartBuilder::on(area)
            .margin_top(CAPTION_HEIGHT + CHART_MARGIN)
            .margin_bottom(X_LABEL_AREA + CHART_MARGIN)
            .margin_right(CHART_MARGIN + 10)
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(0.0..1.0, scale.vmin..scale.vmax)
            .map_err(drawing)?;

        bar.configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .disable_x_axis()
            .y_desc(COLORBAR_LABEL)
            .y_labels(6)
            .y_label_formatter(&|v| format!("{:.0}", v))
            .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL).into_font())
            .draw()
            .map_err(drawing)?;

        let step = (scale.vmax - scale.vmin) / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|i| {
            let low = scale.vmin + step * i as f64;
            let high = low + step;
            let [r, g, b] = scale.color((low + high) / 2.0);
            Rectangle::new([(0.0, low), (1.0, high)], RGBColor(r, g, b).filled())
        }))
        .map_err(drawing)?;
        Ok(())
    }
}

/// Pad a data range by 5% on each side; a degenerate range gets ±1.
pub fn padded_range(range: Range<f64>) -> Range<f64> {
    let span = range.end - range.start;
    if span.abs() < 1e-9 {
        return (range.start - 1.0)..(range.end + 1.0);
    }
    let pad = span * 0.05;
    (range.start - pad)..(range.end + pad)
}

/// Widen one of the ranges so a data unit spans the same number of pixels
/// on both axes. Both ranges keep their centers.
pub fn equal_aspect_ranges(
    x: Range<f64>,
    y: Range<f64>,
    width_px: u32,
    height_px: u32,
) -> (Range<f64>, Range<f64>) {
    let w = width_px.max(1) as f64;
    let h = height_px.max(1) as f64;
    let x_span = (x.end - x.start).abs().max(1e-9);
    let y_span = (y.end - y.start).abs().max(1e-9);

    let units_per_px = (x_span / w).max(y_span / h);
    let half_x = units_per_px * w / 2.0;
    let half_y = units_per_px * h / 2.0;
    let cx = (x.start + x.end) / 2.0;
    let cy = (y.start + y.end) / 2.0;

    ((cx - half_x)..(cx + half_x), (cy - half_y)..(cy + half_y))
}
