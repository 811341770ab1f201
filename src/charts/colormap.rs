//! Color Scale Module
//! Maps pressure readings onto a diverging cool-to-warm color ramp.

use palette::{LinSrgb, Mix, Srgb};

/// Ramp anchors from cool (low pressure) through neutral gray to warm.
const COOLWARM_ANCHORS: [(u8, u8, u8); 5] = [
    (59, 76, 192),
    (124, 159, 249),
    (221, 221, 221),
    (244, 154, 123),
    (180, 4, 38),
];

/// Color for a normalized position `t` in `[0, 1]` on the cool-to-warm ramp.
pub fn coolwarm(t: f64) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let segments = (COOLWARM_ANCHORS.len() - 1) as f64;
    let scaled = t * segments;
    let idx = (scaled.floor() as usize).min(COOLWARM_ANCHORS.len() - 2);
    let local = (scaled - idx as f64) as f32;

    let start = linear(COOLWARM_ANCHORS[idx]);
    let end = linear(COOLWARM_ANCHORS[idx + 1]);
    let mixed: Srgb<u8> = Srgb::from_linear(start.mix(end, local));
    [mixed.red, mixed.green, mixed.blue]
}

fn linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    Srgb::new(r, g, b).into_linear()
}

/// Value range mapped onto the color ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`.
    /// Non-finite readings land on the neutral midpoint.
    pub fn normalize(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.5;
        }
        let span = (self.vmax - self.vmin).abs().max(1e-9);
        ((value - self.vmin) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> [u8; 3] {
        coolwarm(self.normalize(value))
    }

    /// Evenly spaced tick values from `vmin` to `vmax` inclusive.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.vmin],
            n => (0..n)
                .map(|i| self.vmin + (self.vmax - self.vmin) * i as f64 / (n - 1) as f64)
                .collect(),
        }
    }
}
