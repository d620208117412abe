use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Continuous colour ramp for the heatmap: dark blue → teal → yellow,
/// `t` clamped to `[0, 1]`.
pub fn heat_color(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    // Sweep hue from 250° (blue) down to 60° (yellow), brightening as we go.
    let hue = 250.0 - 190.0 * t;
    let lightness = 0.25 + 0.4 * t;
    let hsl = Hsl::new(hue, 0.85, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color mapping: county name → Color32
// ---------------------------------------------------------------------------

/// Maps county names to distinct line colours for the trend chart.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map over a sorted list of county names.
    pub fn new(counties: &[String]) -> Self {
        let palette = generate_palette(counties.len());
        let mapping: BTreeMap<String, Color32> = counties
            .iter()
            .cloned()
            .zip(palette.into_iter())
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given county.
    pub fn color_for(&self, county: &str) -> Color32 {
        self.mapping
            .get(county)
            .copied()
            .unwrap_or(self.default_color)
    }
}
