use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// First hue, matching the blue of the single-series charts.
const START_HUE: f32 = 210.0;

/// `n` colours for filled chart areas (stacked bars, pie slices).  Hues are
/// evenly spaced from `START_HUE`; lightness alternates so that neighbouring
/// slices stay apart when `n` is large.
pub fn series_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = START_HUE + (i as f32 / n as f32) * 360.0;
            let lightness = if i % 2 == 0 { 0.50 } else { 0.62 };
            let rgb: Srgb = Hsl::new(hue, 0.60, lightness).into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours: chart label → Color32
// ---------------------------------------------------------------------------

/// Assigns each series label (damage level, weather condition, …) its own
/// colour.  The same label keeps its colour across re-runs as long as the
/// label set does not change.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl SeriesColors {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        let palette = series_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        SeriesColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = series_palette(5);
        assert_eq!(p.len(), 5);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(series_palette(0).is_empty());
    }

    #[test]
    fn first_colour_is_blue() {
        let first = series_palette(3)[0];
        assert!(first.b() > first.r() && first.b() > first.g());
    }

    #[test]
    fn unknown_label_gets_default() {
        let colors = SeriesColors::new(["Destroyed", "Minor"]);
        assert_ne!(colors.color_for("Destroyed"), colors.color_for("Minor"));
        assert_eq!(colors.color_for("Unknown"), Color32::GRAY);
    }
}
