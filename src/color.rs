use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::CellValue;

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

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a categorical column to distinct colours, for
/// scatter colour-grouping and box-plot groups.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from a column's distinct values.
    pub fn new(unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<CellValue, Color32> = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging ramp for correlation values
// ---------------------------------------------------------------------------

/// Map a correlation in [-1, 1] to a diverging blue/red ramp: white at zero,
/// saturated blue at +1, saturated red at -1.
pub fn diverging_color(value: f64) -> Color32 {
    let value = value.clamp(-1.0, 1.0);
    if value >= 0.0 {
        let intensity = (value * 255.0) as u8;
        Color32::from_rgb(255 - intensity, 255 - intensity, 255)
    } else {
        let intensity = (-value * 255.0) as u8;
        Color32::from_rgb(255, 255 - intensity, 255 - intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size() {
        assert_eq!(generate_palette(5).len(), 5);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_color_map_distinct_values() {
        let values = BTreeSet::from([
            CellValue::Text("A".to_string()),
            CellValue::Text("B".to_string()),
        ]);
        let map = ColorMap::new(&values);
        let a = map.color_for(&CellValue::Text("A".to_string()));
        let b = map.color_for(&CellValue::Text("B".to_string()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_diverging_ramp_endpoints() {
        assert_eq!(diverging_color(0.0), Color32::from_rgb(255, 255, 255));
        assert_eq!(diverging_color(1.0), Color32::from_rgb(0, 0, 255));
        assert_eq!(diverging_color(-1.0), Color32::from_rgb(255, 0, 0));
    }
}
