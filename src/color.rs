use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{SelectedTest, TestConfiguration};

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
// Series colours: (device, test name) → Color32
// ---------------------------------------------------------------------------

/// Colour identity of a plotted series. TX and RX of the same configuration
/// share a colour and are told apart by line style.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub device: String,
    pub test_name: String,
}

impl SeriesKey {
    pub fn of(sel: &SelectedTest<'_>) -> Self {
        Self {
            device: sel.device_name().to_string(),
            test_name: sel.test.test_name(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<SeriesKey, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// One distinct colour per distinct series key in the selection.
    pub fn for_selection(selected: &[SelectedTest<'_>]) -> Self {
        let keys: Vec<SeriesKey> = {
            let mut keys: Vec<SeriesKey> = selected.iter().map(SeriesKey::of).collect();
            keys.sort();
            keys.dedup();
            keys
        };
        let palette = generate_palette(keys.len());
        ColorMap {
            mapping: keys.into_iter().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, sel: &SelectedTest<'_>) -> Color32 {
        self.mapping
            .get(&SeriesKey::of(sel))
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// RX series are drawn dashed, everything else solid.
pub fn is_dashed(test: &TestConfiguration) -> bool {
    test.direction_label().contains("RX")
}
