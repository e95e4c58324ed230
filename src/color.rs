use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::chart::spec::Rgb;

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
            to_color32(rgb)
        })
        .collect()
}

/// Colour of group `index` out of `n` groups.
pub fn group_color(index: usize, n: usize) -> Color32 {
    generate_palette(n.max(1))
        .get(index % n.max(1))
        .copied()
        .unwrap_or(Color32::LIGHT_BLUE)
}

// ---------------------------------------------------------------------------
// Sequential scale for heatmaps
// ---------------------------------------------------------------------------

/// Reversed inferno stops: pale for low counts, dark for high counts.
const HEAT_STOPS: [(u8, u8, u8); 5] = [
    (252, 255, 164),
    (249, 142, 9),
    (188, 55, 84),
    (87, 16, 110),
    (0, 0, 4),
];

/// Colour for `t` in `0.0..=1.0` on the heatmap scale.
pub fn sequential(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0) * (HEAT_STOPS.len() - 1) as f32;
    let lo = (t.floor() as usize).min(HEAT_STOPS.len() - 2);
    let frac = t - lo as f32;

    let linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = linear(HEAT_STOPS[lo]).mix(linear(HEAT_STOPS[lo + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

pub fn from_rgb(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}
