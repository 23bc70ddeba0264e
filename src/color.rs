use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Index `i` always maps to the same colour for a given `n`, so a series
/// keeps its colour while the filter changes.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Heat ramp
// ---------------------------------------------------------------------------

/// Continuous ramp for the heat map: dark violet at 0, bright yellow at `max`.
pub fn heat_color(value: f64, max: f64) -> Color32 {
    let t = if max > 0.0 {
        (value / max).clamp(0.0, 1.0) as f32
    } else {
        0.0
    };
    hsl_to_color32(270.0 - 210.0 * t, 0.8, 0.2 + 0.45 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = generate_palette(6);
        assert_eq!(p.len(), 6);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn heat_ramp_ends_differ_and_degenerate_max_is_safe() {
        assert_ne!(heat_color(0.0, 10.0), heat_color(10.0, 10.0));
        assert_eq!(heat_color(5.0, 0.0), heat_color(0.0, 1.0));
        assert_eq!(heat_color(20.0, 10.0), heat_color(10.0, 10.0));
    }
}
