use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::{DayPeriod, Season, Weather};

/// Accent used for single-series charts and KPI values.
pub const ACCENT: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);

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
            let hsl = Hsl::new(hue, 0.65, 0.6);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Fixed category colours
// ---------------------------------------------------------------------------

pub fn period_color(period: DayPeriod) -> Color32 {
    match period {
        DayPeriod::Night => Color32::from_rgb(0x06, 0x5f, 0x46),
        DayPeriod::Morning => Color32::from_rgb(0x16, 0xa3, 0x4a),
        DayPeriod::Afternoon => Color32::from_rgb(0x22, 0xc5, 0x5e),
        DayPeriod::Evening => Color32::from_rgb(0x4a, 0xde, 0x80),
    }
}

pub fn season_color(season: Season) -> Color32 {
    match season {
        Season::Spring => Color32::from_rgb(0x84, 0xcc, 0x16),
        Season::Summer => Color32::from_rgb(0x22, 0xc5, 0x5e),
        Season::Fall => Color32::from_rgb(0xfb, 0x92, 0x3c),
        Season::Winter => Color32::from_rgb(0x60, 0xa5, 0xfa),
    }
}

pub fn weather_color(weather: Weather) -> Color32 {
    match weather {
        Weather::Clear => Color32::from_rgb(0x22, 0xc5, 0x5e),
        Weather::Mist => Color32::from_rgb(0xfb, 0xbf, 0x24),
        Weather::LightPrecipitation => Color32::from_rgb(0xf8, 0x71, 0x71),
        Weather::HeavyPrecipitation => Color32::from_rgb(0xdc, 0x26, 0x26),
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for correlations
// ---------------------------------------------------------------------------

/// Blue (-1) → near-white (0) → red (+1), mixed in linear RGB.
/// Missing coefficients are drawn grey.
pub fn diverging(value: Option<f64>) -> Color32 {
    let Some(v) = value else {
        return Color32::from_gray(70);
    };
    let t = v.clamp(-1.0, 1.0) as f32;

    let blue: LinSrgb = Srgb::new(0.13f32, 0.40, 0.67).into_linear();
    let mid: LinSrgb = Srgb::new(0.97f32, 0.97, 0.97).into_linear();
    let red: LinSrgb = Srgb::new(0.70f32, 0.09, 0.17).into_linear();

    let mixed = if t < 0.0 { mid.mix(blue, -t) } else { mid.mix(red, t) };
    to_color32(Srgb::from_linear(mixed))
}

/// Black or white, whichever reads better on `bg`.
pub fn contrast_text(bg: Color32) -> Color32 {
    let luma = 0.299 * bg.r() as f32 + 0.587 * bg.g() as f32 + 0.114 * bg.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let colors = generate_palette(7);
        assert_eq!(colors.len(), 7);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_diverging_endpoints() {
        let neg = diverging(Some(-1.0));
        let zero = diverging(Some(0.0));
        let pos = diverging(Some(1.0));

        assert!(neg.b() > neg.r());
        assert!(pos.r() > pos.b());
        assert!(zero.r() > 230 && zero.g() > 230 && zero.b() > 230);
        assert_eq!(diverging(None), Color32::from_gray(70));
        assert_eq!(contrast_text(zero), Color32::BLACK);
    }
}
