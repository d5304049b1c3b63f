use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Colour specifications: CSS names and hex strings
// ---------------------------------------------------------------------------

/// Colour used when a specification cannot be parsed.
pub const FALLBACK: Color32 = Color32::GRAY;

/// Parse a colour specification: a CSS/SVG colour name (`"blue"`,
/// `"magenta"`) or hex (`"#1f77b4"`, `"#fff"`).
pub fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();
    if value.starts_with('#') {
        let rgb = Srgb::<u8>::from_str(value).ok()?;
        return Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue));
    }
    let rgb = palette::named::from_str(&value.to_ascii_lowercase())?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// Like [`parse_color`], with [`FALLBACK`] for unknown specifications.
pub fn color_or_fallback(value: &str) -> Color32 {
    parse_color(value).unwrap_or_else(|| {
        log::debug!("Unknown colour {value:?}; using fallback");
        FALLBACK
    })
}

/// Hex form written back after the user picks a colour.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
