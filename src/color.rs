/// Color derivation for shifts and time entries.
use crate::types::ShiftType;

pub const ENTRY_DEFAULT_HUE: u16 = 200;
pub const MAX_HUE: u16 = 360;

/// Display colors for a single record, as `#RRGGBB` strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTriple {
    pub background: String,
    pub border: String,
    pub text: String,
}

/// Validate if a string is a valid hex color (e.g., #RRGGBB).
pub fn is_valid_hex(s: &str) -> bool {
    s.starts_with('#') && s.len() == 7 && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_valid_hue(hue: u16) -> bool {
    hue <= MAX_HUE
}

pub fn default_hue(shift_type: ShiftType) -> u16 {
    match shift_type {
        ShiftType::Day => 210,
        ShiftType::Rest => 140,
        ShiftType::Overnight => 270,
        ShiftType::Special => 30,
    }
}

/// Colors for a shift or schedule; a custom hue wins over the type default.
pub fn shift_color(shift_type: ShiftType, custom_hue: Option<u16>) -> ColorTriple {
    triple(custom_hue.unwrap_or_else(|| default_hue(shift_type)))
}

pub fn entry_color(custom_hue: Option<u16>) -> ColorTriple {
    triple(custom_hue.unwrap_or(ENTRY_DEFAULT_HUE))
}

fn triple(hue: u16) -> ColorTriple {
    let hue = f64::from(hue.min(MAX_HUE) % MAX_HUE);
    ColorTriple {
        background: hsl_to_hex(hue, 0.70, 0.90),
        border: hsl_to_hex(hue, 0.60, 0.50),
        text: hsl_to_hex(hue, 0.70, 0.25),
    }
}

fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02X}{:02X}{:02X}", channel(r), channel(g), channel(b))
}
