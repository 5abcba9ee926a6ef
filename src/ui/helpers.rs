use ratatui::style::{Color, Modifier, Style};

use super::theme::Theme;
use crate::color::is_valid_hex;

pub fn clamp_name(value: &str, width: usize) -> String {
    let value_len = value.chars().count();
    if value_len <= width {
        return format!("{value:<width$}", width = width);
    }
    let trimmed = value
        .chars()
        .take(width.saturating_sub(2))
        .collect::<String>();
    format!("{trimmed}..")
}

/// Converts a `#RRGGBB` string to a terminal color.
pub fn hex_to_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if !is_valid_hex(value) {
        return None;
    }
    let r = u8::from_str_radix(&value[1..3], 16).ok()?;
    let g = u8::from_str_radix(&value[3..5], 16).ok()?;
    let b = u8::from_str_radix(&value[5..7], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

pub fn marker(selected: bool) -> (&'static str, Style) {
    if selected {
        ("> ", Style::default().fg(Theme::selection_marker()))
    } else {
        ("  ", Style::default().fg(Theme::dim()))
    }
}

pub fn row_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(hex_to_color("#1A2b3C"), Some(Color::Rgb(0x1A, 0x2B, 0x3C)));
        assert_eq!(hex_to_color("1A2B3C"), None);
        assert_eq!(hex_to_color("#12345"), None);
    }

    #[test]
    fn clamps_long_names() {
        assert_eq!(clamp_name("Morning", 9), "Morning  ");
        assert_eq!(clamp_name("Overnight cover", 8), "Overni..");
    }
}
