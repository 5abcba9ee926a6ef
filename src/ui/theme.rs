use ratatui::style::Color;

/// Fixed palette for chrome; record colors come from `crate::color`.
pub struct Theme;

impl Theme {
    /// Header badge
    pub fn primary() -> Color {
        Color::Blue
    }

    /// Borders and column headers
    pub fn secondary() -> Color {
        Color::Cyan
    }

    /// Worked-time totals
    pub fn total() -> Color {
        Color::LightGreen
    }

    /// Status line messages
    pub fn warn() -> Color {
        Color::Yellow
    }

    pub fn highlight() -> Color {
        Color::Cyan
    }

    pub fn selection_marker() -> Color {
        Color::Green
    }

    pub fn dim() -> Color {
        Color::DarkGray
    }

    pub fn text() -> Color {
        Color::White
    }

    /// Section titles and counts
    pub fn accent() -> Color {
        Color::LightBlue
    }
}
