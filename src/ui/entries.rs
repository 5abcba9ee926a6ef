use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, hex_to_color, marker, row_style};
use super::theme::Theme;
use crate::app::App;
use crate::color::entry_color;
use crate::duration::display_minutes;

pub fn build_entries_text(app: &App) -> Text<'_> {
    if app.entries.is_empty() {
        return Text::from("No time entries yet. Press 'n' to add one.");
    }

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(
            "    {:<10} {:<5} {:<5} {:>8}  {}",
            "Date", "Start", "End", "Worked", "Notes"
        ),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));
    for (index, entry) in app.entries.iter().enumerate() {
        let selected = index == app.selected_entry_index;
        let (arrow, arrow_style) = marker(selected);
        let swatch = hex_to_color(&entry_color(entry.custom_hue).border)
            .map(|color| Style::default().fg(color))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(arrow, arrow_style),
            Span::styled("■ ", swatch),
            Span::styled(
                format!(
                    "{:<10} {:<5} {:<5} ",
                    entry.date, entry.start_time, entry.end_time
                ),
                row_style(selected),
            ),
            Span::styled(
                format!("{:>8}", display_minutes(entry.duration)),
                Style::default().fg(Theme::total()),
            ),
            Span::raw("  "),
            Span::styled(clamp_name(&entry.notes, 36), Style::default().fg(Theme::text())),
        ]));
    }
    Text::from(lines)
}
