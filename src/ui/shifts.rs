use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, hex_to_color, marker, row_style};
use super::theme::Theme;
use crate::app::App;
use crate::color::shift_color;
use crate::duration::display_minutes;
use crate::report::shift_minutes;

pub fn build_shifts_text(app: &App) -> Text<'_> {
    if app.shifts.is_empty() {
        return Text::from("No shift templates. Create one with `shiftbook shift add <name>`.");
    }

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(
            "    {:<20} {:<10} {:<5} {:<5} {:>8}",
            "Name", "Type", "Start", "End", "Length"
        ),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));
    for (index, shift) in app.shifts.iter().enumerate() {
        let selected = index == app.selected_shift_index;
        let (arrow, arrow_style) = marker(selected);
        let color = hex_to_color(&shift_color(shift.shift_type, shift.custom_hue).border);
        let swatch = color.map(|c| Style::default().fg(c)).unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(arrow, arrow_style),
            Span::styled("■ ", swatch),
            Span::styled(
                format!(
                    "{} {:<10} {:<5} {:<5} ",
                    clamp_name(&shift.name, 20),
                    shift.shift_type.label(),
                    shift.start_time,
                    shift.end_time
                ),
                row_style(selected),
            ),
            Span::styled(
                format!("{:>8}", display_minutes(shift_minutes(shift))),
                Style::default().fg(Theme::total()),
            ),
        ]));
    }
    Text::from(lines)
}
