use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::{clamp_name, hex_to_color, marker, row_style};
use super::theme::Theme;
use crate::app::App;
use crate::color::shift_color;
use crate::duration::display_minutes;
use crate::report::schedule_minutes;

pub fn build_schedules_text(app: &App) -> Text<'_> {
    if app.schedules.is_empty() {
        return Text::from("Nothing scheduled. Press 'a' to assign a shift to a day.");
    }

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(
            "    {:<10} {:<20} {:<5} {:<5} {:>8}",
            "Date", "Shift", "Start", "End", "Worked"
        ),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));
    for (index, schedule) in app.schedules.iter().enumerate() {
        let selected = index == app.selected_schedule_index;
        let (arrow, arrow_style) = marker(selected);
        let shift = app.shifts.iter().find(|s| s.id == schedule.selected_shift);
        // A deleted template leaves the schedule without a type to color by.
        let swatch = match shift {
            Some(shift) => hex_to_color(&shift_color(shift.shift_type, shift.custom_hue).border)
                .map(|color| Style::default().fg(color))
                .unwrap_or_default(),
            None => Style::default().fg(Theme::dim()),
        };
        let mut spans = vec![
            Span::styled(arrow, arrow_style),
            Span::styled("■ ", swatch),
            Span::styled(
                format!(
                    "{:<10} {} {:<5} {:<5} ",
                    schedule.date,
                    clamp_name(&schedule.title, 20),
                    schedule.start_time,
                    schedule.end_time
                ),
                row_style(selected),
            ),
            Span::styled(
                format!("{:>8}", display_minutes(schedule_minutes(schedule, &app.shifts))),
                Style::default().fg(Theme::total()),
            ),
        ];
        if schedule.custom_duration.is_some() {
            spans.push(Span::styled(" *", Style::default().fg(Theme::warn())));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  * custom duration",
        Style::default().fg(Theme::dim()),
    )));
    Text::from(lines)
}
