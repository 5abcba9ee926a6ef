use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::helpers::clamp_name;
use super::theme::Theme;
use crate::app::App;
use crate::duration::display_minutes;
use crate::report::{Summary, daily_totals};

/// Totals for the current week or month, then one line per worked day.
pub fn build_summary_text(app: &App) -> Text<'_> {
    let (entries, schedules) = app.summary_records();
    let summary = Summary::new(&entries, &schedules, &app.shifts);
    let (start, end) = app.summary_range.bounds(app.today);

    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {} ", app.summary_range.label()),
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("({start} to {end})"), Style::default().fg(Theme::dim())),
    ]));
    lines.push(Line::from(""));
    lines.push(metric_line("Time entries", summary.entries.to_string()));
    lines.push(metric_line("Scheduled shifts", summary.schedules.to_string()));
    lines.push(metric_line("Shift templates", summary.shifts.to_string()));
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<18}", "Total hours"), Style::default().fg(Theme::dim())),
        Span::styled(
            summary.total_hours_display(),
            Style::default()
                .fg(Theme::total())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ({})", display_minutes(summary.total_minutes)),
            Style::default().fg(Theme::dim()),
        ),
    ]));
    lines.push(Line::from(""));

    let daily = daily_totals(&entries, &schedules, &app.shifts);
    if daily.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nothing recorded in this range.",
            Style::default().fg(Theme::dim()),
        )));
        return Text::from(lines);
    }

    lines.push(Line::from(Span::styled(
        format!("  {:<12} {:>8}  {}", "Date", "Worked", "Shifts"),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    )));
    for (date, minutes) in daily {
        let titles = schedules
            .iter()
            .filter(|s| s.date == date)
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {date:<12} ")),
            Span::styled(
                format!("{:>8}", display_minutes(minutes)),
                Style::default().fg(Theme::total()),
            ),
            Span::raw("  "),
            Span::styled(clamp_name(&titles, 32), Style::default().fg(Theme::text())),
        ]));
    }
    Text::from(lines)
}

fn metric_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<18}"), Style::default().fg(Theme::dim())),
        Span::styled(value, Style::default().fg(Theme::accent())),
    ])
}
