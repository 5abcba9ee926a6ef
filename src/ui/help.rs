use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span, Text},
};

use super::theme::Theme;

pub fn build_help_text() -> Text<'static> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        "Key bindings",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(section_title("Global"));
    lines.extend(section_lines(&[
        "q: Quit",
        "?: Toggle help",
        "Tab: Toggle focus (tab bar / content)",
        "Left/Right: Navigate tabs (tab bar focus)",
        "Enter: Activate tab (tab bar focus)",
        "h/e/s/t: Summary, Entries, Schedules, Shifts",
        "r: Reload from disk",
        "esc: Back",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Lists"));
    lines.extend(section_lines(&["Up/Down: Move selection", "d: Delete selected (asks first)"]));

    lines.push(Line::from(""));
    lines.push(section_title("Summary"));
    lines.extend(section_lines(&["Shift+Tab: Toggle week/month range"]));

    lines.push(Line::from(""));
    lines.push(section_title("Create"));
    lines.extend(section_lines(&[
        "n: New time entry (summary/entries)",
        "a: Assign a shift to a day (summary/schedules)",
        "K/J: Move shift up/down (shifts)",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Popups"));
    lines.extend(section_lines(&[
        "New entry: Tab/Up/Down switch field, Enter save, Esc cancel",
        "Assign shift: Tab switch field, Up/Down pick shift, Enter save, Esc cancel",
        "Durations accept forms like 8h, 45m or 1h30m",
        "Confirm: y delete, n or Esc cancel",
    ]));

    lines.push(Line::from(""));
    lines.push(section_title("Sync"));
    lines.extend(section_lines(&[
        "Changes saved by another shiftbook session show up on the next tick",
    ]));

    Text::from(lines)
}

fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(Theme::secondary())
            .add_modifier(Modifier::BOLD),
    ))
}

fn section_lines(items: &[&str]) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  - {item}"),
                Style::default().fg(Theme::text()),
            ))
        })
        .collect()
}
