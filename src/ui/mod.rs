mod entries;
mod help;
mod helpers;
mod schedules;
mod shifts;
mod summary;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::app::{
    App, AppView, AssignField, AssignShiftPopup, ConfirmPopup, EntryField, FocusMode,
    NewEntryPopup, ShiftOption, TABS,
};
use crate::color::shift_color;
use theme::Theme;

use helpers::hex_to_color;

/// Renders the entire UI for a single frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let (title, body_text) = match app.view {
        AppView::Summary => (" Summary ", summary::build_summary_text(app)),
        AppView::Entries => (" Time Entries ", entries::build_entries_text(app)),
        AppView::Schedules => (" Schedule ", schedules::build_schedules_text(app)),
        AppView::Shifts => (" Shifts ", shifts::build_shifts_text(app)),
        AppView::Help => (" Help ", help::build_help_text()),
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    let header_lines = vec![Line::from(vec![
        Span::styled(
            "  Shiftbook  ",
            Style::default().fg(Color::Black).bg(Theme::primary()),
        ),
        Span::raw(" "),
        Span::styled(
            "hours & shifts",
            Style::default()
                .fg(Theme::secondary())
                .add_modifier(Modifier::BOLD),
        ),
    ])];
    let header = Paragraph::new(Text::from(header_lines))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(header, layout[0]);

    let mut body_lines = vec![
        tabs_line(app),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {title}"),
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    body_lines.extend(body_text.lines);
    body_lines.push(Line::from(""));
    body_lines.push(Line::from(Span::styled(
        "----------------------------------------",
        Style::default().fg(Theme::dim()),
    )));
    body_lines.extend(keybinds_lines(app));
    let body = Paragraph::new(Text::from(body_lines))
        .style(Style::default().fg(Theme::text()))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(body, layout[1]);

    let footer = Paragraph::new(Text::from(status_line(app)))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Theme::secondary())),
        );
    frame.render_widget(footer, layout[2]);

    if let Some(popup) = &app.new_entry_popup {
        render_new_entry_popup(frame, popup);
    }
    if let Some(popup) = &app.assign_popup {
        render_assign_popup(frame, popup);
    }
    if let Some(popup) = &app.confirm_popup {
        render_confirm_popup(frame, popup);
    }
}

fn field_styles(active: bool) -> (Style, Style) {
    if active {
        let style = Style::default()
            .fg(Theme::highlight())
            .add_modifier(Modifier::BOLD);
        (style, style)
    } else {
        (
            Style::default().fg(Theme::dim()),
            Style::default().fg(Theme::text()),
        )
    }
}

fn input_line<'a>(label: &'a str, value: &'a str, placeholder: &'a str, active: bool) -> Line<'a> {
    let arrow_style = Style::default()
        .fg(Theme::selection_marker())
        .add_modifier(Modifier::BOLD);
    let (title_style, value_style) = field_styles(active);
    let value = if value.is_empty() && !active {
        Span::styled(placeholder, Style::default().fg(Theme::dim()))
    } else {
        Span::styled(value, value_style)
    };
    Line::from(vec![
        Span::styled(if active { "> " } else { "  " }, arrow_style),
        Span::styled(label, title_style),
        value,
    ])
}

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Theme::secondary()))
        .title(title)
}

fn render_new_entry_popup(frame: &mut Frame, popup: &NewEntryPopup) {
    let area = centered_rect(60, 55, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "New time entry",
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        input_line("Date:     ", &popup.date, "YYYY-MM-DD", popup.field == EntryField::Date),
        input_line("Start:    ", &popup.start_time, "HH:MM", popup.field == EntryField::Start),
        input_line("End:      ", &popup.end_time, "HH:MM", popup.field == EntryField::End),
        input_line(
            "Duration: ",
            &popup.duration,
            "from start/end",
            popup.field == EntryField::Duration,
        ),
        input_line("Notes:    ", &popup.notes, "", popup.field == EntryField::Notes),
        Line::from(""),
        Line::from(Span::styled(
            "Tab: next field. Enter: save. Esc: cancel.",
            Style::default().fg(Theme::dim()),
        )),
    ];

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .block(popup_block(" New Entry ")),
        area,
    );
}

fn shift_option_line(option: &ShiftOption, selected: bool, active: bool) -> Line<'_> {
    let marker_style = if selected {
        Style::default()
            .fg(Theme::selection_marker())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Theme::dim())
    };
    let mut name_style = hex_to_color(&shift_color(option.shift_type, option.custom_hue).border)
        .map(|color| Style::default().fg(color))
        .unwrap_or_else(|| Style::default().fg(Theme::text()));
    if selected || active {
        name_style = name_style.add_modifier(Modifier::BOLD);
    }
    Line::from(vec![
        Span::styled(if selected { "  > " } else { "    " }, marker_style),
        Span::styled(option.name.as_str(), name_style),
        Span::styled(
            format!("  {}", option.shift_type.label()),
            Style::default().fg(Theme::dim()),
        ),
    ])
}

fn render_assign_popup(frame: &mut Frame, popup: &AssignShiftPopup) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let shift_active = popup.field == AssignField::Shift;
    let (shift_title_style, _) = field_styles(shift_active);
    let arrow_style = Style::default()
        .fg(Theme::selection_marker())
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        "Assign shift",
        Style::default()
            .fg(Theme::accent())
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(input_line(
        "Date:     ",
        &popup.date,
        "YYYY-MM-DD",
        popup.field == AssignField::Date,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(if shift_active { "> " } else { "  " }, arrow_style),
        Span::styled("Shift", shift_title_style),
    ]));
    for (index, option) in popup.shifts.iter().enumerate() {
        lines.push(shift_option_line(option, index == popup.shift_index, shift_active));
    }
    lines.push(Line::from(""));
    lines.push(input_line(
        "Duration: ",
        &popup.duration,
        "from shift",
        popup.field == AssignField::Duration,
    ));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab: switch field. Up/Down: pick shift. Enter: save. Esc: cancel.",
        Style::default().fg(Theme::dim()),
    )));

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .block(popup_block(" Assign ")),
        area,
    );
}

fn render_confirm_popup(frame: &mut Frame, popup: &ConfirmPopup) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let key_style = Style::default()
        .fg(Theme::highlight())
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(Span::styled(
            "Confirm delete",
            Style::default()
                .fg(Theme::accent())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            popup.message.as_str(),
            Style::default().fg(Theme::text()),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Theme::dim())),
            Span::styled("Y", key_style),
            Span::styled(" to confirm or ", Style::default().fg(Theme::dim())),
            Span::styled("N", key_style),
            Span::styled("/", Style::default().fg(Theme::dim())),
            Span::styled("ESC", key_style),
            Span::styled(" to cancel", Style::default().fg(Theme::dim())),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(popup_block(" Confirm ")),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn tab_name(view: &AppView) -> &'static str {
    match view {
        AppView::Summary => "Summary",
        AppView::Entries => "Entries",
        AppView::Schedules => "Schedule",
        AppView::Shifts => "Shifts",
        AppView::Help => "Help",
    }
}

fn tabs_line(app: &App) -> Line<'_> {
    let mut spans = Vec::new();
    for (index, view) in TABS.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
        }
        let active = *view == app.view;
        let focused = app.focus_mode == FocusMode::TabBar && app.selected_tab_index == index;
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Theme::highlight())
                .add_modifier(Modifier::BOLD)
        } else if focused {
            Style::default()
                .fg(Theme::highlight())
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Theme::dim())
        };
        spans.push(Span::styled(format!(" {} ", tab_name(view)), style));
    }

    Line::from(spans)
}

fn status_line(app: &App) -> Line<'_> {
    if let Some(status) = &app.status {
        return Line::from(Span::styled(
            format!("● {status}"),
            Style::default()
                .fg(Theme::warn())
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(Span::styled(
        format!(
            "● {} entries, {} scheduled, {} shifts",
            app.entries.len(),
            app.schedules.len(),
            app.shifts.len()
        ),
        Style::default().fg(Theme::dim()),
    ))
}

fn keybinds_lines(app: &App) -> Vec<Line<'static>> {
    let focus_hint = if app.focus_mode == FocusMode::TabBar {
        "Tab: Switch to content  ←/→: Navigate tabs  Enter: Select"
    } else {
        "Tab: Switch to tab bar  h/e/s/t: Quick nav"
    };

    let (primary, secondary) = match app.view {
        AppView::Summary => (
            "n: New entry  a: Assign shift  Shift+Tab: Week/Month",
            "r: Reload  ?: Help  q: Quit",
        ),
        AppView::Entries => (
            "Up/Down: Select  n: New entry  d: Delete",
            "esc: Back  r: Reload  ?: Help  q: Quit",
        ),
        AppView::Schedules => (
            "Up/Down: Select  a: Assign shift  d: Delete",
            "esc: Back  r: Reload  ?: Help  q: Quit",
        ),
        AppView::Shifts => (
            "Up/Down: Select  K/J: Move  d: Delete",
            "esc: Back  r: Reload  ?: Help  q: Quit",
        ),
        AppView::Help => ("Press ? or ESC to close this help screen", ""),
    };
    vec![
        Line::from(Span::styled(
            focus_hint,
            Style::default().fg(Theme::highlight()),
        )),
        Line::from(Span::styled(primary, Style::default().fg(Theme::dim()))),
        Line::from(Span::styled(secondary, Style::default().fg(Theme::dim()))),
    ]
}
