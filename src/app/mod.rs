mod state;

use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::KeyCode;

pub use state::{
    App, AssignField, AssignShiftPopup, ConfirmPopup, EntryField, NewEntryPopup, ShiftOption,
};

/// Possible input events the app reacts to.
pub enum AppEvent {
    Tick,
    KeyPress(KeyCode),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppView {
    Summary,
    Entries,
    Schedules,
    Shifts,
    Help,
}

/// Views reachable from the tab bar, in display order.
pub const TABS: [AppView; 5] = [
    AppView::Summary,
    AppView::Entries,
    AppView::Schedules,
    AppView::Shifts,
    AppView::Help,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusMode {
    TabBar,
    Content,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryRange {
    Week,
    Month,
}

impl SummaryRange {
    /// Inclusive `(start, end)` ISO dates of the range containing `today`.
    /// Weeks start on Monday.
    pub fn bounds(&self, today: NaiveDate) -> (String, String) {
        let (start, end) = match self {
            SummaryRange::Week => {
                let start = today - Duration::days(today.weekday().num_days_from_monday().into());
                (start, start + Duration::days(6))
            }
            SummaryRange::Month => {
                let start = today.with_day(1).unwrap_or(today);
                let next = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                };
                let end = next.and_then(|d| d.pred_opt()).unwrap_or(today);
                (start, end)
            }
        };
        (
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SummaryRange::Week => "this week",
            SummaryRange::Month => "this month",
        }
    }
}

/// What a confirmed delete removes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    Entry(String),
    Schedule(String),
    Shift(String),
}
