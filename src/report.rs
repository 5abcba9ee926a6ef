/// Aggregation over entries and schedules: date filtering, totals and flat export rows.
use std::collections::BTreeMap;

use crate::duration::{
    duration_to_minutes, format_duration, minutes_to_duration, range_duration_minutes,
};
use crate::types::{Dated, Schedule, Shift, TimeEntry};

/// Keeps records dated within `start..=end`. ISO dates compare correctly as strings.
pub fn filter_by_date_range<T: Dated>(records: Vec<T>, start: &str, end: &str) -> Vec<T> {
    records
        .into_iter()
        .filter(|r| r.date() >= start && r.date() <= end)
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Effective worked minutes of a schedule.
///
/// Priority: the schedule's own custom duration, then the referenced shift's
/// custom duration, then the time range. The range comes from the schedule's
/// snapshot times, or the shift's times when the snapshot has none.
pub fn schedule_minutes(schedule: &Schedule, shifts: &[Shift]) -> u32 {
    if let Some(custom) = non_empty(&schedule.custom_duration) {
        return duration_to_minutes(custom);
    }
    let shift = shifts.iter().find(|s| s.id == schedule.selected_shift);
    if let Some(custom) = shift.and_then(|s| non_empty(&s.custom_duration)) {
        return duration_to_minutes(custom);
    }
    if !schedule.start_time.is_empty() && !schedule.end_time.is_empty() {
        return range_duration_minutes(&schedule.start_time, &schedule.end_time);
    }
    shift
        .map(|s| range_duration_minutes(&s.start_time, &s.end_time))
        .unwrap_or(0)
}

/// Minutes a shift template contributes when scheduled without overrides.
pub fn shift_minutes(shift: &Shift) -> u32 {
    match non_empty(&shift.custom_duration) {
        Some(custom) => duration_to_minutes(custom),
        None => range_duration_minutes(&shift.start_time, &shift.end_time),
    }
}

/// Sum of all worked minutes, saturating at `u32::MAX`.
pub fn total_minutes(entries: &[TimeEntry], schedules: &[Schedule], shifts: &[Shift]) -> u32 {
    entries
        .iter()
        .map(|e| e.duration)
        .chain(schedules.iter().map(|s| schedule_minutes(s, shifts)))
        .fold(0, u32::saturating_add)
}

/// Minutes per date, ordered by date.
pub fn daily_totals(
    entries: &[TimeEntry],
    schedules: &[Schedule],
    shifts: &[Shift],
) -> BTreeMap<String, u32> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        let total = totals.entry(entry.date.clone()).or_insert(0u32);
        *total = total.saturating_add(entry.duration);
    }
    for schedule in schedules {
        let total = totals.entry(schedule.date.clone()).or_insert(0u32);
        *total = total.saturating_add(schedule_minutes(schedule, shifts));
    }
    totals
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    TimeEntry,
    Schedule,
}

impl RowKind {
    pub fn label(&self) -> &'static str {
        match self {
            RowKind::TimeEntry => "Time Entry",
            RowKind::Schedule => "Schedule",
        }
    }
}

/// One flat report line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRow {
    pub kind: RowKind,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub minutes: u32,
    pub notes: String,
}

pub const EXPORT_COLUMNS: [&str; 7] = [
    "Type",
    "Date",
    "Start Time",
    "End Time",
    "Duration",
    "Minutes",
    "Notes",
];

impl ExportRow {
    fn from_entry(entry: &TimeEntry) -> Self {
        Self {
            kind: RowKind::TimeEntry,
            date: entry.date.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            duration: format_duration(minutes_to_duration(entry.duration)),
            minutes: entry.duration,
            notes: entry.notes.clone(),
        }
    }

    fn from_schedule(schedule: &Schedule, shifts: &[Shift]) -> Self {
        let minutes = schedule_minutes(schedule, shifts);
        let notes = match (schedule.title.is_empty(), schedule.notes.is_empty()) {
            (_, true) => schedule.title.clone(),
            (true, false) => schedule.notes.clone(),
            (false, false) => format!("{}: {}", schedule.title, schedule.notes),
        };
        Self {
            kind: RowKind::Schedule,
            date: schedule.date.clone(),
            start_time: schedule.start_time.clone(),
            end_time: schedule.end_time.clone(),
            duration: format_duration(minutes_to_duration(minutes)),
            minutes,
            notes,
        }
    }
}

/// Rows for entries followed by schedules, stable-sorted by (date, start time).
pub fn export_rows(
    entries: &[TimeEntry],
    schedules: &[Schedule],
    shifts: &[Shift],
) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = entries
        .iter()
        .map(ExportRow::from_entry)
        .chain(schedules.iter().map(|s| ExportRow::from_schedule(s, shifts)))
        .collect();
    rows.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));
    rows
}

/// Counts and total time for a set of records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub entries: usize,
    pub schedules: usize,
    pub shifts: usize,
    pub total_minutes: u32,
}

impl Summary {
    pub fn new(entries: &[TimeEntry], schedules: &[Schedule], shifts: &[Shift]) -> Self {
        Self {
            entries: entries.len(),
            schedules: schedules.len(),
            shifts: shifts.len(),
            total_minutes: total_minutes(entries, schedules, shifts),
        }
    }

    /// Total hours with one decimal, e.g. "7.5".
    pub fn total_hours_display(&self) -> String {
        format!("{:.1}", f64::from(self.total_minutes) / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShiftType;
    use pretty_assertions::assert_eq;

    fn shift(id: &str, start: &str, end: &str, custom: Option<&str>) -> Shift {
        Shift {
            id: id.into(),
            name: "Morning".into(),
            start_time: start.into(),
            end_time: end.into(),
            custom_duration: custom.map(str::to_string),
            shift_type: ShiftType::Day,
            custom_hue: None,
        }
    }

    fn schedule(date: &str, shift_id: &str, start: &str, end: &str) -> Schedule {
        Schedule {
            id: format!("{date}-{shift_id}"),
            date: date.into(),
            selected_shift: shift_id.into(),
            title: "Morning".into(),
            start_time: start.into(),
            end_time: end.into(),
            notes: String::new(),
            custom_duration: None,
        }
    }

    fn entry(id: &str, date: &str, start: &str, minutes: u32) -> TimeEntry {
        TimeEntry {
            id: id.into(),
            date: date.into(),
            start_time: start.into(),
            end_time: String::new(),
            duration: minutes,
            notes: String::new(),
            custom_hue: None,
        }
    }

    #[test]
    fn own_custom_duration_wins() {
        let shifts = vec![shift("s", "09:00", "17:00", Some("4h"))];
        let mut s = schedule("2024-01-01", "s", "09:00", "17:00");
        s.custom_duration = Some("1h30m".into());
        assert_eq!(schedule_minutes(&s, &shifts), 90);
    }

    #[test]
    fn blank_custom_duration_is_ignored() {
        let shifts = vec![shift("s", "09:00", "17:00", Some("4h"))];
        let mut s = schedule("2024-01-01", "s", "09:00", "17:00");
        s.custom_duration = Some("  ".into());
        assert_eq!(schedule_minutes(&s, &shifts), 240);
    }

    #[test]
    fn falls_back_to_snapshot_range() {
        let shifts = vec![shift("s", "09:00", "17:00", None)];
        let s = schedule("2024-01-01", "s", "09:00", "17:00");
        assert_eq!(schedule_minutes(&s, &shifts), 480);
    }

    #[test]
    fn deleted_shift_uses_snapshot_times() {
        let s = schedule("2024-01-01", "gone", "22:00", "06:00");
        assert_eq!(schedule_minutes(&s, &[]), 480);
    }

    #[test]
    fn empty_snapshot_uses_shift_times() {
        let shifts = vec![shift("s", "13:00", "18:00", None)];
        let s = schedule("2024-01-01", "s", "", "");
        assert_eq!(schedule_minutes(&s, &shifts), 300);
        assert_eq!(schedule_minutes(&s, &[]), 0);
    }

    #[test]
    fn totals_entries_and_schedules() {
        let shifts = vec![shift("s", "09:00", "17:00", None)];
        let schedules = vec![schedule("2024-01-02", "s", "09:00", "17:00")];
        let entries = vec![entry("e", "2024-01-02", "18:00", 45)];
        assert_eq!(total_minutes(&entries, &schedules, &shifts), 525);

        let daily = daily_totals(&entries, &schedules, &shifts);
        assert_eq!(daily.get("2024-01-02"), Some(&525));
    }

    #[test]
    fn huge_durations_saturate_instead_of_overflowing() {
        let mut a = schedule("2024-01-02", "s", "", "");
        a.custom_duration = Some("80000000h".into());
        let mut b = a.clone();
        b.id = "other".into();
        let schedules = vec![a, b];
        let entries = vec![entry("e", "2024-01-02", "09:00", 30)];

        assert_eq!(total_minutes(&entries, &schedules, &[]), u32::MAX);
        let daily = daily_totals(&entries, &schedules, &[]);
        assert_eq!(daily.get("2024-01-02"), Some(&u32::MAX));
    }

    #[test]
    fn filters_inclusive_range() {
        let entries = vec![
            entry("a", "2024-01-31", "09:00", 10),
            entry("b", "2024-02-01", "09:00", 10),
            entry("c", "2024-02-29", "09:00", 10),
            entry("d", "2024-03-01", "09:00", 10),
        ];
        let kept = filter_by_date_range(entries, "2024-02-01", "2024-02-29");
        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn rows_sort_by_date_then_start() {
        let shifts = vec![shift("s", "09:00", "17:00", None)];
        let entries = vec![
            entry("late", "2024-01-02", "18:00", 30),
            entry("early", "2024-01-01", "07:00", 60),
        ];
        let schedules = vec![schedule("2024-01-02", "s", "09:00", "17:00")];
        let rows = export_rows(&entries, &schedules, &shifts);
        let keys: Vec<(&str, &str, RowKind)> = rows
            .iter()
            .map(|r| (r.date.as_str(), r.start_time.as_str(), r.kind))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01", "07:00", RowKind::TimeEntry),
                ("2024-01-02", "09:00", RowKind::Schedule),
                ("2024-01-02", "18:00", RowKind::TimeEntry),
            ]
        );
        assert_eq!(rows[1].duration, "8h");
        assert_eq!(rows[1].minutes, 480);
        assert_eq!(rows[1].notes, "Morning");
    }

    #[test]
    fn ties_keep_collection_order() {
        let entries = vec![entry("e", "2024-01-01", "09:00", 30)];
        let schedules = vec![schedule("2024-01-01", "x", "09:00", "10:00")];
        let rows = export_rows(&entries, &schedules, &[]);
        assert_eq!(rows[0].kind, RowKind::TimeEntry);
        assert_eq!(rows[1].kind, RowKind::Schedule);
    }

    #[test]
    fn empty_summary_shows_zero_hours() {
        let summary = Summary::new(&[], &[], &[]);
        assert_eq!(summary.entries, 0);
        assert_eq!(summary.schedules, 0);
        assert_eq!(summary.total_hours_display(), "0.0");
    }

    #[test]
    fn summary_shows_fractional_hours() {
        let summary = Summary {
            total_minutes: 510,
            ..Summary::default()
        };
        assert_eq!(summary.total_hours_display(), "8.5");
    }
}
