/// Record builders: turn raw user input into validated records.
///
/// Built records carry an empty id; the repositories assign one on insert.
use chrono::NaiveDate;
use thiserror::Error;

use crate::color::is_valid_hue;
use crate::duration::{display_minutes, duration_to_minutes, parse_time, range_duration_minutes};
use crate::types::{Schedule, Shift, ShiftType, TimeEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("'{0}' is not a valid time (expected HH:MM)")]
    InvalidTime(String),

    #[error("{0} time is required")]
    MissingTime(&'static str),

    #[error("Shift name is required")]
    MissingName,

    #[error("End time must be after start time")]
    EndNotAfterStart,

    #[error("Start and end time are the same")]
    EmptyRange,

    #[error("Hue {0} is out of range (0-360)")]
    InvalidHue(u16),

    #[error("Shift '{0}' not found")]
    UnknownShift(String),
}

fn check_date(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Normalises an optional time to `HH:MM`; empty input stays empty.
fn check_time(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    parse_time(value)
        .map(|time| time.format("%H:%M").to_string())
        .ok_or_else(|| ValidationError::InvalidTime(value.to_string()))
}

fn check_hue(hue: Option<u16>) -> Result<Option<u16>, ValidationError> {
    match hue {
        Some(h) if !is_valid_hue(h) => Err(ValidationError::InvalidHue(h)),
        other => Ok(other),
    }
}

fn clean_duration(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, Default)]
pub struct EntryForm {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub notes: String,
    pub custom_hue: Option<u16>,
    /// Overrides the minutes derived from start and end.
    pub custom_duration: Option<String>,
}

impl EntryForm {
    /// Prefills from a stored entry. A duration that differs from the
    /// start/end range is carried over as the custom duration.
    pub fn from_entry(entry: &TimeEntry) -> Self {
        let derived = range_duration_minutes(&entry.start_time, &entry.end_time);
        let custom_duration = (entry.duration != derived || entry.start_time == entry.end_time)
            .then(|| display_minutes(entry.duration));
        Self {
            date: entry.date.clone(),
            start_time: entry.start_time.clone(),
            end_time: entry.end_time.clone(),
            notes: entry.notes.clone(),
            custom_hue: entry.custom_hue,
            custom_duration,
        }
    }

    /// Entries may wrap past midnight; only an empty range is rejected.
    pub fn build(self) -> Result<TimeEntry, ValidationError> {
        let date = check_date(&self.date)?;
        let start_time = check_time(&self.start_time)?;
        let end_time = check_time(&self.end_time)?;
        if start_time.is_empty() {
            return Err(ValidationError::MissingTime("Start"));
        }
        if end_time.is_empty() {
            return Err(ValidationError::MissingTime("End"));
        }
        let duration = match clean_duration(self.custom_duration) {
            Some(custom) => duration_to_minutes(&custom),
            None => {
                if start_time == end_time {
                    return Err(ValidationError::EmptyRange);
                }
                range_duration_minutes(&start_time, &end_time)
            }
        };
        Ok(TimeEntry {
            id: String::new(),
            date,
            start_time,
            end_time,
            duration,
            notes: self.notes.trim().to_string(),
            custom_hue: check_hue(self.custom_hue)?,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ShiftForm {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub custom_duration: Option<String>,
    pub shift_type: ShiftType,
    pub custom_hue: Option<u16>,
}

impl ShiftForm {
    pub fn from_shift(shift: &Shift) -> Self {
        Self {
            name: shift.name.clone(),
            start_time: shift.start_time.clone(),
            end_time: shift.end_time.clone(),
            custom_duration: shift.custom_duration.clone(),
            shift_type: shift.shift_type,
            custom_hue: shift.custom_hue,
        }
    }

    /// A custom duration skips the time checks. Without one, overnight
    /// shifts may wrap and rest days may omit times; everything else must
    /// end after it starts.
    pub fn build(self) -> Result<Shift, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let start_time = check_time(&self.start_time)?;
        let end_time = check_time(&self.end_time)?;
        let custom_duration = clean_duration(self.custom_duration);

        if custom_duration.is_none() {
            let has_times = !start_time.is_empty() || !end_time.is_empty();
            if self.shift_type != ShiftType::Rest || has_times {
                check_shift_range(self.shift_type, &start_time, &end_time)?;
            }
        }

        Ok(Shift {
            id: String::new(),
            name,
            start_time,
            end_time,
            custom_duration,
            shift_type: self.shift_type,
            custom_hue: check_hue(self.custom_hue)?,
        })
    }
}

fn check_shift_range(shift_type: ShiftType, start: &str, end: &str) -> Result<(), ValidationError> {
    if start.is_empty() {
        return Err(ValidationError::MissingTime("Start"));
    }
    if end.is_empty() {
        return Err(ValidationError::MissingTime("End"));
    }
    if start == end {
        return Err(ValidationError::EmptyRange);
    }
    // HH:MM strings order the same way as the times they encode.
    if shift_type != ShiftType::Overnight && end < start {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok(())
}

#[derive(Clone, Debug, Default)]
pub struct ScheduleForm {
    pub date: String,
    pub shift_id: String,
    pub custom_duration: Option<String>,
    pub notes: String,
}

impl ScheduleForm {
    /// Snapshots the referenced shift's fields into a new schedule.
    pub fn build(self, shifts: &[Shift]) -> Result<Schedule, ValidationError> {
        let date = check_date(&self.date)?;
        let shift = shifts
            .iter()
            .find(|s| s.id == self.shift_id)
            .ok_or_else(|| ValidationError::UnknownShift(self.shift_id.clone()))?;
        Ok(Schedule {
            id: String::new(),
            date,
            selected_shift: shift.id.clone(),
            title: shift.name.clone(),
            start_time: shift.start_time.clone(),
            end_time: shift.end_time.clone(),
            notes: self.notes.trim().to_string(),
            custom_duration: clean_duration(self.custom_duration),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::schedule_minutes;
    use pretty_assertions::assert_eq;

    fn morning() -> Shift {
        ShiftForm {
            name: "Morning".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            shift_type: ShiftType::Day,
            ..ShiftForm::default()
        }
        .build()
        .map(|mut shift| {
            shift.id = "morning".into();
            shift
        })
        .unwrap()
    }

    #[test]
    fn entry_derives_duration() {
        let entry = EntryForm {
            date: "2024-04-02".into(),
            start_time: "9:30".into(),
            end_time: "12:00".into(),
            ..EntryForm::default()
        }
        .build()
        .unwrap();
        assert_eq!(entry.start_time, "09:30");
        assert_eq!(entry.duration, 150);
    }

    #[test]
    fn entry_wraps_past_midnight() {
        let entry = EntryForm {
            date: "2024-04-02".into(),
            start_time: "23:00".into(),
            end_time: "02:00".into(),
            ..EntryForm::default()
        }
        .build()
        .unwrap();
        assert_eq!(entry.duration, 180);
    }

    #[test]
    fn entry_rejects_bad_input() {
        let base = EntryForm {
            date: "2024-04-02".into(),
            start_time: "10:00".into(),
            end_time: "10:00".into(),
            ..EntryForm::default()
        };
        assert_eq!(base.clone().build(), Err(ValidationError::EmptyRange));
        assert_eq!(
            EntryForm {
                date: "02/04/2024".into(),
                ..base.clone()
            }
            .build(),
            Err(ValidationError::InvalidDate("02/04/2024".into()))
        );
        assert_eq!(
            EntryForm {
                end_time: "11:00".into(),
                custom_hue: Some(400),
                ..base
            }
            .build(),
            Err(ValidationError::InvalidHue(400))
        );
    }

    #[test]
    fn entry_custom_duration_overrides_range() {
        let entry = EntryForm {
            date: "2024-04-02".into(),
            start_time: "10:00".into(),
            end_time: "10:00".into(),
            custom_duration: Some("2h".into()),
            ..EntryForm::default()
        }
        .build()
        .unwrap();
        assert_eq!(entry.duration, 120);
    }

    #[test]
    fn prefill_carries_only_overridden_durations() {
        let mut entry = EntryForm {
            date: "2024-04-02".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
            ..EntryForm::default()
        }
        .build()
        .unwrap();
        assert_eq!(EntryForm::from_entry(&entry).custom_duration, None);

        entry.duration = 180;
        let form = EntryForm::from_entry(&entry);
        assert_eq!(form.custom_duration.as_deref(), Some("3h"));
        assert_eq!(form.build().unwrap().duration, 180);
    }

    #[test]
    fn shift_requires_name() {
        let result = ShiftForm {
            name: "   ".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            ..ShiftForm::default()
        }
        .build();
        assert_eq!(result, Err(ValidationError::MissingName));
    }

    #[test]
    fn day_shift_must_end_after_start() {
        let result = ShiftForm {
            name: "Late".into(),
            start_time: "22:00".into(),
            end_time: "06:00".into(),
            ..ShiftForm::default()
        }
        .build();
        assert_eq!(result, Err(ValidationError::EndNotAfterStart));
    }

    #[test]
    fn overnight_shift_may_wrap() {
        let shift = ShiftForm {
            name: "Night".into(),
            start_time: "22:00".into(),
            end_time: "06:00".into(),
            shift_type: ShiftType::Overnight,
            ..ShiftForm::default()
        }
        .build()
        .unwrap();
        assert_eq!(shift.shift_type, ShiftType::Overnight);
    }

    #[test]
    fn custom_duration_skips_time_checks() {
        let shift = ShiftForm {
            name: "On call".into(),
            custom_duration: Some(" 4h ".into()),
            shift_type: ShiftType::Special,
            ..ShiftForm::default()
        }
        .build()
        .unwrap();
        assert_eq!(shift.custom_duration.as_deref(), Some("4h"));
    }

    #[test]
    fn rest_day_without_times() {
        let shift = ShiftForm {
            name: "Off".into(),
            shift_type: ShiftType::Rest,
            ..ShiftForm::default()
        }
        .build()
        .unwrap();
        assert_eq!(shift.start_time, "");
    }

    #[test]
    fn schedule_snapshots_shift() {
        let shifts = vec![morning()];
        let schedule = ScheduleForm {
            date: "2024-04-03".into(),
            shift_id: "morning".into(),
            ..ScheduleForm::default()
        }
        .build(&shifts)
        .unwrap();
        assert_eq!(schedule.title, "Morning");
        assert_eq!(schedule.start_time, "09:00");
        assert_eq!(schedule.custom_duration, None);
        assert_eq!(schedule_minutes(&schedule, &shifts), 480);
    }

    #[test]
    fn schedule_needs_existing_shift() {
        let result = ScheduleForm {
            date: "2024-04-03".into(),
            shift_id: "ghost".into(),
            ..ScheduleForm::default()
        }
        .build(&[]);
        assert_eq!(result, Err(ValidationError::UnknownShift("ghost".into())));
    }

    #[test]
    fn schedule_override_beats_shift() {
        let shifts = vec![morning()];
        let schedule = ScheduleForm {
            date: "2024-04-03".into(),
            shift_id: "morning".into(),
            custom_duration: Some("6h".into()),
            ..ScheduleForm::default()
        }
        .build(&shifts)
        .unwrap();
        assert_eq!(schedule_minutes(&schedule, &shifts), 360);
    }
}
