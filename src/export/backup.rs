/// Whole-store JSON backup: export, validation and import.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::db::{Batch, Collection, Store, import_merge};
use crate::types::{Schedule, Shift, TimeEntry};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid backup file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid backup file: missing '{0}'")]
    MissingField(&'static str),

    #[error("Invalid backup file: '{0}' must be an array")]
    NotAnArray(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub time_entries: Vec<TimeEntry>,
    pub schedules: Vec<Schedule>,
    /// Absent in a file means "leave stored shifts alone".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_shifts: Option<Vec<Shift>>,
    #[serde(default)]
    pub export_date: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportMode {
    #[default]
    Overwrite,
    Merge,
}

/// Collection sizes after an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub entries: usize,
    pub schedules: usize,
    pub shifts: usize,
}

pub fn export_backup(store: &Store) -> Backup {
    Backup {
        time_entries: store.get(Collection::TimeEntries),
        schedules: store.get(Collection::Schedules),
        custom_shifts: Some(store.get(Collection::CustomShifts)),
        export_date: Utc::now().to_rfc3339(),
    }
}

pub fn write_backup(path: &Path, backup: &Backup) -> Result<()> {
    let json = serde_json::to_string_pretty(backup)?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write backup to {}", path.display()))?;
    info!(
        path = %path.display(),
        entries = backup.time_entries.len(),
        schedules = backup.schedules.len(),
        "backup written"
    );
    Ok(())
}

/// Validates the layout before decoding: `timeEntries` and `schedules` must
/// be arrays, `customShifts` is optional.
pub fn parse_backup(text: &str) -> Result<Backup, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    for key in [Collection::TimeEntries.key(), Collection::Schedules.key()] {
        match value.get(key) {
            None => return Err(ImportError::MissingField(key)),
            Some(field) if !field.is_array() => return Err(ImportError::NotAnArray(key)),
            Some(_) => {}
        }
    }
    let shifts_key = Collection::CustomShifts.key();
    if let Some(field) = value.get(shifts_key) {
        if !field.is_null() && !field.is_array() {
            return Err(ImportError::NotAnArray(shifts_key));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Writes a parsed backup into the store in one transaction. Overwrite
/// replaces entries and schedules; merge keeps existing records on id
/// collisions. Repeated ids in the backup keep their first occurrence.
pub fn import_backup(store: &Store, backup: Backup, mode: ImportMode) -> Result<ImportStats> {
    let (entries, schedules, shifts) = match mode {
        ImportMode::Overwrite => (
            import_merge(Vec::new(), backup.time_entries, |e: &TimeEntry| e.id.as_str()),
            import_merge(Vec::new(), backup.schedules, |s: &Schedule| s.id.as_str()),
            backup
                .custom_shifts
                .map(|incoming| import_merge(Vec::new(), incoming, |s: &Shift| s.id.as_str())),
        ),
        ImportMode::Merge => {
            let entries = import_merge(
                store.get(Collection::TimeEntries),
                backup.time_entries,
                |e: &TimeEntry| e.id.as_str(),
            );
            let schedules = import_merge(
                store.get(Collection::Schedules),
                backup.schedules,
                |s: &Schedule| s.id.as_str(),
            );
            let shifts = backup.custom_shifts.map(|incoming| {
                import_merge(store.get(Collection::CustomShifts), incoming, |s: &Shift| {
                    s.id.as_str()
                })
            });
            (entries, schedules, shifts)
        }
    };

    let mut batch = Batch::default();
    batch.set(Collection::TimeEntries, &entries)?;
    batch.set(Collection::Schedules, &schedules)?;
    let shift_count = match &shifts {
        Some(shifts) => {
            batch.set(Collection::CustomShifts, shifts)?;
            shifts.len()
        }
        None => store.get::<Shift>(Collection::CustomShifts).len(),
    };
    store.commit(batch)?;

    let stats = ImportStats {
        entries: entries.len(),
        schedules: schedules.len(),
        shifts: shift_count,
    };
    info!(?mode, ?stats, "backup imported");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store;
    use crate::types::ShiftType;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, notes: &str) -> TimeEntry {
        TimeEntry {
            id: id.into(),
            date: "2024-06-01".into(),
            start_time: "09:00".into(),
            end_time: "11:00".into(),
            duration: 120,
            notes: notes.into(),
            custom_hue: None,
        }
    }

    fn shift(id: &str) -> Shift {
        Shift {
            id: id.into(),
            name: "Morning".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            custom_duration: None,
            shift_type: ShiftType::Day,
            custom_hue: None,
        }
    }

    #[test]
    fn export_then_parse() {
        let store = memory_store();
        store.set(Collection::TimeEntries, &[entry("1", "a")]).unwrap();
        store.set(Collection::CustomShifts, &[shift("s")]).unwrap();

        let backup = export_backup(&store);
        assert!(chrono::DateTime::parse_from_rfc3339(&backup.export_date).is_ok());

        let text = serde_json::to_string(&backup).unwrap();
        assert!(text.contains("\"exportDate\""));
        assert_eq!(parse_backup(&text).unwrap(), backup);
    }

    #[test]
    fn rejects_missing_required_keys() {
        let err = parse_backup(r#"{"timeEntries": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingField("schedules")));

        let err = parse_backup(r#"{"timeEntries": {}, "schedules": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::NotAnArray("timeEntries")));

        let err = parse_backup("not json").unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson(_)));
    }

    #[test]
    fn overwrite_without_shifts_keeps_stored_shifts() {
        let store = memory_store();
        store.set(Collection::TimeEntries, &[entry("old", "")]).unwrap();
        store.set(Collection::CustomShifts, &[shift("keep")]).unwrap();

        let backup = parse_backup(r#"{"timeEntries": [], "schedules": []}"#).unwrap();
        let stats = import_backup(&store, backup, ImportMode::Overwrite).unwrap();

        assert_eq!(
            stats,
            ImportStats {
                entries: 0,
                schedules: 0,
                shifts: 1
            }
        );
        assert!(store.get::<TimeEntry>(Collection::TimeEntries).is_empty());
        assert_eq!(store.get::<Shift>(Collection::CustomShifts), vec![shift("keep")]);
    }

    #[test]
    fn overwrite_drops_repeated_ids() {
        let store = memory_store();
        let backup = Backup {
            time_entries: vec![entry("x", "first"), entry("x", "second"), entry("y", "")],
            schedules: Vec::new(),
            custom_shifts: Some(vec![shift("s"), shift("s")]),
            export_date: String::new(),
        };
        let stats = import_backup(&store, backup, ImportMode::Overwrite).unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.shifts, 1);

        let entries: Vec<TimeEntry> = store.get(Collection::TimeEntries);
        assert_eq!(entries, vec![entry("x", "first"), entry("y", "")]);
        assert_eq!(store.get::<Shift>(Collection::CustomShifts), vec![shift("s")]);
    }

    #[test]
    fn import_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.db");
        let store = crate::db::init(&path).unwrap();
        store.set(Collection::TimeEntries, &[entry("old", "")]).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_schedules BEFORE INSERT ON storage
             WHEN NEW.key = 'schedules'
             BEGIN SELECT RAISE(ABORT, 'schedules are read-only'); END;",
        )
        .unwrap();

        let backup = Backup {
            time_entries: vec![entry("new", "")],
            schedules: Vec::new(),
            custom_shifts: None,
            export_date: String::new(),
        };
        assert!(import_backup(&store, backup, ImportMode::Overwrite).is_err());
        assert_eq!(
            store.get::<TimeEntry>(Collection::TimeEntries),
            vec![entry("old", "")]
        );
    }

    #[test]
    fn merge_keeps_existing_records() {
        let store = memory_store();
        store
            .set(Collection::TimeEntries, &[entry("1", "mine")])
            .unwrap();

        let backup = Backup {
            time_entries: vec![entry("1", "theirs"), entry("2", "theirs")],
            schedules: Vec::new(),
            custom_shifts: Some(vec![shift("s")]),
            export_date: String::new(),
        };
        let stats = import_backup(&store, backup, ImportMode::Merge).unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.shifts, 1);

        let entries: Vec<TimeEntry> = store.get(Collection::TimeEntries);
        assert_eq!(entries, vec![entry("1", "mine"), entry("2", "theirs")]);
    }

    #[test]
    fn failed_parse_writes_nothing() {
        let store = memory_store();
        store.set(Collection::TimeEntries, &[entry("1", "")]).unwrap();
        assert!(parse_backup(r#"{"schedules": []}"#).is_err());
        assert_eq!(store.get::<TimeEntry>(Collection::TimeEntries).len(), 1);
    }

    #[test]
    fn backup_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let store = memory_store();
        store.set(Collection::TimeEntries, &[entry("1", "x")]).unwrap();

        let backup = export_backup(&store);
        write_backup(&path, &backup).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(parse_backup(&text).unwrap(), backup);
    }
}
