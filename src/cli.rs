/// CLI argument parsing and command handling.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::AppConfig;
use crate::db::{self, Store};
use crate::duration::{display_minutes, parse_duration};
use crate::export::{self, ImportMode};
use crate::forms::{EntryForm, ScheduleForm, ShiftForm};
use crate::report::{Summary, daily_totals, schedule_minutes, shift_minutes};
use crate::types::{EntryQuery, ScheduleQuery, Shift, ShiftType};

const EARLIEST_DATE: &str = "0000-01-01";
const LATEST_DATE: &str = "9999-12-31";

#[derive(Parser)]
#[command(
    name = "shiftbook",
    version,
    about = "Shiftbook - A terminal-based time tracker and shift planner"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Path to the database file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recorded time entries
    Entry {
        #[command(subcommand)]
        command: EntryCommand,
    },
    /// Reusable shift templates
    Shift {
        #[command(subcommand)]
        command: ShiftCommand,
    },
    /// Shifts assigned to dates
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    /// Counts and worked hours, optionally within a date range
    Summary {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
    /// Restore a JSON backup
    Import {
        path: PathBuf,
        /// Keep existing records and add new ones instead of overwriting
        #[arg(long)]
        merge: bool,
    },
    /// Show how a duration string is read, e.g. "1h30m"
    Duration { text: String },
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    Add {
        date: String,
        start: String,
        end: String,
        #[arg(short = 'n', long = "notes", default_value = "")]
        notes: String,
        #[arg(long = "hue")]
        hue: Option<u16>,
        #[arg(short = 'd', long = "duration")]
        duration: Option<String>,
    },
    List {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Edit {
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(short = 's', long = "start")]
        start: Option<String>,
        #[arg(short = 'e', long = "end")]
        end: Option<String>,
        #[arg(short = 'n', long = "notes")]
        notes: Option<String>,
        #[arg(long = "hue")]
        hue: Option<u16>,
        /// Custom duration; an empty value goes back to the start/end range
        #[arg(short = 'd', long = "duration")]
        duration: Option<String>,
    },
    Rm {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ShiftCommand {
    Add {
        name: String,
        #[arg(short = 's', long = "start", default_value = "")]
        start: String,
        #[arg(short = 'e', long = "end", default_value = "")]
        end: String,
        #[arg(short = 'd', long = "duration")]
        duration: Option<String>,
        #[arg(short = 't', long = "type")]
        shift_type: Option<ShiftType>,
        #[arg(long = "hue")]
        hue: Option<u16>,
    },
    List,
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 's', long = "start")]
        start: Option<String>,
        #[arg(short = 'e', long = "end")]
        end: Option<String>,
        #[arg(short = 'd', long = "duration")]
        duration: Option<String>,
        #[arg(short = 't', long = "type")]
        shift_type: Option<ShiftType>,
        #[arg(long = "hue")]
        hue: Option<u16>,
    },
    Rm {
        id: String,
    },
    /// Change a shift's position in the list
    Move {
        id: String,
        index: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    Add {
        date: String,
        /// Shift id or name
        shift: String,
        #[arg(short = 'd', long = "duration")]
        duration: Option<String>,
        #[arg(short = 'n', long = "notes", default_value = "")]
        notes: String,
    },
    List {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Move to another date or change the override; an empty duration clears it
    Edit {
        id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(short = 'd', long = "duration")]
        duration: Option<String>,
        #[arg(short = 'n', long = "notes")]
        notes: Option<String>,
    },
    Rm {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExportCommand {
    /// Full JSON backup
    Json { path: PathBuf },
    /// Spreadsheet report
    Xlsx {
        path: PathBuf,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
}

/// Execute a CLI command.
pub fn run(command: Command, store: &Store, config: &AppConfig) -> Result<()> {
    debug!(?command, "running command");
    match command {
        Command::Entry { command } => run_entry(command, store),
        Command::Shift { command } => run_shift(command, store, config),
        Command::Schedule { command } => run_schedule(command, store),
        Command::Summary { from, to } => handle_summary(from, to, store),
        Command::Export {
            command: ExportCommand::Json { path },
        } => handle_export_json(config.export_path(&path), store),
        Command::Export {
            command: ExportCommand::Xlsx { path, from, to },
        } => handle_export_xlsx(config.export_path(&path), from, to, store),
        Command::Import { path, merge } => handle_import(path, merge, store),
        Command::Duration { text } => {
            let parsed = parse_duration(&text);
            println!(
                "{}h {}m ({} minutes)",
                parsed.hours,
                parsed.minutes,
                parsed.total_minutes()
            );
            Ok(())
        }
    }
}

fn run_entry(command: EntryCommand, store: &Store) -> Result<()> {
    match command {
        EntryCommand::Add {
            date,
            start,
            end,
            notes,
            hue,
            duration,
        } => {
            let form = EntryForm {
                date,
                start_time: start,
                end_time: end,
                notes,
                custom_hue: hue,
                custom_duration: duration,
            };
            match form.build() {
                Ok(entry) => {
                    let entry = db::create_entry(entry, store)?;
                    println!("Added entry {} ({})", entry.id, display_minutes(entry.duration));
                }
                Err(err) => println!("{err}"),
            }
        }
        EntryCommand::List { from, to } => {
            let Some(bounds) = parse_range(from, to) else {
                return Ok(());
            };
            let entries = db::query_entries(bounds.entry_query(), store);
            if entries.is_empty() {
                println!("No time entries found.");
            }
            for entry in entries {
                println!(
                    "{}  {} {}-{}  {:>7}  {}",
                    entry.id,
                    entry.date,
                    entry.start_time,
                    entry.end_time,
                    display_minutes(entry.duration),
                    entry.notes
                );
            }
        }
        EntryCommand::Edit {
            id,
            date,
            start,
            end,
            notes,
            hue,
            duration,
        } => {
            let Some(existing) = db::query_entry_by_id(&id, store) else {
                println!("Entry '{id}' not found");
                return Ok(());
            };
            let mut form = EntryForm::from_entry(&existing);
            if let Some(date) = date {
                form.date = date;
            }
            if let Some(start) = start {
                form.start_time = start;
            }
            if let Some(end) = end {
                form.end_time = end;
            }
            if let Some(notes) = notes {
                form.notes = notes;
            }
            if hue.is_some() {
                form.custom_hue = hue;
            }
            if duration.is_some() {
                form.custom_duration = duration;
            }
            match form.build() {
                Ok(mut entry) => {
                    entry.id = existing.id;
                    db::update_entry(entry, store)?;
                    println!("Updated entry '{id}'");
                }
                Err(err) => println!("{err}"),
            }
        }
        EntryCommand::Rm { id } => {
            if db::delete_entry(&id, store)? {
                println!("Deleted entry '{id}'");
            } else {
                println!("Entry '{id}' not found");
            }
        }
    }
    Ok(())
}

fn run_shift(command: ShiftCommand, store: &Store, config: &AppConfig) -> Result<()> {
    match command {
        ShiftCommand::Add {
            name,
            start,
            end,
            duration,
            shift_type,
            hue,
        } => {
            let shift_type = match shift_type {
                Some(shift_type) => shift_type,
                None => config.shift_type()?,
            };
            let form = ShiftForm {
                name,
                start_time: start,
                end_time: end,
                custom_duration: duration,
                shift_type,
                custom_hue: hue,
            };
            match form.build() {
                Ok(shift) => {
                    let shift = db::create_shift(shift, store)?;
                    println!("Added shift '{}' ({})", shift.name, shift.id);
                }
                Err(err) => println!("{err}"),
            }
        }
        ShiftCommand::List => {
            let shifts = db::query_shifts(store);
            if shifts.is_empty() {
                println!("No shifts defined.");
            }
            for (index, shift) in shifts.iter().enumerate() {
                println!(
                    "{index:>2}. {}  {:<20} {:<10} {}-{}  {}",
                    shift.id,
                    shift.name,
                    shift.shift_type.label(),
                    shift.start_time,
                    shift.end_time,
                    display_minutes(shift_minutes(shift))
                );
            }
        }
        ShiftCommand::Edit {
            id,
            name,
            start,
            end,
            duration,
            shift_type,
            hue,
        } => {
            let Some(existing) = db::query_shift_by_id(&id, store) else {
                println!("Shift '{id}' not found");
                return Ok(());
            };
            let mut form = ShiftForm::from_shift(&existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(start) = start {
                form.start_time = start;
            }
            if let Some(end) = end {
                form.end_time = end;
            }
            if duration.is_some() {
                form.custom_duration = duration;
            }
            if let Some(shift_type) = shift_type {
                form.shift_type = shift_type;
            }
            if hue.is_some() {
                form.custom_hue = hue;
            }
            match form.build() {
                Ok(mut shift) => {
                    shift.id = existing.id;
                    db::update_shift(shift, store)?;
                    println!("Updated shift '{id}'");
                }
                Err(err) => println!("{err}"),
            }
        }
        ShiftCommand::Rm { id } => {
            if db::delete_shift(&id, store)? {
                let orphaned = db::query_schedules(ScheduleQuery::ByShift(id.clone()), store);
                println!("Deleted shift '{id}'");
                if !orphaned.is_empty() {
                    println!(
                        "{} scheduled day(s) keep their copied times.",
                        orphaned.len()
                    );
                }
            } else {
                println!("Shift '{id}' not found");
            }
        }
        ShiftCommand::Move { id, index } => {
            if db::move_shift(&id, index, store)? {
                println!("Moved shift '{id}'");
            } else {
                println!("Shift '{id}' not found");
            }
        }
    }
    Ok(())
}

/// Finds a shift by id, then by case-insensitive name.
fn resolve_shift(key: &str, shifts: &[Shift]) -> Result<String, String> {
    if let Some(shift) = shifts.iter().find(|s| s.id == key) {
        return Ok(shift.id.clone());
    }
    let matches: Vec<&Shift> = shifts
        .iter()
        .filter(|s| s.name.eq_ignore_ascii_case(key))
        .collect();
    match matches.as_slice() {
        [] => Err(format!("Shift '{key}' not found")),
        [shift] => Ok(shift.id.clone()),
        _ => Err(format!(
            "Multiple shifts are named '{key}', use the shift id instead"
        )),
    }
}

fn run_schedule(command: ScheduleCommand, store: &Store) -> Result<()> {
    match command {
        ScheduleCommand::Add {
            date,
            shift,
            duration,
            notes,
        } => {
            let shifts = db::query_shifts(store);
            let shift_id = match resolve_shift(&shift, &shifts) {
                Ok(id) => id,
                Err(message) => {
                    println!("{message}");
                    return Ok(());
                }
            };
            let form = ScheduleForm {
                date,
                shift_id,
                custom_duration: duration,
                notes,
            };
            match form.build(&shifts) {
                Ok(schedule) => {
                    let schedule = db::create_schedule(schedule, store)?;
                    println!(
                        "Scheduled '{}' on {} ({})",
                        schedule.title,
                        schedule.date,
                        display_minutes(schedule_minutes(&schedule, &shifts))
                    );
                }
                Err(err) => println!("{err}"),
            }
        }
        ScheduleCommand::List { from, to } => {
            let Some(bounds) = parse_range(from, to) else {
                return Ok(());
            };
            let shifts = db::query_shifts(store);
            let schedules = db::query_schedules(bounds.schedule_query(), store);
            if schedules.is_empty() {
                println!("No scheduled shifts found.");
            }
            for schedule in schedules {
                println!(
                    "{}  {}  {:<20} {}-{}  {:>7}  {}",
                    schedule.id,
                    schedule.date,
                    schedule.title,
                    schedule.start_time,
                    schedule.end_time,
                    display_minutes(schedule_minutes(&schedule, &shifts)),
                    schedule.notes
                );
            }
        }
        ScheduleCommand::Edit {
            id,
            date,
            duration,
            notes,
        } => {
            let Some(mut schedule) = db::query_schedules(ScheduleQuery::All, store)
                .into_iter()
                .find(|s| s.id == id)
            else {
                println!("Schedule '{id}' not found");
                return Ok(());
            };
            if let Some(date) = date {
                match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
                    Ok(parsed) => schedule.date = parsed.format("%Y-%m-%d").to_string(),
                    Err(_) => {
                        println!("'{date}' is not a valid date (expected YYYY-MM-DD)");
                        return Ok(());
                    }
                }
            }
            if let Some(duration) = duration {
                let duration = duration.trim().to_string();
                schedule.custom_duration = (!duration.is_empty()).then_some(duration);
            }
            if let Some(notes) = notes {
                schedule.notes = notes.trim().to_string();
            }
            db::update_schedule(schedule, store)?;
            println!("Updated schedule '{id}'");
        }
        ScheduleCommand::Rm { id } => {
            if db::delete_schedule(&id, store)? {
                println!("Deleted schedule '{id}'");
            } else {
                println!("Schedule '{id}' not found");
            }
        }
    }
    Ok(())
}

fn handle_summary(from: Option<String>, to: Option<String>, store: &Store) -> Result<()> {
    let Some(bounds) = parse_range(from, to) else {
        return Ok(());
    };
    let shifts = db::query_shifts(store);
    let entries = db::query_entries(bounds.entry_query(), store);
    let schedules = db::query_schedules(bounds.schedule_query(), store);
    let summary = Summary::new(&entries, &schedules, &shifts);

    println!("Time entries:     {}", summary.entries);
    println!("Scheduled shifts: {}", summary.schedules);
    println!("Shift templates:  {}", summary.shifts);
    println!(
        "Total:            {}h ({} minutes)",
        summary.total_hours_display(),
        summary.total_minutes
    );
    let daily = daily_totals(&entries, &schedules, &shifts);
    if !daily.is_empty() {
        println!();
    }
    for (date, minutes) in daily {
        println!("{date}  {:>7}", display_minutes(minutes));
    }
    Ok(())
}

fn handle_export_json(path: PathBuf, store: &Store) -> Result<()> {
    let backup = export::export_backup(store);
    export::write_backup(&path, &backup)?;
    println!(
        "Exported {} entries, {} schedules to {}",
        backup.time_entries.len(),
        backup.schedules.len(),
        path.display()
    );
    Ok(())
}

fn handle_export_xlsx(
    path: PathBuf,
    from: Option<String>,
    to: Option<String>,
    store: &Store,
) -> Result<()> {
    let Some(bounds) = parse_range(from, to) else {
        return Ok(());
    };
    let shifts = db::query_shifts(store);
    let entries = db::query_entries(bounds.entry_query(), store);
    let schedules = db::query_schedules(bounds.schedule_query(), store);
    export::write_report(&path, &entries, &schedules, &shifts)?;
    println!("Report written to {}", path.display());
    Ok(())
}

fn handle_import(path: PathBuf, merge: bool, store: &Store) -> Result<()> {
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let backup = match export::parse_backup(&text) {
        Ok(backup) => backup,
        Err(err) => {
            println!("{err}");
            return Ok(());
        }
    };
    let mode = if merge {
        ImportMode::Merge
    } else {
        ImportMode::Overwrite
    };
    let stats = export::import_backup(store, backup, mode)?;
    println!(
        "Import complete: {} entries, {} schedules, {} shifts stored",
        stats.entries, stats.schedules, stats.shifts
    );
    Ok(())
}

/// Inclusive `--from/--to` bounds. Without either flag every record is
/// selected, including imported ones with an empty or malformed date.
#[derive(Debug, Default, PartialEq, Eq)]
struct DateBounds {
    from: Option<String>,
    to: Option<String>,
}

impl DateBounds {
    fn range(&self) -> Option<(String, String)> {
        if self.from.is_none() && self.to.is_none() {
            return None;
        }
        Some((
            self.from.clone().unwrap_or_else(|| EARLIEST_DATE.to_string()),
            self.to.clone().unwrap_or_else(|| LATEST_DATE.to_string()),
        ))
    }

    fn entry_query(&self) -> EntryQuery {
        match self.range() {
            Some((from, to)) => EntryQuery::ByRange(from, to),
            None => EntryQuery::All,
        }
    }

    fn schedule_query(&self) -> ScheduleQuery {
        match self.range() {
            Some((from, to)) => ScheduleQuery::ByRange(from, to),
            None => ScheduleQuery::All,
        }
    }
}

/// Validates optional `--from/--to` dates, printing a message when invalid.
fn parse_range(from: Option<String>, to: Option<String>) -> Option<DateBounds> {
    let check = |value: Option<String>| match value {
        Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(Some(date.format("%Y-%m-%d").to_string())),
            Err(_) => {
                println!("'{raw}' is not a valid date (expected YYYY-MM-DD)");
                None
            }
        },
        None => Some(None),
    };
    Some(DateBounds {
        from: check(from)?,
        to: check(to)?,
    })
}
