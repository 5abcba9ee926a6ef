/// Spreadsheet report: one sheet per non-empty collection plus a summary.
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::report::{EXPORT_COLUMNS, ExportRow, Summary, export_rows, shift_minutes};
use crate::types::{Schedule, Shift, TimeEntry};

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

const SHIFT_COLUMNS: [&str; 7] = [
    "Name",
    "Type",
    "Start Time",
    "End Time",
    "Custom Duration",
    "Minutes",
    "Hue",
];

fn row_cells(row: ExportRow) -> Vec<Cell> {
    vec![
        Cell::Text(row.kind.label().to_string()),
        Cell::Text(row.date),
        Cell::Text(row.start_time),
        Cell::Text(row.end_time),
        Cell::Text(row.duration),
        Cell::Number(f64::from(row.minutes)),
        Cell::Text(row.notes),
    ]
}

fn shift_cells(shift: &Shift) -> Vec<Cell> {
    vec![
        Cell::Text(shift.name.clone()),
        Cell::Text(shift.shift_type.label().to_string()),
        Cell::Text(shift.start_time.clone()),
        Cell::Text(shift.end_time.clone()),
        Cell::Text(shift.custom_duration.clone().unwrap_or_default()),
        Cell::Number(f64::from(shift_minutes(shift))),
        match shift.custom_hue {
            Some(hue) => Cell::Number(f64::from(hue)),
            None => Cell::Text(String::new()),
        },
    ]
}

/// Lays out the report. The summary sheet is always last and always present.
pub fn build_sheets(entries: &[TimeEntry], schedules: &[Schedule], shifts: &[Shift]) -> Vec<Sheet> {
    let mut sheets = Vec::new();
    if !entries.is_empty() {
        sheets.push(Sheet {
            name: "Time Entries",
            header: EXPORT_COLUMNS.to_vec(),
            rows: export_rows(entries, &[], shifts)
                .into_iter()
                .map(row_cells)
                .collect(),
        });
    }
    if !schedules.is_empty() {
        sheets.push(Sheet {
            name: "Schedule Entries",
            header: EXPORT_COLUMNS.to_vec(),
            rows: export_rows(&[], schedules, shifts)
                .into_iter()
                .map(row_cells)
                .collect(),
        });
    }
    if !shifts.is_empty() {
        sheets.push(Sheet {
            name: "Custom Shifts",
            header: SHIFT_COLUMNS.to_vec(),
            rows: shifts.iter().map(shift_cells).collect(),
        });
    }

    let summary = Summary::new(entries, schedules, shifts);
    let count = |label: &str, n: usize| {
        vec![Cell::Text(label.to_string()), Cell::Number(n as f64)]
    };
    sheets.push(Sheet {
        name: "Summary",
        header: vec!["Metric", "Value"],
        rows: vec![
            count("Time Entries", summary.entries),
            count("Schedule Entries", summary.schedules),
            count("Custom Shifts", summary.shifts),
            vec![
                Cell::Text("Total Minutes".to_string()),
                Cell::Number(f64::from(summary.total_minutes)),
            ],
            vec![
                Cell::Text("Total Hours".to_string()),
                Cell::Text(summary.total_hours_display()),
            ],
        ],
    });
    sheets
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), XlsxError> {
    worksheet.set_name(sheet.name)?;
    for (col, title) in sheet.header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }
    for (index, row) in sheet.rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(text) => worksheet.write_string(row_num, col as u16, text)?,
                Cell::Number(number) => worksheet.write_number(row_num, col as u16, *number)?,
            };
        }
    }
    Ok(())
}

pub fn write_report(
    path: &Path,
    entries: &[TimeEntry],
    schedules: &[Schedule],
    shifts: &[Shift],
) -> Result<()> {
    let sheets = build_sheets(entries, schedules, shifts);
    let mut workbook = Workbook::new();
    for sheet in &sheets {
        write_sheet(workbook.add_worksheet(), sheet)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!(path = %path.display(), sheets = sheets.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShiftType;
    use pretty_assertions::assert_eq;

    fn names(sheets: &[Sheet]) -> Vec<&'static str> {
        sheets.iter().map(|s| s.name).collect()
    }

    #[test]
    fn empty_export_still_has_summary() {
        let sheets = build_sheets(&[], &[], &[]);
        assert_eq!(names(&sheets), vec!["Summary"]);
        let summary = &sheets[0];
        assert_eq!(summary.rows[0][1], Cell::Number(0.0));
        assert_eq!(summary.rows[1][1], Cell::Number(0.0));
        assert_eq!(summary.rows[4][1], Cell::Text("0.0".into()));
    }

    #[test]
    fn one_sheet_per_non_empty_collection() {
        let shift = Shift {
            id: "s".into(),
            name: "Night".into(),
            start_time: "22:00".into(),
            end_time: "06:00".into(),
            custom_duration: None,
            shift_type: ShiftType::Overnight,
            custom_hue: Some(300),
        };
        let schedule = Schedule {
            id: "1".into(),
            date: "2024-07-01".into(),
            selected_shift: "s".into(),
            title: "Night".into(),
            start_time: "22:00".into(),
            end_time: "06:00".into(),
            notes: String::new(),
            custom_duration: None,
        };
        let sheets = build_sheets(&[], &[schedule], &[shift]);
        assert_eq!(names(&sheets), vec!["Schedule Entries", "Custom Shifts", "Summary"]);
        assert_eq!(sheets[0].rows[0][5], Cell::Number(480.0));
        assert_eq!(sheets[1].rows[0][1], Cell::Text("Overnight".into()));
        assert_eq!(sheets[2].rows[4][1], Cell::Text("8.0".into()));
    }

    #[test]
    fn writes_workbook_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        write_report(&path, &[], &[], &[]).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
