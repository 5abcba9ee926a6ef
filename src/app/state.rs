use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::KeyCode;
use tracing::{info, warn};

use crate::db::{self, Collection, Store};
use crate::forms::{EntryForm, ScheduleForm};
use crate::report::filter_by_date_range;
use crate::types::{EntryQuery, Schedule, ScheduleQuery, Shift, ShiftId, ShiftType, TimeEntry};

use super::{AppEvent, AppView, DeleteTarget, FocusMode, SummaryRange, TABS};

/// The top-level application state.
pub struct App {
    pub running: bool,
    pub store: Store,
    pub view: AppView,
    view_history: Vec<AppView>,
    pub entries: Vec<TimeEntry>,
    pub schedules: Vec<Schedule>,
    pub shifts: Vec<Shift>,
    pub status: Option<String>,
    pub selected_entry_index: usize,
    pub selected_schedule_index: usize,
    pub selected_shift_index: usize,
    pub summary_range: SummaryRange,
    pub today: NaiveDate,
    pub focus_mode: FocusMode,
    pub selected_tab_index: usize,
    pub confirm_popup: Option<ConfirmPopup>,
    pub new_entry_popup: Option<NewEntryPopup>,
    pub assign_popup: Option<AssignShiftPopup>,
    /// Collections another session changed since the last tick.
    changes: Rc<RefCell<Vec<Collection>>>,
}

#[derive(Clone, Debug)]
pub struct ConfirmPopup {
    pub message: String,
    pub target: DeleteTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryField {
    Date,
    Start,
    End,
    Duration,
    Notes,
}

impl EntryField {
    fn next(self) -> Self {
        match self {
            EntryField::Date => EntryField::Start,
            EntryField::Start => EntryField::End,
            EntryField::End => EntryField::Duration,
            EntryField::Duration => EntryField::Notes,
            EntryField::Notes => EntryField::Date,
        }
    }

    fn prev(self) -> Self {
        match self {
            EntryField::Date => EntryField::Notes,
            EntryField::Start => EntryField::Date,
            EntryField::End => EntryField::Start,
            EntryField::Duration => EntryField::End,
            EntryField::Notes => EntryField::Duration,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewEntryPopup {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub notes: String,
    pub field: EntryField,
}

impl NewEntryPopup {
    fn field_mut(&mut self) -> &mut String {
        match self.field {
            EntryField::Date => &mut self.date,
            EntryField::Start => &mut self.start_time,
            EntryField::End => &mut self.end_time,
            EntryField::Duration => &mut self.duration,
            EntryField::Notes => &mut self.notes,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShiftOption {
    pub id: ShiftId,
    pub name: String,
    pub shift_type: ShiftType,
    pub custom_hue: Option<u16>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignField {
    Date,
    Shift,
    Duration,
}

#[derive(Clone, Debug)]
pub struct AssignShiftPopup {
    pub date: String,
    pub shift_index: usize,
    pub shifts: Vec<ShiftOption>,
    pub duration: String,
    pub field: AssignField,
}

impl AssignShiftPopup {
    fn select_prev(&mut self) {
        if self.shifts.is_empty() {
            return;
        }
        if self.shift_index == 0 {
            self.shift_index = self.shifts.len() - 1;
        } else {
            self.shift_index -= 1;
        }
    }

    fn select_next(&mut self) {
        if self.shifts.is_empty() {
            return;
        }
        self.shift_index = (self.shift_index + 1) % self.shifts.len();
    }
}

impl App {
    /// Loads all collections and subscribes to changes from other sessions.
    pub fn new(mut store: Store) -> Result<Self> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        store.watch(Box::new(move |collection, _value: Option<&str>| {
            sink.borrow_mut().push(collection);
        }))?;

        let mut app = Self {
            running: true,
            store,
            view: AppView::Summary,
            view_history: Vec::new(),
            entries: Vec::new(),
            schedules: Vec::new(),
            shifts: Vec::new(),
            status: None,
            selected_entry_index: 0,
            selected_schedule_index: 0,
            selected_shift_index: 0,
            summary_range: SummaryRange::Week,
            today: Local::now().date_naive(),
            focus_mode: FocusMode::Content,
            selected_tab_index: 0,
            confirm_popup: None,
            new_entry_popup: None,
            assign_popup: None,
            changes,
        };
        app.load_all();
        Ok(app)
    }

    /// Central update function - process an event and mutate state.
    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Tick => {
                self.today = Local::now().date_naive();
                self.poll_external_changes();
            }
            AppEvent::KeyPress(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.confirm_popup.is_some() {
            self.handle_confirm_key(key);
            return;
        }
        if self.new_entry_popup.is_some() {
            self.handle_new_entry_key(key);
            return;
        }
        if self.assign_popup.is_some() {
            self.handle_assign_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('h') => self.navigate_to(AppView::Summary),
            KeyCode::Char('e') => self.navigate_to(AppView::Entries),
            KeyCode::Char('s') => self.navigate_to(AppView::Schedules),
            KeyCode::Char('t') => self.navigate_to(AppView::Shifts),
            KeyCode::Char('?') => {
                if self.view == AppView::Help {
                    self.go_back();
                } else {
                    self.navigate_to(AppView::Help);
                }
            }
            KeyCode::Tab => {
                if self.focus_mode == FocusMode::TabBar {
                    self.focus_mode = FocusMode::Content;
                } else {
                    self.focus_mode = FocusMode::TabBar;
                }
            }
            KeyCode::BackTab => {
                if self.view == AppView::Summary {
                    self.toggle_summary_range();
                }
            }
            KeyCode::Char('r') => {
                self.load_all();
                self.clear_status();
            }
            KeyCode::Left => {
                if self.focus_mode == FocusMode::TabBar {
                    self.navigate_tab_left();
                }
            }
            KeyCode::Right => {
                if self.focus_mode == FocusMode::TabBar {
                    self.navigate_tab_right();
                }
            }
            KeyCode::Up => {
                if self.focus_mode == FocusMode::Content {
                    self.move_selection_up();
                }
            }
            KeyCode::Down => {
                if self.focus_mode == FocusMode::Content {
                    self.move_selection_down();
                }
            }
            KeyCode::Enter => {
                if self.focus_mode == FocusMode::TabBar {
                    self.activate_selected_tab();
                }
            }
            KeyCode::Esc => self.go_back(),
            KeyCode::Char('n') => match self.view {
                AppView::Summary | AppView::Entries => self.open_new_entry_popup(),
                _ => {}
            },
            KeyCode::Char('a') => match self.view {
                AppView::Summary | AppView::Schedules => self.open_assign_popup(),
                _ => {}
            },
            KeyCode::Char('d') => self.open_delete_confirm(),
            KeyCode::Char('K') => {
                if self.view == AppView::Shifts {
                    self.move_selected_shift(-1);
                }
            }
            KeyCode::Char('J') => {
                if self.view == AppView::Shifts {
                    self.move_selected_shift(1);
                }
            }
            _ => {}
        }
    }

    fn navigate_to(&mut self, view: AppView) {
        if self.view != view {
            self.view_history.push(self.view.clone());
            self.view = view;
            if let Some(index) = TABS.iter().position(|v| *v == self.view) {
                self.selected_tab_index = index;
            }
        }
    }

    fn navigate_tab_left(&mut self) {
        if self.selected_tab_index == 0 {
            self.selected_tab_index = TABS.len() - 1;
        } else {
            self.selected_tab_index -= 1;
        }
    }

    fn navigate_tab_right(&mut self) {
        self.selected_tab_index = (self.selected_tab_index + 1) % TABS.len();
    }

    fn activate_selected_tab(&mut self) {
        let target_view = TABS[self.selected_tab_index].clone();
        self.navigate_to(target_view);
        self.focus_mode = FocusMode::Content;
    }

    fn go_back(&mut self) {
        if let Some(prev_view) = self.view_history.pop() {
            self.view = prev_view;
            if let Some(index) = TABS.iter().position(|v| *v == self.view) {
                self.selected_tab_index = index;
            }
        }
        self.clear_status();
    }

    fn toggle_summary_range(&mut self) {
        self.summary_range = match self.summary_range {
            SummaryRange::Week => SummaryRange::Month,
            SummaryRange::Month => SummaryRange::Week,
        };
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn load_all(&mut self) {
        for collection in Collection::ALL {
            self.load_collection(collection);
        }
    }

    fn load_collection(&mut self, collection: Collection) {
        match collection {
            Collection::TimeEntries => {
                let mut entries = db::query_entries(EntryQuery::All, &self.store);
                entries.sort_by(|a, b| (&b.date, &b.start_time).cmp(&(&a.date, &a.start_time)));
                self.entries = entries;
                if self.selected_entry_index >= self.entries.len() {
                    self.selected_entry_index = self.entries.len().saturating_sub(1);
                }
            }
            Collection::Schedules => {
                let mut schedules = db::query_schedules(ScheduleQuery::All, &self.store);
                schedules.sort_by(|a, b| (&b.date, &b.start_time).cmp(&(&a.date, &a.start_time)));
                self.schedules = schedules;
                if self.selected_schedule_index >= self.schedules.len() {
                    self.selected_schedule_index = self.schedules.len().saturating_sub(1);
                }
            }
            Collection::CustomShifts => {
                self.shifts = db::query_shifts(&self.store);
                if self.selected_shift_index >= self.shifts.len() {
                    self.selected_shift_index = self.shifts.len().saturating_sub(1);
                }
            }
        }
    }

    fn poll_external_changes(&mut self) {
        match self.store.poll_changes() {
            Ok(0) => {}
            Ok(_) => {
                let changed: Vec<Collection> = self.changes.borrow_mut().drain(..).collect();
                let mut labels = Vec::new();
                for collection in changed {
                    self.load_collection(collection);
                    labels.push(collection_label(collection));
                }
                info!(collections = ?labels, "reloaded after external change");
                self.status = Some(format!("Updated from another session: {}", labels.join(", ")));
            }
            Err(err) => warn!(error = %err, "failed to poll for external changes"),
        }
    }

    /// Entries and schedules inside the current summary range.
    pub fn summary_records(&self) -> (Vec<TimeEntry>, Vec<Schedule>) {
        let (start, end) = self.summary_range.bounds(self.today);
        (
            filter_by_date_range(self.entries.clone(), &start, &end),
            filter_by_date_range(self.schedules.clone(), &start, &end),
        )
    }

    fn move_selection_up(&mut self) {
        let (index, len) = match self.view {
            AppView::Entries => (&mut self.selected_entry_index, self.entries.len()),
            AppView::Schedules => (&mut self.selected_schedule_index, self.schedules.len()),
            AppView::Shifts => (&mut self.selected_shift_index, self.shifts.len()),
            _ => return,
        };
        if len == 0 {
            return;
        }
        if *index == 0 {
            *index = len - 1;
        } else {
            *index -= 1;
        }
    }

    fn move_selection_down(&mut self) {
        let (index, len) = match self.view {
            AppView::Entries => (&mut self.selected_entry_index, self.entries.len()),
            AppView::Schedules => (&mut self.selected_schedule_index, self.schedules.len()),
            AppView::Shifts => (&mut self.selected_shift_index, self.shifts.len()),
            _ => return,
        };
        if len == 0 {
            return;
        }
        *index = (*index + 1) % len;
    }

    fn move_selected_shift(&mut self, offset: isize) {
        let Some(shift) = self.shifts.get(self.selected_shift_index) else {
            return;
        };
        let Some(target) = self.selected_shift_index.checked_add_signed(offset) else {
            return;
        };
        if target >= self.shifts.len() {
            return;
        }
        let id = shift.id.clone();
        match db::move_shift(&id, target, &self.store) {
            Ok(_) => {
                self.load_collection(Collection::CustomShifts);
                self.selected_shift_index = target;
            }
            Err(err) => self.status = Some(format!("Failed to move shift: {err}")),
        }
    }

    fn open_delete_confirm(&mut self) {
        let popup = match self.view {
            AppView::Entries => self.entries.get(self.selected_entry_index).map(|entry| {
                ConfirmPopup {
                    message: format!(
                        "Delete time entry on {} ({}-{})?",
                        entry.date, entry.start_time, entry.end_time
                    ),
                    target: DeleteTarget::Entry(entry.id.clone()),
                }
            }),
            AppView::Schedules => {
                self.schedules
                    .get(self.selected_schedule_index)
                    .map(|schedule| ConfirmPopup {
                        message: format!(
                            "Remove '{}' from {}?",
                            schedule.title, schedule.date
                        ),
                        target: DeleteTarget::Schedule(schedule.id.clone()),
                    })
            }
            AppView::Shifts => self.shifts.get(self.selected_shift_index).map(|shift| {
                let used = self
                    .schedules
                    .iter()
                    .filter(|s| s.selected_shift == shift.id)
                    .count();
                let message = if used == 0 {
                    format!("Delete shift '{}'?", shift.name)
                } else {
                    format!(
                        "Delete shift '{}'? {used} scheduled day(s) keep their copied times.",
                        shift.name
                    )
                };
                ConfirmPopup {
                    message,
                    target: DeleteTarget::Shift(shift.id.clone()),
                }
            }),
            _ => None,
        };
        self.confirm_popup = popup;
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.apply_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_popup = None;
                self.clear_status();
            }
            _ => {}
        }
    }

    fn apply_delete(&mut self) {
        let Some(popup) = self.confirm_popup.take() else {
            return;
        };
        let (result, collection, noun) = match &popup.target {
            DeleteTarget::Entry(id) => (
                db::delete_entry(id, &self.store),
                Collection::TimeEntries,
                "Time entry",
            ),
            DeleteTarget::Schedule(id) => (
                db::delete_schedule(id, &self.store),
                Collection::Schedules,
                "Scheduled shift",
            ),
            DeleteTarget::Shift(id) => (
                db::delete_shift(id, &self.store),
                Collection::CustomShifts,
                "Shift",
            ),
        };
        match result {
            Ok(true) => self.status = Some(format!("{noun} deleted.")),
            Ok(false) => self.status = Some(format!("{noun} no longer exists.")),
            Err(err) => self.status = Some(format!("Failed to delete: {err}")),
        }
        self.load_collection(collection);
    }

    fn open_new_entry_popup(&mut self) {
        self.new_entry_popup = Some(NewEntryPopup {
            date: self.today.format("%Y-%m-%d").to_string(),
            start_time: String::new(),
            end_time: String::new(),
            duration: String::new(),
            notes: String::new(),
            field: EntryField::Start,
        });
    }

    fn handle_new_entry_key(&mut self, key: KeyCode) {
        let Some(popup) = self.new_entry_popup.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                self.new_entry_popup = None;
                self.clear_status();
            }
            KeyCode::Enter => self.apply_new_entry_popup(),
            KeyCode::Tab | KeyCode::Down => popup.field = popup.field.next(),
            KeyCode::BackTab | KeyCode::Up => popup.field = popup.field.prev(),
            KeyCode::Backspace | KeyCode::Delete => {
                popup.field_mut().pop();
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                popup.field_mut().push(ch);
            }
            _ => {}
        }
    }

    fn apply_new_entry_popup(&mut self) {
        let Some(popup) = self.new_entry_popup.take() else {
            return;
        };
        let form = EntryForm {
            date: popup.date.clone(),
            start_time: popup.start_time.clone(),
            end_time: popup.end_time.clone(),
            notes: popup.notes.clone(),
            custom_hue: None,
            custom_duration: Some(popup.duration.clone()),
        };
        let entry = match form.build() {
            Ok(entry) => entry,
            Err(err) => {
                self.status = Some(err.to_string());
                self.new_entry_popup = Some(popup);
                return;
            }
        };
        if let Err(err) = db::create_entry(entry, &self.store) {
            self.status = Some(format!("Failed to save entry: {err}"));
            self.new_entry_popup = Some(popup);
            return;
        }
        self.status = Some("Time entry added.".to_string());
        self.load_collection(Collection::TimeEntries);
    }

    fn open_assign_popup(&mut self) {
        if self.shifts.is_empty() {
            self.status = Some("No shifts defined. Add one with `shiftbook shift add`.".to_string());
            return;
        }
        let shifts = self
            .shifts
            .iter()
            .map(|shift| ShiftOption {
                id: shift.id.clone(),
                name: shift.name.clone(),
                shift_type: shift.shift_type,
                custom_hue: shift.custom_hue,
            })
            .collect();
        self.assign_popup = Some(AssignShiftPopup {
            date: self.today.format("%Y-%m-%d").to_string(),
            shift_index: 0,
            shifts,
            duration: String::new(),
            field: AssignField::Shift,
        });
    }

    fn handle_assign_key(&mut self, key: KeyCode) {
        let Some(popup) = self.assign_popup.as_mut() else {
            return;
        };
        match key {
            KeyCode::Esc => {
                self.assign_popup = None;
                self.clear_status();
            }
            KeyCode::Enter => self.apply_assign_popup(),
            KeyCode::Tab => {
                popup.field = match popup.field {
                    AssignField::Date => AssignField::Shift,
                    AssignField::Shift => AssignField::Duration,
                    AssignField::Duration => AssignField::Date,
                };
            }
            KeyCode::Up => {
                if popup.field == AssignField::Shift {
                    popup.select_prev();
                }
            }
            KeyCode::Down => {
                if popup.field == AssignField::Shift {
                    popup.select_next();
                }
            }
            KeyCode::Backspace | KeyCode::Delete => match popup.field {
                AssignField::Date => {
                    popup.date.pop();
                }
                AssignField::Duration => {
                    popup.duration.pop();
                }
                AssignField::Shift => {}
            },
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    return;
                }
                match popup.field {
                    AssignField::Date => popup.date.push(ch),
                    AssignField::Duration => popup.duration.push(ch),
                    AssignField::Shift => {}
                }
            }
            _ => {}
        }
    }

    fn apply_assign_popup(&mut self) {
        let Some(popup) = self.assign_popup.take() else {
            return;
        };
        let Some((shift_id, name)) = popup
            .shifts
            .get(popup.shift_index)
            .map(|option| (option.id.clone(), option.name.clone()))
        else {
            self.status = Some("Shift selection is required.".to_string());
            self.assign_popup = Some(popup);
            return;
        };
        let form = ScheduleForm {
            date: popup.date.clone(),
            shift_id,
            custom_duration: Some(popup.duration.clone()),
            notes: String::new(),
        };
        let schedule = match form.build(&self.shifts) {
            Ok(schedule) => schedule,
            Err(err) => {
                self.status = Some(err.to_string());
                self.assign_popup = Some(popup);
                return;
            }
        };
        if let Err(err) = db::create_schedule(schedule, &self.store) {
            self.status = Some(format!("Failed to assign shift: {err}"));
            self.assign_popup = Some(popup);
            return;
        }
        self.status = Some(format!("'{name}' assigned to {}.", popup.date.trim()));
        self.load_collection(Collection::Schedules);
    }
}

fn collection_label(collection: Collection) -> &'static str {
    match collection {
        Collection::TimeEntries => "entries",
        Collection::Schedules => "schedules",
        Collection::CustomShifts => "shifts",
    }
}
