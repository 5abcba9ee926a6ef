/// Time entry queries.
use anyhow::Result;

use super::{Collection, Store, insert_record, remove_record, replace_record};
use crate::report::filter_by_date_range;
use crate::types::{EntryQuery, TimeEntry};

/// Stores a new entry under a freshly generated id and returns it.
pub fn create_entry(entry: TimeEntry, store: &Store) -> Result<TimeEntry> {
    insert_record(Collection::TimeEntries, entry, store)
}

pub fn query_entries(query: EntryQuery, store: &Store) -> Vec<TimeEntry> {
    let entries: Vec<TimeEntry> = store.get(Collection::TimeEntries);
    match query {
        EntryQuery::All => entries,
        EntryQuery::ByDate(date) => entries.into_iter().filter(|e| e.date == date).collect(),
        EntryQuery::ByRange(from, to) => filter_by_date_range(entries, &from, &to),
    }
}

pub fn query_entry_by_id(id: &str, store: &Store) -> Option<TimeEntry> {
    store
        .get::<TimeEntry>(Collection::TimeEntries)
        .into_iter()
        .find(|e| e.id == id)
}

pub fn update_entry(entry: TimeEntry, store: &Store) -> Result<bool> {
    replace_record(Collection::TimeEntries, entry, store)
}

pub fn delete_entry(id: &str, store: &Store) -> Result<bool> {
    remove_record::<TimeEntry>(Collection::TimeEntries, id, store)
}
