/// Storage module: the key-value store, per-collection repositories and migrations.
mod entries;
mod migrations;
mod schedules;
mod shifts;
mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use rand::RngExt;
use rusqlite::Connection;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::types::Record;

// Re-export all public functions
pub use entries::{
    create_entry, delete_entry, query_entries, query_entry_by_id, update_entry,
};
pub use schedules::{create_schedule, delete_schedule, query_schedules, update_schedule};
pub use shifts::{
    create_shift, delete_shift, move_shift, query_shift_by_id, query_shifts, update_shift,
};
pub use store::{Batch, Collection, SqliteBackend, Store, import_merge};

#[cfg(test)]
pub(crate) use store::memory::MemoryBackend;

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &Path) -> Result<Store> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(2))?;
    migrations::run_migrations(&conn)?;
    debug!(path = %db_path.display(), "database opened");
    Ok(Store::new(Box::new(SqliteBackend::new(conn))))
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./shiftbook.db` when no data dir is found.
pub fn default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join("shiftbook");
        std::fs::create_dir_all(&app_dir).ok();
        app_dir.join("shiftbook.db")
    } else {
        PathBuf::from("shiftbook.db")
    }
}

/// Time-based id with a random suffix, unique among `existing`.
pub fn new_record_id<T: Record>(existing: &[T]) -> String {
    let mut rng = rand::rng();
    loop {
        let id = format!(
            "{}{:03}",
            Utc::now().timestamp_millis(),
            rng.random_range(0..1000)
        );
        if !existing.iter().any(|record| record.id() == id) {
            return id;
        }
    }
}

fn insert_record<T>(collection: Collection, mut record: T, store: &Store) -> Result<T>
where
    T: Record + Serialize + DeserializeOwned + Clone,
{
    let mut records: Vec<T> = store.get(collection);
    record.set_id(new_record_id(&records));
    records.push(record.clone());
    store.set(collection, &records)?;
    Ok(record)
}

fn replace_record<T>(collection: Collection, record: T, store: &Store) -> Result<bool>
where
    T: Record + Serialize + DeserializeOwned,
{
    let mut records: Vec<T> = store.get(collection);
    let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) else {
        return Ok(false);
    };
    *slot = record;
    store.set(collection, &records)?;
    Ok(true)
}

fn remove_record<T>(collection: Collection, id: &str, store: &Store) -> Result<bool>
where
    T: Record + Serialize + DeserializeOwned,
{
    let records: Vec<T> = store.get(collection);
    let before = records.len();
    let kept: Vec<T> = records.into_iter().filter(|r| r.id() != id).collect();
    if kept.len() == before {
        return Ok(false);
    }
    store.set(collection, &kept)?;
    Ok(true)
}

#[cfg(test)]
pub(crate) fn memory_store() -> Store {
    Store::new(Box::new(MemoryBackend::default()))
}
