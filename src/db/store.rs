/// Key-value persistence over the three record collections.
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// The three named collections, each stored as one JSON array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    TimeEntries,
    Schedules,
    CustomShifts,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::TimeEntries,
        Collection::Schedules,
        Collection::CustomShifts,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Collection::TimeEntries => "timeEntries",
            Collection::Schedules => "schedules",
            Collection::CustomShifts => "customShifts",
        }
    }
}

/// Raw storage the [`Store`] sits on.
pub trait Backend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    /// Writes every pair or none of them.
    fn write_all(&self, pairs: &[(&str, &str)]) -> Result<()>;
    /// Moves only when a different context committed a change.
    fn external_version(&self) -> Result<u64>;
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl Backend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM storage WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        upsert(&self.conn, key, value)
    }

    fn write_all(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in pairs {
            upsert(&tx, key, value)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn external_version(&self) -> Result<u64> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?;
        Ok(version as u64)
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO storage (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

/// Collections serialized up front and committed together by [`Store::commit`].
#[derive(Default)]
pub struct Batch {
    writes: Vec<(Collection, String, usize)>,
}

impl Batch {
    pub fn set<T: Serialize>(&mut self, collection: Collection, records: &[T]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.writes.push((collection, raw, records.len()));
        Ok(())
    }
}

pub type WatchCallback = Box<dyn FnMut(Collection, Option<&str>)>;

/// Typed, fail-soft access to the collections plus change notification for
/// writes made by other contexts. Every `set` overwrites the whole collection.
pub struct Store {
    backend: Box<dyn Backend>,
    watchers: Vec<WatchCallback>,
    seen: RefCell<HashMap<Collection, Option<String>>>,
    last_version: Option<u64>,
}

impl Store {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            watchers: Vec::new(),
            seen: RefCell::new(HashMap::new()),
            last_version: None,
        }
    }

    /// Reads a collection. Missing keys and unreadable data give an empty vec.
    pub fn get<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        let raw = match self.backend.read(collection.key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key = collection.key(), error = %err, "failed to read collection");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!(key = collection.key(), error = %err, "stored collection is malformed, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn set<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.backend.write(collection.key(), &raw)?;
        debug!(key = collection.key(), count = records.len(), "collection written");
        self.seen.borrow_mut().insert(collection, Some(raw));
        Ok(())
    }

    /// Writes all collections in `batch` atomically.
    pub fn commit(&self, batch: Batch) -> Result<()> {
        let pairs: Vec<(&str, &str)> = batch
            .writes
            .iter()
            .map(|(collection, raw, _)| (collection.key(), raw.as_str()))
            .collect();
        self.backend.write_all(&pairs)?;
        let mut seen = self.seen.borrow_mut();
        for (collection, raw, count) in batch.writes {
            debug!(key = collection.key(), count, "collection written");
            seen.insert(collection, Some(raw));
        }
        Ok(())
    }

    /// Registers a callback for changes made outside this store.
    /// Notifications are delivered by [`Store::poll_changes`].
    pub fn watch(&mut self, callback: WatchCallback) -> Result<()> {
        if self.last_version.is_none() {
            self.last_version = Some(self.backend.external_version()?);
            let mut seen = self.seen.borrow_mut();
            for collection in Collection::ALL {
                seen.insert(collection, self.backend.read(collection.key())?);
            }
        }
        self.watchers.push(callback);
        Ok(())
    }

    /// Delivers notifications for collections changed by another context.
    /// Returns the number of collections that changed.
    pub fn poll_changes(&mut self) -> Result<usize> {
        let Some(last_version) = self.last_version else {
            return Ok(0);
        };
        let version = self.backend.external_version()?;
        if version == last_version {
            return Ok(0);
        }
        self.last_version = Some(version);

        let mut changed = Vec::new();
        {
            let mut seen = self.seen.borrow_mut();
            for collection in Collection::ALL {
                let current = self.backend.read(collection.key())?;
                if seen.get(&collection) != Some(&current) {
                    seen.insert(collection, current.clone());
                    changed.push((collection, current));
                }
            }
        }
        for (collection, value) in &changed {
            debug!(key = collection.key(), "external change detected");
            for watcher in self.watchers.iter_mut() {
                watcher(*collection, value.as_deref());
            }
        }
        Ok(changed.len())
    }
}

/// Union by id. Existing records win on collision and keep their order;
/// new incoming records follow in incoming order.
pub fn import_merge<T, F>(existing: Vec<T>, incoming: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut ids: HashSet<String> = existing.iter().map(|r| id_of(r).to_string()).collect();
    let mut merged = existing;
    for record in incoming {
        if ids.insert(id_of(&record).to_string()) {
            merged.push(record);
        }
    }
    merged
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use anyhow::Result;

    use super::Backend;

    #[derive(Default)]
    struct Shared {
        values: HashMap<String, String>,
        writes: u64,
    }

    /// In-process backend. Handles from [`MemoryBackend::connect`] share
    /// data but count as separate contexts.
    #[derive(Default)]
    pub struct MemoryBackend {
        shared: Rc<RefCell<Shared>>,
        own_writes: Cell<u64>,
    }

    impl MemoryBackend {
        pub fn connect(&self) -> Self {
            Self {
                shared: Rc::clone(&self.shared),
                own_writes: Cell::new(0),
            }
        }

        pub fn put_raw(&self, key: &str, value: &str) {
            self.write(key, value).unwrap();
        }
    }

    impl Backend for MemoryBackend {
        fn read(&self, key: &str) -> Result<Option<String>> {
            Ok(self.shared.borrow().values.get(key).cloned())
        }

        fn write(&self, key: &str, value: &str) -> Result<()> {
            let mut shared = self.shared.borrow_mut();
            shared.values.insert(key.to_string(), value.to_string());
            shared.writes += 1;
            self.own_writes.set(self.own_writes.get() + 1);
            Ok(())
        }

        fn write_all(&self, pairs: &[(&str, &str)]) -> Result<()> {
            for (key, value) in pairs {
                self.write(key, value)?;
            }
            Ok(())
        }

        fn external_version(&self) -> Result<u64> {
            Ok(self.shared.borrow().writes - self.own_writes.get())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::memory::MemoryBackend;
    use super::*;
    use crate::types::TimeEntry;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, notes: &str) -> TimeEntry {
        TimeEntry {
            id: id.into(),
            date: "2024-05-01".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
            duration: 60,
            notes: notes.into(),
            custom_hue: None,
        }
    }

    #[test]
    fn get_on_fresh_store_is_empty() {
        let store = Store::new(Box::new(MemoryBackend::default()));
        let entries: Vec<TimeEntry> = store.get(Collection::TimeEntries);
        assert!(entries.is_empty());
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = Store::new(Box::new(MemoryBackend::default()));
        let records = vec![entry("1", "a"), entry("2", "b")];
        store.set(Collection::TimeEntries, &records).unwrap();
        let loaded: Vec<TimeEntry> = store.get(Collection::TimeEntries);
        assert_eq!(loaded, records);
    }

    #[test]
    fn malformed_data_reads_as_empty() {
        let backend = MemoryBackend::default();
        backend.put_raw("timeEntries", "{not json");
        let store = Store::new(Box::new(backend));
        let entries: Vec<TimeEntry> = store.get(Collection::TimeEntries);
        assert!(entries.is_empty());
    }

    #[test]
    fn sqlite_backend_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::db::init(&dir.path().join("test.db")).unwrap();
        store.set(Collection::TimeEntries, &[entry("1", "x")]).unwrap();
        store.set(Collection::TimeEntries, &[entry("2", "y")]).unwrap();
        let loaded: Vec<TimeEntry> = store.get(Collection::TimeEntries);
        assert_eq!(loaded, vec![entry("2", "y")]);
    }

    #[test]
    fn watch_reports_only_external_writes() {
        let backend = MemoryBackend::default();
        let other = Store::new(Box::new(backend.connect()));
        let mut store = Store::new(Box::new(backend));

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store
            .watch(Box::new(move |collection, value: Option<&str>| {
                sink.borrow_mut()
                    .push((collection, value.map(str::to_string)));
            }))
            .unwrap();

        store.set(Collection::TimeEntries, &[entry("1", "local")]).unwrap();
        assert_eq!(store.poll_changes().unwrap(), 0);

        other.set(Collection::Schedules, &Vec::<TimeEntry>::new()).unwrap();
        assert_eq!(store.poll_changes().unwrap(), 1);
        assert_eq!(
            *events.borrow(),
            vec![(Collection::Schedules, Some("[]".to_string()))]
        );
        assert_eq!(store.poll_changes().unwrap(), 0);
    }

    #[test]
    fn watch_across_sqlite_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");
        let mut watcher = crate::db::init(&path).unwrap();
        let writer = crate::db::init(&path).unwrap();

        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        watcher
            .watch(Box::new(move |collection, _: Option<&str>| {
                assert_eq!(collection, Collection::CustomShifts);
                *counter.borrow_mut() += 1;
            }))
            .unwrap();

        writer
            .set(Collection::CustomShifts, &Vec::<TimeEntry>::new())
            .unwrap();
        assert_eq!(watcher.poll_changes().unwrap(), 1);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn failed_commit_leaves_every_collection_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atomic.db");
        let store = crate::db::init(&path).unwrap();
        store.set(Collection::TimeEntries, &[entry("1", "before")]).unwrap();

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_schedules BEFORE INSERT ON storage
             WHEN NEW.key = 'schedules'
             BEGIN SELECT RAISE(ABORT, 'schedules are read-only'); END;",
        )
        .unwrap();

        let mut batch = Batch::default();
        batch
            .set(Collection::TimeEntries, &[entry("2", "after")])
            .unwrap();
        batch
            .set(Collection::Schedules, &Vec::<TimeEntry>::new())
            .unwrap();
        assert!(store.commit(batch).is_err());

        let entries: Vec<TimeEntry> = store.get(Collection::TimeEntries);
        assert_eq!(entries, vec![entry("1", "before")]);
    }

    #[test]
    fn commit_writes_all_collections() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::db::init(&dir.path().join("batch.db")).unwrap();
        let mut batch = Batch::default();
        batch.set(Collection::TimeEntries, &[entry("1", "x")]).unwrap();
        batch.set(Collection::Schedules, &Vec::<TimeEntry>::new()).unwrap();
        store.commit(batch).unwrap();

        assert_eq!(
            store.get::<TimeEntry>(Collection::TimeEntries),
            vec![entry("1", "x")]
        );
        assert!(store.get::<TimeEntry>(Collection::Schedules).is_empty());
    }

    #[test]
    fn merge_keeps_existing_on_collision() {
        let existing = vec![entry("1", "old"), entry("2", "old")];
        let incoming = vec![entry("2", "new"), entry("3", "new"), entry("3", "dup")];
        let merged = import_merge(existing, incoming, |e| e.id.as_str());
        let summary: Vec<(&str, &str)> = merged
            .iter()
            .map(|e| (e.id.as_str(), e.notes.as_str()))
            .collect();
        assert_eq!(summary, vec![("1", "old"), ("2", "old"), ("3", "new")]);
    }

    #[test]
    fn merge_never_duplicates_ids() {
        let existing = vec![entry("a", ""), entry("b", "")];
        let incoming = vec![entry("b", ""), entry("a", ""), entry("c", ""), entry("c", "")];
        let merged = import_merge(existing, incoming, |e| e.id.as_str());
        let mut ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
        assert_eq!(before, 3);
    }
}
