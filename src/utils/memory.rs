use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use lazy_static::lazy_static;
use serde_json::Value;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

lazy_static! {
    static ref SHARED: Arc<MemoryDatabase> = Arc::new(MemoryDatabase::new());
}

type Tables = HashMap<String, HashMap<String, Value>>;

// WriteOp is a single write inside a memory transaction. Records carry the version
// they were read at; an update stores version + 1.
#[derive(Debug, Clone)]
pub(crate) enum WriteOp {
    Put { table: String, id: String, value: Value },
    Update { table: String, id: String, value: Value },
}

impl WriteOp {
    pub(crate) fn put(table: &str, id: &str, value: Value) -> Self {
        WriteOp::Put { table: table.to_string(), id: id.to_string(), value }
    }

    pub(crate) fn update(table: &str, id: &str, value: Value) -> Self {
        WriteOp::Update { table: table.to_string(), id: id.to_string(), value }
    }
}

// MemoryDatabase is a process-local document store keyed by table and id. It backs
// the InMemory repositories and can be switched off to exercise storage failures.
#[derive(Debug)]
pub(crate) struct MemoryDatabase {
    tables: RwLock<Tables>,
    available: AtomicBool,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    pub(crate) fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub(crate) fn shared() -> Arc<MemoryDatabase> {
        SHARED.clone()
    }

    pub(crate) fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub(crate) fn put_if_absent(&self, table: &str, id: &str, value: Value) -> LibraryResult<usize> {
        self.transact(vec![WriteOp::put(table, id, value)])
    }

    pub(crate) fn update_versioned(&self, table: &str, id: &str, value: Value) -> LibraryResult<usize> {
        self.transact(vec![WriteOp::update(table, id, value)])
    }

    pub(crate) fn get(&self, table: &str, id: &str) -> LibraryResult<Value> {
        let tables = self.read()?;
        tables.get(table).and_then(|t| t.get(id)).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("{} not found for {}", table, id).as_str()))
    }

    pub(crate) fn delete(&self, table: &str, id: &str) -> LibraryResult<usize> {
        let mut tables = self.write()?;
        Ok(tables.get_mut(table).and_then(|t| t.remove(id)).map(|_| 1).unwrap_or(0))
    }

    pub(crate) fn scan<F>(&self, table: &str, filter: F) -> LibraryResult<Vec<Value>>
        where F: Fn(&Value) -> bool {
        let tables = self.read()?;
        let mut records: Vec<(String, Value)> = tables.get(table)
            .map(|t| t.iter().filter(|(_, v)| filter(v)).map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records.into_iter().map(|(_, v)| v).collect())
    }

    // equality match on every predicate field; the page token is an offset
    pub(crate) fn query(&self, table: &str, predicate: &HashMap<String, String>,
                        page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Value>> {
        let matched = self.scan(table, |v| matches_predicate(v, predicate))?;
        let offset = page.and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
        let records: Vec<Value> = matched.iter().skip(offset).take(page_size).cloned().collect();
        let next_page = if offset + records.len() < matched.len() {
            Some((offset + records.len()).to_string())
        } else {
            None
        };
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }

    // All checks run before any write so a failed transaction leaves no trace.
    pub(crate) fn transact(&self, ops: Vec<WriteOp>) -> LibraryResult<usize> {
        let mut tables = self.write()?;
        for op in &ops {
            match op {
                WriteOp::Put { table, id, .. } => {
                    if tables.get(table).map(|t| t.contains_key(id)).unwrap_or(false) {
                        return Err(LibraryError::duplicate_key(
                            format!("{} already exists in {}", id, table).as_str()));
                    }
                }
                WriteOp::Update { table, id, value } => {
                    check_version(&tables, table, id, version_of(value))?;
                }
            }
        }
        let size = ops.len();
        for op in ops {
            match op {
                WriteOp::Put { table, id, value } => {
                    tables.entry(table).or_default().insert(id, value);
                }
                WriteOp::Update { table, id, mut value } => {
                    let next = version_of(&value) + 1;
                    if let Value::Object(ref mut map) = value {
                        map.insert("version".to_string(), Value::from(next));
                    }
                    tables.entry(table).or_default().insert(id, value);
                }
            }
        }
        Ok(size)
    }

    fn check_available(&self) -> LibraryResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LibraryError::unavailable("memory store is unavailable", Some("Offline".to_string()), true))
        }
    }

    fn read(&self) -> LibraryResult<RwLockReadGuard<'_, Tables>> {
        self.check_available()?;
        self.tables.read().map_err(|err| LibraryError::runtime(format!("poisoned store {}", err).as_str(), None))
    }

    fn write(&self) -> LibraryResult<RwLockWriteGuard<'_, Tables>> {
        self.check_available()?;
        self.tables.write().map_err(|err| LibraryError::runtime(format!("poisoned store {}", err).as_str(), None))
    }
}

pub(crate) fn version_of(value: &Value) -> i64 {
    value.get("version").and_then(Value::as_i64).unwrap_or(0)
}

fn check_version(tables: &Tables, table: &str, id: &str, expected: i64) -> LibraryResult<()> {
    match tables.get(table).and_then(|t| t.get(id)) {
        Some(stored) if version_of(stored) == expected => Ok(()),
        Some(stored) => Err(LibraryError::conflict(
            format!("stale version {} of {} in {}, stored {}", expected, id, table, version_of(stored)).as_str(),
            Some("ConditionalCheckFailed".to_string()))),
        None => Err(LibraryError::not_found(format!("{} not found for {}", table, id).as_str())),
    }
}

pub(crate) fn matches_predicate(value: &Value, predicate: &HashMap<String, String>) -> bool {
    predicate.iter().all(|(k, expected)| {
        match value.get(k) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        }
    })
}
