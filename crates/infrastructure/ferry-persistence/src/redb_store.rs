use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::api::{DbState, RunRecord, CURRENT_SCHEMA, HISTORY_REDB_FILENAME};
use crate::codec::{decode_run, encode_run};
use crate::maintenance::{quarantine_corrupt_file, quarantined_copies};
use crate::{RunHistory, StorageError};

const META: TableDefinition<&str, &str> = TableDefinition::new("meta");
const RUNS: TableDefinition<&str, &[u8]> = TableDefinition::new("runs");

const META_FORMAT_KEY: &str = "format";
const META_FORMAT_VALUE: &str = "ferry-history";
const META_SCHEMA_VERSION: &str = "schema_version";
const META_CREATED_AT: &str = "created_at";
const META_LAST_WRITE_AT: &str = "last_write_at";

/// Run history in a single redb file under `root`.
///
/// redb refuses a second open of the same file within one process, so open
/// databases are shared through a process-wide cache keyed by path.
#[derive(Debug, Clone)]
pub struct RedbRunHistory {
    path: Utf8PathBuf,
}

impl RedbRunHistory {
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            path: Self::path_for_root(root),
        }
    }

    pub fn path_for_root(root: &Utf8Path) -> Utf8PathBuf {
        root.join(HISTORY_REDB_FILENAME)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Earlier databases that were moved aside as corrupt.
    pub fn quarantined(&self) -> Vec<Utf8PathBuf> {
        quarantined_copies(&self.path)
    }

    fn is_corrupt_open_error(err: &redb::DatabaseError) -> bool {
        match err {
            redb::DatabaseError::Storage(storage) => match storage {
                redb::StorageError::Corrupted(_) => true,
                redb::StorageError::Io(ioe) => matches!(
                    ioe.kind(),
                    std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
                ),
                _ => false,
            },
            _ => false,
        }
    }

    fn db_cache() -> &'static Mutex<HashMap<Utf8PathBuf, Arc<Database>>> {
        static CACHE: OnceLock<Mutex<HashMap<Utf8PathBuf, Arc<Database>>>> = OnceLock::new();
        CACHE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    fn quarantine(&self) {
        if let Err(e) = quarantine_corrupt_file(&self.path) {
            tracing::warn!("Failed to quarantine {}: {}", self.path, e);
        }
    }

    /// Open the database, creating it when `create` is set and it is absent.
    fn open(&self, create: bool) -> Result<Arc<Database>, StorageError> {
        let path = &self.path;
        let mut cache = Self::db_cache()
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = cache.get(path) {
            if path.exists() {
                return Ok(existing.clone());
            }
            cache.remove(path);
        }

        let db = if path.exists() {
            match Database::open(path.as_std_path()) {
                Ok(db) => db,
                Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                    return Err(StorageError::DatabaseAlreadyOpen);
                }
                Err(e) if Self::is_corrupt_open_error(&e) => {
                    self.quarantine();
                    return Err(StorageError::Corrupt);
                }
                Err(e) => return Err(e.into()),
            }
        } else if create {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Database::create(path.as_std_path())?
        } else {
            return Err(StorageError::Missing);
        };

        if let Err(e) = Self::ensure_schema(&db) {
            drop(db);
            if matches!(e, StorageError::Corrupt) {
                self.quarantine();
            }
            return Err(e);
        }
        let db = Arc::new(db);
        cache.insert(path.clone(), db.clone());
        Ok(db)
    }

    fn ensure_schema(db: &Database) -> Result<(), StorageError> {
        let write_tx = db.begin_write()?;
        {
            let mut meta = write_tx.open_table(META)?;
            let format: Option<String> = meta.get(META_FORMAT_KEY)?.map(|g| g.value().to_string());
            match format.as_deref() {
                None => {
                    let schema_version = CURRENT_SCHEMA.to_string();
                    let created_at = Utc::now().to_rfc3339();
                    meta.insert(META_FORMAT_KEY, META_FORMAT_VALUE)?;
                    meta.insert(META_SCHEMA_VERSION, schema_version.as_str())?;
                    meta.insert(META_CREATED_AT, created_at.as_str())?;
                }
                Some(META_FORMAT_VALUE) => {}
                Some(_) => return Err(StorageError::Corrupt),
            }
        }
        let _ = write_tx.open_table(RUNS)?;
        write_tx.commit()?;

        let read_tx = db.begin_read()?;
        let meta = read_tx.open_table(META)?;
        let schema_version = meta
            .get(META_SCHEMA_VERSION)?
            .and_then(|g| g.value().parse::<u32>().ok())
            .unwrap_or(0);
        match schema_version {
            0 => Err(StorageError::Corrupt),
            v if v > CURRENT_SCHEMA => Err(StorageError::NewerSchema {
                found: v,
                supported: CURRENT_SCHEMA,
            }),
            v if v != CURRENT_SCHEMA => Err(StorageError::Corrupt),
            _ => Ok(()),
        }
    }

    fn write(&self, record: &RunRecord, must_exist: bool) -> Result<(), StorageError> {
        let db = self.open(true)?;
        let key = record.run_id.to_string();
        let value = encode_run(record)?;

        let write_tx = db.begin_write()?;
        {
            let mut runs = write_tx.open_table(RUNS)?;
            let exists = runs.get(key.as_str())?.is_some();
            match (exists, must_exist) {
                (true, false) => return Err(StorageError::DuplicateRun(key)),
                (false, true) => return Err(StorageError::RunNotFound(key)),
                _ => {}
            }
            runs.insert(key.as_str(), value.as_slice())?;

            let ts = Utc::now().to_rfc3339();
            let mut meta = write_tx.open_table(META)?;
            meta.insert(META_LAST_WRITE_AT, ts.as_str())?;
        }
        write_tx.commit()?;
        Ok(())
    }
}

impl RunHistory for RedbRunHistory {
    fn validate(&self) -> Result<DbState, StorageError> {
        let path = &self.path;
        if !path.exists() {
            return Ok(DbState::Missing);
        }
        {
            let cache = Self::db_cache()
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if cache.contains_key(path) {
                return Ok(DbState::Valid);
            }
        }

        match Database::open(path.as_std_path()) {
            Ok(db) => match Self::ensure_schema(&db) {
                Ok(()) => Ok(DbState::Valid),
                Err(StorageError::NewerSchema { found, supported }) => {
                    Ok(DbState::NewerSchema { found, supported })
                }
                Err(StorageError::DatabaseAlreadyOpen) => Ok(DbState::Busy),
                Err(StorageError::Corrupt) => {
                    drop(db);
                    self.quarantine();
                    Ok(DbState::Corrupt)
                }
                Err(e) => Err(e),
            },
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => Ok(DbState::Busy),
            Err(e) if Self::is_corrupt_open_error(&e) => {
                self.quarantine();
                Ok(DbState::Corrupt)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn insert_run(&self, record: &RunRecord) -> Result<(), StorageError> {
        self.write(record, false)
    }

    fn update_run(&self, record: &RunRecord) -> Result<(), StorageError> {
        self.write(record, true)
    }

    fn get_run(&self, run_id: Uuid) -> Result<Option<RunRecord>, StorageError> {
        let db = match self.open(false) {
            Ok(db) => db,
            Err(StorageError::Missing) => return Ok(None),
            Err(e) => return Err(e),
        };
        let read_tx = db.begin_read()?;
        let runs = read_tx.open_table(RUNS)?;
        let key = run_id.to_string();
        let guard = runs.get(key.as_str())?;
        guard.map(|g| decode_run(g.value())).transpose()
    }

    fn list_runs(&self, limit: usize) -> Result<Vec<RunRecord>, StorageError> {
        let db = match self.open(false) {
            Ok(db) => db,
            Err(StorageError::Missing) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let read_tx = db.begin_read()?;
        let runs = read_tx.open_table(RUNS)?;

        let mut out = Vec::new();
        for row in runs.iter()? {
            let (_, v) = row?;
            out.push(decode_run(v.value())?);
        }
        out.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        out.truncate(limit);
        Ok(out)
    }
}
