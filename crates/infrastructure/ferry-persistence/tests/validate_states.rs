use camino::Utf8PathBuf;
use ferry_persistence::{DbState, RedbRunHistory, RunHistory, StorageErrorKind, CURRENT_SCHEMA};
use redb::TableDefinition;

const META: TableDefinition<&str, &str> = TableDefinition::new("meta");

fn root() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

#[test]
fn validate_reports_missing_without_creating() {
    let (_dir, root) = root();
    let store = RedbRunHistory::new(&root);
    assert_eq!(store.validate().unwrap(), DbState::Missing);
    assert!(!store.path().exists());
}

#[test]
fn validate_reports_busy_when_database_is_locked() {
    let (_dir, root) = root();
    let db_path = RedbRunHistory::path_for_root(&root);

    let _lock = redb::Database::create(db_path.as_std_path()).unwrap();

    let store = RedbRunHistory::new(&root);
    assert_eq!(store.validate().unwrap(), DbState::Busy);
}

#[test]
fn validate_reports_newer_schema_without_quarantine() {
    let (_dir, root) = root();
    let db_path = RedbRunHistory::path_for_root(&root);

    let db = redb::Database::create(db_path.as_std_path()).unwrap();
    let write_tx = db.begin_write().unwrap();
    {
        let mut meta = write_tx.open_table(META).unwrap();
        let schema_version = (CURRENT_SCHEMA + 1).to_string();
        meta.insert("format", "ferry-history").unwrap();
        meta.insert("schema_version", schema_version.as_str()).unwrap();
        meta.insert("created_at", "2020-01-01T00:00:00Z").unwrap();
    }
    write_tx.commit().unwrap();
    drop(db);

    let store = RedbRunHistory::new(&root);
    assert_eq!(
        store.validate().unwrap(),
        DbState::NewerSchema {
            found: CURRENT_SCHEMA + 1,
            supported: CURRENT_SCHEMA
        }
    );
    assert!(db_path.exists(), "newer schema should not be quarantined");

    let err = store.list_runs(5).unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::NewerSchema);
}

#[test]
fn foreign_redb_file_is_treated_as_corrupt() {
    let (_dir, root) = root();
    let db_path = RedbRunHistory::path_for_root(&root);

    let db = redb::Database::create(db_path.as_std_path()).unwrap();
    let write_tx = db.begin_write().unwrap();
    {
        let mut meta = write_tx.open_table(META).unwrap();
        meta.insert("format", "something-else").unwrap();
    }
    write_tx.commit().unwrap();
    drop(db);

    let store = RedbRunHistory::new(&root);
    assert_eq!(store.validate().unwrap(), DbState::Corrupt);
    assert!(!db_path.exists());
}
