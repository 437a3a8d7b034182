use camino::Utf8PathBuf;
use ferry_persistence::{RedbRunHistory, RunHistory, RunRecord};
use std::sync::{Arc, Barrier};
use uuid::Uuid;

#[test]
fn concurrent_writers_do_not_hit_database_already_open() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let root = Arc::new(root);

    std::thread::scope(|s| {
        for i in 0..threads {
            let barrier = barrier.clone();
            let root = root.clone();
            s.spawn(move || {
                let store = RedbRunHistory::new(&root);
                let mut run =
                    RunRecord::started(Uuid::new_v4(), Some(format!("job{i}")), "/in", "/out");
                barrier.wait();

                store.insert_run(&run).unwrap();
                run.succeed(1, 1);
                store.update_run(&run).unwrap();
            });
        }
    });

    let store = RedbRunHistory::new(&root);
    assert_eq!(store.list_runs(100).unwrap().len(), threads);
}
