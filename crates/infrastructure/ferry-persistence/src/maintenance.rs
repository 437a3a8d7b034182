use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;

const QUARANTINE_MARKER: &str = ".corrupt.";

/// Move an unreadable history database aside so a fresh one can be created.
/// Returns the new location, or `None` when there was nothing to move.
pub fn quarantine_corrupt_file(path: &Utf8Path) -> std::io::Result<Option<Utf8PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let base = path.file_name().unwrap_or(crate::api::HISTORY_REDB_FILENAME);
    let target = path.with_file_name(format!(
        "{base}{QUARANTINE_MARKER}{stamp}.{}.{seq}",
        std::process::id()
    ));

    tracing::warn!("Run history at {} is unreadable, moving it to {}", path, target);
    std::fs::rename(path, &target)?;
    Ok(Some(target))
}

/// Quarantined copies of `path` left next to it, oldest first.
pub fn quarantined_copies(path: &Utf8Path) -> Vec<Utf8PathBuf> {
    let (Some(dir), Some(base)) = (path.parent(), path.file_name()) else {
        return Vec::new();
    };
    let prefix = format!("{base}{QUARANTINE_MARKER}");
    let Ok(entries) = dir.read_dir_utf8() else {
        return Vec::new();
    };
    let mut copies: Vec<Utf8PathBuf> = entries
        .flatten()
        .filter(|e| e.file_name().starts_with(&prefix))
        .map(|e| e.path().to_path_buf())
        .collect();
    copies.sort();
    copies
}
