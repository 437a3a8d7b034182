use std::path::Path;
use std::thread;
use std::time::Duration;

/// Rename with exponential backoff. Scanners and indexers briefly lock freshly
/// written files on some platforms.
pub fn robust_rename<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> std::io::Result<()> {
    let mut attempt = 0u32;
    let max_attempts = 8u32;
    let mut backoff = Duration::from_millis(50);

    loop {
        match std::fs::rename(&from, &to) {
            Ok(()) => return Ok(()),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts || e.kind() == std::io::ErrorKind::NotFound {
                    return Err(e);
                }
                thread::sleep(backoff);
                backoff = std::cmp::min(backoff * 2, Duration::from_millis(2000));
            }
        }
    }
}

/// Reject names that would escape the directory they are written into on
/// this host. Backslashes and drive prefixes are only separators on Windows.
pub fn is_safe_file_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return false;
    }
    if cfg!(windows) {
        return !name.contains('\\') && !(name.len() >= 2 && name.as_bytes()[1] == b':');
    }
    true
}
