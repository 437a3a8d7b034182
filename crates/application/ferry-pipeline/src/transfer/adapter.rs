use camino::{Utf8Path, Utf8PathBuf};
use ferry_core::{FileEntry, FileMask, Protocol};

use super::{ReceiveContext, SendContext, TransferError};

/// One transport. Each call is self-contained: adapters hold no connection
/// between calls, so an instance can be shared across runs.
pub trait TransferAdapter: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// Download every file in the source directory matching the mask into the
    /// staging directory. Returns the staged paths sorted by name.
    fn receive(&self, ctx: &ReceiveContext) -> Result<Vec<Utf8PathBuf>, TransferError>;

    /// Upload one local file. Returns where it landed.
    fn send(&self, local_file: &Utf8Path, ctx: &SendContext) -> Result<String, TransferError>;

    /// Delete one file by its full path. A missing file is not an error.
    fn delete(&self, path: &str) -> Result<(), TransferError>;

    /// Snapshot of the files in `path` that match `mask`. A blank or missing
    /// path yields an empty list.
    fn list_files(
        &self,
        path: &str,
        mask: &FileMask,
        user: &str,
        password: &str,
    ) -> Result<Vec<FileEntry>, TransferError>;
}

/// Size of a file about to be sent, or `NotFound` when it is not a regular file.
pub(crate) fn source_size(local_file: &Utf8Path) -> Result<u64, TransferError> {
    match std::fs::metadata(local_file) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(TransferError::NotFound(format!("{local_file} is not a file"))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TransferError::NotFound(format!(
            "local file {local_file} does not exist"
        ))),
        Err(e) => Err(TransferError::io(format!("stat {local_file}"), e)),
    }
}

/// Listed names matching `mask`, sorted. Only the `.`/`..` pseudo-entries are
/// dropped here; a matching name that cannot be staged on this host fails the
/// run when it is staged.
pub(crate) fn select_names<I>(names: I, mask: &FileMask) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut selected: Vec<String> = names
        .into_iter()
        .filter(|n| !matches!(n.as_str(), "" | "." | ".."))
        .filter(|n| mask.is_match_name(n))
        .collect();
    selected.sort();
    selected.dedup();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_names_filters_and_sorts() {
        let names = ["b.csv", "a.csv", "..", "notes.txt", "A.CSV"].map(String::from);
        let picked = select_names(names, &FileMask::new("*.csv"));
        assert_eq!(picked, vec!["A.CSV", "a.csv", "b.csv"]);
    }

    #[test]
    fn select_names_keeps_names_with_colons_and_backslashes() {
        let names = ["1:30.csv", "x\\y.csv", ".", "a.txt"].map(String::from);
        let picked = select_names(names, &FileMask::new("*.csv"));
        assert_eq!(picked, vec!["1:30.csv", "x\\y.csv"]);
    }

    #[test]
    fn source_size_reports_missing_file() {
        let err = source_size(Utf8Path::new("/definitely/not/here.bin")).unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)));
    }
}
