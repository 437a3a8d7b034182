use std::fs::{self, File, OpenOptions};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use ferry_core::copy_mode::unique_name;
use ferry_core::path_utils::FerryPath;
use ferry_core::{CopyMode, FileEntry, FileMask, Protocol};
use tracing::{debug, info, warn};

use super::adapter::{select_names, source_size, TransferAdapter};
use super::{ReceiveContext, SendContext, TransferError};

/// Filesystem transport. Credentials are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalAdapter;

impl LocalAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Regular files directly inside `dir` matching `mask`, sorted by name.
    fn matching_files(dir: &Utf8Path, mask: &FileMask) -> Result<Vec<(String, u64)>, TransferError> {
        let entries = dir
            .read_dir_utf8()
            .map_err(|e| TransferError::io(format!("list {dir}"), e))?;

        let mut sizes = std::collections::HashMap::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!("Skipping non UTF-8 file name in {}: {}", dir, e);
                    continue;
                }
                Err(e) => return Err(TransferError::io(format!("list {dir}"), e)),
            };
            let name = entry.file_name();
            // Follows symlinks, unlike DirEntry::file_type.
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => {
                    sizes.insert(name.to_string(), meta.len());
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping {}: {}", name, e),
            }
        }

        let names = select_names(sizes.keys().cloned(), mask);
        Ok(names
            .into_iter()
            .map(|n| {
                let size = sizes.get(&n).copied().unwrap_or_default();
                (n, size)
            })
            .collect())
    }

    fn resolve_dir(raw: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(FerryPath::normalize_local(FerryPath::sanitize(raw)))
    }
}

fn copy_replace(from: &Utf8Path, to: &Utf8Path) -> Result<u64, TransferError> {
    fs::copy(from, to).map_err(|e| TransferError::io(format!("copy {from} -> {to}"), e))
}

fn copy_into(from: &Utf8Path, to: &Utf8Path, options: &OpenOptions) -> Result<u64, TransferError> {
    let mut src = File::open(from).map_err(|e| TransferError::io(format!("open {from}"), e))?;
    let mut dst = options
        .open(to)
        .map_err(|e| TransferError::io(format!("open {to}"), e))?;
    io::copy(&mut src, &mut dst).map_err(|e| TransferError::io(format!("copy {from} -> {to}"), e))
}

impl TransferAdapter for LocalAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Local
    }

    fn receive(&self, ctx: &ReceiveContext) -> Result<Vec<Utf8PathBuf>, TransferError> {
        let source = Utf8Path::new(ctx.endpoint().path());
        if !source.is_dir() {
            return Err(TransferError::NotFound(format!(
                "source directory {source} does not exist"
            )));
        }

        ctx.staging().ensure()?;
        let files = Self::matching_files(source, ctx.mask())?;
        info!(
            "Found {} file(s) matching '{}' in {}",
            files.len(),
            ctx.mask(),
            source
        );

        let mut staged = Vec::with_capacity(files.len());
        for (name, _) in files {
            let origin = source.join(&name);
            let path = ctx.staging().stage_with(&name, |out| {
                let mut src =
                    File::open(&origin).map_err(|e| TransferError::io(format!("open {origin}"), e))?;
                io::copy(&mut src, out)
                    .map(|_| ())
                    .map_err(|e| TransferError::io(format!("read {origin}"), e))
            })?;
            debug!("Staged {} -> {}", origin, path);
            staged.push(path);

            if ctx.delete_after_receive() {
                fs::remove_file(&origin)
                    .map_err(|e| TransferError::io(format!("delete {origin}"), e))?;
                debug!("Deleted source {}", origin);
            }
        }
        Ok(staged)
    }

    fn send(&self, local_file: &Utf8Path, ctx: &SendContext) -> Result<String, TransferError> {
        source_size(local_file)?;

        let dir = Utf8Path::new(ctx.endpoint().path());
        let name = ctx.destination_name(local_file);
        let mut target = dir.join(&name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TransferError::io(format!("create directory {parent}"), e))?;
        }

        let exists = target.exists();
        let written = match (exists, ctx.copy_mode()) {
            (true, CopyMode::Append) => {
                copy_into(local_file, &target, OpenOptions::new().append(true))?
            }
            (true, CopyMode::CreateNew) => {
                let fresh = unique_name(target.file_name().unwrap_or(name.as_str()));
                target = target.with_file_name(fresh);
                copy_into(local_file, &target, OpenOptions::new().write(true).create_new(true))?
            }
            _ => copy_replace(local_file, &target)?,
        };

        info!("Sent {} -> {} ({} bytes, {})", local_file, target, written, ctx.copy_mode());
        Ok(target.into_string())
    }

    fn delete(&self, path: &str) -> Result<(), TransferError> {
        let path = Utf8PathBuf::from(FerryPath::normalize_local(FerryPath::sanitize(path)));
        if path.as_str().is_empty() || !path.is_file() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|e| TransferError::io(format!("delete {path}"), e))
    }

    fn list_files(
        &self,
        path: &str,
        mask: &FileMask,
        _user: &str,
        _password: &str,
    ) -> Result<Vec<FileEntry>, TransferError> {
        let dir = Self::resolve_dir(path);
        if dir.as_str().is_empty() || !dir.is_dir() {
            return Ok(Vec::new());
        }
        Ok(Self::matching_files(&dir, mask)?
            .into_iter()
            .map(|(name, size)| FileEntry::new(name, Some(size)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{Endpoint, StagingDir};

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn list_files_on_missing_or_blank_path_is_empty() {
        let adapter = LocalAdapter::new();
        let mask = FileMask::match_all();
        assert!(adapter.list_files("", &mask, "", "").unwrap().is_empty());
        assert!(adapter
            .list_files("/no/such/dir/anywhere", &mask, "", "")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn list_files_reports_sizes_and_skips_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let root = utf8(&tmp);
        fs::write(root.join("b.csv"), b"12345").unwrap();
        fs::write(root.join("a.csv"), b"1").unwrap();
        fs::create_dir(root.join("c.csv")).unwrap();

        let listed = LocalAdapter::new()
            .list_files(root.as_str(), &FileMask::new("*.csv"), "", "")
            .unwrap();
        assert_eq!(
            listed,
            vec![FileEntry::new("a.csv", Some(1)), FileEntry::new("b.csv", Some(5))]
        );
    }

    #[test]
    fn receive_missing_directory_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let root = utf8(&tmp);
        let ctx = ReceiveContext::new(
            Endpoint::local(root.join("missing").as_str()),
            StagingDir::unique(&root),
        );
        let err = LocalAdapter::new().receive(&ctx).unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn delete_missing_file_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let root = utf8(&tmp);
        LocalAdapter::new().delete(root.join("ghost.txt").as_str()).unwrap();

        let real = root.join("real.txt");
        fs::write(&real, b"x").unwrap();
        LocalAdapter::new().delete(real.as_str()).unwrap();
        assert!(!real.exists());
    }
}
