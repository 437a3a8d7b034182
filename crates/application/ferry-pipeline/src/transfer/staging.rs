use std::fs::{self, File};
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;
use uuid::Uuid;

use super::TransferError;
use crate::io_utils::{is_safe_file_name, robust_rename};

/// Per-run scratch directory that received files are staged in before sending.
///
/// The path is fixed at construction; nothing touches the filesystem until
/// [`StagingDir::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDir {
    path: Utf8PathBuf,
}

impl StagingDir {
    /// `<root>/ferry-staging/<random>`
    pub fn unique(root: &Utf8Path) -> Self {
        Self {
            path: root
                .join(ferry_config::STAGING_DIR_NAME)
                .join(Uuid::new_v4().simple().to_string()),
        }
    }

    /// A unique staging directory under the system temp dir.
    pub fn in_temp() -> Result<Self, TransferError> {
        let tmp = Utf8PathBuf::from_path_buf(std::env::temp_dir()).map_err(|p| {
            TransferError::Configuration(format!("temp dir is not valid UTF-8: {}", p.display()))
        })?;
        Ok(Self::unique(&tmp))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    pub fn ensure(&self) -> Result<(), TransferError> {
        fs::create_dir_all(&self.path)
            .map_err(|e| TransferError::io(format!("create staging dir {}", self.path), e))
    }

    /// Stage one file. `write` fills a `.part` sibling which is renamed into
    /// place only on success; on failure the partial file is removed.
    pub fn stage_with<F>(&self, name: &str, write: F) -> Result<Utf8PathBuf, TransferError>
    where
        F: FnOnce(&mut File) -> Result<(), TransferError>,
    {
        if !is_safe_file_name(name) {
            return Err(TransferError::Configuration(format!(
                "refusing to stage unsafe file name '{name}'"
            )));
        }

        let target = self.path.join(name);
        let part = self
            .path
            .join(format!("{name}{}", ferry_config::PART_FILE_SUFFIX));

        let result = File::create(&part)
            .map_err(|e| TransferError::io(format!("create {part}"), e))
            .and_then(|mut file| {
                write(&mut file)?;
                file.flush()
                    .and_then(|_| file.sync_all())
                    .map_err(|e| TransferError::io(format!("flush {part}"), e))
            })
            .and_then(|_| {
                robust_rename(&part, &target)
                    .map_err(|e| TransferError::io(format!("rename {part} -> {target}"), e))
            });

        if let Err(e) = result {
            if part.exists() {
                if let Err(rm) = fs::remove_file(&part) {
                    debug!("Failed to remove partial file {}: {}", part, rm);
                }
            }
            return Err(e);
        }
        Ok(target)
    }

    /// Recursively delete the directory. A directory that was never created is
    /// not an error.
    pub fn remove(&self) -> std::io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::remove_dir_all(&self.path)
    }
}
