use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;
use ferry_config::{ConfigStore, JsonConfigStore};
use ferry_pipeline::TransferParams;

pub const SOURCE_PATH: &str = "SourcePath";
pub const SOURCE_MASK: &str = "SourceMask";
pub const SOURCE_USER: &str = "SourceUser";
pub const SOURCE_PASSWORD: &str = "SourcePassword";
pub const SOURCE_PRIVATE_KEY: &str = "SourcePrivateKey";
pub const SOURCE_PASSPHRASE: &str = "SourcePassphrase";
pub const SOURCE_RETRY: &str = "SourceRetry";
pub const SOURCE_RETRY_INTERVAL: &str = "SourceRetryInterval";
pub const DEST_PATH: &str = "DestPath";
pub const DEST_FILE_NAME_FORMAT: &str = "DestFileNameFormat";
pub const DEST_USER: &str = "DestUser";
pub const DEST_PASSWORD: &str = "DestPassword";
pub const DEST_PRIVATE_KEY: &str = "DestPrivateKey";
pub const DEST_PASSPHRASE: &str = "DestPassphrase";
pub const DEST_RETRY: &str = "DestRetry";
pub const DEST_RETRY_INTERVAL: &str = "DestRetryInterval";
pub const FILE_COPY_MODE: &str = "FileCopyMode";
pub const DELETE_AFTER_RECEIVE: &str = "DeleteAfterReceive";

/// Named transfer jobs, one config section each.
pub struct JobCatalog {
    store: JsonConfigStore,
}

impl JobCatalog {
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let store = JsonConfigStore::load(path.as_std_path())
            .with_context(|| format!("Failed to load jobs from {path}"))?;
        Ok(Self { store })
    }

    pub fn from_store(store: JsonConfigStore) -> Self {
        Self { store }
    }

    pub fn names(&self) -> Vec<String> {
        self.store.sections().map(str::to_string).collect()
    }

    /// Raw scalars for `name`. Missing elements read as empty and fall back to
    /// the transfer defaults.
    pub fn params(&self, name: &str) -> Result<TransferParams> {
        if !self.store.has_section(name) {
            return Err(anyhow!("Job '{}' not found", name));
        }
        let get = |element: &str| self.store.get(name, element).unwrap_or_default();
        let optional = |element: &str| self.store.get(name, element).filter(|v| !v.trim().is_empty());

        Ok(TransferParams {
            source_path: get(SOURCE_PATH),
            source_mask: get(SOURCE_MASK),
            source_user: get(SOURCE_USER),
            source_password: get(SOURCE_PASSWORD),
            source_retry_count: get(SOURCE_RETRY),
            source_retry_interval: get(SOURCE_RETRY_INTERVAL),
            destination_path: get(DEST_PATH),
            destination_file_name_template: get(DEST_FILE_NAME_FORMAT),
            destination_user: get(DEST_USER),
            destination_password: get(DEST_PASSWORD),
            destination_retry_count: get(DEST_RETRY),
            destination_retry_interval: get(DEST_RETRY_INTERVAL),
            file_copy_mode: get(FILE_COPY_MODE),
            delete_after_receive: get(DELETE_AFTER_RECEIVE),
            source_private_key: optional(SOURCE_PRIVATE_KEY),
            source_passphrase: optional(SOURCE_PASSPHRASE),
            destination_private_key: optional(DEST_PRIVATE_KEY),
            destination_passphrase: optional(DEST_PASSPHRASE),
        })
    }
}
