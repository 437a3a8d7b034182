use std::path::Path;

use ferry_core::scalar::{normalize, parse_count, parse_flag, strip_quotes};
use ferry_core::{CopyMode, FileMask};

use super::{Credentials, Endpoint, RetryPolicy, TransferError};

/// Loosely typed run inputs, as a scheduler hands them over.
///
/// Every field is a string and parsed leniently: unparsable counts become 0,
/// unrecognized flags false, unknown copy modes `OVERWRITE`. The literal
/// `null` and one pair of surrounding single quotes read as empty.
#[derive(Clone, Default)]
pub struct TransferParams {
    pub source_path: String,
    pub source_mask: String,
    pub source_user: String,
    pub source_password: String,
    pub source_retry_count: String,
    pub source_retry_interval: String,
    pub destination_path: String,
    pub destination_file_name_template: String,
    pub destination_user: String,
    pub destination_password: String,
    pub destination_retry_count: String,
    pub destination_retry_interval: String,
    pub file_copy_mode: String,
    pub delete_after_receive: String,

    pub source_private_key: Option<String>,
    pub source_passphrase: Option<String>,
    pub destination_private_key: Option<String>,
    pub destination_passphrase: Option<String>,
}

/// Validated, immutable inputs for one run.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    pub source: Endpoint,
    pub mask: FileMask,
    pub source_retry: RetryPolicy,
    pub delete_after_receive: bool,
    pub destination: Endpoint,
    pub template: String,
    pub destination_retry: RetryPolicy,
    pub copy_mode: CopyMode,
}

impl TransferParams {
    pub fn into_plan(self) -> Result<TransferPlan, TransferError> {
        let source = endpoint(
            "source",
            &self.source_path,
            credentials(
                &self.source_user,
                &self.source_password,
                self.source_private_key.as_deref(),
                self.source_passphrase.as_deref(),
            ),
        )?;
        let destination = endpoint(
            "destination",
            &self.destination_path,
            credentials(
                &self.destination_user,
                &self.destination_password,
                self.destination_private_key.as_deref(),
                self.destination_passphrase.as_deref(),
            ),
        )?;

        let mask = normalize(&self.source_mask);
        let mask = if mask.is_empty() {
            FileMask::new(ferry_config::DEFAULT_SOURCE_MASK)
        } else {
            FileMask::new(&mask)
        };

        let template = normalize(&self.destination_file_name_template);
        let template = if template.is_empty() {
            ferry_config::DEFAULT_FILE_NAME_TEMPLATE.to_string()
        } else {
            template
        };

        Ok(TransferPlan {
            source,
            mask,
            source_retry: RetryPolicy::clamped(
                parse_count(&self.source_retry_count),
                parse_count(&self.source_retry_interval),
            ),
            delete_after_receive: parse_flag(&self.delete_after_receive),
            destination,
            template,
            destination_retry: RetryPolicy::clamped(
                parse_count(&self.destination_retry_count),
                parse_count(&self.destination_retry_interval),
            ),
            copy_mode: CopyMode::parse_loose(&normalize(&self.file_copy_mode)),
        })
    }
}

fn endpoint(side: &str, raw: &str, credentials: Credentials) -> Result<Endpoint, TransferError> {
    let raw = normalize(raw);
    if ferry_core::resolve(&raw).is_empty() {
        return Err(TransferError::Configuration(format!("{side} path is empty")));
    }
    Endpoint::parse(&raw, credentials)
        .map_err(|e| match e {
            TransferError::Configuration(msg) => TransferError::Configuration(format!("{side}: {msg}")),
            other => other,
        })
}

/// A password that names an existing file is taken as the private key path.
fn credentials(user: &str, password: &str, key: Option<&str>, passphrase: Option<&str>) -> Credentials {
    let user = normalize(user);
    let password = if normalize(password).is_empty() {
        String::new()
    } else {
        strip_quotes(password.trim())
    };
    let passphrase = passphrase.map(strip_quotes).filter(|p| !p.is_empty());

    match key.map(normalize).filter(|k| !k.is_empty()) {
        Some(key) => Credentials::new(user, password).with_private_key(key, passphrase),
        None if !password.is_empty() && Path::new(&password).is_file() => {
            Credentials::new(user, "").with_private_key(password, passphrase)
        }
        None => Credentials::new(user, password),
    }
}
