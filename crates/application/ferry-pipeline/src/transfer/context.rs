use std::time::Duration;

use camino::Utf8Path;
use ferry_core::{CopyMode, FileMask, FileNameFormatter};

use super::{Endpoint, StagingDir};

/// Connection retry policy: `retries` extra attempts after the first one,
/// `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    retries: u32,
    interval: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a policy from raw configuration values, clamped to sane bounds.
    pub fn clamped(retries: u32, interval_secs: u32) -> Self {
        Self {
            retries: ferry_config::clamp_retry_count(retries),
            interval: ferry_config::clamp_retry_interval(interval_secs),
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

/// Everything a source adapter needs for one `receive` call.
#[derive(Debug, Clone)]
pub struct ReceiveContext {
    endpoint: Endpoint,
    mask: FileMask,
    retry: RetryPolicy,
    delete_after_receive: bool,
    staging: StagingDir,
}

impl ReceiveContext {
    pub fn new(endpoint: Endpoint, staging: StagingDir) -> Self {
        Self {
            endpoint,
            mask: FileMask::match_all(),
            retry: RetryPolicy::none(),
            delete_after_receive: false,
            staging,
        }
    }

    pub fn with_mask(mut self, mask: FileMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_delete_after_receive(mut self, delete: bool) -> Self {
        self.delete_after_receive = delete;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn mask(&self) -> &FileMask {
        &self.mask
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn delete_after_receive(&self) -> bool {
        self.delete_after_receive
    }

    pub fn staging(&self) -> &StagingDir {
        &self.staging
    }
}

/// Everything a destination adapter needs for `send`.
#[derive(Debug, Clone)]
pub struct SendContext {
    endpoint: Endpoint,
    template: String,
    retry: RetryPolicy,
    copy_mode: CopyMode,
    staging: Option<StagingDir>,
}

impl SendContext {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            template: ferry_config::DEFAULT_FILE_NAME_TEMPLATE.to_string(),
            retry: RetryPolicy::none(),
            copy_mode: CopyMode::default(),
            staging: None,
        }
    }

    /// An empty template keeps the source file name.
    pub fn with_template(mut self, template: &str) -> Self {
        self.template = if template.trim().is_empty() {
            ferry_config::DEFAULT_FILE_NAME_TEMPLATE.to_string()
        } else {
            template.to_string()
        };
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_copy_mode(mut self, mode: CopyMode) -> Self {
        self.copy_mode = mode;
        self
    }

    pub fn with_staging(mut self, staging: StagingDir) -> Self {
        self.staging = Some(staging);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn copy_mode(&self) -> CopyMode {
        self.copy_mode
    }

    pub fn staging(&self) -> Option<&StagingDir> {
        self.staging.as_ref()
    }

    /// Destination file name for the staged `local_file`, formatted at call
    /// time from its base name on this host.
    pub fn destination_name(&self, local_file: &Utf8Path) -> String {
        let source_name = local_file.file_name().unwrap_or(local_file.as_str());
        FileNameFormatter::format_name(&self.template, source_name)
    }
}
