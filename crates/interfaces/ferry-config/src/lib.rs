//! Central configuration constants for runtime limits and defaults, plus the
//! scalar configuration store consulted by the host.

mod store;

pub use store::{ConfigError, ConfigStore, JsonConfigStore};

use std::time::Duration;

/// Mask applied when the caller leaves the source mask empty.
pub const DEFAULT_SOURCE_MASK: &str = "*.*";

/// Destination template applied when the caller leaves it empty.
pub const DEFAULT_FILE_NAME_TEMPLATE: &str = "%SourceFileName%";

/// Directory under the staging root that holds one subdirectory per run.
pub const STAGING_DIR_NAME: &str = "ferry-staging";

/// Suffix for files that are still being written.
pub const PART_FILE_SUFFIX: &str = ".part";

/// Tag attached to every event emitted by the transfer core.
pub const EVENT_TAG: &str = "ferry";

/// Upper bound on configured network retries.
pub const MAX_RETRY_COUNT: u32 = 10;

/// Upper bound on the pause between retries, in seconds.
pub const MAX_RETRY_INTERVAL_SECS: u32 = 300;

/// Default file name of the job configuration store.
pub const JOBS_FILE_NAME: &str = "jobs.json";

pub fn clamp_retry_count(v: u32) -> u32 {
    v.min(MAX_RETRY_COUNT)
}

pub fn clamp_retry_interval(secs: u32) -> Duration {
    Duration::from_secs(u64::from(secs.min(MAX_RETRY_INTERVAL_SECS)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_limits_are_clamped() {
        assert_eq!(clamp_retry_count(3), 3);
        assert_eq!(clamp_retry_count(1_000), MAX_RETRY_COUNT);
        assert_eq!(clamp_retry_interval(0), Duration::ZERO);
        assert_eq!(
            clamp_retry_interval(u32::MAX),
            Duration::from_secs(u64::from(MAX_RETRY_INTERVAL_SECS))
        );
    }
}
