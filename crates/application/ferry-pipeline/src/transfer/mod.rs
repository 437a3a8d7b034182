use std::fmt;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod adapter;
pub mod context;
pub mod endpoint;
pub mod factory;
pub mod ftp;
pub mod local;
pub mod orchestrator;
pub mod params;
pub mod sftp;
pub mod staging;

pub use context::{ReceiveContext, RetryPolicy, SendContext};
pub use endpoint::{Credentials, Endpoint};
pub use orchestrator::TransferOrchestrator;
pub use params::{TransferParams, TransferPlan};
pub use staging::StagingDir;

use factory::DefaultAdapterFactory;

/// High-level error type for transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferErrorKind {
    Configuration,
    NotFound,
    Network,
    Io,
    Unsupported,
}

impl TransferError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TransferError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> TransferErrorKind {
        match self {
            TransferError::Configuration(_) => TransferErrorKind::Configuration,
            TransferError::NotFound(_) => TransferErrorKind::NotFound,
            TransferError::Network(_) => TransferErrorKind::Network,
            TransferError::Io { .. } => TransferErrorKind::Io,
            TransferError::Unsupported(_) => TransferErrorKind::Unsupported,
        }
    }

    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::Network(_))
    }
}

/// Lifecycle of one orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Resolving,
    Receiving,
    Sending,
    Cleanup,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Init => "init",
            RunPhase::Resolving => "resolving",
            RunPhase::Receiving => "receiving",
            RunPhase::Sending => "sending",
            RunPhase::Cleanup => "cleanup",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFile {
    pub source: Utf8PathBuf,
    /// Where the file landed, in the destination adapter's notation.
    pub destination: String,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub source: String,
    pub destination: String,
    pub staging_dir: Utf8PathBuf,
    pub received: Vec<Utf8PathBuf>,
    pub sent: Vec<SentFile>,
    pub cleanup_ok: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn bytes_sent(&self) -> u64 {
        self.sent.iter().map(|f| f.bytes).sum()
    }
}

/// Orchestrator with the built-in adapters that logs through `tracing`.
/// `staging_root` of `None` stages under the system temp dir.
pub fn default_orchestrator(staging_root: Option<Utf8PathBuf>) -> TransferOrchestrator {
    TransferOrchestrator::with_components(
        std::sync::Arc::new(DefaultAdapterFactory),
        std::sync::Arc::new(crate::events::TracingSink),
        staging_root,
    )
}
