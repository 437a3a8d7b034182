use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HISTORY_REDB_FILENAME: &str = "history.redb";
pub const CURRENT_SCHEMA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbState {
    Missing,
    Valid,
    Busy,
    Corrupt,
    NewerSchema { found: u32, supported: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        }
    }
}

/// One orchestrator run as seen by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub job: Option<String>,
    pub source: String,
    pub destination: String,
    pub status: RunStatus,
    pub files_sent: u64,
    pub bytes_sent: u64,
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    pub fn started(
        run_id: Uuid,
        job: Option<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            run_id,
            job,
            source: source.into(),
            destination: destination.into(),
            status: RunStatus::Running,
            files_sent: 0,
            bytes_sent: 0,
            message: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn succeed(&mut self, files_sent: u64, bytes_sent: u64) {
        self.status = RunStatus::Succeeded;
        self.files_sent = files_sent;
        self.bytes_sent = bytes_sent;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.message = Some(message.into());
        self.finished_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }
}

/// Run history keyed by run id.
pub trait RunHistory: Send + Sync {
    fn validate(&self) -> Result<DbState, crate::StorageError>;

    /// Fails with `DuplicateRun` if the id is already recorded.
    fn insert_run(&self, record: &RunRecord) -> Result<(), crate::StorageError>;

    /// Fails with `RunNotFound` if the id was never inserted.
    fn update_run(&self, record: &RunRecord) -> Result<(), crate::StorageError>;

    fn get_run(&self, run_id: Uuid) -> Result<Option<RunRecord>, crate::StorageError>;

    /// Most recent runs first, at most `limit`.
    fn list_runs(&self, limit: usize) -> Result<Vec<RunRecord>, crate::StorageError>;
}
