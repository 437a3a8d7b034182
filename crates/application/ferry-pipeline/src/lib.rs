mod io_utils;
pub mod events;
pub mod retry;
pub mod transfer;

// Re-export core transfer components
pub use events::{EventSink, MemorySink, Severity, TracingSink};
pub use transfer::{
    default_orchestrator, Credentials, Endpoint, ReceiveContext, RetryPolicy, RunPhase, RunReport,
    SendContext, SentFile, StagingDir, TransferError, TransferErrorKind, TransferOrchestrator,
    TransferParams, TransferPlan,
};
pub use transfer::adapter::TransferAdapter;
pub use transfer::factory::{AdapterFactory, DefaultAdapterFactory};

// Re-export domain types often needed by consumers
pub use ferry_core::{CopyMode, FileEntry, FileMask, Protocol};
