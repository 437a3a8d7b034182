use std::sync::Arc;

use camino::Utf8PathBuf;
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::factory::{AdapterFactory, DefaultAdapterFactory};
use super::{
    ReceiveContext, RunPhase, RunReport, SendContext, SentFile, StagingDir, TransferError,
    TransferParams, TransferPlan,
};
use crate::events::{EventSink, Severity};

/// Drives one batch: resolve endpoints, receive into a private staging
/// directory, send every staged file, then remove the staging directory.
///
/// Runs are synchronous. The orchestrator itself is stateless between runs and
/// can be shared.
pub struct TransferOrchestrator {
    factory: Arc<dyn AdapterFactory>,
    sink: Arc<dyn EventSink>,
    staging_root: Option<Utf8PathBuf>,
}

impl TransferOrchestrator {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            factory: Arc::new(DefaultAdapterFactory),
            sink,
            staging_root: None,
        }
    }

    /// `staging_root` of `None` stages under the system temp dir.
    pub fn with_components(
        factory: Arc<dyn AdapterFactory>,
        sink: Arc<dyn EventSink>,
        staging_root: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            factory,
            sink,
            staging_root,
        }
    }

    pub fn run(&self, params: TransferParams) -> Result<RunReport, TransferError> {
        self.run_with_id(Uuid::new_v4(), params)
    }

    /// Like [`run`](Self::run) with a caller-chosen id, so a host can record
    /// the run before it starts.
    pub fn run_with_id(&self, run_id: Uuid, params: TransferParams) -> Result<RunReport, TransferError> {
        self.report(run_id, RunPhase::Init, "starting transfer", Severity::Info);
        self.report(run_id, RunPhase::Resolving, "resolving endpoints", Severity::Info);
        match params.into_plan() {
            Ok(plan) => self.execute(run_id, plan),
            Err(e) => {
                self.report(run_id, RunPhase::Failed, &e.to_string(), Severity::Error);
                Err(e)
            }
        }
    }

    /// Run an already validated plan.
    pub fn execute(&self, run_id: Uuid, plan: TransferPlan) -> Result<RunReport, TransferError> {
        let started_at = Utc::now();
        let prepared = self.factory.create(&plan.source).and_then(|source| {
            let destination = self.factory.create(&plan.destination)?;
            let staging = self.staging_dir()?;
            Ok((source, destination, staging))
        });
        let (source_adapter, destination_adapter, staging) = match prepared {
            Ok(parts) => parts,
            Err(e) => {
                self.report(run_id, RunPhase::Failed, &e.to_string(), Severity::Error);
                return Err(e);
            }
        };
        debug!(
            "Run {}: {} ({}) -> {} ({}), staging {}",
            run_id,
            plan.source,
            source_adapter.protocol(),
            plan.destination,
            destination_adapter.protocol(),
            staging.path()
        );

        let receive_ctx = ReceiveContext::new(plan.source.clone(), staging.clone())
            .with_mask(plan.mask.clone())
            .with_retry(plan.source_retry)
            .with_delete_after_receive(plan.delete_after_receive);

        self.report(
            run_id,
            RunPhase::Receiving,
            &format!("receiving '{}' from {}", plan.mask, plan.source),
            Severity::Info,
        );
        let mut sent = Vec::new();
        let received = source_adapter.receive(&receive_ctx);

        let outcome = match &received {
            Ok(files) => {
                let send_ctx = SendContext::new(plan.destination.clone())
                    .with_template(&plan.template)
                    .with_retry(plan.destination_retry)
                    .with_copy_mode(plan.copy_mode)
                    .with_staging(receive_ctx.staging().clone());

                self.report(
                    run_id,
                    RunPhase::Sending,
                    &format!("sending {} file(s) to {}", files.len(), plan.destination),
                    Severity::Info,
                );
                files.iter().try_for_each(|file| {
                    let bytes = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
                    let destination = destination_adapter.send(file, &send_ctx)?;
                    info!("{} -> {}", file, destination);
                    sent.push(SentFile {
                        source: file.clone(),
                        destination,
                        bytes,
                    });
                    Ok(())
                })
            }
            Err(_) => Ok(()),
        };

        self.report(run_id, RunPhase::Cleanup, "removing staging directory", Severity::Info);
        let cleanup_ok = match staging.remove() {
            Ok(()) => true,
            Err(e) => {
                let msg = format!("failed to remove staging directory {}: {}", staging.path(), e);
                warn!("{}", msg);
                self.sink.log(ferry_config::EVENT_TAG, &msg, Severity::Warning);
                false
            }
        };

        let failure = match (received, outcome) {
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
            (Ok(received), Ok(())) => Ok(received),
        };
        match failure {
            Ok(received) => {
                self.report(
                    run_id,
                    RunPhase::Done,
                    &format!("{} of {} file(s) sent", sent.len(), received.len()),
                    Severity::Info,
                );
                Ok(RunReport {
                    run_id,
                    source: plan.source.to_string(),
                    destination: plan.destination.to_string(),
                    staging_dir: staging.path().to_path_buf(),
                    received,
                    sent,
                    cleanup_ok,
                    started_at,
                    finished_at: Utc::now(),
                })
            }
            Err(e) => {
                self.report(
                    run_id,
                    RunPhase::Failed,
                    &format!("{} ({} file(s) sent before failure)", e, sent.len()),
                    Severity::Error,
                );
                Err(e)
            }
        }
    }

    fn staging_dir(&self) -> Result<StagingDir, TransferError> {
        match &self.staging_root {
            Some(root) => Ok(StagingDir::unique(root)),
            None => StagingDir::in_temp(),
        }
    }

    fn report(&self, run_id: Uuid, phase: RunPhase, detail: &str, severity: Severity) {
        let message = format!("[{run_id}] {phase}: {detail}");
        match severity {
            Severity::Error => error!("{}", message),
            _ => debug!("{}", message),
        }
        self.sink.log(ferry_config::EVENT_TAG, &message, severity);
    }
}
