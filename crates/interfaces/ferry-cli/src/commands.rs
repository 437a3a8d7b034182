use std::time::Duration;

use anyhow::{Context, Result};
use camino::Utf8Path;
use ferry_core::FileMask;
use ferry_persistence::{RunHistory, RunRecord, RunStatus};
use ferry_pipeline::{
    Credentials, DefaultAdapterFactory, Endpoint, RunReport, TransferOrchestrator, TransferParams,
};
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use crate::jobs::JobCatalog;

/// Endpoint text safe to print or persist: userinfo is dropped.
pub fn display_endpoint(raw: &str) -> String {
    Endpoint::parse(raw, Credentials::default())
        .map(|e| e.to_string())
        .unwrap_or_else(|_| raw.trim().to_string())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

/// Run one transfer, recording it in `history` when given. History failures
/// are reported but never fail the transfer.
pub fn cmd_run(
    orchestrator: &TransferOrchestrator,
    params: TransferParams,
    job: Option<String>,
    history: Option<&dyn RunHistory>,
) -> Result<RunReport> {
    let source = display_endpoint(&params.source_path);
    let destination = display_endpoint(&params.destination_path);

    println!(":: Transfer{}", job.as_deref().map(|j| format!(" '{j}'")).unwrap_or_default());
    println!("   Source:      {}", source);
    println!("   Destination: {}", destination);

    let run_id = Uuid::new_v4();
    let mut record = RunRecord::started(run_id, job, source, destination);
    if let Some(history) = history {
        if let Err(e) = history.insert_run(&record) {
            tracing::warn!("Failed to record run {}: {}", run_id, e);
        }
    }

    let pb = spinner("Transferring...".to_string());
    let result = orchestrator.run_with_id(run_id, params);
    pb.finish_and_clear();

    match &result {
        Ok(report) => record.succeed(report.sent.len() as u64, report.bytes_sent()),
        Err(e) => record.fail(e.to_string()),
    }
    if let Some(history) = history {
        if let Err(e) = history.update_run(&record) {
            tracing::warn!("Failed to update run {}: {}", run_id, e);
        }
    }

    let report = result.with_context(|| format!("Transfer {run_id} failed"))?;

    println!("\n:: Transfer Result");
    println!("   Run:            {}", report.run_id);
    println!("   Files received: {}", report.received.len());
    println!("   Files sent:     {}", report.sent.len());
    println!("   Bytes sent:     {}", format_size(report.bytes_sent(), DECIMAL));
    for sent in &report.sent {
        println!("   -> {}", sent.destination);
    }
    if !report.cleanup_ok {
        println!("   Warning: staging directory {} was not removed", report.staging_dir);
    }
    Ok(report)
}

pub fn cmd_job(
    orchestrator: &TransferOrchestrator,
    jobs_file: &Utf8Path,
    name: &str,
    history: Option<&dyn RunHistory>,
) -> Result<RunReport> {
    let catalog = JobCatalog::load(jobs_file)?;
    let params = catalog.params(name)?;
    cmd_run(orchestrator, params, Some(name.to_string()), history)
}

pub fn cmd_jobs(jobs_file: &Utf8Path) -> Result<()> {
    let catalog = JobCatalog::load(jobs_file)?;
    let names = catalog.names();
    if names.is_empty() {
        println!("No jobs found in {}.", jobs_file);
        return Ok(());
    }

    println!("{:<24} {:<40} {:<40}", "JOB", "SOURCE", "DESTINATION");
    println!("{:-<24} {:-<40} {:-<40}", "", "", "");
    for name in names {
        let params = catalog.params(&name)?;
        println!(
            "{:<24} {:<40} {:<40}",
            name,
            display_endpoint(&params.source_path),
            display_endpoint(&params.destination_path)
        );
    }
    Ok(())
}

pub fn cmd_list(path: &str, mask: &str, user: &str, password: &str) -> Result<()> {
    let adapter = DefaultAdapterFactory::for_path(path);
    let mask = FileMask::new(mask);
    println!(":: Listing {} ({}, mask '{}')", display_endpoint(path), adapter.protocol(), mask);

    let entries = adapter
        .list_files(path, &mask, user, password)
        .context("Listing failed")?;
    if entries.is_empty() {
        println!("   No matching files.");
        return Ok(());
    }

    let mut total = 0u64;
    for entry in &entries {
        let size = entry
            .size
            .map(|s| {
                total += s;
                format_size(s, DECIMAL)
            })
            .unwrap_or_else(|| "?".to_string());
        println!("   {:>12}  {}", size, entry.name);
    }
    println!("   {} file(s), {}", entries.len(), format_size(total, DECIMAL));
    Ok(())
}

pub fn cmd_history(history: &dyn RunHistory, limit: usize) -> Result<()> {
    let runs = history.list_runs(limit).context("Failed to read run history")?;
    if runs.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    println!(
        "{:<20} {:<16} {:<10} {:>6} {:>10}  ROUTE",
        "STARTED", "JOB", "STATUS", "FILES", "BYTES"
    );
    for run in runs {
        println!(
            "{:<20} {:<16} {:<10} {:>6} {:>10}  {} -> {}",
            run.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            run.job.as_deref().unwrap_or("-"),
            run.status.as_str(),
            run.files_sent,
            format_size(run.bytes_sent, DECIMAL),
            run.source,
            run.destination
        );
        if run.status == RunStatus::Failed {
            if let Some(message) = &run.message {
                println!("{:<20} {}", "", message);
            }
        }
    }
    Ok(())
}
