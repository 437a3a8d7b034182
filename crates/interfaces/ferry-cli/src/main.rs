use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ferry_cli::{commands, paths, CliCopyMode};
use ferry_persistence::{RedbRunHistory, RunHistory};
use ferry_pipeline::TransferParams;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Directory holding the run history database
    #[arg(long, global = true, env = "FERRY_HISTORY_DIR")]
    history_dir: Option<Utf8PathBuf>,
    /// Do not record runs
    #[arg(long, global = true)]
    no_history: bool,
    /// Stage received files under this directory instead of the system temp dir
    #[arg(long, global = true, env = "FERRY_STAGING_DIR")]
    staging_dir: Option<Utf8PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move files between two explicit endpoints
    Run {
        #[arg(long)]
        source: String,
        #[arg(long = "dest")]
        destination: String,
        #[arg(long, default_value = ferry_config::DEFAULT_SOURCE_MASK)]
        mask: String,
        #[arg(long, help = "Destination file name template, e.g. %yyyyMMdd%_%SourceFileName%")]
        template: Option<String>,
        #[arg(long, value_enum, default_value_t = CliCopyMode::Overwrite)]
        mode: CliCopyMode,
        #[arg(long)]
        delete_after_receive: bool,
        #[arg(long, default_value_t = 0)]
        retries: u32,
        #[arg(long, default_value_t = 0, help = "Seconds between connection retries")]
        retry_interval: u32,
        #[arg(long, default_value = "")]
        source_user: String,
        #[arg(long, env = "FERRY_SOURCE_PASSWORD", hide_env_values = true, default_value = "")]
        source_password: String,
        #[arg(long)]
        source_key: Option<String>,
        #[arg(long, default_value = "")]
        dest_user: String,
        #[arg(long, env = "FERRY_DEST_PASSWORD", hide_env_values = true, default_value = "")]
        dest_password: String,
        #[arg(long)]
        dest_key: Option<String>,
    },
    /// Run a named job from the jobs file
    Job {
        name: String,
        #[arg(short, long, env = "FERRY_JOBS_FILE")]
        config: Option<Utf8PathBuf>,
    },
    /// List the jobs defined in the jobs file
    Jobs {
        #[arg(short, long, env = "FERRY_JOBS_FILE")]
        config: Option<Utf8PathBuf>,
    },
    /// List files at a local path or remote URI
    List {
        path: String,
        #[arg(long, default_value = ferry_config::DEFAULT_SOURCE_MASK)]
        mask: String,
        #[arg(long, default_value = "")]
        user: String,
        #[arg(long, env = "FERRY_PASSWORD", hide_env_values = true, default_value = "")]
        password: String,
    },
    /// Show recent runs
    History {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

/// Per-run progress is logged at info; `--verbose` adds per-file detail.
fn log_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;

    let open_history = || -> anyhow::Result<Option<RedbRunHistory>> {
        if cli.no_history {
            return Ok(None);
        }
        let root = match &cli.history_dir {
            Some(dir) => dir.clone(),
            None => paths::default_history_root()?,
        };
        Ok(Some(RedbRunHistory::new(&root)))
    };
    let orchestrator = ferry_pipeline::default_orchestrator(cli.staging_dir.clone());
    let jobs_file = |config: Option<Utf8PathBuf>| match config {
        Some(path) => Ok(path),
        None => paths::default_jobs_file(),
    };

    match cli.command {
        Commands::Run {
            ref source,
            ref destination,
            ref mask,
            ref template,
            mode,
            delete_after_receive,
            retries,
            retry_interval,
            ref source_user,
            ref source_password,
            ref source_key,
            ref dest_user,
            ref dest_password,
            ref dest_key,
        } => {
            let params = TransferParams {
                source_path: source.clone(),
                source_mask: mask.clone(),
                source_user: source_user.clone(),
                source_password: source_password.clone(),
                source_retry_count: retries.to_string(),
                source_retry_interval: retry_interval.to_string(),
                destination_path: destination.clone(),
                destination_file_name_template: template.clone().unwrap_or_default(),
                destination_user: dest_user.clone(),
                destination_password: dest_password.clone(),
                destination_retry_count: retries.to_string(),
                destination_retry_interval: retry_interval.to_string(),
                file_copy_mode: ferry_core::CopyMode::from(mode).as_str().to_string(),
                delete_after_receive: delete_after_receive.to_string(),
                source_private_key: source_key.clone(),
                source_passphrase: None,
                destination_private_key: dest_key.clone(),
                destination_passphrase: None,
            };
            let history = open_history()?;
            commands::cmd_run(
                &orchestrator,
                params,
                None,
                history.as_ref().map(|h| h as &dyn RunHistory),
            )?;
        }
        Commands::Job { ref name, ref config } => {
            let history = open_history()?;
            commands::cmd_job(
                &orchestrator,
                &jobs_file(config.clone())?,
                name,
                history.as_ref().map(|h| h as &dyn RunHistory),
            )?;
        }
        Commands::Jobs { ref config } => commands::cmd_jobs(&jobs_file(config.clone())?)?,
        Commands::List {
            ref path,
            ref mask,
            ref user,
            ref password,
        } => commands::cmd_list(path, mask, user, password)?,
        Commands::History { limit } => match open_history()? {
            Some(history) => commands::cmd_history(&history, limit)?,
            None => println!("History is disabled."),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_logging_shows_run_progress() {
        assert_eq!(log_level(false), Level::INFO);
        assert_eq!(log_level(true), Level::DEBUG);
    }
}
