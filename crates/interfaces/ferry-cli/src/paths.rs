use anyhow::{anyhow, Context, Result};
use camino::Utf8PathBuf;
use directories::ProjectDirs;

const QUALIFIER: &str = "com";
const ORG: &str = "ferry";
const APP: &str = "ferry";

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORG, APP).ok_or_else(|| anyhow!("Could not determine home directory"))
}

fn utf8(path: &std::path::Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|p| anyhow!("Path is not valid UTF-8: {}", p.display()))
}

/// `jobs.json` in the per-user config directory.
pub fn default_jobs_file() -> Result<Utf8PathBuf> {
    let dirs = project_dirs()?;
    Ok(utf8(dirs.config_dir())?.join(ferry_config::JOBS_FILE_NAME))
}

/// Directory holding the run history database, created on demand.
pub fn default_history_root() -> Result<Utf8PathBuf> {
    let dirs = project_dirs()?;
    let root = utf8(dirs.data_dir())?;
    std::fs::create_dir_all(&root).with_context(|| format!("Failed to create {root}"))?;
    Ok(root)
}
