use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use ferry_core::copy_mode::unique_name;
use ferry_core::path_utils::FerryPath;
use ferry_core::{CopyMode, FileEntry, FileMask, Protocol};
use ssh2::{ErrorCode, FileStat, OpenFlags, OpenType, Session, Sftp};
use tracing::{debug, info};

use super::adapter::{select_names, source_size, TransferAdapter};
use super::{Credentials, Endpoint, ReceiveContext, RetryPolicy, SendContext, TransferError};
use crate::retry::with_retry;

// libssh2 SFTP status codes
const FX_NO_SUCH_FILE: i32 = 2;
const FX_NO_SUCH_PATH: i32 = 10;

/// SFTP transport. Authenticates with a private key when one is configured,
/// then with the password. One SSH session per adapter call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SftpAdapter;

struct SftpSession {
    sftp: Sftp,
    _session: Session,
}

impl SftpAdapter {
    pub fn new() -> Self {
        Self
    }

    fn connect(endpoint: &Endpoint, retry: &RetryPolicy) -> Result<SftpSession, TransferError> {
        with_retry(retry, &format!("SFTP connect to {endpoint}"), || {
            let tcp = TcpStream::connect((endpoint.host(), endpoint.port())).map_err(|e| {
                TransferError::Network(format!(
                    "TCP connect to {}:{} failed: {e}",
                    endpoint.host(),
                    endpoint.port()
                ))
            })?;
            let mut session = Session::new().map_err(|e| network(endpoint, "session setup", e))?;
            session.set_tcp_stream(tcp);
            session
                .handshake()
                .map_err(|e| network(endpoint, "handshake", e))?;

            authenticate(&session, endpoint)?;

            let sftp = session.sftp().map_err(|e| network(endpoint, "open sftp channel", e))?;
            debug!("Connected to {} as {}", endpoint, endpoint.credentials().user);
            Ok(SftpSession {
                sftp,
                _session: session,
            })
        })
    }

    fn parse_remote(path: &str, credentials: Credentials) -> Result<Option<Endpoint>, TransferError> {
        if FerryPath::sanitize(path).is_empty() {
            return Ok(None);
        }
        let endpoint = Endpoint::parse(path, credentials)?;
        if endpoint.protocol() != Protocol::Sftp {
            return Err(TransferError::Configuration(format!("'{path}' is not an SFTP path")));
        }
        Ok(Some(endpoint))
    }
}

fn authenticate(session: &Session, endpoint: &Endpoint) -> Result<(), TransferError> {
    let creds = endpoint.credentials();
    let mut failures = Vec::new();

    if let Some(key) = &creds.private_key {
        if let Err(e) = session.userauth_pubkey_file(
            &creds.user,
            None,
            key.as_std_path(),
            creds.passphrase.as_deref(),
        ) {
            failures.push(format!("publickey {key}: {e}"));
        }
    }
    if !session.authenticated() && !creds.password.is_empty() {
        if let Err(e) = session.userauth_password(&creds.user, &creds.password) {
            failures.push(format!("password: {e}"));
        }
    }
    if !session.authenticated() {
        if failures.is_empty() {
            failures.push("no private key or password configured".to_string());
        }
        return Err(TransferError::Network(format!(
            "SFTP authentication failed for '{}' on {}:{}: {}",
            creds.user,
            endpoint.host(),
            endpoint.port(),
            failures.join("; ")
        )));
    }
    Ok(())
}

fn network(endpoint: &Endpoint, what: &str, err: ssh2::Error) -> TransferError {
    TransferError::Network(format!(
        "SFTP {what} failed for {}:{}: {err}",
        endpoint.host(),
        endpoint.port()
    ))
}

fn is_missing(err: &ssh2::Error) -> bool {
    matches!(
        err.code(),
        ErrorCode::SFTP(FX_NO_SUCH_FILE) | ErrorCode::SFTP(FX_NO_SUCH_PATH)
    )
}

/// Regular files of a directory listing that match `mask`, sorted by name.
fn matching_files(listing: Vec<(PathBuf, FileStat)>, mask: &FileMask) -> Vec<FileEntry> {
    let mut sizes = HashMap::new();
    for (path, stat) in listing {
        if stat.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            sizes.insert(name.to_string(), stat.size);
        }
    }
    select_names(sizes.keys().cloned(), mask)
        .into_iter()
        .map(|name| {
            let size = sizes.get(&name).copied().flatten();
            FileEntry::new(name, size)
        })
        .collect()
}

/// How an upload opens its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UploadPlan {
    flags: OpenFlags,
    /// Write position; non-zero only when appending to an existing file.
    offset: u64,
    /// Write to a fresh sibling instead of the named target.
    unique_name: bool,
}

impl UploadPlan {
    fn for_target(existing: Option<&FileStat>, mode: CopyMode) -> Self {
        let (flags, offset, unique_name) = match (existing, mode) {
            (Some(stat), CopyMode::Append) => (
                OpenFlags::WRITE | OpenFlags::APPEND | OpenFlags::CREATE,
                stat.size.unwrap_or(0),
                false,
            ),
            (Some(_), CopyMode::CreateNew) => {
                (OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::EXCLUSIVE, 0, true)
            }
            _ => (OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE, 0, false),
        };
        Self {
            flags,
            offset,
            unique_name,
        }
    }
}

impl SftpSession {
    /// Resolve `dir` on the server and confirm it is a directory. Listing
    /// always goes through the resolved absolute path, never the session's
    /// implicit working directory.
    fn enter(&self, endpoint: &Endpoint, dir: &str) -> Result<PathBuf, TransferError> {
        let not_found = || TransferError::NotFound(format!("remote directory {dir} on {endpoint}"));
        let resolved = self.sftp.realpath(Path::new(dir)).map_err(|e| {
            if is_missing(&e) {
                not_found()
            } else {
                network(endpoint, "resolve directory", e)
            }
        })?;
        match self.sftp.stat(&resolved) {
            Ok(stat) if stat.is_dir() => Ok(resolved),
            Ok(_) => Err(not_found()),
            Err(e) if is_missing(&e) => Err(not_found()),
            Err(e) => Err(network(endpoint, "stat directory", e)),
        }
    }

    fn list(&self, endpoint: &Endpoint, dir: &str, mask: &FileMask) -> Result<(PathBuf, Vec<FileEntry>), TransferError> {
        let resolved = self.enter(endpoint, dir)?;
        let listing = self
            .sftp
            .readdir(&resolved)
            .map_err(|e| network(endpoint, "list", e))?;
        Ok((resolved, matching_files(listing, mask)))
    }

    fn make_dirs(&self, endpoint: &Endpoint, dir: &str) -> Result<(), TransferError> {
        let mut current = String::new();
        for part in dir.split('/').filter(|p| !p.is_empty()) {
            current.push('/');
            current.push_str(part);
            let path = Path::new(&current);
            if self.sftp.stat(path).is_err() {
                self.sftp
                    .mkdir(path, 0o755)
                    .map_err(|e| network(endpoint, &format!("mkdir {current}"), e))?;
            }
        }
        Ok(())
    }
}

impl TransferAdapter for SftpAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Sftp
    }

    fn receive(&self, ctx: &ReceiveContext) -> Result<Vec<Utf8PathBuf>, TransferError> {
        let endpoint = ctx.endpoint();
        let dir = FerryPath::absolute_remote(endpoint.path());
        ctx.staging().ensure()?;

        let session = Self::connect(endpoint, ctx.retry())?;
        let (resolved, entries) = session.list(endpoint, &dir, ctx.mask())?;
        info!(
            "Found {} file(s) matching '{}' in {}",
            entries.len(),
            ctx.mask(),
            endpoint
        );

        let mut staged = Vec::with_capacity(entries.len());
        for entry in entries {
            let remote = resolved.join(&entry.name);
            let path = ctx.staging().stage_with(&entry.name, |out| {
                let mut file = session
                    .sftp
                    .open(&remote)
                    .map_err(|e| network(endpoint, &format!("open {}", remote.display()), e))?;
                io::copy(&mut file, out).map(|_| ()).map_err(|e| {
                    TransferError::Network(format!("SFTP download {} failed: {e}", remote.display()))
                })
            })?;
            debug!("Staged {} -> {}", remote.display(), path);

            if ctx.delete_after_receive() {
                session
                    .sftp
                    .unlink(&remote)
                    .map_err(|e| network(endpoint, &format!("delete {}", remote.display()), e))?;
                debug!("Deleted source {}", remote.display());
            }
            staged.push(path);
        }
        Ok(staged)
    }

    fn send(&self, local_file: &Utf8Path, ctx: &SendContext) -> Result<String, TransferError> {
        let size = source_size(local_file)?;
        let endpoint = ctx.endpoint();
        let dir = FerryPath::absolute_remote(endpoint.path());
        let name = ctx.destination_name(local_file);

        let session = Self::connect(endpoint, ctx.retry())?;
        session.make_dirs(endpoint, &dir)?;

        let mut target = FerryPath::join_remote(&dir, &name);
        let existing = session.sftp.stat(Path::new(&target)).ok();
        let mode = ctx.copy_mode();

        let plan = UploadPlan::for_target(existing.as_ref(), mode);
        if plan.unique_name {
            target = FerryPath::join_remote(&dir, &unique_name(FerryPath::remote_file_name(&name)));
        }

        let mut remote = session
            .sftp
            .open_mode(Path::new(&target), plan.flags, 0o644, OpenType::File)
            .map_err(|e| network(endpoint, &format!("open {target}"), e))?;
        if plan.offset > 0 {
            // Servers that ignore the append flag still honor an explicit offset.
            remote
                .seek(SeekFrom::Start(plan.offset))
                .map_err(|e| TransferError::Network(format!("SFTP seek in {target} failed: {e}")))?;
        }

        let mut reader =
            File::open(local_file).map_err(|e| TransferError::io(format!("open {local_file}"), e))?;
        let written = io::copy(&mut reader, &mut remote)
            .map_err(|e| TransferError::Network(format!("SFTP upload {target} failed: {e}")))?;
        drop(remote);

        info!("Sent {} -> {} ({}/{} bytes, {})", local_file, target, written, size, mode);
        Ok(endpoint.describe(FerryPath::remote_file_name(&target)))
    }

    fn delete(&self, path: &str) -> Result<(), TransferError> {
        Err(TransferError::Unsupported(format!(
            "SFTP delete of '{path}' is not supported; use delete-after-receive"
        )))
    }

    fn list_files(
        &self,
        path: &str,
        mask: &FileMask,
        user: &str,
        password: &str,
    ) -> Result<Vec<FileEntry>, TransferError> {
        let Some(endpoint) = Self::parse_remote(path, Credentials::new(user, password))? else {
            return Ok(Vec::new());
        };
        let session = Self::connect(&endpoint, &RetryPolicy::none())?;
        let dir = FerryPath::absolute_remote(endpoint.path());
        match session.list(&endpoint, &dir, mask) {
            Ok((_, entries)) => Ok(entries),
            Err(TransferError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}
