use std::fs::File;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use ferry_core::copy_mode::unique_name;
use ferry_core::path_utils::FerryPath;
use ferry_core::{CopyMode, FileEntry, FileMask, Protocol};
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Mode};
use tracing::{debug, info};

use super::adapter::{select_names, source_size, TransferAdapter};
use super::{Credentials, Endpoint, ReceiveContext, RetryPolicy, SendContext, TransferError};
use crate::retry::with_retry;

const ANONYMOUS_USER: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "anonymous@";

/// FTP transport over a plain control channel, passive mode, binary type.
///
/// Every logical operation (list, download one, upload one, delete one) opens
/// its own connection and closes it afterwards.
#[derive(Debug, Clone, Default)]
pub struct FtpAdapter {
    /// Used by `delete`, whose only input is a path.
    credentials: Credentials,
}

impl FtpAdapter {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn connect(endpoint: &Endpoint, retry: &RetryPolicy) -> Result<FtpSession, TransferError> {
        with_retry(retry, &format!("FTP connect to {endpoint}"), || {
            let mut stream = FtpStream::connect((endpoint.host(), endpoint.port()))
                .map_err(|e| network(endpoint, "connect", e))?;

            let creds = endpoint.credentials();
            let (user, password) = if creds.has_user() {
                (creds.user.as_str(), creds.password.as_str())
            } else {
                (ANONYMOUS_USER, ANONYMOUS_PASSWORD)
            };
            stream
                .login(user, password)
                .map_err(|e| network(endpoint, "login", e))?;
            stream.set_mode(Mode::Passive);
            stream
                .transfer_type(FileType::Binary)
                .map_err(|e| network(endpoint, "set binary mode", e))?;

            debug!("Connected to {} as {}", endpoint, user);
            Ok(FtpSession { stream })
        })
    }

    fn listing(endpoint: &Endpoint, dir: &str, retry: &RetryPolicy, mask: &FileMask) -> Result<Vec<FileEntry>, TransferError> {
        let mut session = Self::connect(endpoint, retry)?;
        let entries = session.list(endpoint, dir, mask);
        session.close();
        entries
    }

    fn parse_remote(&self, path: &str, credentials: Credentials) -> Result<Option<Endpoint>, TransferError> {
        if FerryPath::sanitize(path).is_empty() {
            return Ok(None);
        }
        let endpoint = Endpoint::parse(path, credentials)?;
        if endpoint.protocol() != Protocol::Ftp {
            return Err(TransferError::Configuration(format!("'{path}' is not an FTP path")));
        }
        Ok(Some(endpoint))
    }
}

struct FtpSession {
    stream: FtpStream,
}

impl FtpSession {
    /// Change into `dir`, failing with `NotFound` when the server rejects it.
    fn enter(&mut self, endpoint: &Endpoint, dir: &str) -> Result<(), TransferError> {
        self.stream.cwd(dir).map_err(|e| match e {
            FtpError::UnexpectedResponse(_) => TransferError::NotFound(format!(
                "remote directory {dir} on {}:{}: {e}",
                endpoint.host(),
                endpoint.port()
            )),
            other => network(endpoint, "change directory", other),
        })
    }

    /// Files in `dir` matching `mask`. Entries the server refuses a size for
    /// with 550 are directories and are skipped.
    fn list(&mut self, endpoint: &Endpoint, dir: &str, mask: &FileMask) -> Result<Vec<FileEntry>, TransferError> {
        self.enter(endpoint, dir)?;

        let raw = match self.stream.nlst(None) {
            Ok(names) => names,
            // Several servers answer NLST on an empty directory with 450/550.
            Err(FtpError::UnexpectedResponse(resp)) if matches!(resp.status.code(), 450 | 550) => Vec::new(),
            Err(e) => return Err(network(endpoint, "list", e)),
        };
        let names = select_names(raw.iter().map(|n| FerryPath::remote_file_name(n.trim()).to_string()), mask);

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            match self.stream.size(&FerryPath::join_remote(dir, &name)) {
                Ok(size) => entries.push(FileEntry::new(name, Some(size as u64))),
                Err(FtpError::UnexpectedResponse(resp)) if resp.status.code() == 550 => {
                    debug!("Skipping {} (not a regular file)", name);
                }
                Err(FtpError::UnexpectedResponse(_)) => entries.push(FileEntry::new(name, None)),
                Err(e) => return Err(network(endpoint, "size", e)),
            }
        }
        Ok(entries)
    }

    /// Create each missing component of `dir`. Errors are ignored; the
    /// following `enter` reports a directory that still does not exist.
    fn make_dirs(&mut self, dir: &str) {
        let mut current = String::new();
        for part in dir.split('/').filter(|p| !p.is_empty()) {
            current.push('/');
            current.push_str(part);
            if self.stream.cwd(&current).is_err() {
                if let Err(e) = self.stream.mkdir(&current) {
                    debug!("mkdir {} failed: {}", current, e);
                }
            }
        }
    }

    fn exists(&mut self, path: &str) -> bool {
        self.stream.size(path).is_ok()
    }

    fn close(mut self) {
        if let Err(e) = self.stream.quit() {
            debug!("FTP quit failed: {}", e);
        }
    }
}

fn network(endpoint: &Endpoint, what: &str, err: FtpError) -> TransferError {
    TransferError::Network(format!(
        "FTP {what} failed for {}:{}: {err}",
        endpoint.host(),
        endpoint.port()
    ))
}

impl TransferAdapter for FtpAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Ftp
    }

    fn receive(&self, ctx: &ReceiveContext) -> Result<Vec<Utf8PathBuf>, TransferError> {
        let endpoint = ctx.endpoint();
        let dir = FerryPath::absolute_remote(endpoint.path());
        ctx.staging().ensure()?;

        let entries = Self::listing(endpoint, &dir, ctx.retry(), ctx.mask())?;
        info!(
            "Found {} file(s) matching '{}' in {}",
            entries.len(),
            ctx.mask(),
            endpoint
        );

        let mut staged = Vec::with_capacity(entries.len());
        for entry in entries {
            let remote = FerryPath::join_remote(&dir, &entry.name);

            let mut session = Self::connect(endpoint, ctx.retry())?;
            let path = ctx.staging().stage_with(&entry.name, |out| {
                session
                    .stream
                    .retr(&remote, |reader| {
                        io::copy(reader, &mut *out).map_err(FtpError::ConnectionError)
                    })
                    .map(|_| ())
                    .map_err(|e| network(endpoint, &format!("download {remote}"), e))
            })?;
            session.close();
            debug!("Staged {} -> {}", remote, path);

            if ctx.delete_after_receive() {
                let mut session = Self::connect(endpoint, ctx.retry())?;
                let removed = session
                    .stream
                    .rm(&remote)
                    .map_err(|e| network(endpoint, &format!("delete {remote}"), e));
                session.close();
                removed?;
                debug!("Deleted source {}", remote);
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

        let mut session = Self::connect(endpoint, ctx.retry())?;
        session.make_dirs(&dir);
        session.enter(endpoint, &dir)?;

        let mut target = FerryPath::join_remote(&dir, &name);
        let mut reader =
            File::open(local_file).map_err(|e| TransferError::io(format!("open {local_file}"), e))?;

        let mode = ctx.copy_mode();
        let written = match mode {
            // APPE creates the file when it is missing.
            CopyMode::Append => session.stream.append_file(&target, &mut reader),
            CopyMode::CreateNew if session.exists(&target) => {
                target = FerryPath::join_remote(&dir, &unique_name(FerryPath::remote_file_name(&name)));
                session.stream.put_file(&target, &mut reader)
            }
            _ => session.stream.put_file(&target, &mut reader),
        }
        .map_err(|e| network(endpoint, &format!("upload {target}"), e))?;
        session.close();

        info!("Sent {} -> {} ({}/{} bytes, {})", local_file, target, written, size, mode);
        Ok(endpoint.describe(FerryPath::remote_file_name(&target)))
    }

    fn delete(&self, path: &str) -> Result<(), TransferError> {
        let Some(endpoint) = self.parse_remote(path, self.credentials.clone())? else {
            return Ok(());
        };
        let mut session = Self::connect(&endpoint, &RetryPolicy::none())?;
        let result = match session.stream.rm(endpoint.path()) {
            Ok(()) => Ok(()),
            Err(FtpError::UnexpectedResponse(resp)) if resp.status.code() == 550 => {
                debug!("{} already gone", endpoint);
                Ok(())
            }
            Err(e) => Err(network(&endpoint, "delete", e)),
        };
        session.close();
        result
    }

    fn list_files(
        &self,
        path: &str,
        mask: &FileMask,
        user: &str,
        password: &str,
    ) -> Result<Vec<FileEntry>, TransferError> {
        let Some(endpoint) = self.parse_remote(path, Credentials::new(user, password))? else {
            return Ok(Vec::new());
        };
        let dir = FerryPath::absolute_remote(endpoint.path());
        match Self::listing(&endpoint, &dir, &RetryPolicy::none(), mask) {
            Err(TransferError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }
}
