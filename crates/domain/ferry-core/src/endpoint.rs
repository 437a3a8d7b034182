//! Endpoint string classification.
//!
//! Resolution is a pure function of the string form: the same input always
//! yields the same protocol, no filesystem or network access is involved.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::path_utils::FerryPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Local,
    Ftp,
    Sftp,
}

impl Protocol {
    /// Maps a URI scheme to a transport. Anything that is not FTP or SFTP is
    /// treated as a local path (drive letters parse as one-letter schemes).
    pub fn from_scheme(scheme: &str) -> Self {
        if scheme.eq_ignore_ascii_case("ftp") {
            Protocol::Ftp
        } else if scheme.eq_ignore_ascii_case("sftp") {
            Protocol::Sftp
        } else {
            Protocol::Local
        }
    }

    pub fn default_port(self) -> Option<u16> {
        match self {
            Protocol::Local => None,
            Protocol::Ftp => Some(21),
            Protocol::Sftp => Some(22),
        }
    }

    pub fn is_remote(self) -> bool {
        !matches!(self, Protocol::Local)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Local => "Local",
            Protocol::Ftp => "FTP",
            Protocol::Sftp => "SFTP",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub protocol: Protocol,
    /// Canonical form: separator-normalized for local paths, the URI with any
    /// trailing slash removed for remote ones.
    pub path: String,
}

impl ResolvedPath {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Sanitize a raw endpoint string and classify its transport.
///
/// Blank input resolves to `Local` with an empty path; callers must reject it.
pub fn resolve(raw: &str) -> ResolvedPath {
    let clean = FerryPath::sanitize(raw);
    if clean.is_empty() {
        return ResolvedPath {
            protocol: Protocol::Local,
            path: String::new(),
        };
    }

    let protocol = detect_protocol(clean);
    let path = match protocol {
        Protocol::Local => FerryPath::normalize_local(clean),
        Protocol::Ftp | Protocol::Sftp => FerryPath::normalize_remote(clean),
    };
    ResolvedPath { protocol, path }
}

/// Protocol of an already sanitized string.
pub fn detect_protocol(clean: &str) -> Protocol {
    if let Ok(url) = Url::parse(clean) {
        return Protocol::from_scheme(url.scheme());
    }

    // `Url::parse` rejects things like `ftp://` with an empty host; those still
    // belong to the remote adapter so it can report a proper error.
    let lower = clean.to_ascii_lowercase();
    if lower.starts_with("ftp://") {
        Protocol::Ftp
    } else if lower.starts_with("sftp://") {
        Protocol::Sftp
    } else {
        Protocol::Local
    }
}
