use ferry_core::Protocol;

use super::adapter::TransferAdapter;
use super::ftp::FtpAdapter;
use super::local::LocalAdapter;
use super::sftp::SftpAdapter;
use super::{Credentials, Endpoint, TransferError};

/// Chooses the transport for an endpoint. A trait so hosts and tests can
/// substitute their own adapters.
pub trait AdapterFactory: Send + Sync {
    fn create(&self, endpoint: &Endpoint) -> Result<Box<dyn TransferAdapter>, TransferError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAdapterFactory;

impl DefaultAdapterFactory {
    /// Adapter for a protocol. `credentials` are only kept by transports
    /// whose `delete` needs them.
    pub fn for_protocol(protocol: Protocol, credentials: Credentials) -> Box<dyn TransferAdapter> {
        match protocol {
            Protocol::Local => Box::new(LocalAdapter::new()),
            Protocol::Ftp => Box::new(FtpAdapter::new(credentials)),
            Protocol::Sftp => Box::new(SftpAdapter::new()),
        }
    }

    /// Adapter for a raw path string, by its detected protocol.
    pub fn for_path(raw: &str) -> Box<dyn TransferAdapter> {
        Self::for_protocol(ferry_core::resolve(raw).protocol, Credentials::default())
    }
}

impl AdapterFactory for DefaultAdapterFactory {
    fn create(&self, endpoint: &Endpoint) -> Result<Box<dyn TransferAdapter>, TransferError> {
        Ok(Self::for_protocol(
            endpoint.protocol(),
            endpoint.credentials().clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_selects_matching_transport() {
        let cases = [
            ("/var/in", Protocol::Local),
            ("C:\\in", Protocol::Local),
            ("ftp://h/in", Protocol::Ftp),
            ("SFTP://h/in", Protocol::Sftp),
            ("", Protocol::Local),
        ];
        for (raw, expected) in cases {
            assert_eq!(DefaultAdapterFactory::for_path(raw).protocol(), expected, "{raw}");
        }
    }

    #[test]
    fn create_uses_endpoint_protocol() {
        let endpoint = Endpoint::parse("sftp://h:2200/in", Credentials::new("u", "p")).unwrap();
        let adapter = DefaultAdapterFactory.create(&endpoint).unwrap();
        assert_eq!(adapter.protocol(), Protocol::Sftp);
    }
}
