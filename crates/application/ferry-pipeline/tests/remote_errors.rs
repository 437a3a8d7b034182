//! Remote transports against a closed local port. No servers are needed: every
//! case here fails before or at connection time.

use std::fs;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ferry_pipeline::transfer::ftp::FtpAdapter;
use ferry_pipeline::transfer::sftp::SftpAdapter;
use ferry_pipeline::{
    Credentials, DefaultAdapterFactory, Endpoint, FileMask, MemorySink, SendContext,
    TransferAdapter, TransferError, TransferErrorKind, TransferOrchestrator, TransferParams,
};
use tempfile::tempdir;

const CLOSED_FTP: &str = "ftp://127.0.0.1:1/in";
const CLOSED_SFTP: &str = "sftp://127.0.0.1:1/out";

fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let guard = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).unwrap();
    (guard, root)
}

#[test]
fn unreachable_ftp_source_is_a_network_error_after_retries() {
    let (_guard, root) = utf8_tempdir();
    let sink = Arc::new(MemorySink::new());
    let orchestrator = TransferOrchestrator::with_components(
        Arc::new(DefaultAdapterFactory),
        sink.clone(),
        Some(root.join("work")),
    );

    let err = orchestrator
        .run(TransferParams {
            source_path: CLOSED_FTP.into(),
            source_user: "u".into(),
            source_password: "p".into(),
            source_retry_count: "2".into(),
            source_retry_interval: "0".into(),
            destination_path: root.join("out").to_string(),
            ..Default::default()
        })
        .unwrap_err();

    assert_eq!(err.kind(), TransferErrorKind::Network);
    let staging_parent = root.join("work").join(ferry_config::STAGING_DIR_NAME);
    assert_eq!(fs::read_dir(staging_parent).map(|d| d.count()).unwrap_or(0), 0);
    assert!(!root.join("out").exists());
}

#[test]
fn unreachable_sftp_destination_fails_the_run_and_keeps_sources() {
    let (_guard, root) = utf8_tempdir();
    let source = root.join("in");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("a.txt"), b"payload").unwrap();

    let orchestrator = TransferOrchestrator::with_components(
        Arc::new(DefaultAdapterFactory),
        Arc::new(MemorySink::new()),
        Some(root.join("work")),
    );
    let err = orchestrator
        .run(TransferParams {
            source_path: source.to_string(),
            destination_path: CLOSED_SFTP.into(),
            destination_user: "u".into(),
            destination_password: "p".into(),
            ..Default::default()
        })
        .unwrap_err();

    assert!(matches!(err, TransferError::Network(_)), "got {err:?}");
    assert!(source.join("a.txt").exists());
}

#[test]
fn sending_a_missing_file_is_not_found_before_connecting() {
    let (_guard, root) = utf8_tempdir();
    let missing = root.join("ghost.bin");

    let adapters: Vec<(Box<dyn TransferAdapter>, &str)> = vec![
        (Box::new(FtpAdapter::new(Credentials::default())), CLOSED_FTP),
        (Box::new(SftpAdapter::new()), CLOSED_SFTP),
    ];
    for (adapter, uri) in adapters {
        let ctx = SendContext::new(Endpoint::parse(uri, Credentials::new("u", "p")).unwrap());
        let err = adapter.send(&missing, &ctx).unwrap_err();
        assert!(matches!(err, TransferError::NotFound(_)), "{uri}: {err:?}");
    }
}

#[test]
fn remote_listing_surfaces_connection_failures() {
    let mask = FileMask::match_all();

    let err = FtpAdapter::default()
        .list_files(CLOSED_FTP, &mask, "u", "p")
        .unwrap_err();
    assert_eq!(err.kind(), TransferErrorKind::Network);

    let err = SftpAdapter::new()
        .list_files(CLOSED_SFTP, &mask, "u", "p")
        .unwrap_err();
    assert_eq!(err.kind(), TransferErrorKind::Network);

    assert!(FtpAdapter::default().list_files("", &mask, "", "").unwrap().is_empty());
}

#[test]
fn ftp_delete_uses_its_own_connection() {
    let err = FtpAdapter::new(Credentials::new("u", "p"))
        .delete("ftp://127.0.0.1:1/in/a.txt")
        .unwrap_err();
    assert_eq!(err.kind(), TransferErrorKind::Network);

    let err = SftpAdapter::new().delete("sftp://127.0.0.1:1/in/a.txt").unwrap_err();
    assert_eq!(err.kind(), TransferErrorKind::Unsupported);
}
