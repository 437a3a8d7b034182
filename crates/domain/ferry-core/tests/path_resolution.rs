use ferry_core::{resolve, Protocol};

#[test]
fn resolves_scheme_to_protocol() {
    assert_eq!(resolve("ftp://host/path").protocol, Protocol::Ftp);
    assert_eq!(resolve("sftp://host:2222/x").protocol, Protocol::Sftp);
    assert_eq!(resolve("FTP://HOST/IN").protocol, Protocol::Ftp);
    assert_eq!(resolve("SFTP://host").protocol, Protocol::Sftp);
    assert_eq!(resolve("http://host/x").protocol, Protocol::Local);
}

#[test]
fn windows_and_unix_paths_are_local() {
    assert_eq!(resolve("C:\\data\\in").protocol, Protocol::Local);
    assert_eq!(resolve("/var/spool/in").protocol, Protocol::Local);
    assert_eq!(resolve("\\\\server\\share\\in").protocol, Protocol::Local);
    assert_eq!(resolve("relative/dir").protocol, Protocol::Local);
}

#[test]
fn dirty_wrapping_is_stripped_before_classification() {
    let resolved = resolve("'  <ftp://host/dir>  '");
    assert_eq!(resolved.protocol, Protocol::Ftp);
    assert_eq!(resolved.path, "ftp://host/dir");

    let resolved = resolve("\"sftp://host/out/\"");
    assert_eq!(resolved.protocol, Protocol::Sftp);
    assert_eq!(resolved.path, "sftp://host/out");
}

#[test]
fn hostless_remote_uri_falls_back_to_prefix_check() {
    assert_eq!(resolve("ftp://").protocol, Protocol::Ftp);
}

#[test]
fn blank_input_is_local_and_empty() {
    for raw in ["", "   ", "''", "<>", " \"\" "] {
        let resolved = resolve(raw);
        assert_eq!(resolved.protocol, Protocol::Local, "{raw:?}");
        assert!(resolved.is_empty(), "{raw:?}");
    }
}

#[test]
fn local_paths_are_separator_normalized() {
    let sep = std::path::MAIN_SEPARATOR;
    assert_eq!(resolve("data/in/").path, format!("data{sep}in"));
    assert_eq!(resolve("data\\in\\\\").path, format!("data{sep}in"));
}

#[test]
fn resolution_is_deterministic() {
    let raw = " <sftp://example.org:2222/inbox/> ";
    assert_eq!(resolve(raw), resolve(raw));
}
