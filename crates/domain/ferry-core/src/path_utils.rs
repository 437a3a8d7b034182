use std::path::MAIN_SEPARATOR;

pub struct FerryPath;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_endpoint_junk(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\'' | '"' | '<' | '>')
}

impl FerryPath {
    /// Strip the whitespace, quotes and angle brackets that upstream templating
    /// tends to leave around endpoint strings.
    pub fn sanitize(raw: &str) -> &str {
        raw.trim_matches(is_endpoint_junk)
    }

    /// Base name of a path written with either separator style.
    pub fn file_name(path: &str) -> &str {
        path.rsplit(is_separator).next().unwrap_or(path)
    }

    /// Base name of a remote path. Only `/` separates; a backslash is an
    /// ordinary character on FTP and SFTP servers.
    pub fn remote_file_name(path: &str) -> &str {
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Standardize a local path on the platform separator and drop trailing
    /// separators. A bare root (`/`, `C:\`) is kept intact.
    pub fn normalize_local(path: &str) -> String {
        let unified: String = path
            .chars()
            .map(|c| if is_separator(c) { MAIN_SEPARATOR } else { c })
            .collect();
        let trimmed = unified.trim_end_matches(MAIN_SEPARATOR);

        if trimmed.is_empty() {
            return if unified.is_empty() {
                String::new()
            } else {
                MAIN_SEPARATOR.to_string()
            };
        }
        if trimmed.len() < unified.len() && trimmed.len() == 2 && trimmed.ends_with(':') {
            return format!("{trimmed}{MAIN_SEPARATOR}");
        }
        trimmed.to_string()
    }

    /// Remote URIs keep their separators; only a trailing slash is removed.
    pub fn normalize_remote(uri: &str) -> String {
        let trimmed = uri.trim_end_matches(is_separator);
        if trimmed.ends_with(':') {
            return uri.to_string();
        }
        trimmed.to_string()
    }

    /// Join a remote directory and a file name with exactly one `/`.
    pub fn join_remote(dir: &str, name: &str) -> String {
        let dir = dir.trim_end_matches('/');
        let name = name.trim_start_matches('/');
        if dir.is_empty() {
            format!("/{name}")
        } else {
            format!("{dir}/{name}")
        }
    }

    /// Force a remote directory into absolute form. Empty means the server root.
    pub fn absolute_remote(dir: &str) -> String {
        let dir = dir.trim();
        if dir.is_empty() || dir == "/" {
            return "/".to_string();
        }
        let dir = dir.trim_end_matches('/');
        if dir.starts_with('/') {
            dir.to_string()
        } else {
            format!("/{dir}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FerryPath;

    #[test]
    fn sanitize_strips_interleaved_junk() {
        assert_eq!(FerryPath::sanitize("'  <ftp://host/dir>  '"), "ftp://host/dir");
        assert_eq!(FerryPath::sanitize("\"C:\\in\" "), "C:\\in");
        assert_eq!(FerryPath::sanitize(" \t "), "");
    }

    #[test]
    fn file_name_accepts_both_separators() {
        assert_eq!(FerryPath::file_name("a/b\\c.txt"), "c.txt");
        assert_eq!(FerryPath::file_name("c.txt"), "c.txt");
        assert_eq!(FerryPath::file_name("dir/"), "");
    }

    #[test]
    fn remote_file_name_splits_on_slash_only() {
        assert_eq!(FerryPath::remote_file_name("/in/x\\y.csv"), "x\\y.csv");
        assert_eq!(FerryPath::remote_file_name("a.csv"), "a.csv");
    }

    #[test]
    fn normalize_local_trims_trailing_separators_but_keeps_root() {
        let sep = std::path::MAIN_SEPARATOR;
        assert_eq!(
            FerryPath::normalize_local("data/in//"),
            format!("data{sep}in")
        );
        assert_eq!(FerryPath::normalize_local("/"), sep.to_string());
        assert_eq!(FerryPath::normalize_local("C:\\"), format!("C:{sep}"));
        assert_eq!(FerryPath::normalize_local(""), "");
    }

    #[test]
    fn remote_helpers() {
        assert_eq!(FerryPath::normalize_remote("ftp://h/dir/"), "ftp://h/dir");
        assert_eq!(FerryPath::join_remote("/", "a.txt"), "/a.txt");
        assert_eq!(FerryPath::join_remote("/in/", "a.txt"), "/in/a.txt");
        assert_eq!(FerryPath::absolute_remote("in/sub/"), "/in/sub");
        assert_eq!(FerryPath::absolute_remote(""), "/");
    }
}
