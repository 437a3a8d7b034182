use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Destination-collision policy applied when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CopyMode {
    #[default]
    Overwrite,
    Append,
    CreateNew,
}

impl CopyMode {
    /// Empty or unrecognized text falls back to `Overwrite`.
    pub fn parse_loose(raw: &str) -> Self {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' ' | '\'' | '"'))
            .collect::<String>()
            .to_ascii_uppercase();
        match folded.as_str() {
            "APPEND" => CopyMode::Append,
            "CREATENEW" => CopyMode::CreateNew,
            _ => CopyMode::Overwrite,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CopyMode::Overwrite => "OVERWRITE",
            CopyMode::Append => "APPEND",
            CopyMode::CreateNew => "CREATENEW",
        }
    }
}

impl fmt::Display for CopyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insert a random token before the extension: `a.txt` -> `a_<hex>.txt`.
pub fn unique_name(file_name: &str) -> String {
    let token = Uuid::new_v4().simple();
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}_{}{}", &file_name[..idx], token, &file_name[idx..]),
        _ => format!("{file_name}_{token}"),
    }
}
