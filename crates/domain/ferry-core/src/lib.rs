use serde::{Deserialize, Serialize};

pub mod copy_mode;
pub mod endpoint;
pub mod mask;
pub mod naming;
pub mod path_utils;
pub mod scalar;

pub use copy_mode::CopyMode;
pub use endpoint::{resolve, Protocol, ResolvedPath};
pub use mask::FileMask;
pub use naming::FileNameFormatter;

/// Placeholder that expands to the source file's base name.
pub const SOURCE_FILE_NAME_TOKEN: &str = "%SourceFileName%";

/// One entry of a directory snapshot returned by `ListFiles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: Option<u64>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}
