pub mod commands;
pub mod jobs;
pub mod paths;

use clap::ValueEnum;
use ferry_core::CopyMode;

#[derive(ValueEnum, Clone, Debug, Copy)]
pub enum CliCopyMode {
    Overwrite,
    Append,
    CreateNew,
}

impl From<CliCopyMode> for CopyMode {
    fn from(m: CliCopyMode) -> Self {
        match m {
            CliCopyMode::Overwrite => CopyMode::Overwrite,
            CliCopyMode::Append => CopyMode::Append,
            CliCopyMode::CreateNew => CopyMode::CreateNew,
        }
    }
}
