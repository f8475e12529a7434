//! extpack - pack a directory's top-level entries into per-extension folders
//!
//! This library groups the immediate children of a source directory by file
//! extension and, after a yes/no confirmation per group, moves each group into
//! `<target>/<ext>_files/`.

pub mod cli;
pub mod config;
pub mod grouping;
pub mod output;
pub mod packer;
pub mod prompt;

pub use cli::{PackReport, PackRequest, RunError, run_with_config};
pub use config::{CompiledConfig, ConfigError, PackConfig};
pub use grouping::{ExtensionGroup, ExtensionGroups, extension_of};
pub use output::{Level, Logger};
pub use packer::PackError;
pub use prompt::{AssumeYes, Confirm, LinePrompt};
