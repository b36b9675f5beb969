//! Basedirs - XDG base directories and user directories across platforms.
//!
//! This crate resolves cache, config, data, runtime, state and logs directories for Linux, macOS
//! and Windows, reads the `user-dirs.*` convention files, and offers file helpers over the
//! resolved directories.

pub mod config_files;
pub mod fs;
pub mod os;

pub use config_files::expand::{Directory, DirectoryExt, ExpandedDirectories};
pub use config_files::xdg::{BaseDirectories, Directories, base_dirs, xdg};
pub use config_files::{Category, Options};
