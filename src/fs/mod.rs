//! Filesystem utilities and extensions.
//!
//! Provides the [`PathExt`](path_ext::PathExt) extension trait for [`Path`](std::path::Path), used
//! by the directory decoration layer to read and write under resolved directories.

pub mod path_ext;

pub use path_ext::{MkdirOptions, PathExt};
