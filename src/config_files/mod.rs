//! Base directories, user directories and the convention files behind them.
//!
//! [`xdg`](xdg::xdg) resolves cache, config, data, runtime, state and logs directories for Linux,
//! macOS and Windows; [`user_dirs`] locates and merges the `user-dirs.*` files.
//!
//! ```rust
//! use basedirs::config_files::{Options, xdg};
//! use basedirs::os::env::Env;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = Options::default()
//!     .with_platform("linux")
//!     .with_env(Env::empty())
//!     .with_homedir("/home/u");
//!
//! let dirs = xdg::base_dirs(&options)?;
//! assert_eq!(dirs.config, std::path::Path::new("/home/u/.config"));
//! # Ok(())
//! # }
//! ```

use std::{env::home_dir, path::Path, path::PathBuf};

use tracing::warn;

use crate::os::platform::Platform;

pub mod casing;
pub mod expand;
pub mod key_value;
pub mod loaders;
pub mod options;
pub mod user_dirs;
pub mod xdg;

pub use options::{Category, Options};

/// Home used on POSIX platforms when the OS cannot report one.
pub const POSIX_FALLBACK_HOME: &str = "/usr/local/share";

/// Wrapper around [`std::env::home_dir`].
pub fn home() -> Option<PathBuf> {
    home_dir().filter(|home| !home.as_os_str().is_empty())
}

/// Home directory for `platform`.
///
/// `override_home` wins when non-empty. Otherwise the OS is asked, and if it has no answer the
/// temp directory (Windows) or [`POSIX_FALLBACK_HOME`] is returned, so this never fails.
pub fn resolve_home(platform: Platform, override_home: Option<&Path>) -> PathBuf {
    if let Some(home) = override_home.filter(|home| !home.as_os_str().is_empty()) {
        return home.to_path_buf();
    }
    home().unwrap_or_else(|| {
        let fallback = match platform {
            Platform::Win32 => std::env::temp_dir(),
            Platform::Linux | Platform::Darwin => PathBuf::from(POSIX_FALLBACK_HOME),
        };
        warn!(platform = %platform, fallback = %fallback.display(), "no home directory, using fallback");
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_home_wins() {
        assert_eq!(
            resolve_home(Platform::Linux, Some(Path::new("/home/u"))),
            Path::new("/home/u")
        );
    }

    #[test]
    fn empty_override_falls_through() {
        let home = resolve_home(Platform::Linux, Some(Path::new("")));
        assert!(!home.as_os_str().is_empty());
    }
}
