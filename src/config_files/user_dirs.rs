//! XDG user directories (Desktop, Downloads, Documents, ...).
//!
//! Three convention files are involved:
//! - `user-dirs.conf`: system switches, e.g. `enabled=False`.
//! - `user-dirs.defaults`: system template of default locations.
//! - `user-dirs.dirs`: the user's actual choices, which win over the defaults.
//!
//! ```rust,no_run
//! use basedirs::config_files::{Options, user_dirs::UserDirs};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let user_dirs = UserDirs::new(&Options::default())?;
//! for (key, dir) in user_dirs.create()? {
//!     println!("{key} = {}", dir.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config_files::key_value::{
    self, ParseOptions, Properties, PropertyFn, PropertyValue, ResolveFn, interpolate,
};
use crate::config_files::options::{Context, Options};
use crate::os::env::Env;
use crate::os::platform::{Platform, UnsupportedPlatform};

pub const CONF_FILE: &str = "user-dirs.conf";
pub const DEFAULTS_FILE: &str = "user-dirs.defaults";
pub const DIRS_FILE: &str = "user-dirs.dirs";

/// Default system directory of `user-dirs.conf` and `user-dirs.defaults` on Unix.
pub const DEFAULT_ETC: &str = "/etc/xdg";

/// Canonical `XDG_<NAME>_DIR` key to absolute directory.
pub type UserDirsEntries = BTreeMap<String, PathBuf>;

/// Errors of the one-shot helpers that both pick a platform and read files.
#[derive(Debug, Error)]
pub enum UserDirsError {
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),

    #[error("failed to read user-dirs file: {0}")]
    Io(#[from] io::Error),
}

/// Locations of the convention files. Not checked for existence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserDirsPaths {
    pub conf: PathBuf,
    pub defaults: PathBuf,
    pub dirs: PathBuf,
}

impl UserDirsPaths {
    fn new(ctx: &Context<'_>) -> Self {
        let platform = ctx.platform;
        let etc = ctx
            .var("XDG_ETC")
            .map(str::to_owned)
            .or_else(|| {
                ctx.options
                    .etc
                    .as_ref()
                    .map(|etc| etc.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| match platform {
                Platform::Win32 => ctx.home.clone(),
                Platform::Linux | Platform::Darwin => DEFAULT_ETC.to_owned(),
            });
        let config_home = ctx.var("XDG_CONFIG_HOME").map_or_else(
            || match platform {
                Platform::Linux => ctx.home_join(&[".config"]),
                Platform::Darwin => ctx.home_join(&["Library", "Application Support"]),
                Platform::Win32 => ctx
                    .var("APPDATA")
                    .map_or_else(|| ctx.home_join(&["AppData", "Roaming"]), str::to_owned),
            },
            str::to_owned,
        );
        let file = |var: &str, dir: &str, name: &str| -> PathBuf {
            ctx.var(var)
                .map_or_else(|| platform.join(dir, [name]), str::to_owned)
                .into()
        };

        Self {
            conf: file("XDG_USER_DIRS_CONF", &etc, CONF_FILE),
            defaults: file("XDG_USER_DIRS_DEFAULTS", &etc, DEFAULTS_FILE),
            dirs: file("XDG_USER_DIRS", &config_home, DIRS_FILE),
        }
    }
}

/// Everything read from the convention files at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDirsSnapshot {
    pub paths: UserDirsPaths,
    pub config: Properties,
    /// Empty when disabled by `user-dirs.conf`.
    pub defaults: UserDirsEntries,
    /// Empty when disabled by `user-dirs.conf`.
    pub dirs: UserDirsEntries,
}

/// Convention file locations plus everything needed to parse them.
///
/// Files are read on every call; nothing is cached.
#[derive(Clone)]
pub struct UserDirs {
    pub paths: UserDirsPaths,
    pub home: String,
    platform: Platform,
    env: Env,
    on_property: Option<Arc<PropertyFn>>,
}

impl fmt::Debug for UserDirs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDirs")
            .field("paths", &self.paths)
            .field("home", &self.home)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl UserDirs {
    pub fn new(options: &Options) -> Result<Self, UnsupportedPlatform> {
        Context::new(options).map(Self::from_context)
    }

    pub(crate) fn from_context(ctx: Context<'_>) -> Self {
        Self {
            paths: UserDirsPaths::new(&ctx),
            on_property: ctx.options.on_property.clone(),
            home: ctx.home,
            platform: ctx.platform,
            env: ctx.env.into_owned(),
        }
    }

    /// Interpolate `value`, then join it onto home unless already absolute.
    pub fn resolve(&self, value: &str) -> String {
        let expanded = interpolate(value, &self.home, &self.env);
        if self.platform.is_absolute(&expanded) {
            expanded.into_owned()
        } else {
            self.platform.join(&self.home, [expanded])
        }
    }

    /// Parsed `user-dirs.conf`, keys and values as written (booleans coerced).
    pub fn config(&self) -> io::Result<Properties> {
        let on_property = self.on_property.as_deref();
        let options = ParseOptions::unformatted().with_on_property(on_property);
        key_value::parse_file(&self.paths.conf, options)
    }

    /// `false` only if `user-dirs.conf` says `enabled=false`.
    pub fn is_enabled(&self) -> io::Result<bool> {
        Ok(enabled_in(&self.config()?))
    }

    /// Parsed `user-dirs.defaults`.
    pub fn defaults(&self) -> io::Result<UserDirsEntries> {
        self.entries(&self.paths.defaults)
    }

    /// Parsed `user-dirs.dirs`.
    pub fn dirs(&self) -> io::Result<UserDirsEntries> {
        self.entries(&self.paths.dirs)
    }

    /// Defaults overlaid with the user's dirs, or nothing if disabled.
    pub fn create(&self) -> io::Result<UserDirsEntries> {
        if !self.is_enabled()? {
            debug!(conf = %self.paths.conf.display(), "user dirs disabled");
            return Ok(UserDirsEntries::new());
        }
        let mut entries = self.defaults()?;
        entries.extend(self.dirs()?);
        Ok(entries)
    }

    /// Read all three files, skipping defaults and dirs when disabled.
    pub fn load(&self) -> io::Result<UserDirsSnapshot> {
        let config = self.config()?;
        let (defaults, dirs) = if enabled_in(&config) {
            (self.defaults()?, self.dirs()?)
        } else {
            Default::default()
        };
        Ok(UserDirsSnapshot {
            paths: self.paths.clone(),
            config,
            defaults,
            dirs,
        })
    }

    fn entries(&self, path: &std::path::Path) -> io::Result<UserDirsEntries> {
        let resolve: &ResolveFn<'_> = &|value: &str| self.resolve(value);
        let options = ParseOptions::formatted(Some(resolve))
            .with_on_property(self.on_property.as_deref());
        let properties = key_value::parse_file(path, options)?;
        Ok(properties
            .into_iter()
            .filter_map(|(key, value)| match value {
                PropertyValue::Text(dir) => Some((key, PathBuf::from(dir))),
                PropertyValue::Bool(_) => {
                    trace!(key = %key, path = %path.display(), "ignoring boolean user dir");
                    None
                }
            })
            .collect())
    }
}

fn enabled_in(config: &Properties) -> bool {
    config.get("enabled").and_then(PropertyValue::as_bool) != Some(false)
}

/// Locations of the convention files for `options`.
pub fn paths(options: &Options) -> Result<UserDirsPaths, UnsupportedPlatform> {
    UserDirs::new(options).map(|user_dirs| user_dirs.paths)
}

/// Merged user directories for `options`; see [`UserDirs::create`].
pub fn create(options: &Options) -> Result<UserDirsEntries, UserDirsError> {
    Ok(UserDirs::new(options)?.create()?)
}
