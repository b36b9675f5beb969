//! Options bag shared by every resolver, and the category merger.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config_files::key_value::PropertyFn;
use crate::config_files::resolve_home;
use crate::os::env::Env;
use crate::os::platform::{Platform, UnsupportedPlatform};

/// Base directory category.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Cache,
    Config,
    Data,
    Runtime,
    State,
    Logs,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Cache,
        Category::Config,
        Category::Data,
        Category::Runtime,
        Category::State,
        Category::Logs,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Config => "config",
            Self::Data => "data",
            Self::Runtime => "runtime",
            Self::State => "state",
            Self::Logs => "logs",
        }
    }

    /// Middle part of the `<PREFIX>_<NAME>_DIR` override variable.
    const fn env_name(self) -> &'static str {
        match self {
            Self::Cache => "CACHE",
            Self::Config => "CONFIG",
            Self::Data => "DATA",
            Self::Runtime => "RUNTIME",
            Self::State => "STATE",
            Self::Logs => "LOG",
        }
    }

    /// Name of the override variable for `prefix`, e.g. `XDG_CACHE_DIR`.
    pub fn env_var(self, prefix: &str) -> String {
        format!("{}_{}_DIR", prefix.to_uppercase(), self.env_name())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of a single resolution call.
///
/// Nothing here is mutated by the resolvers; unset fields fall back to the host (process
/// environment, OS home directory, host temp directory, compile-time platform).
///
/// ```rust
/// use basedirs::config_files::Options;
/// use basedirs::os::env::Env;
///
/// let options = Options::default()
///     .with_platform("linux")
///     .with_env(Env::empty())
///     .with_homedir("/home/u")
///     .with_subdir("toolkit");
/// assert_eq!(options.subdir(), "toolkit");
/// ```
#[derive(Clone, Default)]
pub struct Options {
    /// Platform name; see [`Platform`]'s `FromStr` for accepted values.
    pub platform: Option<String>,
    pub env: Option<Env>,
    pub homedir: Option<PathBuf>,
    pub tempdir: Option<PathBuf>,
    /// Application directory appended to every category.
    pub subdir: Option<String>,
    /// On Windows, base `data` on `%APPDATA%` instead of `%LOCALAPPDATA%`.
    pub roaming: bool,
    pub cwd: Option<PathBuf>,
    /// Prefix of the `<PREFIX>_<CATEGORY>_DIR` override variables. Defaults to `XDG`.
    pub env_prefix: Option<String>,
    /// Make [`xdg`](crate::config_files::xdg::xdg) return expanded directories.
    pub expanded: bool,
    /// System directory holding `user-dirs.conf` and `user-dirs.defaults`.
    pub etc: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
    /// Replaces the default per-line handling of convention files.
    pub on_property: Option<Arc<PropertyFn>>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("platform", &self.platform)
            .field("env", &self.env)
            .field("homedir", &self.homedir)
            .field("tempdir", &self.tempdir)
            .field("subdir", &self.subdir)
            .field("roaming", &self.roaming)
            .field("cwd", &self.cwd)
            .field("env_prefix", &self.env_prefix)
            .field("expanded", &self.expanded)
            .field("etc", &self.etc)
            .field("cache_dir", &self.cache_dir)
            .field("config_dir", &self.config_dir)
            .field("data_dir", &self.data_dir)
            .field("runtime_dir", &self.runtime_dir)
            .field("state_dir", &self.state_dir)
            .field("logs_dir", &self.logs_dir)
            .field("on_property", &self.on_property.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Options {
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_homedir(mut self, home: impl Into<PathBuf>) -> Self {
        self.homedir = Some(home.into());
        self
    }

    pub fn with_tempdir(mut self, temp: impl Into<PathBuf>) -> Self {
        self.tempdir = Some(temp.into());
        self
    }

    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    pub fn with_roaming(mut self, roaming: bool) -> Self {
        self.roaming = roaming;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn with_etc(mut self, etc: impl Into<PathBuf>) -> Self {
        self.etc = Some(etc.into());
        self
    }

    /// Set the direct override for `category`.
    pub fn with_dir(mut self, category: Category, dir: impl Into<PathBuf>) -> Self {
        let dir = Some(dir.into());
        match category {
            Category::Cache => self.cache_dir = dir,
            Category::Config => self.config_dir = dir,
            Category::Data => self.data_dir = dir,
            Category::Runtime => self.runtime_dir = dir,
            Category::State => self.state_dir = dir,
            Category::Logs => self.logs_dir = dir,
        }
        self
    }

    pub fn with_on_property(mut self, on_property: Arc<PropertyFn>) -> Self {
        self.on_property = Some(on_property);
        self
    }

    /// Requested platform, or the host one.
    pub fn platform(&self) -> Result<Platform, UnsupportedPlatform> {
        match &self.platform {
            Some(name) => name.parse(),
            None => Ok(Platform::current()),
        }
    }

    /// Injected environment, or a snapshot of the process one.
    pub fn env(&self) -> Cow<'_, Env> {
        match &self.env {
            Some(env) => Cow::Borrowed(env),
            None => Cow::Owned(Env::new()),
        }
    }

    pub fn subdir(&self) -> &str {
        self.subdir.as_deref().unwrap_or_default()
    }

    pub fn env_prefix(&self) -> &str {
        self.env_prefix.as_deref().unwrap_or("XDG")
    }

    /// Direct override set on the options for `category`.
    pub fn dir(&self, category: Category) -> Option<&Path> {
        let dir = match category {
            Category::Cache => &self.cache_dir,
            Category::Config => &self.config_dir,
            Category::Data => &self.data_dir,
            Category::Runtime => &self.runtime_dir,
            Category::State => &self.state_dir,
            Category::Logs => &self.logs_dir,
        };
        dir.as_deref().filter(|dir| !dir.as_os_str().is_empty())
    }

    /// Explicit location of `category`, if any.
    ///
    /// Precedence: the option override, then `<PREFIX>_<CATEGORY>_DIR` from `env`. `None` means
    /// the platform default applies.
    pub fn category_override(&self, category: Category, env: &Env) -> Option<String> {
        if let Some(dir) = self.dir(category) {
            return Some(dir.to_string_lossy().into_owned());
        }
        env.get_non_empty(category.env_var(self.env_prefix()))
            .map(str::to_owned)
    }
}

/// [`Options`] with host fallbacks applied, shared by the platform builders.
#[derive(Debug)]
pub(crate) struct Context<'a> {
    pub(crate) options: &'a Options,
    pub(crate) platform: Platform,
    pub(crate) env: Cow<'a, Env>,
    pub(crate) home: String,
    pub(crate) temp: String,
}

impl<'a> Context<'a> {
    pub(crate) fn new(options: &'a Options) -> Result<Self, UnsupportedPlatform> {
        let platform = options.platform()?;
        let env = options.env();
        let home = resolve_home(platform, options.homedir.as_deref())
            .to_string_lossy()
            .into_owned();
        let temp = match &options.tempdir {
            Some(temp) if !temp.as_os_str().is_empty() => temp.to_string_lossy().into_owned(),
            _ => {
                let vars: &[&str] = match platform {
                    Platform::Win32 => &["TEMP", "TMP"],
                    Platform::Linux | Platform::Darwin => &["TMPDIR"],
                };
                env.first_of(vars.iter().copied())
                    .map(str::to_owned)
                    .unwrap_or_else(|| std::env::temp_dir().to_string_lossy().into_owned())
            }
        };
        Ok(Self {
            options,
            platform,
            env,
            home,
            temp,
        })
    }

    /// Variable from the snapshot, if set and non-empty.
    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.env.get_non_empty(key)
    }

    /// Variable from the snapshot, or `default` when unset.
    pub(crate) fn var_or(&self, key: &str, default: impl FnOnce() -> String) -> String {
        self.var(key).map_or_else(default, str::to_owned)
    }

    /// `segments` joined onto the home directory.
    pub(crate) fn home_join(&self, segments: &[&str]) -> String {
        self.platform.join(&self.home, segments)
    }

    /// Base of `category`: an explicit override, or `default`.
    pub(crate) fn merged(&self, category: Category, default: impl FnOnce() -> String) -> String {
        self.options
            .category_override(category, &self.env)
            .unwrap_or_else(default)
    }
}
