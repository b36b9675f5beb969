//! XDG Base Directory Specification support.
//!
//! Implements path resolution following the XDG Base Directory spec on Linux, with equivalent
//! layouts for macOS (`~/Library/...`) and Windows (`%APPDATA%`, `%LOCALAPPDATA%`).
//!
//! Every category is resolved the same way: an explicit override ([`Options`] field, then
//! `<PREFIX>_<CATEGORY>_DIR`) or the platform default, followed by the optional `subdir` joined
//! through the [casing resolver](crate::config_files::casing).

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::config_files::casing;
use crate::config_files::expand::{self, ExpandedDirectories};
use crate::config_files::options::{Category, Context, Options};
use crate::os::platform::{Platform, UnsupportedPlatform};

/// Default `$XDG_CONFIG_DIRS`.
pub const DEFAULT_CONFIG_DIRS: &str = "/etc/xdg";
/// Default `$XDG_DATA_DIRS`.
pub const DEFAULT_DATA_DIRS: &str = "/usr/local/share/:/usr/share/";
/// Default logs directory on Linux.
pub const DEFAULT_LOG_DIR: &str = "/var/log";

/// Resolved base directories of one platform.
///
/// `config_dirs[0] == config` and `data_dirs[0] == data` always hold; the remaining entries are
/// the system search path, in lookup order and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BaseDirectories {
    pub cache: PathBuf,
    pub config: PathBuf,
    pub config_dirs: Vec<PathBuf>,
    pub data: PathBuf,
    pub data_dirs: Vec<PathBuf>,
    pub runtime: PathBuf,
    pub logs: PathBuf,
    pub state: PathBuf,
}

/// Either plain or expanded directories, depending on [`Options::expanded`].
#[derive(Debug, Clone)]
pub enum Directories {
    Base(BaseDirectories),
    Expanded(Box<ExpandedDirectories>),
}

/// Resolve directories for `options`, expanding them if [`Options::expanded`] is set.
pub fn xdg(options: &Options) -> Result<Directories, UnsupportedPlatform> {
    if options.expanded {
        expand::expanded_dirs(options).map(|dirs| Directories::Expanded(Box::new(dirs)))
    } else {
        base_dirs(options).map(Directories::Base)
    }
}

/// Resolve base directories for the platform requested in `options`.
///
/// # Errors
/// [`UnsupportedPlatform`] if `options.platform` names no known platform.
///
/// ```rust
/// use basedirs::config_files::{Options, xdg::base_dirs};
///
/// let err = base_dirs(&Options::default().with_platform("plan9")).unwrap_err();
/// assert_eq!(err.0, "plan9");
/// ```
pub fn base_dirs(options: &Options) -> Result<BaseDirectories, UnsupportedPlatform> {
    Context::new(options).map(|ctx| build(&ctx))
}

pub(crate) fn build(ctx: &Context<'_>) -> BaseDirectories {
    debug!(platform = %ctx.platform, home = %ctx.home, "resolving base directories");
    match ctx.platform {
        Platform::Linux => linux(ctx),
        Platform::Darwin => darwin(ctx),
        Platform::Win32 => win32(ctx),
    }
}

/// Resolve `category`'s base and join `subdir` and `suffix` onto it.
fn own_dir(
    ctx: &Context<'_>,
    category: Category,
    suffix: &[&str],
    default: impl FnOnce() -> String,
) -> String {
    let base = ctx.merged(category, default);
    let mut segments = vec![ctx.options.subdir()];
    segments.extend_from_slice(suffix);
    casing::resolve(ctx.platform, &base, &segments)
}

/// `[own] ++ system`, keeping the first occurrence of every entry.
fn search_path(own: &str, system: Vec<String>) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::with_capacity(system.len() + 1);
    for dir in std::iter::once(own.to_owned()).chain(system) {
        let dir = PathBuf::from(dir);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

fn system_dirs(ctx: &Context<'_>, var: &str, default: Option<&str>) -> Vec<String> {
    ctx.var(var)
        .or(default)
        .map(|list| ctx.platform.split_paths(list))
        .unwrap_or_default()
}

fn linux(ctx: &Context<'_>) -> BaseDirectories {
    let cache = own_dir(ctx, Category::Cache, &[], || {
        ctx.var_or("XDG_CACHE_HOME", || ctx.home_join(&[".cache"]))
    });
    let config = own_dir(ctx, Category::Config, &[], || {
        ctx.var_or("XDG_CONFIG_HOME", || ctx.home_join(&[".config"]))
    });
    let data = own_dir(ctx, Category::Data, &[], || {
        ctx.var_or("XDG_DATA_HOME", || ctx.home_join(&[".local", "share"]))
    });
    let state = own_dir(ctx, Category::State, &[], || {
        ctx.var_or("XDG_STATE_HOME", || ctx.home_join(&[".local", "state"]))
    });
    let runtime = own_dir(ctx, Category::Runtime, &[], || {
        ctx.var_or("XDG_RUNTIME_DIR", || ctx.temp.clone())
    });
    let logs = own_dir(ctx, Category::Logs, &[], || DEFAULT_LOG_DIR.to_owned());
    let config_dirs = system_dirs(ctx, "XDG_CONFIG_DIRS", Some(DEFAULT_CONFIG_DIRS));
    let data_dirs = system_dirs(ctx, "XDG_DATA_DIRS", Some(DEFAULT_DATA_DIRS));

    BaseDirectories {
        config_dirs: search_path(&config, config_dirs),
        data_dirs: search_path(&data, data_dirs),
        cache: cache.into(),
        config: config.into(),
        data: data.into(),
        runtime: runtime.into(),
        logs: logs.into(),
        state: state.into(),
    }
}

fn darwin(ctx: &Context<'_>) -> BaseDirectories {
    let app_support = || ctx.home_join(&["Library", "Application Support"]);

    let cache = own_dir(ctx, Category::Cache, &[], || {
        ctx.var_or("XDG_CACHE_HOME", || ctx.home_join(&["Library", "Caches"]))
    });
    let config = own_dir(ctx, Category::Config, &[], || {
        ctx.var_or("XDG_CONFIG_HOME", app_support)
    });
    let data = own_dir(ctx, Category::Data, &[], || {
        ctx.var_or("XDG_DATA_HOME", app_support)
    });
    let state = own_dir(ctx, Category::State, &[], || {
        ctx.var_or("XDG_STATE_HOME", app_support)
    });
    let runtime = own_dir(ctx, Category::Runtime, &[], || {
        ctx.var_or("XDG_RUNTIME_DIR", || ctx.temp.clone())
    });
    let logs = logs_under_cache(ctx, &cache);
    let config_dirs = system_dirs(ctx, "XDG_CONFIG_DIRS", Some(DEFAULT_CONFIG_DIRS));
    let data_dirs = system_dirs(ctx, "XDG_DATA_DIRS", Some(DEFAULT_DATA_DIRS));

    BaseDirectories {
        config_dirs: search_path(&config, config_dirs),
        data_dirs: search_path(&data, data_dirs),
        cache: cache.into(),
        config: config.into(),
        data: data.into(),
        runtime: runtime.into(),
        logs: logs.into(),
        state: state.into(),
    }
}

fn win32(ctx: &Context<'_>) -> BaseDirectories {
    let roaming = ctx.var_or("APPDATA", || ctx.home_join(&["AppData", "Roaming"]));
    let local = ctx.var_or("LOCALAPPDATA", || ctx.home_join(&["AppData", "Local"]));
    let data_base = if ctx.options.roaming { &roaming } else { &local };

    let cache = own_dir(ctx, Category::Cache, &["Cache"], || {
        ctx.var_or("XDG_CACHE_HOME", || ctx.temp.clone())
    });
    let config = own_dir(ctx, Category::Config, &["Config"], || {
        ctx.var_or("XDG_CONFIG_HOME", || roaming.clone())
    });
    let data = own_dir(ctx, Category::Data, &["Data"], || {
        ctx.var_or("XDG_DATA_HOME", || data_base.clone())
    });
    let runtime = own_dir(ctx, Category::Runtime, &[], || {
        ctx.var_or("XDG_RUNTIME_DIR", || ctx.temp.clone())
    });
    // Without a subdir the state lands in `<local>\xdg`.
    let state_base = ctx.merged(Category::State, || {
        ctx.var_or("XDG_STATE_HOME", || local.clone())
    });
    let state = match ctx.options.subdir() {
        "" => casing::resolve(ctx.platform, &state_base, &[]),
        subdir => casing::resolve(ctx.platform, &state_base, &[subdir]),
    };
    let logs = logs_under_cache(ctx, &cache);
    let config_dirs = system_dirs(ctx, "XDG_CONFIG_DIRS", None);
    let data_dirs = system_dirs(ctx, "XDG_DATA_DIRS", None);

    BaseDirectories {
        config_dirs: search_path(&config, config_dirs),
        data_dirs: search_path(&data, data_dirs),
        cache: cache.into(),
        config: config.into(),
        data: data.into(),
        runtime: runtime.into(),
        logs: logs.into(),
        state: state.into(),
    }
}

/// `<cache>/logs` unless the logs category is overridden.
fn logs_under_cache(ctx: &Context<'_>, cache: &str) -> String {
    match ctx.options.category_override(Category::Logs, &ctx.env) {
        Some(logs) => casing::resolve(ctx.platform, &logs, &[ctx.options.subdir()]),
        None => ctx.platform.join(cache, ["logs"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os::env::Env;
    use claim::{assert_err, assert_ok};
    use std::path::Path;

    fn options(platform: &str, home: &str) -> Options {
        Options::default()
            .with_platform(platform)
            .with_env(Env::empty())
            .with_homedir(home)
            .with_tempdir("/tmp")
    }

    fn paths(dirs: &[&str]) -> Vec<PathBuf> {
        dirs.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn linux_defaults() {
        let dirs = assert_ok!(base_dirs(&options("linux", "/home/u")));
        assert_eq!(dirs.config, Path::new("/home/u/.config"));
        assert_eq!(dirs.data, Path::new("/home/u/.local/share"));
        assert_eq!(dirs.cache, Path::new("/home/u/.cache"));
        assert_eq!(dirs.state, Path::new("/home/u/.local/state"));
        assert_eq!(dirs.runtime, Path::new("/tmp"));
        assert_eq!(dirs.logs, Path::new("/var/log"));
        assert_eq!(dirs.config_dirs, paths(&["/home/u/.config", "/etc/xdg"]));
        let data_dirs = ["/home/u/.local/share", "/usr/local/share/", "/usr/share/"];
        assert_eq!(dirs.data_dirs, paths(&data_dirs));
    }

    #[test]
    fn linux_honours_xdg_variables() {
        let env = Env::from_iter([
            ("XDG_CACHE_HOME", "/c"),
            ("XDG_DATA_HOME", "/d"),
            ("XDG_STATE_HOME", "/s"),
            ("XDG_RUNTIME_DIR", "/run/user/1000"),
            ("XDG_LOG_DIR", "/logs"),
            ("XDG_DATA_DIRS", "/opt/share:/usr/share"),
        ]);
        let dirs = assert_ok!(base_dirs(&options("linux", "/home/u").with_env(env)));
        assert_eq!(dirs.cache, Path::new("/c"));
        assert_eq!(dirs.data, Path::new("/d"));
        assert_eq!(dirs.state, Path::new("/s"));
        assert_eq!(dirs.runtime, Path::new("/run/user/1000"));
        assert_eq!(dirs.logs, Path::new("/logs"));
        assert_eq!(dirs.data_dirs, paths(&["/d", "/opt/share", "/usr/share"]));
    }

    #[test]
    fn xdg_state_dir_beats_xdg_state_home() {
        let env = Env::from_iter([
            ("XDG_STATE_HOME", "/state-home"),
            ("XDG_STATE_DIR", "/state-dir"),
        ]);
        for (platform, home) in [("linux", "/home/u"), ("darwin", "/Users/u")] {
            let opts = options(platform, home).with_env(env.clone());
            let dirs = assert_ok!(base_dirs(&opts));
            assert_eq!(dirs.state, Path::new("/state-dir"));

            let dirs = assert_ok!(base_dirs(&opts.with_subdir("App")));
            assert_eq!(dirs.state, Path::new("/state-dir/app"));
        }

        let env = Env::from_iter([("XDG_STATE_HOME", "/s")]);
        let dirs = assert_ok!(base_dirs(&options("linux", "/home/u").with_env(env)));
        assert_eq!(dirs.state, Path::new("/s"));
    }

    #[test]
    fn darwin_defaults() {
        let dirs = assert_ok!(base_dirs(&options("darwin", "/Users/u")));
        let support = Path::new("/Users/u/Library/Application Support");
        assert_eq!(dirs.config, support);
        assert_eq!(dirs.data, support);
        assert_eq!(dirs.state, support);
        assert_eq!(dirs.cache, Path::new("/Users/u/Library/Caches"));
        assert_eq!(dirs.logs, Path::new("/Users/u/Library/Caches/logs"));
        assert_eq!(
            dirs.config_dirs,
            paths(&["/Users/u/Library/Application Support", "/etc/xdg"])
        );
    }

    #[test]
    fn darwin_runtime_falls_back_to_tmpdir() {
        let env = Env::from_iter([("TMPDIR", "/var/folders/xy/T/")]);
        let mut opts = options("darwin", "/Users/u").with_env(env);
        opts.tempdir = None;
        let dirs = assert_ok!(base_dirs(&opts));
        assert_eq!(dirs.runtime, Path::new("/var/folders/xy/T/"));
    }

    #[test]
    fn win32_defaults() {
        let temp = r"C:\Users\u\AppData\Local\Temp";
        let opts = options("win32", r"C:\Users\u").with_tempdir(temp);
        let dirs = assert_ok!(base_dirs(&opts));
        let config = dirs.config.to_string_lossy();
        let data = dirs.data.to_string_lossy();
        assert!(config.ends_with(r"AppData\Roaming\Config"), "{config}");
        assert!(data.ends_with(r"AppData\Local\Data"), "{data}");
        assert_eq!(
            dirs.cache,
            Path::new(r"C:\Users\u\AppData\Local\Temp\Cache")
        );
        assert_eq!(
            dirs.logs,
            Path::new(r"C:\Users\u\AppData\Local\Temp\Cache\logs")
        );
        assert_eq!(dirs.state, Path::new(r"C:\Users\u\AppData\Local\xdg"));
        assert_eq!(dirs.runtime, Path::new(r"C:\Users\u\AppData\Local\Temp"));
        assert_eq!(dirs.config_dirs, vec![dirs.config.clone()]);
        assert_eq!(dirs.data_dirs, vec![dirs.data.clone()]);
    }

    #[test]
    fn win32_uses_appdata_variables_and_roaming() {
        let env = Env::from_iter([
            ("APPDATA", r"D:\Roaming"),
            ("LOCALAPPDATA", r"D:\Local"),
            ("XDG_CONFIG_DIRS", r"E:\cfg;F:\cfg"),
        ]);
        let opts = options("win32", r"C:\Users\u").with_env(env);
        let dirs = assert_ok!(base_dirs(&opts));
        assert_eq!(dirs.config, Path::new(r"D:\Roaming\Config"));
        assert_eq!(dirs.data, Path::new(r"D:\Local\Data"));
        assert_eq!(
            dirs.config_dirs,
            paths(&[r"D:\Roaming\Config", r"E:\cfg", r"F:\cfg"])
        );

        let dirs = assert_ok!(base_dirs(&opts.with_roaming(true)));
        assert_eq!(dirs.data, Path::new(r"D:\Roaming\Data"));
    }

    #[test]
    fn subdir_follows_parent_casing() {
        let opts = options("linux", "/home/u").with_subdir("FooBar");
        let dirs = assert_ok!(base_dirs(&opts));
        assert_eq!(dirs.config, Path::new("/home/u/.config/foobar"));
        assert_eq!(dirs.logs, Path::new("/var/log/foobar"));
        assert_eq!(
            dirs.config_dirs,
            paths(&["/home/u/.config/foobar", "/etc/xdg"])
        );

        let opts = options("darwin", "/Users/u").with_subdir("fooBar");
        let dirs = assert_ok!(base_dirs(&opts));
        assert_eq!(dirs.cache, Path::new("/Users/u/Library/Caches/FooBar"));
        assert_eq!(dirs.logs, Path::new("/Users/u/Library/Caches/FooBar/logs"));

        let opts = options("win32", r"C:\Users\u").with_subdir("fooBar");
        let dirs = assert_ok!(base_dirs(&opts));
        assert_eq!(
            dirs.config,
            Path::new(r"C:\Users\u\AppData\Roaming\FooBar\Config")
        );
        assert_eq!(dirs.state, Path::new(r"C:\Users\u\AppData\Local\FooBar"));
    }

    #[test]
    fn xdg_config_home_wins_on_every_platform() {
        for (platform, home) in [("linux", "/home/u"), ("darwin", "/Users/u")] {
            let env = Env::from_iter([("XDG_CONFIG_HOME", "/custom")]);
            let dirs = assert_ok!(base_dirs(&options(platform, home).with_env(env)));
            assert_eq!(dirs.config, Path::new("/custom"));
        }
        let env = Env::from_iter([("XDG_CONFIG_HOME", "/custom")]);
        let dirs = assert_ok!(base_dirs(&options("win32", r"C:\Users\u").with_env(env)));
        assert_eq!(dirs.config, Path::new(r"/custom\config"));
    }

    #[test]
    fn explicit_overrides_beat_environment() {
        let env = Env::from_iter([
            ("XDG_CACHE_HOME", "/env-cache"),
            ("XDG_DATA_DIR", "/env-data"),
        ]);
        let opts = options("linux", "/home/u")
            .with_env(env)
            .with_dir(Category::Cache, "/opt-cache");
        let dirs = assert_ok!(base_dirs(&opts));
        assert_eq!(dirs.cache, Path::new("/opt-cache"));
        assert_eq!(dirs.data, Path::new("/env-data"));
        assert_eq!(dirs.data_dirs[0], dirs.data);
    }

    #[test]
    fn search_paths_are_deduplicated() {
        let env = Env::from_iter([
            ("XDG_CONFIG_DIRS", "/etc/xdg:/etc/xdg"),
            ("XDG_DATA_HOME", "/usr/share/"),
        ]);
        let dirs = assert_ok!(base_dirs(&options("linux", "/home/u").with_env(env)));
        assert_eq!(dirs.config_dirs, paths(&["/home/u/.config", "/etc/xdg"]));
        assert_eq!(dirs.data_dirs, paths(&["/usr/share/", "/usr/local/share/"]));
    }

    #[test]
    fn resolution_is_deterministic() {
        let homes = [
            ("linux", "/home/u"),
            ("darwin", "/Users/u"),
            ("win32", r"C:\Users\u"),
        ];
        for (platform, home) in homes {
            let opts = options(platform, home).with_subdir("app");
            assert_eq!(assert_ok!(base_dirs(&opts)), assert_ok!(base_dirs(&opts)));
        }
    }

    #[test]
    fn unsupported_platform_is_an_error() {
        let err = assert_err!(base_dirs(&options("plan9", "/")));
        assert_eq!(err, UnsupportedPlatform("plan9".into()));
        assert_err!(xdg(&options("plan9", "/")));
    }

    #[test]
    fn xdg_dispatches_on_expanded() {
        let opts = options("linux", "/home/u").with_cwd("/work");
        assert!(matches!(assert_ok!(xdg(&opts)), Directories::Base(_)));
        assert!(matches!(
            assert_ok!(xdg(&opts.with_expanded(true))),
            Directories::Expanded(_)
        ));
    }
}
