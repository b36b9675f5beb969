//! Expanded directories: every category decorated with the paths it searches, plus helpers to
//! find, read, load, write and glob files across those paths.

use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config_files::loaders::{LoadError, Loaders};
use crate::config_files::options::{Context, Options};
use crate::config_files::user_dirs::UserDirs;
use crate::config_files::xdg::{self, BaseDirectories};
use crate::fs::PathExt;
use crate::os::platform::UnsupportedPlatform;

/// One category: its own directory plus the directories searched for it, most important first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Directory {
    pub name: String,
    pub home: PathBuf,
    pub dirs: Vec<PathBuf>,
}

impl Directory {
    fn single(name: &str, home: PathBuf) -> Self {
        Self {
            name: name.to_owned(),
            dirs: vec![home.clone()],
            home,
        }
    }

    fn searching(name: &str, home: PathBuf, dirs: Vec<PathBuf>) -> Self {
        Self {
            name: name.to_owned(),
            home,
            dirs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpandedDirectories {
    pub cwd: PathBuf,
    pub home: PathBuf,
    pub temp: PathBuf,
    pub cache: Directory,
    pub config: Directory,
    pub data: Directory,
    pub runtime: Directory,
    pub state: Directory,
    pub logs: Directory,
    /// The working directory, named after its last component.
    pub local: Directory,
    pub user_dirs: UserDirs,
}

/// Resolve base directories for `options` and decorate each of them.
///
/// ```rust
/// use basedirs::config_files::{Options, expand::expanded_dirs};
///
/// let dirs = expanded_dirs(
///     &Options::default()
///         .with_platform("linux")
///         .with_env(Default::default())
///         .with_homedir("/home/u")
///         .with_cwd("/srv/app"),
/// )
/// .unwrap();
/// assert_eq!(dirs.local.name, "app");
/// assert_eq!(dirs.config.dirs[0], std::path::Path::new("/home/u/.config"));
/// ```
pub fn expanded_dirs(options: &Options) -> Result<ExpandedDirectories, UnsupportedPlatform> {
    let ctx = Context::new(options)?;
    let base = xdg::build(&ctx);
    let cwd = working_dir(options.cwd.as_deref(), std::env::current_dir(), &ctx.home);
    debug!(cwd = %cwd.display(), "expanding directories");

    let home = PathBuf::from(&ctx.home);
    let temp = PathBuf::from(&ctx.temp);
    let local_name = cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cwd.display().to_string());
    let BaseDirectories {
        cache,
        config,
        config_dirs,
        data,
        data_dirs,
        runtime,
        logs,
        state,
    } = base;

    Ok(ExpandedDirectories {
        local: Directory::single(&local_name, cwd.clone()),
        cwd,
        home,
        temp,
        cache: Directory::single("cache", cache),
        config: Directory::searching("config", config, config_dirs),
        data: Directory::searching("data", data, data_dirs),
        runtime: Directory::single("runtime", runtime),
        state: Directory::single("state", state),
        logs: Directory::single("logs", logs),
        user_dirs: UserDirs::from_context(ctx),
    })
}

/// Absolute working directory: the explicit one, else the process one, else home.
fn working_dir(explicit: Option<&Path>, current: io::Result<PathBuf>, home: &str) -> PathBuf {
    match explicit {
        Some(cwd) => cwd.absolutize(),
        None => current.unwrap_or_else(|err| {
            debug!(%err, home, "no current directory, using home");
            PathBuf::from(home)
        }),
    }
}

/// Order in which [`Directory::dirs`] are visited.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq)]
pub enum SearchOrder {
    /// Most important directory first.
    #[default]
    Forward,
    /// Least important directory first.
    Reverse,
}

/// A path found in one of the searched directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundFile {
    pub path: PathBuf,
    /// `None` when the path is a directory.
    pub contents: Option<String>,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Directory {}
}

/// File helpers over the directories of a [`Directory`].
///
/// Reads search [`Directory::dirs`]; writes always go to [`Directory::home`].
pub trait DirectoryExt: sealed::Sealed {
    /// Every existing `dir/path`, in `order`.
    fn find(&self, path: impl AsRef<Path>, order: SearchOrder) -> Vec<PathBuf>;

    /// First existing `dir/path`, in `order`.
    fn first(&self, path: impl AsRef<Path>, order: SearchOrder) -> Option<PathBuf>;

    /// Files under `home/path`, sorted by name. A missing directory has no files.
    fn files(&self, path: impl AsRef<Path>, recursive: bool) -> io::Result<Vec<PathBuf>>;

    /// Contents of the first `dir/path` found, without a byte order mark.
    fn read(&self, path: impl AsRef<Path>) -> io::Result<Option<FoundFile>>;

    /// [`read`](DirectoryExt::read), then parse with the loader registered for the extension.
    fn load(&self, path: impl AsRef<Path>, loaders: &Loaders) -> Result<Option<Value>, LoadError>;

    /// Write `contents` to `home/path`, creating parents. Returns the written path.
    fn write(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<PathBuf>;

    /// Entries of every `dir[/folder]` whose name matches the glob `pattern`.
    fn search(&self, pattern: &str, folder: Option<&Path>) -> Result<Vec<PathBuf>, LoadError>;

    #[cfg(feature = "tokio")]
    /// Async [`read`](DirectoryExt::read).
    fn read_async(
        &self,
        path: impl AsRef<Path>,
    ) -> impl Future<Output = io::Result<Option<FoundFile>>> + Send;

    #[cfg(feature = "tokio")]
    /// Async [`load`](DirectoryExt::load).
    fn load_async(
        &self,
        path: impl AsRef<Path>,
        loaders: &Loaders,
    ) -> impl Future<Output = Result<Option<Value>, LoadError>> + Send;
}

impl Directory {
    fn ordered(&self, order: SearchOrder) -> Box<dyn Iterator<Item = &PathBuf> + '_> {
        match order {
            SearchOrder::Forward => Box::new(self.dirs.iter()),
            SearchOrder::Reverse => Box::new(self.dirs.iter().rev()),
        }
    }
}

impl DirectoryExt for Directory {
    fn find(&self, path: impl AsRef<Path>, order: SearchOrder) -> Vec<PathBuf> {
        let path = path.as_ref();
        self.ordered(order)
            .map(|dir| dir.join(path))
            .filter(|candidate| candidate.exists())
            .collect()
    }

    fn first(&self, path: impl AsRef<Path>, order: SearchOrder) -> Option<PathBuf> {
        let path = path.as_ref();
        self.ordered(order)
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.exists())
    }

    fn files(&self, path: impl AsRef<Path>, recursive: bool) -> io::Result<Vec<PathBuf>> {
        let root = self.home.join(path);
        if !root.is_dir() {
            trace!(root = %root.display(), "no such directory");
            return Ok(Vec::new());
        }
        let walker = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name();
        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn read(&self, path: impl AsRef<Path>) -> io::Result<Option<FoundFile>> {
        let Some(path) = self.first(path, SearchOrder::Forward) else {
            return Ok(None);
        };
        let contents = if path.is_dir() {
            None
        } else {
            Some(path.read_text()?)
        };
        Ok(Some(FoundFile { path, contents }))
    }

    fn load(&self, path: impl AsRef<Path>, loaders: &Loaders) -> Result<Option<Value>, LoadError> {
        match self.read(path)? {
            Some(FoundFile {
                path,
                contents: Some(contents),
            }) => loaders.load(&path, &contents).map(Some),
            _ => Ok(None),
        }
    }

    fn write(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let target = self.home.join(path);
        target.write_creating_parents(contents)?;
        debug!(path = %target.display(), "wrote file");
        Ok(target)
    }

    fn search(&self, pattern: &str, folder: Option<&Path>) -> Result<Vec<PathBuf>, LoadError> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        let mut found = Vec::new();
        for dir in &self.dirs {
            let dir = match folder {
                Some(folder) => dir.join(folder),
                None => dir.clone(),
            };
            if !dir.is_dir() {
                continue;
            }
            let mut entries = read_dir(&dir)?
                .map(|entry| entry.map(|entry| entry.path()))
                .collect::<io::Result<Vec<_>>>()?;
            entries.sort();
            for entry in entries {
                let matched = entry.file_name().is_some_and(|name| matcher.is_match(name));
                if matched {
                    found.push(entry);
                }
            }
        }
        Ok(found)
    }

    #[cfg(feature = "tokio")]
    fn read_async(
        &self,
        path: impl AsRef<Path>,
    ) -> impl Future<Output = io::Result<Option<FoundFile>>> + Send {
        let path = path.as_ref().to_path_buf();
        let dirs = &self.dirs;
        async move {
            let mut found = None;
            for dir in dirs {
                let candidate = dir.join(&path);
                if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
                    found = Some(candidate);
                    break;
                }
            }
            let Some(path) = found else {
                return Ok(None);
            };
            if tokio::fs::metadata(&path).await?.is_dir() {
                return Ok(Some(FoundFile {
                    path,
                    contents: None,
                }));
            }
            let text = tokio::fs::read_to_string(&path).await?;
            let contents = crate::config_files::key_value::strip_bom(&text);
            Ok(Some(FoundFile {
                path,
                contents: Some(contents.to_owned()),
            }))
        }
    }

    #[cfg(feature = "tokio")]
    fn load_async(
        &self,
        path: impl AsRef<Path>,
        loaders: &Loaders,
    ) -> impl Future<Output = Result<Option<Value>, LoadError>> + Send {
        let read = self.read_async(path);
        async move {
            match read.await? {
                Some(FoundFile {
                    path,
                    contents: Some(contents),
                }) => loaders.load(&path, &contents).map(Some),
                _ => Ok(None),
            }
        }
    }
}
