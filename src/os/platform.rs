//! Target platform model.
//!
//! Paths are computed for a *target* platform, which need not be the host: Windows layouts can be
//! resolved on Linux and vice versa. [`Platform`] therefore carries its own separator, path-list
//! delimiter and notion of an absolute path instead of relying on [`std::path`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Requested platform has no directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("platform \"{0}\" is not supported")]
pub struct UnsupportedPlatform(pub String);

/// Platform whose directory conventions should be followed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Platform {
    /// Linux and other XDG-native Unix systems.
    Linux,
    /// macOS, using `~/Library/...`.
    Darwin,
    /// Windows, using `%APPDATA%` and `%LOCALAPPDATA%`.
    Win32,
}

impl Platform {
    /// Platform this crate was compiled for.
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Win32
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Linux
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Win32 => "win32",
        }
    }

    /// Preferred path separator.
    pub const fn separator(self) -> char {
        match self {
            Self::Win32 => '\\',
            Self::Linux | Self::Darwin => '/',
        }
    }

    /// Delimiter of path lists such as `$XDG_CONFIG_DIRS`.
    pub const fn list_delimiter(self) -> char {
        match self {
            Self::Win32 => ';',
            Self::Linux | Self::Darwin => ':',
        }
    }

    /// Windows accepts both slashes.
    pub fn is_separator(self, c: char) -> bool {
        match self {
            Self::Win32 => c == '\\' || c == '/',
            Self::Linux | Self::Darwin => c == '/',
        }
    }

    /// Returns `true` if `path` is absolute on this platform.
    ///
    /// On Windows drive-letter paths (`C:\`) and rooted paths (`\foo`, `/foo`) are absolute.
    pub fn is_absolute(self, path: &str) -> bool {
        match self {
            Self::Win32 => {
                let bytes = path.as_bytes();
                path.starts_with(['\\', '/'])
                    || (bytes.len() >= 3
                        && bytes[0].is_ascii_alphabetic()
                        && bytes[1] == b':'
                        && (bytes[2] == b'\\' || bytes[2] == b'/'))
            }
            Self::Linux | Self::Darwin => path.starts_with('/'),
        }
    }

    /// Join `segments` onto `base` with this platform's separator.
    ///
    /// Empty segments are skipped and no separator is doubled.
    ///
    /// ```rust
    /// use basedirs::os::platform::Platform;
    ///
    /// assert_eq!(Platform::Win32.join(r"C:\Users\u", ["AppData", "Local"]), r"C:\Users\u\AppData\Local");
    /// assert_eq!(Platform::Linux.join("/home/u/", [".cache"]), "/home/u/.cache");
    /// ```
    pub fn join<I, S>(self, base: &str, segments: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = base.to_owned();
        for segment in segments {
            let segment = segment.as_ref();
            let segment = segment.trim_start_matches(|c| self.is_separator(c));
            if segment.is_empty() {
                continue;
            }
            if !joined.is_empty() && !joined.ends_with(|c| self.is_separator(c)) {
                joined.push(self.separator());
            }
            joined.push_str(segment);
        }
        joined
    }

    /// Last non-empty segment of `path`, ignoring trailing separators.
    pub fn basename(self, path: &str) -> &str {
        let trimmed = path.trim_end_matches(|c| self.is_separator(c));
        match trimmed.rfind(|c| self.is_separator(c)) {
            Some(idx) => &trimmed[idx + 1..],
            None => trimmed,
        }
    }

    /// Split a path list on [`Platform::list_delimiter`], dropping empty entries.
    pub fn split_paths(self, list: &str) -> Vec<String> {
        list.split(self.list_delimiter())
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" | "unix" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::Darwin),
            "win32" | "windows" => Ok(Self::Win32),
            other => Err(UnsupportedPlatform(other.to_owned())),
        }
    }
}
