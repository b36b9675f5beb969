use std::{
    fs::{create_dir, create_dir_all, read_to_string, write},
    io,
    path::{Path, PathBuf},
};

const BOM: char = '\u{feff}';

/// Options for controlling [`PathExt::mkdir`]
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum MkdirOptions {
    /// Equivalent of `mkdir $path`.
    WithoutParents,
    /// Equivalent of `mkdir -p $path`.
    WithParents,
}

mod sealed {
    use std::path::Path;

    pub trait Sealed {}
    impl Sealed for Path {}
}

/// Extension trait for [`Path`] with the filesystem operations used on resolved directories.
///
/// ```rust,no_run
/// # use basedirs::fs::*;
/// # use std::path::Path;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let path = Path::new("/home/u/.config/toolkit/config.toml");
/// path.write_creating_parents("name = \"toolkit\"\n")?;
/// let contents = path.read_text()?;
/// # Ok(())
/// # }
/// ```
pub trait PathExt: sealed::Sealed {
    /// Create directories at given [`Path`].
    ///
    /// # Returns
    /// [`Ok(())`](Ok) if created successfully, otherwise error, as reported by
    /// [`create_dir`], or [`create_dir_all`].
    ///
    /// Note that this function will return `Ok(())`, if [`create_dir`] returns `Err` with kind
    /// [`ErrorKind::AlreadyExists`](io::ErrorKind::AlreadyExists).
    fn mkdir(&self, opts: MkdirOptions) -> io::Result<()>;

    /// Write `contents`, creating missing parent directories first.
    fn write_creating_parents(&self, contents: impl AsRef<[u8]>) -> io::Result<()>;

    /// [`std::fs::read_to_string`] without a leading byte order mark.
    fn read_text(&self) -> io::Result<String>;

    /// Absolute form of `self`, relative paths taken against the current directory.
    ///
    /// With the __full-resolve__ feature symlinks are resolved too, even for paths that do not
    /// exist yet. Never fails: on error `self` is returned unchanged.
    fn absolutize(&self) -> PathBuf;
}

impl PathExt for Path {
    fn mkdir(&self, opts: MkdirOptions) -> io::Result<()> {
        if self.as_os_str().is_empty() {
            return Ok(());
        }
        let result = match opts {
            MkdirOptions::WithoutParents => create_dir(self),
            MkdirOptions::WithParents => create_dir_all(self),
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            _ => result,
        }
    }

    fn write_creating_parents(&self, contents: impl AsRef<[u8]>) -> io::Result<()> {
        if let Some(parent) = self.parent() {
            parent.mkdir(MkdirOptions::WithParents)?;
        }
        write(self, contents)
    }

    fn read_text(&self) -> io::Result<String> {
        let mut contents = read_to_string(self)?;
        if contents.starts_with(BOM) {
            contents.drain(..BOM.len_utf8());
        }
        Ok(contents)
    }

    #[cfg(feature = "full-resolve")]
    fn absolutize(&self) -> PathBuf {
        soft_canonicalize::soft_canonicalize(self).unwrap_or_else(|_| self.to_path_buf())
    }

    #[cfg(not(feature = "full-resolve"))]
    fn absolutize(&self) -> PathBuf {
        std::path::absolute(self).unwrap_or_else(|_| self.to_path_buf())
    }
}
