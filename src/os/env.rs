use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

use thiserror::Error;

/// Snapshot of environmental variables, either taken from the process or injected by the caller.
///
/// Resolution functions only ever consult the snapshot they are handed, so the same snapshot always
/// yields the same directories. Lookups are case-insensitive on Windows hosts, like the variables
/// themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    keys: HashMap<OsString, OsString>,

    normalised_keys: HashMap<OsString, OsString>,
}

/// Errors encountered when getting environmental variable.
#[derive(Debug, Clone, Error)]
pub enum EnvStrError {
    /// This variant indicates, that variable `Missing.0` is missing.
    #[error("there is no environmental variable `${0:?}`")]
    Missing(OsString),

    /// This variant indicates, that variable `$NonUTF8.0` is not an UTF-8 string.
    #[error("environmental variable `${0:?}` is not an UTF-8 string")]
    NonUTF8(OsString),
}

impl Env {
    /// Snapshot of the current process environment.
    pub fn new() -> Self {
        Self::new_from(std::env::vars_os().collect())
    }

    /// Snapshot without any variables.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create new [`Env`] using `env` as existing environmental variables.
    pub fn new_from(env: HashMap<OsString, OsString>) -> Self {
        let normalised_keys = env
            .iter()
            .map(|(key, value)| (Env::normalize_key(key), value.clone()))
            .collect();
        Self {
            keys: env,
            normalised_keys,
        }
    }

    fn normalize_key(key: impl AsRef<OsStr>) -> OsString {
        key.as_ref().to_ascii_uppercase()
    }

    /// Get environmental variable pointed by `key`.
    ///
    /// # Returns
    /// `Option<&OsStr>`. `None` variant indicates missing key, `Some`: existing key.
    pub fn get_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        match self.keys.get(key) {
            Some(x) => Some(x),
            None if cfg!(target_os = "windows") => self
                .normalised_keys
                .get(&Env::normalize_key(key))
                .map(|x| x.as_ref()),
            None => None,
        }
    }

    /// Get environmental variable pointed by `key` and convert it to UTF-8.
    ///
    /// # Examples
    /// ```rust
    /// use basedirs::os::env::Env;
    ///
    /// let env = Env::from_iter([("XDG_CONFIG_HOME", "/custom")]);
    /// assert_eq!(env.get("XDG_CONFIG_HOME").ok(), Some("/custom"));
    /// assert!(env.get("XDG_DATA_HOME").is_err());
    /// ```
    pub fn get(&self, key: impl AsRef<OsStr>) -> Result<&str, EnvStrError> {
        let key = key.as_ref();
        self.get_os(key)
            .ok_or_else(|| EnvStrError::Missing(key.to_os_string()))?
            .to_str()
            .ok_or_else(|| EnvStrError::NonUTF8(key.to_os_string()))
    }

    /// Get variable only if it is set to a non-empty UTF-8 string.
    ///
    /// Empty variables are treated as unset everywhere in this crate.
    pub fn get_non_empty(&self, key: impl AsRef<OsStr>) -> Option<&str> {
        self.get(key).ok().filter(|value| !value.is_empty())
    }

    /// First of `keys` that is set and non-empty.
    pub fn first_of<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&str> {
        keys.into_iter().find_map(|key| self.get_non_empty(key))
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new_from(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
