//! Parser for the line-oriented `KEY=VALUE` format of `user-dirs.*` and `.env` files.
//!
//! Lines are trimmed; blank lines, `#` comments and lines without `=` are skipped. The first `=`
//! splits key from value. Values lose one pair of matching surrounding quotes, and unquoted
//! `true`/`false` (any case) become booleans.
//!
//! In *formatted* mode keys are normalised to `XDG_<NAME>_DIR` and string values are passed
//! through a caller-supplied resolver, typically "interpolate, then join onto home". *Unformatted*
//! mode, always used for `.conf` files, leaves both alone.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::trace;

use crate::os::env::Env;

/// Coerced value of a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Parsed file, ordered by key.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Value resolver applied in formatted mode.
pub type ResolveFn<'a> = dyn Fn(&str) -> String + 'a;

/// What a [`PropertyFn`] gets to see besides the raw key and value.
pub struct PropertyContext<'a> {
    /// Basename of the parsed file.
    pub file_name: &'a str,
    /// Whether the default handling would have formatted this line.
    pub formatted: bool,
    /// Resolver the default handling would have used (identity if none).
    pub resolve: &'a ResolveFn<'a>,
}

/// Per-line callback replacing the default coercion and normalisation.
pub type PropertyFn =
    dyn Fn(&str, &str, &PropertyContext<'_>) -> (String, PropertyValue) + Send + Sync;

/// How to treat parsed lines.
#[derive(Default, Clone, Copy)]
pub struct ParseOptions<'a> {
    /// Normalise keys and resolve values. Ignored (treated as `false`) for `.conf` files.
    pub formatted: bool,
    pub resolve: Option<&'a ResolveFn<'a>>,
    pub on_property: Option<&'a PropertyFn>,
}

impl<'a> ParseOptions<'a> {
    /// Keys and values kept as-is, apart from value coercion.
    pub fn unformatted() -> Self {
        Self::default()
    }

    /// Canonical keys, string values passed through `resolve`.
    pub fn formatted(resolve: Option<&'a ResolveFn<'a>>) -> Self {
        Self {
            formatted: true,
            resolve,
            on_property: None,
        }
    }

    pub fn with_on_property(mut self, on_property: Option<&'a PropertyFn>) -> Self {
        self.on_property = on_property;
        self
    }
}

/// Parse the file at `path`.
///
/// A missing file is not an error and yields an empty mapping; other I/O errors are returned.
pub fn parse_file(path: &Path, options: ParseOptions<'_>) -> io::Result<Properties> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            trace!(path = %path.display(), "convention file missing");
            return Ok(Properties::new());
        }
        Err(err) => return Err(err),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let options = if file_name.ends_with(".conf") {
        ParseOptions {
            formatted: false,
            ..options
        }
    } else {
        options
    };
    Ok(parse_str(&contents, &file_name, options))
}

/// Parse `contents` as if read from a file named `file_name`.
pub fn parse_str(contents: &str, file_name: &str, options: ParseOptions<'_>) -> Properties {
    let identity = |value: &str| value.to_owned();
    let resolve: &ResolveFn<'_> = match options.resolve {
        Some(resolve) => resolve,
        None => &identity,
    };
    let mut properties = Properties::new();

    for (raw_key, raw_value) in lines(contents) {
        let (key, value) = match options.on_property {
            Some(on_property) => {
                let ctx = PropertyContext {
                    file_name,
                    formatted: options.formatted,
                    resolve,
                };
                on_property(raw_key, raw_value, &ctx)
            }
            None if options.formatted => {
                let value = match coerce(raw_value) {
                    PropertyValue::Text(text) => PropertyValue::Text(resolve(&text)),
                    other => other,
                };
                (canonical_key(raw_key), value)
            }
            None => (raw_key.to_owned(), coerce(raw_value)),
        };
        properties.insert(key, value);
    }
    properties
}

/// `(key, value)` of every property line, untouched apart from trimming.
pub fn lines(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    strip_bom(contents)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match line.split_once('=') {
            Some((key, value)) => Some((key.trim(), value.trim())),
            None => {
                trace!(line, "skipping line without `=`");
                None
            }
        })
}

pub fn strip_bom(contents: &str) -> &str {
    contents.strip_prefix('\u{feff}').unwrap_or(contents)
}

/// Strip one pair of matching quotes, or turn `true`/`false` into a boolean.
pub fn coerce(raw: &str) -> PropertyValue {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return PropertyValue::Text(raw[1..raw.len() - 1].to_owned());
        }
    }
    if raw.eq_ignore_ascii_case("true") {
        PropertyValue::Bool(true)
    } else if raw.eq_ignore_ascii_case("false") {
        PropertyValue::Bool(false)
    } else {
        PropertyValue::Text(raw.to_owned())
    }
}

/// Bare lowercase name of a user directory key: `XDG_DESKTOP_DIR` and `desktop` both give
/// `desktop`.
pub fn bare_key(key: &str) -> String {
    let key = strip_prefix_ignore_case(key, "XDG_").unwrap_or(key);
    let key = strip_suffix_ignore_case(key, "_DIR").unwrap_or(key);
    key.to_lowercase()
}

/// Canonical `XDG_<NAME>_DIR` form of `key`.
pub fn canonical_key(key: &str) -> String {
    format!("XDG_{}_DIR", bare_key(key).to_uppercase())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    let tail = s.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &s[..split])
}

/// Expand `~`, `$VAR` and `${VAR}` in `value`.
///
/// `HOME` and `~` expand to `home`; other variables come from `env`. Unknown variables are left as
/// written.
pub fn interpolate<'a>(value: &'a str, home: &str, env: &Env) -> Cow<'a, str> {
    shellexpand::full_with_context_no_errors(
        value,
        || Some(home),
        |var| match var {
            "HOME" => Some(home.to_owned()),
            _ => env.get(var).ok().map(str::to_owned),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::{assert_ok, assert_some_eq};
    use tempfile::tempdir;

    #[test]
    fn comments_blanks_and_malformed_lines_are_skipped() {
        let contents = "# comment\n\n   \nnot a property\nenabled=True\n";
        let parsed = parse_str(contents, "user-dirs.conf", ParseOptions::unformatted());
        assert_eq!(parsed.len(), 1);
        assert_some_eq!(parsed.get("enabled"), &PropertyValue::Bool(true));
    }

    #[test]
    fn booleans_are_case_insensitive() {
        let parsed = parse_str(
            "enabled=False\nfilename_encoding=UTF-8",
            "user-dirs.conf",
            ParseOptions::unformatted(),
        );
        assert_some_eq!(parsed.get("enabled"), &PropertyValue::Bool(false));
        let encoding = PropertyValue::from("UTF-8");
        assert_some_eq!(parsed.get("filename_encoding"), &encoding);
    }

    #[test]
    fn quoted_booleans_stay_text() {
        assert_eq!(coerce("\"true\""), PropertyValue::from("true"));
        assert_eq!(coerce("'a b'"), PropertyValue::from("a b"));
        assert_eq!(coerce("\"a'"), PropertyValue::from("\"a'"));
        assert_eq!(coerce("\""), PropertyValue::from("\""));
    }

    #[test]
    fn splits_on_first_equals_with_whitespace() {
        let parsed = parse_str("KEY = a=b", ".env", ParseOptions::unformatted());
        assert_some_eq!(parsed.get("KEY"), &PropertyValue::from("a=b"));
    }

    #[test]
    fn keys_are_canonicalised() {
        assert_eq!(canonical_key("XDG_DESKTOP_DIR"), "XDG_DESKTOP_DIR");
        assert_eq!(canonical_key("desktop"), "XDG_DESKTOP_DIR");
        assert_eq!(canonical_key("xdg_music_dir"), "XDG_MUSIC_DIR");
        assert_eq!(canonical_key("PUBLICSHARE"), "XDG_PUBLICSHARE_DIR");
        assert_eq!(bare_key("XDG_DOWNLOAD_DIR"), "download");
    }

    #[test]
    fn formatted_mode_resolves_text_only() {
        let resolve: &ResolveFn<'_> = &|value: &str| format!("/home/u/{value}");
        let parsed = parse_str(
            "DESKTOP=Desktop\nXDG_FLAG_DIR=true",
            "user-dirs.defaults",
            ParseOptions::formatted(Some(resolve)),
        );
        assert_some_eq!(
            parsed.get("XDG_DESKTOP_DIR"),
            &PropertyValue::from("/home/u/Desktop")
        );
        assert_some_eq!(parsed.get("XDG_FLAG_DIR"), &PropertyValue::Bool(true));
    }

    #[test]
    fn on_property_overrides_default_handling() {
        let on_property: &PropertyFn = &|key: &str, value: &str, ctx: &PropertyContext<'_>| {
            (
                format!("{}:{}", ctx.file_name, key.to_lowercase()),
                PropertyValue::Text((ctx.resolve)(value)),
            )
        };
        let resolve: &ResolveFn<'_> = &|value: &str| value.to_uppercase();
        let options = ParseOptions::formatted(Some(resolve))
            .with_on_property(Some(on_property));
        let parsed = parse_str("XDG_MUSIC_DIR=\"music\"", "user-dirs.dirs", options);
        assert_some_eq!(
            parsed.get("user-dirs.dirs:xdg_music_dir"),
            &PropertyValue::from("\"MUSIC\"")
        );
    }

    #[test]
    fn bom_is_stripped() {
        let contents = "\u{feff}enabled=true";
        let parsed = parse_str(contents, "user-dirs.conf", ParseOptions::unformatted());
        assert_some_eq!(parsed.get("enabled"), &PropertyValue::Bool(true));
    }

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempdir().expect("needed for tests");
        let path = tmp.path().join("user-dirs.dirs");
        let parsed = assert_ok!(parse_file(&path, ParseOptions::formatted(None)));
        assert!(parsed.is_empty());
    }

    #[test]
    fn conf_files_are_never_formatted() {
        let tmp = tempdir().expect("needed for tests");
        let path = tmp.path().join("user-dirs.conf");
        std::fs::write(&path, "enabled=false\n").expect("needed for tests");
        let parsed = assert_ok!(parse_file(&path, ParseOptions::formatted(None)));
        assert_some_eq!(parsed.get("enabled"), &PropertyValue::Bool(false));
    }

    #[test]
    fn interpolation_uses_home_and_env() {
        let env = Env::from_iter([("USER_MEDIA", "/media/u")]);
        let home = "/home/u";
        assert_eq!(interpolate("$HOME/Desktop", home, &env), "/home/u/Desktop");
        assert_eq!(interpolate("${HOME}/Music", home, &env), "/home/u/Music");
        assert_eq!(interpolate("~/Videos", home, &env), "/home/u/Videos");
        assert_eq!(interpolate("$USER_MEDIA/x", home, &env), "/media/u/x");
        assert_eq!(interpolate("$NOPE/x", home, &env), "$NOPE/x");
    }
}
