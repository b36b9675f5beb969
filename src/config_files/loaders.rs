//! Registry of config file parsers, keyed by file extension.
//!
//! [`Loaders::default`] knows `json`, `toml`, `yaml`/`yml`, `ini` and `env`. Any file whose name
//! starts with `.env` (`.env`, `.env.local`) is treated as `env`. Files with an unknown extension
//! load as their raw text.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use ini::{Ini, ParseOption};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config_files::key_value::{self, ParseOptions, PropertyValue};

/// Errors while reading, matching or parsing config files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid INI: {0}")]
    Ini(#[from] ini::ParseError),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    /// Raised by caller-registered loaders.
    #[error("failed to load `.{extension}` file: {message}")]
    Loader { extension: String, message: String },
}

/// Parser of one file format. Receives the file contents, BOM already stripped.
pub type LoaderFn = dyn Fn(&str) -> Result<Value, LoadError> + Send + Sync;

/// Extension to parser map.
#[derive(Clone)]
pub struct Loaders {
    by_extension: HashMap<String, Arc<LoaderFn>>,
}

impl fmt::Debug for Loaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut extensions: Vec<_> = self.by_extension.keys().collect();
        extensions.sort();
        f.debug_struct("Loaders")
            .field("extensions", &extensions)
            .finish()
    }
}

impl Default for Loaders {
    fn default() -> Self {
        let mut loaders = Self::empty();
        loaders
            .register("json", |contents| Ok(serde_json::from_str(contents)?))
            .register("toml", |contents| Ok(toml::from_str::<Value>(contents)?))
            .register("yaml", yaml)
            .register("yml", yaml)
            .register("ini", ini_sections)
            .register("env", |contents| Ok(flat(contents, ".env")));
        loaders
    }
}

impl Loaders {
    /// Registry without any parsers; everything loads as text.
    pub fn empty() -> Self {
        Self {
            by_extension: HashMap::new(),
        }
    }

    /// Register `loader` for `extension` (without the dot), replacing any previous one.
    pub fn register<F>(&mut self, extension: &str, loader: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, LoadError> + Send + Sync + 'static,
    {
        self.by_extension
            .insert(extension.to_ascii_lowercase(), Arc::new(loader));
        self
    }

    pub fn get(&self, extension: &str) -> Option<&LoaderFn> {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .map(|loader| loader.as_ref())
    }

    /// Extension used to pick a loader for `path`.
    pub fn extension_of(path: &Path) -> Option<String> {
        let name = path.file_name()?.to_string_lossy();
        if name.starts_with(".env") {
            return Some("env".to_owned());
        }
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// Parse `contents` read from `path`.
    ///
    /// Unknown extensions pass the text through as [`Value::String`].
    pub fn load(&self, path: &Path, contents: &str) -> Result<Value, LoadError> {
        let contents = key_value::strip_bom(contents);
        match Self::extension_of(path).and_then(|ext| self.get(&ext)) {
            Some(loader) => loader(contents),
            None => Ok(Value::String(contents.to_owned())),
        }
    }
}

fn yaml(contents: &str) -> Result<Value, LoadError> {
    Ok(serde_yaml::from_str(contents)?)
}

/// Keys before the first header land at the top level; every `[section]` becomes a nested object.
fn ini_sections(contents: &str) -> Result<Value, LoadError> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(contents, options)?;
    let mut root = Map::new();
    for (section, properties) in &ini {
        let target = match section {
            Some(name) => {
                let entry = root
                    .entry(name.to_owned())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                match entry {
                    Value::Object(object) => object,
                    _ => continue,
                }
            }
            None => &mut root,
        };
        for (key, value) in properties.iter() {
            target.insert(key.to_owned(), to_json(key_value::coerce(value)));
        }
    }
    Ok(Value::Object(root))
}

/// Flat `KEY=VALUE` object, as `.env` files are read.
fn flat(contents: &str, file_name: &str) -> Value {
    let properties = key_value::parse_str(contents, file_name, ParseOptions::unformatted());
    let object: Map<String, Value> = properties
        .into_iter()
        .map(|(key, value)| (key, to_json(value)))
        .collect();
    Value::Object(object)
}

fn to_json(value: PropertyValue) -> Value {
    match value {
        PropertyValue::Bool(b) => Value::Bool(b),
        PropertyValue::Text(s) => Value::String(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::{assert_err, assert_matches, assert_ok, assert_some_eq};
    use serde_json::json;

    #[test]
    fn json_and_toml_load_as_values() {
        let loaders = Loaders::default();
        let value = assert_ok!(loaders.load(Path::new("config.json"), r#"{"a": [1, 2]}"#));
        assert_eq!(value, json!({"a": [1, 2]}));

        let contents = "name = \"x\"\n[table]\nn = 1\n";
        let value = assert_ok!(loaders.load(Path::new("config.TOML"), contents));
        assert_eq!(value, json!({"name": "x", "table": {"n": 1}}));
    }

    #[test]
    fn env_files_are_flat_objects() {
        let loaders = Loaders::default();
        let value = assert_ok!(loaders.load(
            Path::new("/home/u/.env.local"),
            "# secrets\nDEBUG=true\nNAME='app'\n"
        ));
        assert_eq!(value, json!({"DEBUG": true, "NAME": "app"}));
    }

    #[test]
    fn ini_sections_become_nested_objects() {
        let loaders = Loaders::default();
        let value = assert_ok!(loaders.load(
            Path::new("app.ini"),
            "name=app\n[server]\nport=80\ndebug=true\n[client]\nport=8080\n"
        ));
        assert_eq!(
            value,
            json!({
                "name": "app",
                "server": {"port": "80", "debug": true},
                "client": {"port": "8080"},
            })
        );
    }

    #[test]
    fn ini_keeps_windows_paths() {
        let loaders = Loaders::default();
        let contents = "[dirs]\ndata=C:\\Data\n";
        let value = assert_ok!(loaders.load(Path::new("paths.ini"), contents));
        assert_eq!(value, json!({"dirs": {"data": r"C:\Data"}}));
    }

    #[test]
    fn yaml_loads_under_both_extensions() {
        let loaders = Loaders::default();
        let value = assert_ok!(loaders.load(Path::new("app.yaml"), "a: 1\nlist:\n  - x\n"));
        assert_eq!(value, json!({"a": 1, "list": ["x"]}));
        let value = assert_ok!(loaders.load(Path::new("app.yml"), "enabled: false\n"));
        assert_eq!(value, json!({"enabled": false}));

        let err = assert_err!(loaders.load(Path::new("broken.yaml"), "a: [1, 2\n"));
        assert_matches!(err, LoadError::Yaml(_));
    }

    #[test]
    fn unknown_extension_passes_text_through() {
        let loaders = Loaders::default();
        let value = assert_ok!(loaders.load(Path::new("notes.txt"), "\u{feff}hello"));
        assert_eq!(value, json!("hello"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let loaders = Loaders::default();
        let err = assert_err!(loaders.load(Path::new("broken.json"), "{"));
        assert_matches!(err, LoadError::Json(_));
    }

    #[test]
    fn custom_loaders_can_be_registered() {
        let mut loaders = Loaders::empty();
        loaders.register("csv", |contents| {
            let cells = contents.split(',').map(|cell| json!(cell.trim()));
            Ok(Value::Array(cells.collect()))
        });
        let value = assert_ok!(loaders.load(Path::new("row.csv"), "a, b"));
        assert_eq!(value, json!(["a", "b"]));
        let extension = Loaders::extension_of(Path::new("x.JSON"));
        assert_some_eq!(extension, "json".to_owned());
    }
}
