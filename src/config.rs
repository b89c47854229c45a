//! Configuration resolution
//!
//! The configuration file is a YAML document living in a directory chosen by
//! `PATH_CONFIG` (or `<program-root>/cmd/.config` when unset). Variables
//! prefixed with `TSHOT_` override file values, using `__` to descend into
//! nested keys: `TSHOT_GENAI__GEMINI__API_KEY` overrides `genai.gemini.api_key`.
//!
//! The top-level document stays untyped so that sections used by other tools
//! can live in the same file. Consumers decode the section they own with
//! [`ConfigDocument::section`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config as Layers, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Error;
use crate::Result;

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "PATH_CONFIG";

/// Environment variable the resolved config file path is published to.
pub const CONFIG_PATH_ENV: &str = "JSON_CONFIG_PATH";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "TSHOT";

const CONFIG_FILE_NAME: &str = "config";
const CONFIG_FILE_EXTENSION: &str = "yaml";

/// Untyped configuration document: section name to raw value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    fields: Map<String, Value>,
}

impl ConfigDocument {
    /// Build a document from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            other => Err(Error::ConfigParse(format!(
                "top-level config must be a mapping, got {other}"
            ))),
        }
    }

    /// Raw value of a top-level section. Lookup ignores ASCII case.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Decode a top-level section into `T`.
    ///
    /// Returns `Ok(None)` when the section is absent or null.
    pub fn section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => serde_json::from_value(raw.clone())
                .map(Some)
                .map_err(|e| Error::ConfigParse(format!("section '{key}': {e}"))),
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path of the config file that was read.
    pub path: PathBuf,
    pub document: ConfigDocument,
}

impl ResolvedConfig {
    /// Publish the config file path to `JSON_CONFIG_PATH` for external tools.
    pub fn publish(&self) {
        std::env::set_var(CONFIG_PATH_ENV, &self.path);
        debug!("Published {} = {:?}", CONFIG_PATH_ENV, self.path);
    }
}

/// Locates and loads the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config_dir: PathBuf,
    env_overrides: Option<HashMap<String, String>>,
}

impl ConfigResolver {
    /// Resolver using `PATH_CONFIG`, falling back to the default directory.
    pub fn from_env() -> Self {
        Self::new(config_dir_from(std::env::var(CONFIG_DIR_ENV).ok()))
    }

    /// Resolver reading from an explicit directory.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            env_overrides: None,
        }
    }

    /// Resolver using the default layout under another program root.
    pub fn with_program_root(root: &Path) -> Self {
        Self::new(config_dir_under(root))
    }

    /// Use a fixed set of variables instead of the process environment.
    pub fn with_env_overrides(mut self, vars: HashMap<String, String>) -> Self {
        self.env_overrides = Some(vars);
        self
    }

    /// Full path of the config file this resolver reads.
    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir
            .join(format!("{CONFIG_FILE_NAME}.{CONFIG_FILE_EXTENSION}"))
    }

    /// Read the config file and apply environment overrides.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let path = self.config_file_path();

        if !path.is_file() {
            return Err(Error::ConfigNotFound { path });
        }
        let path = path.canonicalize()?;
        debug!("Loading config from {:?}", path);

        let mut env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__");
        if let Some(ref vars) = self.env_overrides {
            env = env.source(Some(vars.clone().into_iter().collect()));
        }

        let layers = Layers::builder()
            .add_source(File::from(path.as_path()).format(FileFormat::Yaml).required(true))
            .add_source(env)
            .build()?;

        let fields: Map<String, Value> = layers.try_deserialize()?;
        let document = ConfigDocument::from_value(Value::Object(fields))?;

        Ok(ResolvedConfig { path, document })
    }
}

/// Root of the program; the default config directory lives beneath it.
pub fn program_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Config directory for a `PATH_CONFIG` value; unset or empty means the default.
pub fn config_dir_from(var: Option<String>) -> PathBuf {
    match var {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            warn!(
                "{} not set, using default config directory",
                CONFIG_DIR_ENV
            );
            default_config_dir()
        }
    }
}

/// Default config directory: `<program-root>/cmd/.config`.
pub fn default_config_dir() -> PathBuf {
    config_dir_under(&program_root())
}

fn config_dir_under(root: &Path) -> PathBuf {
    root.join("cmd").join(".config")
}

/// Resolve configuration the way the CLI does.
pub fn resolve() -> Result<ResolvedConfig> {
    ConfigResolver::from_env().resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
genai:
  gemini:
    api_key: file-key
    model: gemini-2.0-pro
  role: You are an SRE
storage:
  buckets: [a, b]
  retention: 7
"#;

    fn write_config(dir: &Path, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("config.yaml"), content).unwrap();
    }

    fn isolated(dir: &Path) -> ConfigResolver {
        ConfigResolver::new(dir).with_env_overrides(HashMap::new())
    }

    #[test]
    fn test_missing_file_under_default_layout() {
        let root = TempDir::new().unwrap();
        let resolver = ConfigResolver::with_program_root(root.path());

        match resolver.resolve() {
            Err(Error::ConfigNotFound { path }) => {
                assert!(path.ends_with("cmd/.config/config.yaml"));
            }
            other => panic!("expected ConfigNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_config_dir_variable_selects_directory() {
        assert_eq!(
            config_dir_from(Some("/srv/tshot/conf".to_string())),
            PathBuf::from("/srv/tshot/conf")
        );
    }

    #[test]
    fn test_config_dir_variable_unset_or_empty_falls_back() {
        assert_eq!(config_dir_from(None), default_config_dir());
        assert_eq!(config_dir_from(Some(String::new())), default_config_dir());
    }

    #[test]
    fn test_unset_variable_and_missing_default_file_is_not_found() {
        let resolver = ConfigResolver::new(config_dir_from(None));
        let expected = default_config_dir().join("config.yaml");
        if expected.exists() {
            return;
        }

        match resolver.resolve() {
            Err(Error::ConfigNotFound { path }) => assert_eq!(path, expected),
            other => panic!("expected ConfigNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_default_dir_is_under_program_root() {
        assert_eq!(
            default_config_dir(),
            program_root().join("cmd").join(".config")
        );
    }

    #[test]
    fn test_resolve_keeps_unrelated_sections() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), SAMPLE);

        let resolved = isolated(dir.path()).resolve().unwrap();
        let doc = &resolved.document;

        assert!(resolved.path.is_absolute());
        assert!(resolved.path.ends_with("config.yaml"));
        assert_eq!(doc.get("genai").unwrap()["gemini"]["api_key"], json!("file-key"));
        assert_eq!(doc.get("storage").unwrap()["retention"], json!(7));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), "genai: [unterminated\n  - : :");

        let err = isolated(dir.path()).resolve().unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)), "got {err:?}");
    }

    #[test]
    fn test_env_override_wins_over_file() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), SAMPLE);

        let vars = HashMap::from([
            ("TSHOT_GENAI__GEMINI__API_KEY".to_string(), "env-key".to_string()),
            ("UNRELATED_VAR".to_string(), "ignored".to_string()),
        ]);
        let resolved = ConfigResolver::new(dir.path())
            .with_env_overrides(vars)
            .resolve()
            .unwrap();

        let genai = resolved.document.get("genai").unwrap();
        assert_eq!(genai["gemini"]["api_key"], json!("env-key"));
        assert_eq!(genai["gemini"]["model"], json!("gemini-2.0-pro"));
        assert!(resolved.document.get("unrelated_var").is_none());
    }

    #[test]
    fn test_section_decode_and_absence() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Storage {
            buckets: Vec<String>,
        }

        let doc = ConfigDocument::from_value(json!({
            "Storage": {"buckets": ["a"]},
            "empty": null
        }))
        .unwrap();

        let storage: Option<Storage> = doc.section("storage").unwrap();
        assert_eq!(storage, Some(Storage { buckets: vec!["a".to_string()] }));

        let missing: Option<Storage> = doc.section("nope").unwrap();
        assert!(missing.is_none());
        let null: Option<Storage> = doc.section("empty").unwrap();
        assert!(null.is_none());
    }

    #[test]
    fn test_section_with_wrong_shape_is_parse_error() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Storage {
            buckets: Vec<String>,
        }

        let doc = ConfigDocument::from_value(json!({"storage": "flat"})).unwrap();
        let err = doc.section::<Storage>("storage").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_non_mapping_document_rejected() {
        assert!(ConfigDocument::from_value(json!([1, 2])).is_err());
        assert_eq!(
            ConfigDocument::from_value(Value::Null).unwrap(),
            ConfigDocument::default()
        );
    }

    #[test]
    fn test_publish_sets_path_variable() {
        let resolved = ResolvedConfig {
            path: PathBuf::from("/etc/tshot/config.yaml"),
            document: ConfigDocument::default(),
        };
        let previous = std::env::var_os(CONFIG_PATH_ENV);

        resolved.publish();
        let published = std::env::var(CONFIG_PATH_ENV);

        match previous {
            Some(value) => std::env::set_var(CONFIG_PATH_ENV, value),
            None => std::env::remove_var(CONFIG_PATH_ENV),
        }
        assert_eq!(published.unwrap(), "/etc/tshot/config.yaml");
    }
}
