use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::smoke::CheckOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grammar: GrammarConfig,

    #[serde(default)]
    pub checks: ChecksConfig,
}

/// Where the compiled grammar comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarConfig {
    /// Explicit path to the compiled grammar library
    #[serde(default)]
    pub library: Option<PathBuf>,

    /// Accessor symbol exported by the library
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Extra directories searched before `<config_dir>/objecttext/grammars`
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
}

fn default_symbol() -> String {
    objecttext_language::OBJECT_TEXT.symbol.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            library: None,
            symbol: default_symbol(),
            search_dirs: Vec::new(),
        }
    }
}

/// Checks run after the language is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default = "default_true")]
    pub node_kinds: bool,

    #[serde(default = "default_true")]
    pub fields: bool,

    #[serde(default = "default_true")]
    pub queries: bool,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            node_kinds: true,
            fields: true,
            queries: true,
        }
    }
}

impl ChecksConfig {
    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            node_kinds: self.node_kinds,
            fields: self.fields,
            queries: self.queries,
        }
    }
}

impl Config {
    /// `<config_dir>/objecttext/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("objecttext").join("config.json"))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the user config if one exists, otherwise defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load_from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }
        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let symbol = &self.grammar.symbol;
        if symbol.is_empty() {
            return Err(ConfigError::ValidationError(
                "grammar.symbol must not be empty".to_string(),
            ));
        }
        let valid_identifier = symbol
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_identifier {
            return Err(ConfigError::ValidationError(format!(
                "grammar.symbol `{symbol}` is not a C identifier"
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.grammar.symbol, "tree_sitter_objecttext");
        assert!(config.grammar.library.is_none());
        assert!(config.checks.node_kinds);
        assert!(config.checks.fields);
        assert!(config.checks.queries);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.grammar.symbol = String::new();
        assert!(config.validate().is_err());

        config.grammar.symbol = "tree-sitter-objecttext".to_string();
        assert!(config.validate().is_err());

        config.grammar.symbol = "_tree_sitter_objecttext2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"checks": {"queries": false}}"#).unwrap();
        assert!(!config.checks.queries);
        assert!(config.checks.node_kinds);
        assert_eq!(config.grammar.symbol, "tree_sitter_objecttext");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objecttext").join("config.json");

        let mut config = Config::default();
        config.grammar.library = Some(PathBuf::from("/opt/grammars/objecttext.so"));
        config.grammar.search_dirs = vec![PathBuf::from("/opt/grammars")];
        config.checks.fields = false;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.checks.options().fields);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from_file(dir.path().join("absent.json")),
            Err(ConfigError::IoError(_))
        ));
    }
}
