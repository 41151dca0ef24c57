//! Session Configuration
//!
//! Optional TOML file describing the initial session:
//!
//! ```toml
//! cwd = "/home/user"
//! log_level = "debug"
//!
//! [env]
//! GREETING = "hello"
//!
//! [files]
//! "notes.txt" = "buy milk\n"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::shell::ShellOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_cwd")]
    pub cwd: String,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Path to content, seeded into the virtual filesystem
    #[serde(default)]
    pub files: HashMap<String, String>,
}

fn default_cwd() -> String {
    "/".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            cwd: default_cwd(),
            env: HashMap::new(),
            log_level: default_log_level(),
            files: HashMap::new(),
        }
    }
}

impl ShellConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// `log_level` as a filter for the log facade.
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

impl From<ShellConfig> for ShellOptions {
    fn from(config: ShellConfig) -> Self {
        ShellOptions {
            env: Some(config.env),
            cwd: Some(config.cwd),
            files: (!config.files.is_empty()).then_some(config.files),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ShellConfig::from_toml("", Path::new("koma.toml")).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.level_filter().unwrap(), log::LevelFilter::Warn);
    }

    #[test]
    fn full_config_parses() {
        let config = ShellConfig::from_toml(
            r#"
cwd = "/home/user"
log_level = "debug"

[env]
GREETING = "hello"

[files]
"notes.txt" = "buy milk\n"
"#,
            Path::new("koma.toml"),
        )
        .unwrap();
        assert_eq!(config.cwd, "/home/user");
        assert_eq!(config.env.get("GREETING").map(String::as_str), Some("hello"));
        assert_eq!(config.files.get("notes.txt").map(String::as_str), Some("buy milk\n"));
        assert_eq!(config.level_filter().unwrap(), log::LevelFilter::Debug);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = ShellConfig::from_toml("cwd = [", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid config bad.toml"));
    }

    #[test]
    fn unknown_log_level() {
        let config = ShellConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(config.level_filter().unwrap_err().to_string(), "unknown log level 'loud'");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ShellConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn into_shell_options() {
        let options: ShellOptions = ShellConfig::default().into();
        assert_eq!(options.cwd.as_deref(), Some("/"));
        assert!(options.files.is_none());
        assert!(options.fs.is_none());
    }
}
