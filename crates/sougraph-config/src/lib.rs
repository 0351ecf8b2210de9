use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "sougraph.toml";
pub const DEFAULT_NEO4J_URI: &str = "neo4j://localhost:7687";
pub const DEFAULT_NEO4J_USERNAME: &str = "neo4j";
pub const DEFAULT_PASSWORD_ENV: &str = "NEO4J_PASSWORD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SougraphConfig {
    #[serde(default)]
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_username")]
    pub username: String,
    /// Name of the environment variable holding the password. The password
    /// itself is never written to the config file.
    #[serde(default = "default_password_env")]
    pub password_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            username: default_username(),
            password_env: default_password_env(),
            repository_url: None,
        }
    }
}

impl GraphConfig {
    pub fn password(&self) -> Result<String, ConfigError> {
        std::env::var(&self.password_env).map_err(|_| ConfigError::MissingPassword {
            env: self.password_env.clone(),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("password environment variable '{env}' is not set")]
    MissingPassword { env: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
}

pub fn config_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(CONFIG_FILE_NAME)
}

pub fn load_config(dir: impl AsRef<Path>) -> Result<SougraphConfig, ConfigError> {
    let path = config_path(dir);
    if !path.exists() {
        return Ok(SougraphConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: SougraphConfig = toml::from_str(&raw)?;
    Ok(normalize_config(parsed))
}

pub fn ensure_config(dir: impl AsRef<Path>) -> Result<SougraphConfig, ConfigError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = config_path(dir);
    if path.exists() {
        return load_config(dir);
    }

    let config = SougraphConfig::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;

    Ok(config)
}

pub fn validate_config(config: &SougraphConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.graph.repository_url.is_none() {
        warnings.push(ConfigWarning {
            code: "missing_repository_url",
            message: "graph.repository_url is not set; `sougraph link` will require \
                      --repository-url"
                .to_owned(),
        });
    }

    if std::env::var(&config.graph.password_env).is_err() {
        warnings.push(ConfigWarning {
            code: "password_env_unset",
            message: format!(
                "environment variable '{}' is not set; graph commands will fail to authenticate",
                config.graph.password_env
            ),
        });
    }

    warnings
}

fn normalize_config(mut config: SougraphConfig) -> SougraphConfig {
    config.graph.repository_url = config
        .graph
        .repository_url
        .take()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());

    if config.graph.uri.trim().is_empty() {
        config.graph.uri = default_uri();
    }
    if config.graph.username.trim().is_empty() {
        config.graph.username = default_username();
    }
    if config.graph.password_env.trim().is_empty() {
        config.graph.password_env = default_password_env();
    }

    config
}

fn default_uri() -> String {
    DEFAULT_NEO4J_URI.to_owned()
}

fn default_username() -> String {
    DEFAULT_NEO4J_USERNAME.to_owned()
}

fn default_password_env() -> String {
    DEFAULT_PASSWORD_ENV.to_owned()
}
