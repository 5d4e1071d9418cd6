//! ---
//! girder_section: "04-configuration-orchestration"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Daemon configuration loading and validation."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_config_dir() -> PathBuf {
    PathBuf::from("configs")
}

fn default_document() -> String {
    "server.toml".to_owned()
}

fn default_startup_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Primary configuration object for the Girder daemon.
///
/// This describes the daemon's own runtime settings; the server model
/// document (`server.toml` by default) that drives service installation
/// lives inside `config_dir` and is parsed separately by `girder-model`.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory holding the server model document.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    /// File name of the server model document inside `config_dir`.
    #[serde(default = "default_document")]
    pub document: String,
    /// Ceiling for the bounded startup/shutdown waits. Elapsing the
    /// ceiling is advisory, not a failure by itself.
    #[serde(default = "default_startup_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub startup_timeout: Duration,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where a [`ServerConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedServerConfig {
    pub config: ServerConfig,
    pub source: PathBuf,
}

impl ServerConfig {
    pub const ENV_CONFIG_PATH: &'static str = "GIRDER_CONFIG";

    /// Load configuration from disk, respecting the `GIRDER_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedServerConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedServerConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedServerConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<ServerConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Absolute or relative path to the server model document.
    pub fn document_path(&self) -> PathBuf {
        self.config_dir.join(&self.document)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.document.trim().is_empty() {
            return Err(anyhow!("configuration must name a server document"));
        }
        if self.startup_timeout.is_zero() {
            return Err(anyhow!("startup_timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            document: default_document(),
            startup_timeout: default_startup_timeout(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for ServerConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: ServerConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ServerConfig::default();
        config.validate().expect("default config validates");
        assert_eq!(config.document_path(), PathBuf::from("configs/server.toml"));
        assert_eq!(config.startup_timeout, Duration::from_secs(30));
    }

    #[test]
    fn parses_with_overrides() {
        let config: ServerConfig = r#"
            config_dir = "/srv/girder"
            document = "site.toml"
            startup_timeout = 5
        "#
        .parse()
        .expect("config parses");
        assert_eq!(config.document_path(), PathBuf::from("/srv/girder/site.toml"));
        assert_eq!(config.startup_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_empty_document_name() {
        let parsed: Result<ServerConfig> = r#"document = """#.parse();
        assert!(parsed.is_err());
    }

    #[test]
    fn loads_from_first_existing_candidate() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let path = temp.path().join("girderd.toml");
        fs::write(&path, "document = \"site.toml\"\n").expect("write config");

        let missing = temp.path().join("absent.toml");
        let loaded = ServerConfig::load_with_source(&[missing, path.clone()]).expect("load");
        assert_eq!(loaded.source, path);
        assert_eq!(loaded.config.document, "site.toml");
    }
}
