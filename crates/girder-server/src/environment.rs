//! ---
//! girder_section: "04-configuration-orchestration"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Server environment paths and wait ceilings."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};
use std::time::Duration;

use girder_common::ServerConfig;

/// Ceiling for the bounded waits in `start` and `stop`.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Filesystem environment one server instance runs in.
#[derive(Debug, Clone)]
pub struct ServerEnvironment {
    config_dir: PathBuf,
    document: String,
    startup_timeout: Duration,
}

impl ServerEnvironment {
    pub fn new<P: AsRef<Path>, S: Into<String>>(config_dir: P, document: S) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
            document: document.into(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    /// Derive the environment from daemon configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            config_dir: config.config_dir.clone(),
            document: config.document.clone(),
            startup_timeout: config.startup_timeout,
        }
    }

    /// Override the bounded-wait ceiling. Elapsing the ceiling remains
    /// advisory either way.
    pub fn with_startup_timeout(mut self, ceiling: Duration) -> Self {
        self.startup_timeout = ceiling;
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path to the server model document.
    pub fn document_path(&self) -> PathBuf {
        self.config_dir.join(&self.document)
    }

    pub fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }
}
