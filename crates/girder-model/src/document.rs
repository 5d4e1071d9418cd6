//! ---
//! girder_section: "04-configuration-orchestration"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Server document parsing."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::update::{ModelUpdate, SubsystemSpec};

/// Errors raised while loading or rendering the server document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read server document {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse server document {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to render server document")]
    Render {
        #[source]
        source: toml::ser::Error,
    },
}

/// On-disk shape of the server document (`server.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerDocument {
    #[serde(default)]
    pub subsystem: IndexMap<String, SubsystemSpec>,
    #[serde(default)]
    pub binding: IndexMap<String, String>,
}

impl ServerDocument {
    /// Translate the document into the ordered update sequence the
    /// kernel applies to a fresh model. Order follows the document.
    pub fn into_updates(self) -> Vec<ModelUpdate> {
        let mut updates = Vec::with_capacity(self.subsystem.len() + self.binding.len());
        for (name, spec) in self.subsystem {
            updates.push(ModelUpdate::AddSubsystem { name, spec });
        }
        for (name, value) in self.binding {
            updates.push(ModelUpdate::SetBinding { name, value });
        }
        updates
    }

    /// Render the document back to TOML for persistence.
    pub fn render(&self) -> Result<String, LoadError> {
        toml::to_string_pretty(self).map_err(|source| LoadError::Render { source })
    }
}

/// Load the server document at `path` and return the ordered update
/// sequence it describes.
pub fn load_updates<P: AsRef<Path>>(path: P) -> Result<Vec<ModelUpdate>, LoadError> {
    let path = path.as_ref();
    debug!(document = %path.display(), "loading server document");
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: ServerDocument =
        toml::from_str(&contents).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let updates = document.into_updates();
    debug!(document = %path.display(), updates = updates.len(), "server document loaded");
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::ServerModel;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [subsystem.naming]
        provides = ["naming.context.app", "naming.context.global"]

        [subsystem.web]
        provides = ["connector.http"]
        requires = ["naming.context.global"]

        [binding]
        http-port = "8080"
    "#;

    #[test]
    fn document_yields_ordered_updates() {
        let temp = tempfile::NamedTempFile::new().expect("tempfile");
        write!(temp.as_file(), "{}", SAMPLE).expect("write sample");
        let updates = load_updates(temp.path()).expect("load");
        assert_eq!(updates.len(), 3);
        assert!(matches!(&updates[0], ModelUpdate::AddSubsystem { name, .. } if name == "naming"));
        assert!(matches!(&updates[1], ModelUpdate::AddSubsystem { name, .. } if name == "web"));
        assert!(matches!(&updates[2], ModelUpdate::SetBinding { name, .. } if name == "http-port"));
    }

    #[test]
    fn parse_failure_carries_cause() {
        let temp = tempfile::NamedTempFile::new().expect("tempfile");
        write!(temp.as_file(), "not [valid toml").expect("write sample");
        let err = load_updates(temp.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_updates("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn model_round_trips_through_document() {
        let temp = tempfile::NamedTempFile::new().expect("tempfile");
        write!(temp.as_file(), "{}", SAMPLE).expect("write sample");
        let updates = load_updates(temp.path()).expect("load");

        let mut model = ServerModel::new();
        model.apply_all(updates.clone()).expect("apply");
        let rendered = model.to_document().render().expect("render");

        let reparsed: ServerDocument = toml::from_str(&rendered).expect("reparse");
        assert_eq!(reparsed.into_updates(), updates);
    }
}
