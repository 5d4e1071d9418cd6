//! ---
//! girder_section: "04-configuration-orchestration"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Runtime model and ordered update application."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::ServerDocument;

/// Errors raised while applying updates to the model.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("subsystem '{0}' is already present in the model")]
    DuplicateSubsystem(String),
    #[error("subsystem '{0}' is not present in the model")]
    UnknownSubsystem(String),
}

/// Declarative description of one subsystem.
///
/// `provides` lists the dotted service-name suffixes the subsystem
/// registers under the kernel root; `requires` lists the suffixes those
/// nodes depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemSpec {
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
}

/// One operation applied to the runtime model.
///
/// Updates are applied in exactly the order the loader produced them;
/// the loader never re-orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelUpdate {
    AddSubsystem { name: String, spec: SubsystemSpec },
    RemoveSubsystem { name: String },
    SetBinding { name: String, value: String },
}

/// The server's runtime model, built fresh per start cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerModel {
    subsystems: IndexMap<String, SubsystemSpec>,
    bindings: IndexMap<String, String>,
}

impl ServerModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one update in place.
    pub fn apply(&mut self, update: ModelUpdate) -> Result<(), UpdateError> {
        match update {
            ModelUpdate::AddSubsystem { name, spec } => {
                if self.subsystems.contains_key(&name) {
                    return Err(UpdateError::DuplicateSubsystem(name));
                }
                self.subsystems.insert(name, spec);
            }
            ModelUpdate::RemoveSubsystem { name } => {
                if self.subsystems.shift_remove(&name).is_none() {
                    return Err(UpdateError::UnknownSubsystem(name));
                }
            }
            ModelUpdate::SetBinding { name, value } => {
                self.bindings.insert(name, value);
            }
        }
        Ok(())
    }

    /// Apply an ordered sequence of updates, stopping at the first error.
    pub fn apply_all<I: IntoIterator<Item = ModelUpdate>>(
        &mut self,
        updates: I,
    ) -> Result<(), UpdateError> {
        for update in updates {
            self.apply(update)?;
        }
        Ok(())
    }

    /// Subsystems currently present, in application order.
    pub fn subsystems(&self) -> &IndexMap<String, SubsystemSpec> {
        &self.subsystems
    }

    /// Named bindings currently present.
    pub fn bindings(&self) -> &IndexMap<String, String> {
        &self.bindings
    }

    /// Render the model back into a persistable document.
    pub fn to_document(&self) -> ServerDocument {
        ServerDocument {
            subsystem: self.subsystems.clone(),
            binding: self.bindings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming_spec() -> SubsystemSpec {
        SubsystemSpec {
            provides: vec!["naming.context.app".into()],
            requires: vec![],
        }
    }

    #[test]
    fn updates_apply_in_order() {
        let mut model = ServerModel::new();
        model
            .apply_all([
                ModelUpdate::AddSubsystem {
                    name: "naming".into(),
                    spec: naming_spec(),
                },
                ModelUpdate::SetBinding {
                    name: "http-port".into(),
                    value: "8080".into(),
                },
                ModelUpdate::RemoveSubsystem {
                    name: "naming".into(),
                },
            ])
            .expect("updates apply");
        assert!(model.subsystems().is_empty());
        assert_eq!(model.bindings().get("http-port").map(String::as_str), Some("8080"));
    }

    #[test]
    fn duplicate_subsystem_is_rejected() {
        let mut model = ServerModel::new();
        model
            .apply(ModelUpdate::AddSubsystem {
                name: "naming".into(),
                spec: naming_spec(),
            })
            .unwrap();
        let err = model
            .apply(ModelUpdate::AddSubsystem {
                name: "naming".into(),
                spec: naming_spec(),
            })
            .unwrap_err();
        assert!(matches!(err, UpdateError::DuplicateSubsystem(name) if name == "naming"));
    }

    #[test]
    fn removing_unknown_subsystem_is_rejected() {
        let mut model = ServerModel::new();
        let err = model
            .apply(ModelUpdate::RemoveSubsystem {
                name: "ghost".into(),
            })
            .unwrap_err();
        assert!(matches!(err, UpdateError::UnknownSubsystem(name) if name == "ghost"));
    }
}
