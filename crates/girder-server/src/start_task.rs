//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Initial graph construction from the loaded model."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::sync::Arc;

use async_trait::async_trait;
use girder_graph::{Service, ServiceContainer, ServiceFailure, StartContext};
use girder_model::{ModelUpdate, ServerModel};
use tracing::debug;

use crate::activator::{ActivatorContext, ServiceActivator};
use crate::error::ServerError;
use crate::startup::{qualified, server_name, StartupService};

/// Anchor node for the whole start cycle. Every subsystem node depends
/// on it, which makes it the single removal target during `stop`.
struct ServerRootService;

#[async_trait]
impl Service for ServerRootService {
    async fn start(&self, _ctx: StartContext) -> Result<(), ServiceFailure> {
        Ok(())
    }
}

/// Placeholder node for one provided subsystem service. The business
/// behavior of subsystems is outside the kernel; the node exists to
/// carry the declared dependency edges through the graph engine.
struct SubsystemService {
    subsystem: String,
}

#[async_trait]
impl Service for SubsystemService {
    async fn start(&self, ctx: StartContext) -> Result<(), ServiceFailure> {
        debug!(subsystem = %self.subsystem, service = %ctx.name(), "subsystem service online");
        Ok(())
    }

    async fn stop(&self) {
        debug!(subsystem = %self.subsystem, "subsystem service released");
    }
}

/// Builds the initial node set for one start cycle: applies the loaded
/// updates to a fresh model, installs the server root and one node per
/// provided subsystem service, runs caller-supplied activators, then
/// installs the startup sentinel last so that its dependency names can
/// all resolve.
pub struct ServerStartTask {
    updates: Vec<ModelUpdate>,
    activators: Vec<Box<dyn ServiceActivator>>,
}

impl ServerStartTask {
    pub fn new(updates: Vec<ModelUpdate>, activators: Vec<Box<dyn ServiceActivator>>) -> Self {
        Self {
            updates,
            activators,
        }
    }

    /// Populate `container` and return the effective model. Activator
    /// failures propagate unmodified; nothing installed so far is
    /// rolled back, the enclosing `start` surfaces the fault.
    pub fn run(
        self,
        container: &Arc<ServiceContainer>,
        sentinel: Arc<StartupService>,
    ) -> Result<ServerModel, ServerError> {
        let mut model = ServerModel::new();
        model.apply_all(self.updates)?;

        container.install(server_name(), Vec::new(), Arc::new(ServerRootService))?;

        for (subsystem, spec) in model.subsystems() {
            for provided in &spec.provides {
                let mut dependencies = vec![server_name()];
                dependencies.extend(spec.requires.iter().map(|req| qualified(req)));
                container.install(
                    qualified(provided),
                    dependencies,
                    Arc::new(SubsystemService {
                        subsystem: subsystem.clone(),
                    }),
                )?;
            }
        }

        let ctx = ActivatorContext::new(container.clone());
        for activator in &self.activators {
            activator.activate(&ctx)?;
        }

        sentinel.install(container)?;
        debug!(nodes = container.len(), "start task installed initial graph");
        Ok(model)
    }
}
