//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Extension-point activation into the service graph."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::sync::Arc;

use girder_graph::{GraphError, Service, ServiceContainer, ServiceName};

use crate::startup::kernel_root;

/// Target handed to activators during the start task.
pub struct ActivatorContext {
    container: Arc<ServiceContainer>,
}

impl ActivatorContext {
    pub(crate) fn new(container: Arc<ServiceContainer>) -> Self {
        Self { container }
    }

    /// The container being populated for this start cycle.
    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    /// Root namespace of the kernel's service names.
    pub fn root(&self) -> ServiceName {
        kernel_root()
    }

    /// Convenience install wrapper.
    pub fn install(
        &self,
        name: ServiceName,
        dependencies: Vec<ServiceName>,
        service: Arc<dyn Service>,
    ) -> Result<(), GraphError> {
        self.container.install(name, dependencies, service)
    }
}

/// Caller-supplied extension point run during the start task, before
/// the startup sentinel is installed. A failing activator aborts the
/// enclosing `start`.
pub trait ServiceActivator: Send + Sync {
    fn activate(&self, ctx: &ActivatorContext) -> Result<(), GraphError>;
}

impl<F> ServiceActivator for F
where
    F: Fn(&ActivatorContext) -> Result<(), GraphError> + Send + Sync,
{
    fn activate(&self, ctx: &ActivatorContext) -> Result<(), GraphError> {
        self(ctx)
    }
}
