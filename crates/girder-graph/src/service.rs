//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Service trait and start context."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::container::ServiceContainer;
use crate::name::ServiceName;

/// Reason a service failed to start.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ServiceFailure {
    message: String,
}

impl ServiceFailure {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Context handed to a service's start action.
///
/// Carries the owning container so a service can record it or install
/// further nodes while starting.
pub struct StartContext {
    container: Arc<ServiceContainer>,
    name: ServiceName,
}

impl StartContext {
    pub(crate) fn new(container: Arc<ServiceContainer>, name: ServiceName) -> Self {
        Self { container, name }
    }

    /// The container owning the starting node.
    pub fn container(&self) -> Arc<ServiceContainer> {
        self.container.clone()
    }

    /// The name the starting node was installed under.
    pub fn name(&self) -> &ServiceName {
        &self.name
    }
}

/// A unit of work managed by the container.
///
/// `start` runs once every declared dependency of the node has itself
/// reached started state; `stop` runs during reverse-order teardown.
/// Both actions execute on the container's worker tasks, never on the
/// thread that installed the node.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    async fn start(&self, ctx: StartContext) -> Result<(), ServiceFailure>;

    async fn stop(&self) {}
}
