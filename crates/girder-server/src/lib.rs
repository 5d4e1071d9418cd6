//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Server lifecycle orchestration."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
//! Standalone server lifecycle for the Girder kernel.
//!
//! [`StandaloneServer`] turns the declarative server document into a
//! running service graph and back: `start` loads the ordered model
//! updates, installs one node per provided subsystem service plus the
//! startup sentinel, and blocks until the sentinel observes readiness
//! or the bounded wait elapses; `stop` anchors a one-shot listener on
//! the server root node and blocks until the reverse-order teardown
//! reports terminal.

pub mod activator;
pub mod environment;
pub mod error;
pub mod server;
pub mod start_task;
pub mod startup;

pub use activator::{ActivatorContext, ServiceActivator};
pub use environment::ServerEnvironment;
pub use error::ServerError;
pub use server::{LifecycleState, StandaloneServer};
pub use start_task::ServerStartTask;
pub use startup::{
    kernel_root, qualified, readiness_dependencies, server_name, startup_name, ActiveContainer,
    StartupService,
};
