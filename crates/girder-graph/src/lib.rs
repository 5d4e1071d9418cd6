//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Service dependency graph engine."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
//! Dependency-ordered service activation for the Girder kernel.
//!
//! A [`ServiceContainer`] accepts named service nodes together with the
//! names of the nodes they depend on, starts each node concurrently as
//! soon as every declared dependency has reached started state, and
//! tears subgraphs down in reverse dependency order on removal. Node
//! lifecycle transitions are surfaced through [`ServiceListener`]
//! callbacks; the [`Latch`] primitive converts a single asynchronous
//! lifecycle event into a synchronous return for the caller.

pub mod container;
pub mod latch;
pub mod name;
pub mod service;

pub use container::{
    GraphError, NodeState, RemoveMode, ServiceContainer, ServiceHandle, ServiceListener,
};
pub use latch::Latch;
pub use name::ServiceName;
pub use service::{Service, ServiceFailure, StartContext};
