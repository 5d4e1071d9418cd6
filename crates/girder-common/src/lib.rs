//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Shared primitives and utilities for the server kernel."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
//! Core shared primitives for the Girder server workspace.
//! This crate exposes configuration loading, logging, and version
//! metadata utilities consumed across the workspace.

pub mod config;
pub mod logging;
pub mod version;

pub use config::{LoggingConfig, ServerConfig};
pub use logging::{init_tracing, LogFormat};
pub use version::VersionInfo;
