//! ---
//! girder_section: "04-configuration-orchestration"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Server runtime model and update loading."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
//! The persisted server document and the ordered model updates derived
//! from it. The kernel applies updates to a fresh [`ServerModel`] on
//! every start and persists the effective model back to the document,
//! which is why the document must be writable before a start is even
//! attempted.

pub mod document;
pub mod update;

pub use document::{load_updates, LoadError, ServerDocument};
pub use update::{ModelUpdate, ServerModel, SubsystemSpec, UpdateError};
