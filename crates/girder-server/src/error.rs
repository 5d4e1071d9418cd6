//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Server lifecycle error taxonomy."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::path::PathBuf;

use girder_graph::GraphError;
use girder_model::{LoadError, UpdateError};
use thiserror::Error;

/// Faults surfaced by [`crate::StandaloneServer`].
///
/// Nothing here is retried internally; retry policy, if any, belongs
/// to the caller.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server document is missing or not writable. Checked before
    /// loading is attempted; the running server persists the effective
    /// model back to the same document.
    #[error("server document {path} does not exist or is not writable")]
    ConfigUnavailable { path: PathBuf },

    /// The server document could not be read or parsed.
    #[error("failed to load server document {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    /// A loaded model update could not be applied.
    #[error("model update could not be applied")]
    Model {
        #[from]
        source: UpdateError,
    },

    /// Installing a service node into the container failed.
    #[error("service installation failed")]
    Install {
        #[from]
        source: GraphError,
    },

    /// The bounded startup wait elapsed and the active container was
    /// still absent: startup silently failed to reach running state.
    #[error("service container not available after startup wait")]
    ContainerUnavailable,

    /// `start` was invoked while a previous start is still in effect.
    #[error("server is already started")]
    AlreadyStarted,

    /// `stop` was invoked without a prior successful `start`.
    #[error("server not started")]
    NotStarted,
}
