//! ---
//! girder_section: "15-testing-qa-runbook"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "End-to-end lifecycle integration through the daemon configuration."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::fs;
use std::time::Duration;

use girder_common::ServerConfig;
use girder_graph::NodeState;
use girder_model::load_updates;
use girder_server::{qualified, LifecycleState, ServerEnvironment, StandaloneServer};
use tempfile::TempDir;

const DOCUMENT: &str = r#"
[subsystem.management]
provides = ["management.operations", "management.registry"]

[subsystem.naming]
provides = [
    "naming.context.app",
    "naming.context.global",
    "naming.context.comp",
    "naming.context.module",
]

[subsystem.deployment]
provides = ["deployment.manager"]
requires = ["management.operations"]

[subsystem.web]
provides = ["connector.http", "connector.config"]
requires = ["naming.context.global"]

[subsystem.messaging]
provides = [
    "messaging.connection-factory.invm",
    "messaging.connection-factory.remote",
    "messaging.queue.default",
    "messaging.topic.default",
]
requires = ["connector.config"]
"#;

fn daemon_config(temp: &TempDir) -> ServerConfig {
    fs::write(temp.path().join("server.toml"), DOCUMENT).expect("write document");
    let raw = format!(
        r#"
            config_dir = "{}"
            document = "server.toml"
            startup_timeout = 5
        "#,
        temp.path().display()
    );
    raw.parse().expect("daemon config parses")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn daemon_configuration_drives_a_full_lifecycle() {
    let temp = TempDir::new().expect("tempdir");
    let config = daemon_config(&temp);
    assert_eq!(config.startup_timeout, Duration::from_secs(5));

    let updates = load_updates(config.document_path()).expect("document loads");
    assert_eq!(updates.len(), 5);

    let server = StandaloneServer::new(ServerEnvironment::from_config(&config));
    server.start().await.expect("server starts");
    assert_eq!(server.state(), LifecycleState::Running);

    let container = server.active_container().expect("active container");
    for suffix in ["deployment.manager", "connector.http", "messaging.queue.default"] {
        assert_eq!(
            container.state(&qualified(suffix)),
            Some(NodeState::Up),
            "{suffix} should be up once start returned"
        );
    }

    server.stop().await.expect("server stops");
    assert_eq!(server.state(), LifecycleState::Terminated);
    assert!(server.active_container().is_none());

    // The cycle is repeatable on the same instance.
    server.start().await.expect("server restarts");
    server.stop().await.expect("server stops again");
}
