//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Startup sentinel and readiness barrier."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::sync::Arc;

use async_trait::async_trait;
use girder_graph::{
    GraphError, Latch, Service, ServiceContainer, ServiceFailure, ServiceName, StartContext,
};
use parking_lot::Mutex;
use tracing::info;

/// Root namespace for all kernel service names.
pub fn kernel_root() -> ServiceName {
    ServiceName::base("girder")
}

/// Name of the server root node installed by the start task.
pub fn server_name() -> ServiceName {
    kernel_root().append(["server"])
}

/// Name the startup sentinel is installed under.
pub fn startup_name() -> ServiceName {
    kernel_root().append(["server", "startup"])
}

/// Dotted suffixes of the subsystems the server considers mandatory
/// for readiness. The sentinel's dependency list is exactly these plus
/// the server root node.
const READINESS_SUFFIXES: &[&str] = &[
    "management.operations",
    "management.registry",
    "naming.context.app",
    "naming.context.global",
    "naming.context.comp",
    "naming.context.module",
    "deployment.manager",
    "connector.http",
    "connector.config",
    "messaging.connection-factory.invm",
    "messaging.connection-factory.remote",
    "messaging.queue.default",
    "messaging.topic.default",
];

/// Resolve a dotted suffix to its full service name under the root.
pub fn qualified(suffix: &str) -> ServiceName {
    kernel_root().append(suffix.split('.'))
}

/// The sentinel's enumerated, fixed dependency list.
pub fn readiness_dependencies() -> Vec<ServiceName> {
    let mut deps = vec![server_name()];
    deps.extend(READINESS_SUFFIXES.iter().map(|suffix| qualified(suffix)));
    deps
}

/// Thread-safe slot for the active container reference.
///
/// Written by the sentinel's start action (a container worker task)
/// and by the shutdown listener; read by the caller after the bounded
/// wait. The guarded slot is the authoritative startup post-condition.
/// Writes carry the cycle tag issued by [`ActiveContainer::begin_cycle`],
/// so a sentinel still in flight from a discarded start cannot fill the
/// slot for a later cycle.
#[derive(Default)]
pub struct ActiveContainer {
    slot: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    cycle: u64,
    container: Option<Arc<ServiceContainer>>,
}

impl ActiveContainer {
    /// Open a new start cycle: empties the slot and returns the tag
    /// this cycle's writes must carry.
    pub fn begin_cycle(&self) -> u64 {
        let mut slot = self.slot.lock();
        slot.cycle += 1;
        slot.container = None;
        slot.cycle
    }

    /// Record the container for `cycle`. Superseded tags are dropped.
    pub fn set(&self, cycle: u64, container: Arc<ServiceContainer>) {
        let mut slot = self.slot.lock();
        if slot.cycle == cycle {
            slot.container = Some(container);
        }
    }

    pub fn clear(&self) {
        self.slot.lock().container = None;
    }

    pub fn get(&self) -> Option<Arc<ServiceContainer>> {
        self.slot.lock().container.clone()
    }
}

/// Fan-in barrier node observing "the system is ready".
///
/// Installed last so every dependency name resolves within the same
/// start cycle; its start action fires exactly once, exactly when all
/// enumerated dependencies have started, and performs two effects:
/// record the container reference and open the completion latch. Its
/// stop action is a no-op, the sentinel carries no resources.
pub struct StartupService {
    active: Arc<ActiveContainer>,
    latch: Arc<Latch>,
    cycle: u64,
}

impl StartupService {
    pub fn new(active: Arc<ActiveContainer>, latch: Arc<Latch>, cycle: u64) -> Self {
        Self {
            active,
            latch,
            cycle,
        }
    }

    /// Install the sentinel into the target container. Must be the
    /// last installation of the start cycle.
    pub fn install(self: Arc<Self>, container: &Arc<ServiceContainer>) -> Result<(), GraphError> {
        container.install(startup_name(), readiness_dependencies(), self)
    }
}

#[async_trait]
impl Service for StartupService {
    async fn start(&self, ctx: StartContext) -> Result<(), ServiceFailure> {
        self.active.set(self.cycle, ctx.container());
        self.latch.open();
        info!(service = %ctx.name(), "server readiness barrier passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_list_is_fixed_and_rooted() {
        let deps = readiness_dependencies();
        assert_eq!(deps.len(), READINESS_SUFFIXES.len() + 1);
        assert_eq!(deps[0], server_name());
        for dep in &deps {
            assert_eq!(dep.segments()[0], "girder");
        }
    }

    #[test]
    fn qualified_splits_dotted_suffixes() {
        assert_eq!(
            qualified("naming.context.app"),
            ServiceName::parse("girder.naming.context.app")
        );
    }

    #[test]
    fn superseded_cycle_cannot_fill_the_slot() {
        let active = ActiveContainer::default();
        let stale = active.begin_cycle();
        let current = active.begin_cycle();

        active.set(stale, ServiceContainer::new());
        assert!(active.get().is_none());

        active.set(current, ServiceContainer::new());
        assert!(active.get().is_some());
    }
}
