//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Service container scheduling and teardown."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::name::ServiceName;
use crate::service::{Service, ServiceFailure, StartContext};

/// Errors surfaced by container operations.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("service {0} is already registered")]
    DuplicateName(ServiceName),
}

/// Removal modes accepted by [`ServiceHandle::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMode {
    /// Tear down the node and the subgraph it anchors, reverse order.
    Remove,
}

/// Lifecycle states of an installed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Down,
    Starting,
    Up,
    Failed,
    Stopping,
    Removed,
}

/// Lifecycle notifications for container nodes.
///
/// Callbacks run on the container's worker tasks and must not block.
/// Node-level listeners additionally receive `listener_added` once,
/// immediately on registration.
#[allow(unused_variables)]
pub trait ServiceListener: Send + Sync + 'static {
    fn listener_added(&self, handle: &ServiceHandle) {}
    fn service_added(&self, name: &ServiceName) {}
    fn service_started(&self, name: &ServiceName) {}
    fn service_failed(&self, name: &ServiceName, reason: &ServiceFailure) {}
    fn service_stopped(&self, name: &ServiceName) {}
}

struct Node {
    service: Arc<dyn Service>,
    dependencies: Vec<ServiceName>,
    state: NodeState,
    unstarted_deps: usize,
    failure: Option<ServiceFailure>,
    listeners: Vec<Arc<dyn ServiceListener>>,
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<ServiceName, Node>,
    /// Dependency name -> installed nodes requiring it. Edges may be
    /// registered before the dependency itself is installed.
    dependents: HashMap<ServiceName, Vec<ServiceName>>,
    container_listeners: Vec<Arc<dyn ServiceListener>>,
}

/// Engine that schedules concurrent service activation respecting
/// declared dependency edges.
///
/// A node starts once every one of its dependencies has reached
/// [`NodeState::Up`]; a dependency may be installed after its
/// dependents, so installation order within a batch is free. Removal
/// tears down the transitive dependent closure of the removed node,
/// dependents before dependencies, with the anchor's own terminal
/// notification fired last.
pub struct ServiceContainer {
    inner: Mutex<Inner>,
    weak: Weak<ServiceContainer>,
}

impl ServiceContainer {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            inner: Mutex::new(Inner::default()),
            weak: weak.clone(),
        })
    }

    /// Install a named node. Fails when the name is already taken.
    ///
    /// The node's start action is scheduled immediately when all of its
    /// dependencies are already up (trivially so for an empty list).
    pub fn install(
        &self,
        name: ServiceName,
        dependencies: Vec<ServiceName>,
        service: Arc<dyn Service>,
    ) -> Result<(), GraphError> {
        let (ready, listeners) = {
            let mut inner = self.inner.lock();
            if inner.nodes.contains_key(&name) {
                return Err(GraphError::DuplicateName(name));
            }
            let unstarted = dependencies
                .iter()
                .filter(|dep| {
                    inner
                        .nodes
                        .get(*dep)
                        .map(|node| node.state != NodeState::Up)
                        .unwrap_or(true)
                })
                .count();
            for dep in &dependencies {
                inner
                    .dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(name.clone());
            }
            inner.nodes.insert(
                name.clone(),
                Node {
                    service,
                    dependencies,
                    state: NodeState::Down,
                    unstarted_deps: unstarted,
                    failure: None,
                    listeners: Vec::new(),
                },
            );
            (unstarted == 0, inner.container_listeners.clone())
        };
        debug!(service = %name, ready, "service installed");
        for listener in &listeners {
            listener.service_added(&name);
        }
        if ready {
            self.spawn_start(name);
        }
        Ok(())
    }

    /// Register a container-wide listener observing every node.
    pub fn add_listener(&self, listener: Arc<dyn ServiceListener>) {
        self.inner.lock().container_listeners.push(listener);
    }

    /// Look up a controller handle for an installed node.
    pub fn handle(&self, name: &ServiceName) -> Option<ServiceHandle> {
        let container = self.weak.upgrade()?;
        if !self.inner.lock().nodes.contains_key(name) {
            return None;
        }
        Some(ServiceHandle {
            container,
            name: name.clone(),
        })
    }

    /// Current state of a node, if installed.
    pub fn state(&self, name: &ServiceName) -> Option<NodeState> {
        self.inner.lock().nodes.get(name).map(|node| node.state)
    }

    /// Number of installed nodes, including stopped ones.
    pub fn len(&self) -> usize {
        self.inner.lock().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn spawn_start(&self, name: ServiceName) {
        let Some(container) = self.weak.upgrade() else {
            return;
        };
        let service = {
            let mut inner = container.inner.lock();
            let Some(node) = inner.nodes.get_mut(&name) else {
                return;
            };
            if node.state != NodeState::Down {
                return;
            }
            node.state = NodeState::Starting;
            node.service.clone()
        };
        tokio::spawn(async move {
            let ctx = StartContext::new(container.clone(), name.clone());
            match service.start(ctx).await {
                Ok(()) => container.mark_started(&name),
                Err(reason) => container.mark_failed(&name, reason),
            }
        });
    }

    fn mark_started(&self, name: &ServiceName) {
        let (listeners, ready) = {
            let mut inner = self.inner.lock();
            let Some(node) = inner.nodes.get_mut(name) else {
                return;
            };
            if node.state != NodeState::Starting {
                // Removed while its start action was in flight.
                warn!(service = %name, state = ?node.state, "start completion ignored");
                return;
            }
            node.state = NodeState::Up;
            let listeners = self.listeners_for(&inner, name);
            let mut ready = Vec::new();
            let dependents = inner.dependents.get(name).cloned().unwrap_or_default();
            for dependent in dependents {
                if let Some(node) = inner.nodes.get_mut(&dependent) {
                    node.unstarted_deps = node.unstarted_deps.saturating_sub(1);
                    if node.unstarted_deps == 0 && node.state == NodeState::Down {
                        ready.push(dependent);
                    }
                }
            }
            (listeners, ready)
        };
        debug!(service = %name, "service started");
        for listener in &listeners {
            listener.service_started(name);
        }
        for dependent in ready {
            self.spawn_start(dependent);
        }
    }

    fn mark_failed(&self, name: &ServiceName, reason: ServiceFailure) {
        let listeners = {
            let mut inner = self.inner.lock();
            let Some(node) = inner.nodes.get_mut(name) else {
                return;
            };
            if node.state != NodeState::Starting {
                return;
            }
            node.state = NodeState::Failed;
            node.failure = Some(reason.clone());
            self.listeners_for(&inner, name)
        };
        warn!(service = %name, error = %reason, "service failed to start");
        for listener in &listeners {
            listener.service_failed(name, &reason);
        }
    }

    fn listeners_for(&self, inner: &Inner, name: &ServiceName) -> Vec<Arc<dyn ServiceListener>> {
        let mut listeners = inner.container_listeners.clone();
        if let Some(node) = inner.nodes.get(name) {
            listeners.extend(node.listeners.iter().cloned());
        }
        listeners
    }

    /// Stop order for the subgraph anchored at `anchor`: the transitive
    /// dependent closure, dependents before dependencies, anchor last.
    fn teardown_order(&self, anchor: &ServiceName) -> Vec<ServiceName> {
        let inner = self.inner.lock();
        if !inner.nodes.contains_key(anchor) {
            return Vec::new();
        }

        let mut members: HashSet<ServiceName> = HashSet::new();
        let mut stack = vec![anchor.clone()];
        while let Some(name) = stack.pop() {
            if !members.insert(name.clone()) {
                continue;
            }
            if let Some(dependents) = inner.dependents.get(&name) {
                for dependent in dependents {
                    if inner.nodes.contains_key(dependent) && !members.contains(dependent) {
                        stack.push(dependent.clone());
                    }
                }
            }
        }

        // Kahn over the dependent relation restricted to the closure: a
        // node is emitted once every member depending on it is emitted.
        let mut pending: HashMap<ServiceName, usize> = members
            .iter()
            .map(|name| {
                let count = inner
                    .dependents
                    .get(name)
                    .map(|deps| deps.iter().filter(|d| members.contains(*d)).count())
                    .unwrap_or(0);
                (name.clone(), count)
            })
            .collect();

        let mut queue: VecDeque<ServiceName> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(name, _)| name.clone())
            .collect();
        let mut order = Vec::with_capacity(members.len());
        while let Some(name) = queue.pop_front() {
            if let Some(node) = inner.nodes.get(&name) {
                for dep in &node.dependencies {
                    if let Some(count) = pending.get_mut(dep) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(dep.clone());
                        }
                    }
                }
            }
            order.push(name);
        }
        if order.len() != members.len() {
            warn!(anchor = %anchor, "dependency cycle detected; teardown will be partial");
        }
        order
    }

    fn request_remove(&self, anchor: &ServiceName) {
        let Some(container) = self.weak.upgrade() else {
            return;
        };
        let order = self.teardown_order(anchor);
        if order.is_empty() {
            warn!(service = %anchor, "remove requested for unknown service");
            return;
        }
        debug!(service = %anchor, nodes = order.len(), "teardown scheduled");
        tokio::spawn(async move {
            for name in order {
                container.stop_node(&name).await;
            }
        });
    }

    async fn stop_node(&self, name: &ServiceName) {
        let action = {
            let mut inner = self.inner.lock();
            let Some(node) = inner.nodes.get_mut(name) else {
                return;
            };
            match node.state {
                NodeState::Up => {
                    node.state = NodeState::Stopping;
                    Some(node.service.clone())
                }
                NodeState::Stopping | NodeState::Removed => return,
                // Down, Starting and Failed nodes carry nothing to release.
                _ => None,
            }
        };
        if let Some(service) = action {
            service.stop().await;
        }
        let listeners = {
            let mut inner = self.inner.lock();
            let Some(node) = inner.nodes.get_mut(name) else {
                return;
            };
            node.state = NodeState::Removed;
            self.listeners_for(&inner, name)
        };
        debug!(service = %name, "service stopped");
        for listener in &listeners {
            listener.service_stopped(name);
        }
    }
}

/// Controller handle referencing one installed node.
#[derive(Clone)]
pub struct ServiceHandle {
    container: Arc<ServiceContainer>,
    name: ServiceName,
}

impl ServiceHandle {
    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    pub fn state(&self) -> Option<NodeState> {
        self.container.state(&self.name)
    }

    /// Attach a node-level listener.
    ///
    /// `listener_added` fires immediately; when the node already reached
    /// a later state the matching event is replayed so late subscribers
    /// cannot miss a terminal notification.
    pub fn add_listener(&self, listener: Arc<dyn ServiceListener>) {
        let snapshot = {
            let mut inner = self.container.inner.lock();
            let Some(node) = inner.nodes.get_mut(&self.name) else {
                return;
            };
            node.listeners.push(listener.clone());
            (node.state, node.failure.clone())
        };
        listener.listener_added(self);
        match snapshot {
            (NodeState::Up, _) => listener.service_started(&self.name),
            (NodeState::Failed, Some(reason)) => listener.service_failed(&self.name, &reason),
            (NodeState::Removed, _) => listener.service_stopped(&self.name),
            _ => {}
        }
    }

    /// Request asynchronous removal of the node and the subgraph it
    /// anchors. Returns immediately; completion is observed through the
    /// node's terminal listener notification.
    pub fn remove(&self, mode: RemoveMode) {
        let RemoveMode::Remove = mode;
        self.container.request_remove(&self.name);
    }
}
