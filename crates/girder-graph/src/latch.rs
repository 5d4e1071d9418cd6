//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Single-use completion gate."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Single-use completion gate.
///
/// Opened at most once, from any task; waiters observe the open state
/// even when they subscribe after the fact. A fresh latch is created
/// per start/stop cycle and never reused.
#[derive(Debug, Default)]
pub struct Latch {
    opened: AtomicBool,
    notify: Notify,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate. Subsequent calls are no-ops.
    pub fn open(&self) {
        if !self.opened.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether the gate has been opened.
    pub fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    /// Wait until the gate opens.
    pub async fn wait(&self) {
        while !self.is_open() {
            let notified = self.notify.notified();
            // The gate may have opened between the check and subscribing.
            if self.is_open() {
                break;
            }
            notified.await;
        }
    }

    /// Bounded wait. Returns `false` if the ceiling elapsed first; the
    /// elapse is advisory, the caller decides what it means.
    pub async fn timed_wait(&self, ceiling: Duration) -> bool {
        tokio::time::timeout(ceiling, self.wait()).await.is_ok()
    }
}
