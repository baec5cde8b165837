//! Change notification for settings
//!
//! Observers are plain callbacks receiving `(registry, name, new_value)`.
//! They run synchronously on the thread that performed the mutation, after the
//! registry's internal locks are released, so an observer may freely query the
//! registry. An observer that blocks also blocks the writer; slow work should
//! be handed off to the observer's own thread or channel.
//!
//! Observer lists are snapshotted before dispatch, so an observer that adds or
//! removes observers only affects later notifications.

use crate::registry::SettingsRegistry;
use serde_json::Value;
use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type alias for a change callback: `(registry, setting_name, new_value)`
pub type Observer = Arc<dyn Fn(&SettingsRegistry, &str, &Value) + Send + Sync>;

/// Handle returned when registering an observer, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Ordered list of registered observers
#[derive(Default, Clone)]
pub struct ObserverList {
    entries: Vec<(ObserverId, Observer)>,
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, _)| id))
            .finish()
    }
}

impl ObserverList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer, returning its handle
    pub fn add(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId::next();
        self.entries.push((id, observer));
        id
    }

    /// Remove an observer.
    ///
    /// Returns `false` (and changes nothing) if the handle is not registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    /// Check whether a handle is registered
    #[must_use]
    pub fn contains(&self, id: ObserverId) -> bool {
        self.entries.iter().any(|(existing, _)| *existing == id)
    }

    /// Copy of the current callbacks, in registration order
    #[must_use]
    pub fn snapshot(&self) -> Vec<Observer> {
        self.entries.iter().map(|(_, obs)| Arc::clone(obs)).collect()
    }

    /// Number of registered observers
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no observers are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A committed change waiting to be announced
pub(crate) struct PendingChange {
    pub name: String,
    pub value: Value,
    pub observers: Vec<Observer>,
}

// =============================================================================
// Dispatch
// =============================================================================

thread_local! {
    static DISPATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as running observer callbacks
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Self {
        DISPATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// True while the current thread is inside an observer callback
pub(crate) fn in_dispatch() -> bool {
    DISPATCH_DEPTH.with(Cell::get) > 0
}

/// Announce committed changes.
///
/// For each change, per-setting observers run first, then every global
/// observer, each exactly once.
pub(crate) fn dispatch(registry: &SettingsRegistry, changes: &[PendingChange], global: &[Observer]) {
    if changes.is_empty() {
        return;
    }
    let _guard = DispatchGuard::enter();
    for change in changes {
        log::debug!(
            "Notifying {} observer(s) of {} = {}",
            change.observers.len() + global.len(),
            change.name,
            change.value
        );
        for observer in change.observers.iter().chain(global) {
            observer(registry, &change.name, &change.value);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
