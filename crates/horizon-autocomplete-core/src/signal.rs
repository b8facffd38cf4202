//! Signal/slot notifications.
//!
//! The widget announces selections, highlight moves, focus changes and
//! redraw requests by emitting a [`Signal`]. Hosts connect closures to the
//! ones they care about. Slots run synchronously on the emitting thread, the
//! UI thread that drives the widget.
//!
//! ```
//! use horizon_autocomplete_core::Signal;
//!
//! let selection_changed = Signal::<String>::new();
//! let id = selection_changed.connect(|city| println!("picked {city}"));
//!
//! selection_changed.emit("Lisbon".to_string());
//! assert!(selection_changed.disconnect(id));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Key of one connected slot, for [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A notification with any number of connected slots.
///
/// Slots receive `&Args`; notifications without a payload use `()`.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// An unconnected signal.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect `slot`. Keep the returned id to disconnect it later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Connect `slot` for as long as the returned guard lives.
    ///
    /// ```
    /// use horizon_autocomplete_core::Signal;
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    ///
    /// let opened = Signal::<bool>::new();
    /// let seen = Arc::new(AtomicBool::new(false));
    /// {
    ///     let seen = seen.clone();
    ///     let _guard = opened.connect_scoped(move |&open| seen.store(open, Ordering::SeqCst));
    ///     opened.emit(true);
    /// }
    /// opened.emit(false);
    /// assert!(seen.load(Ordering::SeqCst));
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard { signal: self, id }
    }

    /// Remove one slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Remove every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Suppress (or resume) emission.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emission is suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Call every connected slot with `args`.
    ///
    /// Slots are snapshotted before invocation, so a slot may connect or
    /// disconnect on the same signal without deadlocking.
    #[tracing::instrument(skip_all, target = "horizon_autocomplete_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

/// RAII guard returned by [`Signal::connect_scoped`].
///
/// Borrows the signal, so the connection can never outlive it.
pub struct ConnectionGuard<'a, Args: Clone + Send + 'static> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args: Clone + Send + 'static> ConnectionGuard<'_, Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: Clone + Send + 'static> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}
