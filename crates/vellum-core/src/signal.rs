//! Signal/slot system for Vellum.
//!
//! This module provides a type-safe signal/slot mechanism for widget
//! notification. Signals are emitted when a widget's state changes, and
//! connected slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Invocation Model
//!
//! Vellum widgets have a single logical owner: all events are dispatched
//! and fully processed before the next one is handled. Slots are therefore
//! always invoked directly, in connection order, on the emitting thread.
//! The signal itself is `Send + Sync` so it can live inside shared widget
//! cells, but there is no queued/cross-thread delivery.
//!
//! # Example
//!
//! ```
//! use vellum_core::Signal;
//!
//! // Create a signal that passes a string argument
//! let label_changed = Signal::<String>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = label_changed.connect(|label| {
//!     println!("Label changed to: {}", label);
//! });
//!
//! // Emit the signal
//! label_changed.emit("Banana".to_string());
//!
//! // Disconnect when done
//! label_changed.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke (Arc-wrapped so emission can run
    /// outside the connection lock).
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with a
/// reference to the provided argument, in the order they were connected.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments.
///
/// # Related Types
///
/// - [`ConnectionId`] - Returned by [`connect`](Self::connect), used to disconnect
/// - [`ConnectionGuard`] - RAII-style connection that auto-disconnects on drop
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot
    /// later.
    ///
    /// # Example
    ///
    /// ```
    /// use vellum_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let connection = Connection {
            slot: Arc::new(slot),
        };
        self.connections.lock().insert(connection)
    }

    /// Connect a slot and receive an RAII guard that disconnects on drop.
    pub fn connect_guarded<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            signal: self,
            id: Some(self.connect(slot)),
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false`
    /// otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Temporarily block (or unblock) emission.
    ///
    /// While blocked, [`emit`](Self::emit) is a no-op. Returns the previous
    /// blocked state.
    pub fn set_blocked(&self, blocked: bool) -> bool {
        self.blocked.swap(blocked, Ordering::SeqCst)
    }

    /// Check whether emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots with the argument.
    ///
    /// Slots are invoked in connection order, outside the connection lock,
    /// so a slot may connect or disconnect other slots without deadlocking.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            return;
        }

        // Snapshot the slots so emission runs without holding the lock.
        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> = {
            let connections = self.connections.lock();
            connections.values().map(|c| Arc::clone(&c.slot)).collect()
        };

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// RAII guard for a signal connection.
///
/// The connection is disconnected when the guard is dropped. Use
/// [`ConnectionGuard::release`] to keep the connection alive past the
/// guard's lifetime.
pub struct ConnectionGuard<'a, Args> {
    signal: &'a Signal<Args>,
    id: Option<ConnectionId>,
}

impl<'a, Args> ConnectionGuard<'a, Args> {
    /// Get the underlying connection ID.
    pub fn id(&self) -> Option<ConnectionId> {
        self.id
    }

    /// Release the guard without disconnecting, returning the connection ID.
    pub fn release(mut self) -> Option<ConnectionId> {
        self.id.take()
    }
}

impl<'a, Args> Drop for ConnectionGuard<'a, Args> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.signal.disconnect(id);
        }
    }
}

// Signals live inside shared widget cells.
static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
