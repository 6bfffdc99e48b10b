//! Blur mediation: the one-frame deferred close.
//!
//! A pointer-down on an option also blurs the listbox root. If the blur
//! closed the popover immediately, the option's own click handlers would
//! run against a closed list and the click would be lost. The adapter
//! therefore defers the `Blur` event by one frame through the
//! interpreter's scheduler; the option click lands first and its close
//! sweeps the pending blur away with every other timer.

use std::sync::Arc;
use std::time::Duration;

use vellum_core::TimerId;

use crate::interpreter::Interpreter;
use crate::machine::ListboxEvent;

/// One frame at 60Hz; the blur defer window.
pub const BLUR_DEFER_FRAME: Duration = Duration::from_millis(16);

/// Defers and cancels blur for one listbox instance.
pub struct FocusAdapter {
    interpreter: Arc<Interpreter>,
    /// The pending deferred blur, if any.
    pending_blur: Option<TimerId>,
}

impl FocusAdapter {
    /// Create an adapter feeding the given interpreter.
    pub fn new(interpreter: Arc<Interpreter>) -> Self {
        Self {
            interpreter,
            pending_blur: None,
        }
    }

    /// The listbox root lost focus. Schedules a deferred `Blur`.
    pub fn blur(&mut self) {
        self.cancel_pending();
        self.pending_blur = Some(
            self.interpreter
                .schedule(BLUR_DEFER_FRAME, ListboxEvent::Blur),
        );
    }

    /// Focus returned within the defer window; the blur never happened.
    pub fn focus_regained(&mut self) {
        self.cancel_pending();
    }

    /// Cancel the pending deferred blur (unmount cleanup).
    pub fn cancel_pending(&mut self) {
        if let Some(id) = self.pending_blur.take() {
            let _ = self.interpreter.cancel(id);
        }
    }
}

impl Drop for FocusAdapter {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
