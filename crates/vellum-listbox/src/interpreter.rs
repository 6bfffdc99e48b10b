//! Runtime wrapper around the pure state machine.
//!
//! The [`Interpreter`] owns the single `(state, context)` cell for a
//! listbox instance. [`dispatch`](Interpreter::dispatch) feeds an event
//! through [`machine::transition`](crate::machine::transition) and, when a
//! transition is defined, applies it in a fixed order: commit the new
//! context, commit the new state, then run the effects. Subscribers are
//! notified exactly once per dispatch, after everything else, no matter
//! how many effects ran.
//!
//! Events with no defined transition are deliberately silent no-ops: a
//! hover while closed or a stray finish-click is routine, not an error.
//!
//! # Reentrancy
//!
//! Dispatch is not reentrant. Effect and subscriber slots must never
//! dispatch synchronously; anything they need to trigger goes through
//! [`schedule`](Interpreter::schedule), which delivers the event on a
//! later pump. The two timer-driven processes the widget needs (typeahead
//! idle clear, one-frame blur defer) ride this scheduler, so the machine
//! itself stays synchronous and clock-free.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use std::sync::Arc;
use vellum_core::logging::targets;
use vellum_core::{Signal, TimerId, TimerQueue};

use crate::machine::{self, Effect, ListboxContext, ListboxEvent, ListboxState};
use crate::registry::{NodeHandle, OptionRegistry, OptionValue};

/// The owned `(state, context)` pair.
#[derive(Debug)]
struct MachineCell {
    state: ListboxState,
    context: ListboxContext,
}

/// Runtime for one listbox instance.
///
/// # Signals
///
/// - `transitioned(())`: one batch notification per handled dispatch
/// - `value_committed(OptionValue)`: the value-change callback; fired on
///   every commit (click completion, Enter/Space, select-on-type,
///   controlled `ValueChange`)
/// - `focus_requested(NodeHandle)`: the host should focus/scroll this node
pub struct Interpreter {
    registry: Arc<Mutex<OptionRegistry>>,
    cell: Mutex<MachineCell>,
    timers: Mutex<TimerQueue<ListboxEvent>>,

    /// Signal emitted once per handled dispatch, after effects.
    pub transitioned: Signal<()>,
    /// Signal emitted with the newly committed value.
    pub value_committed: Signal<OptionValue>,
    /// Signal emitted when a node should receive focus/scroll.
    pub focus_requested: Signal<NodeHandle>,
}

impl Interpreter {
    /// Create an interpreter in the `Idle` state with the given initial
    /// context, reading options from the shared registry.
    pub fn new(registry: Arc<Mutex<OptionRegistry>>, context: ListboxContext) -> Self {
        Self {
            registry,
            cell: Mutex::new(MachineCell {
                state: ListboxState::Idle,
                context,
            }),
            timers: Mutex::new(TimerQueue::new()),
            transitioned: Signal::new(),
            value_committed: Signal::new(),
            focus_requested: Signal::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> ListboxState {
        self.cell.lock().state
    }

    /// A snapshot of the current context.
    pub fn context(&self) -> ListboxContext {
        self.cell.lock().context.clone()
    }

    /// The shared option registry this instance reads.
    pub fn registry(&self) -> &Arc<Mutex<OptionRegistry>> {
        &self.registry
    }

    /// Dispatch an event into the machine.
    ///
    /// Returns `true` if a transition was applied, `false` if the event
    /// had no transition defined for the current state (a silent no-op).
    pub fn dispatch(&self, event: ListboxEvent) -> bool {
        let transition = {
            let registry = self.registry.lock();
            let cell = self.cell.lock();
            machine::transition(cell.state, &cell.context, &event, &registry)
        };

        let Some(transition) = transition else {
            tracing::trace!(
                target: targets::INTERPRETER,
                ?event,
                state = ?self.state(),
                "event ignored"
            );
            return false;
        };

        let closed_now;
        {
            let mut cell = self.cell.lock();
            tracing::debug!(
                target: targets::INTERPRETER,
                ?event,
                from = ?cell.state,
                to = ?transition.state,
                "transition"
            );
            closed_now = cell.state.is_open() && !transition.state.is_open();
            // Context first, then state.
            cell.context = transition.context;
            cell.state = transition.state;
        }

        // Closing invalidates every pending timer: a typeahead clear or a
        // deferred blur must not fire into the next open session.
        if closed_now {
            self.cancel_all_timers();
        }

        for effect in transition.effects {
            match effect {
                Effect::EmitChange(value) => self.value_committed.emit(value),
                Effect::Focus(node) => self.focus_requested.emit(node),
            }
        }

        self.transitioned.emit(());
        true
    }

    // =========================================================================
    // Scheduler capability
    // =========================================================================

    /// Schedule an event for dispatch after `delay`.
    pub fn schedule(&self, delay: Duration, event: ListboxEvent) -> TimerId {
        self.timers.lock().schedule(delay, event)
    }

    /// Schedule an event for dispatch at an explicit instant (tests).
    pub fn schedule_at(&self, fire_at: Instant, event: ListboxEvent) -> TimerId {
        self.timers.lock().schedule_at(fire_at, event)
    }

    /// Cancel a scheduled event.
    pub fn cancel(&self, id: TimerId) -> vellum_core::Result<()> {
        self.timers.lock().cancel(id)
    }

    /// Cancel every scheduled event. Called on close and unmount.
    pub fn cancel_all_timers(&self) {
        self.timers.lock().clear();
    }

    /// The number of scheduled events still pending.
    pub fn pending_timer_count(&self) -> usize {
        self.timers.lock().active_count()
    }

    /// Dispatch every scheduled event that is due now.
    ///
    /// The embedding framework calls this from its tick.
    pub fn pump_timers(&self) {
        self.pump_timers_at(Instant::now());
    }

    /// Dispatch every scheduled event due at `now` (tests inject time).
    pub fn pump_timers_at(&self, now: Instant) {
        // Drain first so a dispatch that cancels timers cannot deadlock
        // or observe a half-pumped queue.
        let due = self.timers.lock().drain_expired_at(now);
        for (_, event) in due {
            self.dispatch(event);
        }
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell = self.cell.lock();
        f.debug_struct("Interpreter")
            .field("state", &cell.state)
            .field("context", &cell.context)
            .finish()
    }
}
