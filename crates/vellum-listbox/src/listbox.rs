//! The listbox facade: one widget instance, fully wired.
//!
//! [`Listbox`] owns the shared option registry, the interpreter, and the
//! input mediators, and exposes the derived data a renderer needs
//! (selected label, expanded flag, highlighted option) plus the external
//! contracts: the value-change callback, the controlled-mode
//! reconciliation hook, and the hidden form-field mirror.
//!
//! The facade performs no rendering. Hosts feed it raw input through the
//! adapters, pump its timers from their tick, and re-derive presentation
//! from the snapshot after each `transitioned` notification.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use vellum_core::Signal;

use crate::input::{FocusAdapter, Key, KeyboardAdapter, KeyboardModifiers, MouseAdapter};
use crate::interpreter::Interpreter;
use crate::machine::{ListboxContext, ListboxEvent};
use crate::registry::{NodeHandle, OptionRegistry, OptionValue, RegistryError};

/// Per-instance configuration, fixed for the instance's lifetime.
#[derive(Debug, Clone, Default)]
pub struct ListboxConfig {
    /// The initially committed value, if any.
    pub initial_value: Option<OptionValue>,
    /// Whether an external owner controls the committed value. When set,
    /// the machine only proposes commits via the change callback and
    /// waits for the owner to feed the value back.
    pub controlled: bool,
    /// Whether a typeahead match while closed commits as the new value.
    pub select_on_type: bool,
    /// The name under which the committed value mirrors into form
    /// submission.
    pub form_name: Option<String>,
}

impl ListboxConfig {
    /// Create an uncontrolled configuration with no initial value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controlled configuration. Supplying an external value at
    /// creation makes the instance permanently controlled.
    pub fn controlled(value: impl Into<OptionValue>) -> Self {
        Self {
            initial_value: Some(value.into()),
            controlled: true,
            ..Self::default()
        }
    }

    /// Set the initial value using builder pattern.
    pub fn with_initial_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Set select-on-type using builder pattern.
    pub fn with_select_on_type(mut self, select_on_type: bool) -> Self {
        self.select_on_type = select_on_type;
        self
    }

    /// Set the form field name using builder pattern.
    pub fn with_form_name(mut self, name: impl Into<String>) -> Self {
        self.form_name = Some(name.into());
        self
    }
}

/// A name/value pair mirroring the committed value into a standard form
/// submission. A pure projection of the machine's context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    /// The form field name.
    pub name: String,
    /// The committed value.
    pub value: OptionValue,
}

/// An accessible single-select listbox instance.
///
/// # Signals
///
/// - [`value_changed`](Self::value_changed): fired with every committed
///   value (fire-and-forget; no return value is consumed)
/// - `interpreter().transitioned`: one notification per handled event;
///   consumers re-derive presentation from the snapshot
/// - `interpreter().focus_requested`: the host should focus/scroll the
///   given node
pub struct Listbox {
    registry: Arc<Mutex<OptionRegistry>>,
    interpreter: Arc<Interpreter>,
    keyboard: KeyboardAdapter,
    mouse: MouseAdapter,
    focus: FocusAdapter,
    form_name: Option<String>,
}

impl Listbox {
    /// Create a listbox instance from its configuration.
    pub fn new(config: ListboxConfig) -> Self {
        let registry = Arc::new(Mutex::new(OptionRegistry::new()));
        let context = ListboxContext::new(
            config.initial_value,
            config.controlled,
            config.select_on_type,
        );
        let interpreter = Arc::new(Interpreter::new(Arc::clone(&registry), context));

        Self {
            registry: Arc::clone(&registry),
            keyboard: KeyboardAdapter::new(Arc::clone(&interpreter)),
            mouse: MouseAdapter::new(Arc::clone(&interpreter)),
            focus: FocusAdapter::new(Arc::clone(&interpreter)),
            interpreter,
            form_name: config.form_name,
        }
    }

    // =========================================================================
    // Option registration
    // =========================================================================

    /// Register an option as it mounts, in document order.
    ///
    /// Rejects empty values; this is the widget's one loud configuration
    /// error.
    pub fn register_option(
        &self,
        value: impl Into<OptionValue>,
        label: Option<String>,
    ) -> Result<NodeHandle, RegistryError> {
        let node = self.registry.lock().register(value.into(), label)?;
        self.interpreter.dispatch(ListboxEvent::GetDerivedData);
        Ok(node)
    }

    /// Unregister an option as it unmounts.
    ///
    /// A highlight or selection referencing the removed option degrades to
    /// "no highlight" on the derived-data refresh this triggers.
    pub fn unregister_option(&self, node: NodeHandle) -> bool {
        let removed = self.registry.lock().unregister(node);
        if removed {
            self.interpreter.dispatch(ListboxEvent::GetDerivedData);
        }
        removed
    }

    /// Supply an option's display label after mount (lazy derivation from
    /// rendered text).
    pub fn set_option_label(&self, node: NodeHandle, label: impl Into<String>) -> bool {
        self.registry.lock().set_label(node, label)
    }

    /// The number of registered options.
    pub fn option_count(&self) -> usize {
        self.registry.lock().len()
    }

    // =========================================================================
    // Input surfaces
    // =========================================================================

    /// Handle a key press on the widget.
    pub fn handle_key(&mut self, key: Key, modifiers: KeyboardModifiers) {
        self.keyboard.handle_key(key, modifiers);
    }

    /// The mouse mediator.
    pub fn mouse(&mut self) -> &mut MouseAdapter {
        &mut self.mouse
    }

    /// The focus mediator.
    pub fn focus(&mut self) -> &mut FocusAdapter {
        &mut self.focus
    }

    // =========================================================================
    // Derived data
    // =========================================================================

    /// The committed value.
    pub fn value(&self) -> Option<OptionValue> {
        self.interpreter.context().value
    }

    /// The label of the committed value: the registered option's label
    /// when available, otherwise the value text itself (covers an
    /// externally supplied value before its option mounts).
    pub fn selected_label(&self) -> Option<String> {
        let value = self.interpreter.context().value?;
        let registry = self.registry.lock();
        Some(match registry.get(&value) {
            Some(entry) => entry.search_text().to_string(),
            None => value.as_str().to_string(),
        })
    }

    /// The highlighted-but-uncommitted option, if any.
    pub fn highlighted_value(&self) -> Option<OptionValue> {
        self.interpreter.context().navigation_value
    }

    /// Whether the popover is open.
    pub fn is_expanded(&self) -> bool {
        self.interpreter.state().is_open()
    }

    /// The hidden form-field mirror: the committed value under the
    /// configured form name, or `None` when the widget is unnamed or has
    /// no selection.
    pub fn form_entry(&self) -> Option<FormEntry> {
        let name = self.form_name.clone()?;
        let value = self.interpreter.context().value?;
        Some(FormEntry { name, value })
    }

    // =========================================================================
    // External contracts
    // =========================================================================

    /// The value-change callback signal.
    pub fn value_changed(&self) -> &Signal<OptionValue> {
        &self.interpreter.value_committed
    }

    /// The interpreter (state snapshots, `transitioned` and
    /// `focus_requested` signals, timer pump).
    pub fn interpreter(&self) -> &Arc<Interpreter> {
        &self.interpreter
    }

    /// Reconcile a controlled instance against its external owner.
    ///
    /// Hosts call this at the start of every tick, before processing new
    /// input: when the externally supplied value diverges from the
    /// internal one, a `ValueChange` is injected immediately so the
    /// machine never acts on a stale committed value.
    pub fn sync_controlled_value(&self, external: Option<&OptionValue>) {
        let context = self.interpreter.context();
        if !context.is_controlled {
            return;
        }
        if let Some(external) = external {
            if context.value.as_ref() != Some(external) {
                self.interpreter.dispatch(ListboxEvent::ValueChange {
                    value: external.clone(),
                });
            }
        }
    }

    /// Dispatch scheduled events that are due (host tick).
    pub fn pump(&self) {
        self.interpreter.pump_timers();
    }

    /// Dispatch scheduled events due at `now` (tests inject time).
    pub fn pump_at(&self, now: Instant) {
        self.interpreter.pump_timers_at(now);
    }

    /// Tear the instance down: cancel every pending timer so nothing
    /// dispatches into a destroyed widget.
    pub fn unmount(&mut self) {
        self.focus.cancel_pending();
        self.keyboard.typeahead_mut().cancel_pending();
        self.interpreter.cancel_all_timers();
    }
}

impl Drop for Listbox {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for Listbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listbox")
            .field("state", &self.interpreter.state())
            .field("value", &self.interpreter.context().value)
            .field("options", &self.option_count())
            .finish()
    }
}
