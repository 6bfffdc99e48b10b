//! Mouse mediation: click sequencing, hover, and the movement latch.
//!
//! Raw pointer events are ambiguous on their own: a popover can open under
//! a stationary cursor and immediately receive a synthetic hover, and a
//! press on one surface can release on another. The adapter resolves both
//! by feeding the machine two low-level signals alongside the click
//! events: `MouseMoved` (latched per open) and `PointerOriginSet` (which
//! surface the press started on). The machine owns the resulting flags,
//! so every disambiguation decision stays inside the transition table.

use std::sync::Arc;

use crate::interpreter::Interpreter;
use crate::machine::{ListboxEvent, PointerOrigin};
use crate::registry::{NodeHandle, OptionValue};

/// Mouse buttons the listbox distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left,
    /// Secondary button (usually right). Never opens, commits, or closes.
    Right,
    /// Middle button (scroll wheel click). Treated like the secondary
    /// button: ignored by every interactive surface.
    Middle,
}

impl MouseButton {
    /// Whether this press should be ignored by interactive surfaces.
    fn is_secondary(self) -> bool {
        !matches!(self, Self::Left)
    }
}

/// Translates raw pointer events into machine events for one listbox
/// instance.
pub struct MouseAdapter {
    interpreter: Arc<Interpreter>,
}

impl MouseAdapter {
    /// Create an adapter feeding the given interpreter.
    pub fn new(interpreter: Arc<Interpreter>) -> Self {
        Self { interpreter }
    }

    /// Pointer-down on the listbox button.
    pub fn button_pointer_down(&mut self, button: MouseButton) {
        let right_click = button.is_secondary();
        if !right_click {
            // Track the origin before the press event so the paired
            // pointer-up can be attributed even if a blur closes the
            // popover in between.
            self.interpreter.dispatch(ListboxEvent::PointerOriginSet {
                origin: Some(PointerOrigin::Button),
            });
        }
        self.interpreter
            .dispatch(ListboxEvent::ButtonPointerDown { right_click });
    }

    /// Pointer-up on the listbox button.
    pub fn button_pointer_up(&mut self, button: MouseButton) {
        self.interpreter.dispatch(ListboxEvent::ButtonFinishClick {
            right_click: button.is_secondary(),
        });
    }

    /// Pointer-down on an option.
    pub fn option_pointer_down(&mut self, button: MouseButton) {
        let right_click = button.is_secondary();
        if !right_click {
            self.interpreter.dispatch(ListboxEvent::PointerOriginSet {
                origin: Some(PointerOrigin::OptionList),
            });
        }
        self.interpreter
            .dispatch(ListboxEvent::OptionStartClick { right_click });
    }

    /// Pointer-up on an option.
    pub fn option_pointer_up(&mut self, value: OptionValue, button: MouseButton) {
        self.interpreter.dispatch(ListboxEvent::OptionFinishClick {
            value,
            right_click: button.is_secondary(),
        });
    }

    /// Pointer-up anywhere outside the widget's surfaces: the press, if
    /// any, did not complete as a click.
    pub fn pointer_up_outside(&mut self, button: MouseButton) {
        if !button.is_secondary() {
            self.interpreter
                .dispatch(ListboxEvent::PointerOriginSet { origin: None });
        }
    }

    /// The pointer entered or moved within an option.
    pub fn option_hover(&mut self, value: OptionValue, node: NodeHandle) {
        self.interpreter
            .dispatch(ListboxEvent::Navigate { value, node });
    }

    /// The pointer left the option list.
    pub fn option_leave(&mut self) {
        self.interpreter.dispatch(ListboxEvent::ClearNavSelection);
    }

    /// The pointer moved while the popover is open.
    pub fn pointer_moved(&mut self) {
        self.interpreter.dispatch(ListboxEvent::MouseMoved);
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::machine::{ListboxContext, ListboxState};
    use crate::registry::OptionRegistry;

    fn adapter_fixture() -> (Arc<Interpreter>, MouseAdapter) {
        let mut registry = OptionRegistry::new();
        registry.register("apple".into(), Some("Apple".into())).unwrap();
        registry.register("banana".into(), Some("Banana".into())).unwrap();
        let interpreter = Arc::new(Interpreter::new(
            Arc::new(Mutex::new(registry)),
            ListboxContext::default(),
        ));
        let adapter = MouseAdapter::new(Arc::clone(&interpreter));
        (interpreter, adapter)
    }

    #[test]
    fn test_full_click_selects_an_option() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.button_pointer_down(MouseButton::Left);
        adapter.button_pointer_up(MouseButton::Left);
        assert_eq!(interpreter.state(), ListboxState::Navigating);

        adapter.pointer_moved();
        adapter.option_pointer_down(MouseButton::Left);
        adapter.option_pointer_up("banana".into(), MouseButton::Left);

        assert_eq!(interpreter.state(), ListboxState::Idle);
        assert_eq!(interpreter.context().value, Some("banana".into()));
    }

    #[test]
    fn test_drag_from_button_to_option_commits() {
        let (interpreter, mut adapter) = adapter_fixture();

        // Press on the button, drag onto an option, release there.
        adapter.button_pointer_down(MouseButton::Left);
        adapter.pointer_moved();
        let node = interpreter
            .registry()
            .lock()
            .get(&"banana".into())
            .unwrap()
            .node;
        adapter.option_hover("banana".into(), node);
        adapter.option_pointer_up("banana".into(), MouseButton::Left);

        assert_eq!(interpreter.state(), ListboxState::Idle);
        assert_eq!(interpreter.context().value, Some("banana".into()));
    }

    #[test]
    fn test_right_click_never_opens() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.button_pointer_down(MouseButton::Right);
        assert_eq!(interpreter.state(), ListboxState::Idle);
        assert_eq!(interpreter.context().pointer_origin, None);
    }

    #[test]
    fn test_hover_without_movement_is_suppressed() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.button_pointer_down(MouseButton::Left);
        adapter.button_pointer_up(MouseButton::Left);
        let highlight_before = interpreter.context().navigation_value;

        // The popover opened under a stationary cursor and the host fired
        // a synthetic hover. No movement recorded: the highlight holds.
        let node = interpreter
            .registry()
            .lock()
            .get(&"banana".into())
            .unwrap()
            .node;
        adapter.option_hover("banana".into(), node);
        assert_eq!(interpreter.context().navigation_value, highlight_before);

        adapter.pointer_moved();
        adapter.option_hover("banana".into(), node);
        assert_eq!(
            interpreter.context().navigation_value,
            Some("banana".into())
        );
    }

    #[test]
    fn test_mouse_leave_clears_highlight_but_stays_open() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.button_pointer_down(MouseButton::Left);
        adapter.option_leave();

        assert!(interpreter.state().is_open());
        assert_eq!(interpreter.context().navigation_value, None);
    }

    #[test]
    fn test_release_outside_aborts_the_click() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.button_pointer_down(MouseButton::Left);
        adapter.pointer_up_outside(MouseButton::Left);
        adapter.pointer_moved();
        adapter.option_pointer_up("banana".into(), MouseButton::Left);

        // The press was abandoned, so the release on the option is not a
        // click: stay open, nothing committed.
        assert!(interpreter.state().is_open());
        assert_eq!(interpreter.context().value, None);
    }
}
