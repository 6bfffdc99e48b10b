//! Keyboard mediation for the listbox.
//!
//! Translates key presses into machine events. Arrow keys do modular index
//! arithmetic over the *current* registry length, so options mounting or
//! unmounting between keystrokes never produce an out-of-range highlight.

use std::sync::Arc;

use crate::interpreter::Interpreter;
use crate::machine::ListboxEvent;
use crate::registry::{NodeHandle, OptionValue};

use super::typeahead::Typeahead;

/// The keys the listbox consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Move the highlight down / open the popover.
    ArrowDown,
    /// Move the highlight up / open the popover.
    ArrowUp,
    /// Jump to the first option.
    Home,
    /// Jump to the last option.
    End,
    /// Commit the highlight.
    Enter,
    /// Commit the highlight, or open when closed.
    Space,
    /// Close without committing.
    Escape,
    /// Leave the widget; never trapped.
    Tab,
    /// A printable character (typeahead).
    Char(char),
}

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held (Windows key, Cmd on macOS).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Navigation direction for arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Prev,
}

/// Modular arrow-key arithmetic.
///
/// `ArrowDown` from the last index wraps to 0; `ArrowUp` from 0 wraps to
/// the last. With nothing highlighted the first press lands on the first
/// index going down and the last going up (deliberately asymmetric: it
/// matches the "select first/last on first keypress" expectation).
///
/// `len` must be non-zero.
fn step_index(current: Option<usize>, len: usize, direction: Direction) -> usize {
    debug_assert!(len > 0);
    match direction {
        Direction::Next => match current {
            None => 0,
            Some(i) => (i + 1) % len,
        },
        Direction::Prev => match current {
            None => len - 1,
            Some(i) => (i + len - 1) % len,
        },
    }
}

/// Translates key presses into machine events for one listbox instance.
pub struct KeyboardAdapter {
    interpreter: Arc<Interpreter>,
    typeahead: Typeahead,
}

impl KeyboardAdapter {
    /// Create an adapter feeding the given interpreter.
    pub fn new(interpreter: Arc<Interpreter>) -> Self {
        let typeahead = Typeahead::new(Arc::clone(&interpreter));
        Self {
            interpreter,
            typeahead,
        }
    }

    /// The typeahead mediator (for unmount cleanup).
    pub fn typeahead_mut(&mut self) -> &mut Typeahead {
        &mut self.typeahead
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: Key, modifiers: KeyboardModifiers) {
        match key {
            Key::ArrowDown => self.navigate_step(Direction::Next),
            Key::ArrowUp => self.navigate_step(Direction::Prev),
            // Home and End both jump and dispatch; the pair is symmetric.
            Key::Home => self.navigate_to_edge(Direction::Next),
            Key::End => self.navigate_to_edge(Direction::Prev),
            Key::Enter => {
                self.interpreter
                    .dispatch(ListboxEvent::KeyDownEnter { disabled: false });
            }
            Key::Space => {
                // Mid-search, space belongs to the buffer ("new york").
                if self.interpreter.context().typeahead_query.is_some() {
                    self.typeahead.keystroke(' ');
                } else {
                    self.interpreter
                        .dispatch(ListboxEvent::KeyDownSpace { disabled: false });
                }
            }
            Key::Escape => {
                self.interpreter.dispatch(ListboxEvent::KeyDownEscape);
            }
            Key::Tab => {
                let event = if modifiers.shift {
                    ListboxEvent::KeyDownShiftTab
                } else {
                    ListboxEvent::KeyDownTab
                };
                self.interpreter.dispatch(event);
            }
            Key::Char(ch) => {
                if !modifiers.control && !modifiers.meta && !ch.is_control() {
                    self.typeahead.keystroke(ch);
                }
            }
        }
    }

    /// Arrow-key movement: step from the current highlight, or pick the
    /// open target when the popover is closed.
    fn navigate_step(&mut self, direction: Direction) {
        let context = self.interpreter.context();
        let open = self.interpreter.state().is_open();

        let target = {
            let registry = self.interpreter.registry().lock();
            if registry.is_empty() {
                return;
            }
            let index = if open {
                let current = context
                    .navigation_value
                    .as_ref()
                    .and_then(|v| registry.index_of(v));
                step_index(current, registry.len(), direction)
            } else {
                // Opening via keyboard starts from the committed value
                // when it is still registered.
                context
                    .value
                    .as_ref()
                    .and_then(|v| registry.index_of(v))
                    .unwrap_or_else(|| step_index(None, registry.len(), direction))
            };
            registry.get_at(index).map(entry_target)
        };

        if let Some((value, node)) = target {
            self.interpreter
                .dispatch(ListboxEvent::KeyDownNavigate { value, node });
        }
    }

    /// Home/End: jump to the first/last index unconditionally.
    fn navigate_to_edge(&mut self, direction: Direction) {
        let target = {
            let registry = self.interpreter.registry().lock();
            let entry = match direction {
                Direction::Next => registry.first(),
                Direction::Prev => registry.last(),
            };
            entry.map(entry_target)
        };

        if let Some((value, node)) = target {
            self.interpreter
                .dispatch(ListboxEvent::KeyDownNavigate { value, node });
        }
    }
}

fn entry_target(entry: &crate::registry::OptionEntry) -> (OptionValue, NodeHandle) {
    (entry.value.clone(), entry.node)
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::machine::{ListboxContext, ListboxState};
    use crate::registry::OptionRegistry;

    #[test]
    fn test_step_index_wraps_both_ways() {
        assert_eq!(step_index(Some(2), 3, Direction::Next), 0);
        assert_eq!(step_index(Some(0), 3, Direction::Prev), 2);
        assert_eq!(step_index(Some(1), 3, Direction::Next), 2);
        assert_eq!(step_index(Some(1), 3, Direction::Prev), 0);
    }

    #[test]
    fn test_step_index_first_press_is_asymmetric() {
        // Nothing highlighted: Down lands on the first index, Up on the last.
        assert_eq!(step_index(None, 5, Direction::Next), 0);
        assert_eq!(step_index(None, 5, Direction::Prev), 4);
    }

    fn adapter_fixture() -> (Arc<Interpreter>, KeyboardAdapter) {
        let mut registry = OptionRegistry::new();
        registry.register("apple".into(), Some("Apple".into())).unwrap();
        registry.register("apricot".into(), Some("Apricot".into())).unwrap();
        registry.register("banana".into(), Some("Banana".into())).unwrap();
        let interpreter = Arc::new(Interpreter::new(
            Arc::new(Mutex::new(registry)),
            ListboxContext::default(),
        ));
        let adapter = KeyboardAdapter::new(Arc::clone(&interpreter));
        (interpreter, adapter)
    }

    #[test]
    fn test_arrow_down_opens_and_highlights_first() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);

        assert_eq!(interpreter.state(), ListboxState::NavigatingWithKeys);
        assert_eq!(
            interpreter.context().navigation_value,
            Some("apple".into())
        );
    }

    #[test]
    fn test_arrow_down_wraps_from_last_to_first() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.handle_key(Key::End, KeyboardModifiers::NONE);
        assert_eq!(
            interpreter.context().navigation_value,
            Some("banana".into())
        );

        adapter.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
        assert_eq!(
            interpreter.context().navigation_value,
            Some("apple".into())
        );
    }

    #[test]
    fn test_arrow_up_wraps_from_first_to_last() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.handle_key(Key::Home, KeyboardModifiers::NONE);
        adapter.handle_key(Key::ArrowUp, KeyboardModifiers::NONE);

        assert_eq!(
            interpreter.context().navigation_value,
            Some("banana".into())
        );
    }

    #[test]
    fn test_home_and_end_jump_and_dispatch() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.handle_key(Key::End, KeyboardModifiers::NONE);
        assert_eq!(
            interpreter.context().navigation_value,
            Some("banana".into())
        );

        adapter.handle_key(Key::Home, KeyboardModifiers::NONE);
        assert_eq!(
            interpreter.context().navigation_value,
            Some("apple".into())
        );
    }

    #[test]
    fn test_enter_commits_highlight() {
        let (interpreter, mut adapter) = adapter_fixture();

        adapter.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
        adapter.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
        adapter.handle_key(Key::Enter, KeyboardModifiers::NONE);

        assert_eq!(interpreter.state(), ListboxState::Idle);
        assert_eq!(interpreter.context().value, Some("apricot".into()));
    }

    #[test]
    fn test_arrow_keys_ignore_empty_registry() {
        let interpreter = Arc::new(Interpreter::new(
            Arc::new(Mutex::new(OptionRegistry::new())),
            ListboxContext::default(),
        ));
        let mut adapter = KeyboardAdapter::new(Arc::clone(&interpreter));

        adapter.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
        assert_eq!(interpreter.state(), ListboxState::Idle);
    }

    #[test]
    fn test_modified_characters_do_not_search() {
        let (interpreter, mut adapter) = adapter_fixture();

        let ctrl = KeyboardModifiers {
            control: true,
            ..KeyboardModifiers::NONE
        };
        adapter.handle_key(Key::Char('a'), ctrl);

        assert_eq!(interpreter.context().typeahead_query, None);
    }
}
