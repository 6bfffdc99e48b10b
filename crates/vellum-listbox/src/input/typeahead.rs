//! Typeahead mediation: the debounced search buffer.
//!
//! Characters typed in quick succession accumulate into the machine's
//! query buffer via `KeyDownSearch`. After each keystroke the buffer is
//! matched case-insensitively as a *prefix* against the registry labels;
//! the first match in registry order wins and is announced with
//! `UpdateAfterTypeahead`. A trailing idle timeout clears the buffer
//! through the interpreter's scheduler, and is reset on every keystroke so
//! a stale timer can never fire after the buffer has moved on.

use std::sync::Arc;
use std::time::Duration;

use vellum_core::logging::targets;
use vellum_core::TimerId;

use crate::interpreter::Interpreter;
use crate::machine::ListboxEvent;
use crate::registry::{OptionEntry, OptionRegistry};

/// How long the buffer survives without a fresh keystroke. Matches the
/// native `<select>` convention.
pub const TYPEAHEAD_IDLE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Find the first registry-order option whose label starts with `query`,
/// case-insensitively. Unlabeled entries match on their value text.
pub fn find_match<'a>(query: &str, registry: &'a OptionRegistry) -> Option<&'a OptionEntry> {
    if query.is_empty() {
        return None;
    }
    let query = query.to_lowercase();
    registry
        .options()
        .find(|entry| entry.search_text().to_lowercase().starts_with(&query))
}

/// The typeahead debouncer for one listbox instance.
pub struct Typeahead {
    interpreter: Arc<Interpreter>,
    /// The pending idle-clear timer, if any.
    clear_timer: Option<TimerId>,
}

impl Typeahead {
    /// Create a typeahead mediator feeding the given interpreter.
    pub fn new(interpreter: Arc<Interpreter>) -> Self {
        Self {
            interpreter,
            clear_timer: None,
        }
    }

    /// Feed one typed character into the buffer.
    pub fn keystroke(&mut self, ch: char) {
        // Fresh input resets the idle window. The timer may already have
        // fired or been swept by a close; either way the stale id is
        // ignored.
        if let Some(id) = self.clear_timer.take() {
            let _ = self.interpreter.cancel(id);
        }

        self.interpreter.dispatch(ListboxEvent::KeyDownSearch {
            query: ch.to_string(),
        });

        // Read the buffered query back out of the machine and resolve it
        // against the live registry.
        if let Some(query) = self.interpreter.context().typeahead_query {
            let matched = {
                let registry = self.interpreter.registry().lock();
                find_match(&query, &registry).map(|entry| (entry.value.clone(), entry.node))
            };
            match matched {
                Some((value, node)) => {
                    tracing::trace!(
                        target: targets::TYPEAHEAD,
                        %query,
                        %value,
                        "typeahead match"
                    );
                    self.interpreter
                        .dispatch(ListboxEvent::UpdateAfterTypeahead { value, node });
                }
                None => {
                    tracing::trace!(
                        target: targets::TYPEAHEAD,
                        %query,
                        "no typeahead match"
                    );
                }
            }
        }

        self.clear_timer = Some(
            self.interpreter
                .schedule(TYPEAHEAD_IDLE_TIMEOUT, ListboxEvent::ClearTypeahead),
        );
    }

    /// Cancel the pending idle-clear timer (unmount cleanup).
    pub fn cancel_pending(&mut self) {
        if let Some(id) = self.clear_timer.take() {
            let _ = self.interpreter.cancel(id);
        }
    }
}

impl Drop for Typeahead {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use parking_lot::Mutex;

    use super::*;
    use crate::machine::{ListboxContext, ListboxState};

    fn fruit_registry() -> OptionRegistry {
        let mut registry = OptionRegistry::new();
        registry.register("apple".into(), Some("Apple".into())).unwrap();
        registry.register("apricot".into(), Some("Apricot".into())).unwrap();
        registry.register("banana".into(), Some("Banana".into())).unwrap();
        registry
    }

    #[test]
    fn test_prefix_match_is_deterministic_by_registry_order() {
        let registry = fruit_registry();

        // "ap" prefixes both Apple and Apricot; the first in registry
        // order wins.
        let entry = find_match("ap", &registry).unwrap();
        assert_eq!(entry.value.as_str(), "apple");

        let entry = find_match("apr", &registry).unwrap();
        assert_eq!(entry.value.as_str(), "apricot");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let registry = fruit_registry();
        assert_eq!(find_match("BAN", &registry).unwrap().value.as_str(), "banana");
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let registry = fruit_registry();
        assert!(find_match("", &registry).is_none());
    }

    fn typeahead_fixture() -> (Arc<Interpreter>, Typeahead) {
        let interpreter = Arc::new(Interpreter::new(
            Arc::new(Mutex::new(fruit_registry())),
            ListboxContext::default(),
        ));
        let typeahead = Typeahead::new(Arc::clone(&interpreter));
        (interpreter, typeahead)
    }

    #[test]
    fn test_buffered_keystrokes_refine_the_highlight() {
        let (interpreter, mut typeahead) = typeahead_fixture();
        interpreter.dispatch(ListboxEvent::ButtonPointerDown { right_click: false });

        typeahead.keystroke('a');
        assert_eq!(
            interpreter.context().navigation_value,
            Some("apple".into())
        );

        typeahead.keystroke('p');
        assert_eq!(interpreter.context().typeahead_query.as_deref(), Some("ap"));
        assert_eq!(
            interpreter.context().navigation_value,
            Some("apple".into())
        );

        typeahead.keystroke('r');
        assert_eq!(
            interpreter.context().navigation_value,
            Some("apricot".into())
        );
        assert_eq!(interpreter.state(), ListboxState::Searching);
    }

    #[test]
    fn test_idle_timeout_clears_the_buffer() {
        let (interpreter, mut typeahead) = typeahead_fixture();
        interpreter.dispatch(ListboxEvent::ButtonPointerDown { right_click: false });

        typeahead.keystroke('a');
        assert!(interpreter.context().typeahead_query.is_some());

        interpreter.pump_timers_at(Instant::now() + TYPEAHEAD_IDLE_TIMEOUT + Duration::from_millis(5));
        assert_eq!(interpreter.context().typeahead_query, None);
        assert_eq!(interpreter.state(), ListboxState::Navigating);
    }

    #[test]
    fn test_keystroke_resets_the_idle_window() {
        let (interpreter, mut typeahead) = typeahead_fixture();
        interpreter.dispatch(ListboxEvent::ButtonPointerDown { right_click: false });

        typeahead.keystroke('a');
        // A second keystroke cancels the first clear timer; only one
        // pending clear remains.
        typeahead.keystroke('p');
        assert_eq!(interpreter.pending_timer_count(), 1);
    }

    #[test]
    fn test_no_match_leaves_highlight_alone() {
        let (interpreter, mut typeahead) = typeahead_fixture();
        interpreter.dispatch(ListboxEvent::ButtonPointerDown { right_click: false });
        let before = interpreter.context().navigation_value;

        typeahead.keystroke('z');
        assert_eq!(interpreter.context().navigation_value, before);
        assert_eq!(interpreter.context().typeahead_query.as_deref(), Some("z"));
    }
}
