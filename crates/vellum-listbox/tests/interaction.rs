//! End-to-end interaction tests for the assembled listbox widget.
//!
//! These drive the [`Listbox`] facade the way a host would: raw input
//! through the adapters, time through the pump, and observation through
//! the signals and derived data.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use vellum_listbox::input::{BLUR_DEFER_FRAME, TYPEAHEAD_IDLE_TIMEOUT};
use vellum_listbox::prelude::*;

fn fruit_listbox(config: ListboxConfig) -> Listbox {
    let listbox = Listbox::new(config);
    listbox
        .register_option("apple", Some("Apple".into()))
        .unwrap();
    listbox
        .register_option("apricot", Some("Apricot".into()))
        .unwrap();
    listbox
        .register_option("banana", Some("Banana".into()))
        .unwrap();
    listbox
}

#[test]
fn test_mouse_click_sequence_commits_and_notifies() {
    let mut listbox = fruit_listbox(ListboxConfig::new());
    let committed: Arc<Mutex<Vec<OptionValue>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let committed = Arc::clone(&committed);
        listbox.value_changed().connect(move |value: &OptionValue| {
            committed.lock().push(value.clone());
        });
    }

    listbox.mouse().button_pointer_down(MouseButton::Left);
    listbox.mouse().button_pointer_up(MouseButton::Left);
    assert!(listbox.is_expanded());

    listbox.mouse().pointer_moved();
    listbox.mouse().option_pointer_down(MouseButton::Left);
    listbox
        .mouse()
        .option_pointer_up("banana".into(), MouseButton::Left);

    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), Some("banana".into()));
    assert_eq!(listbox.selected_label(), Some("Banana".into()));
    assert_eq!(*committed.lock(), vec![OptionValue::new("banana")]);
}

#[test]
fn test_keyboard_round_trip_with_wrap() {
    let mut listbox = fruit_listbox(ListboxConfig::new());

    // Open on the first press, then wrap backwards past the top.
    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    assert!(listbox.is_expanded());
    assert_eq!(listbox.highlighted_value(), Some("apple".into()));

    listbox.handle_key(Key::ArrowUp, KeyboardModifiers::NONE);
    assert_eq!(listbox.highlighted_value(), Some("banana".into()));

    listbox.handle_key(Key::Enter, KeyboardModifiers::NONE);
    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), Some("banana".into()));
}

#[test]
fn test_escape_discards_and_reopen_restores_committed_highlight() {
    let mut listbox = fruit_listbox(ListboxConfig::new().with_initial_value("apricot"));

    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    assert_eq!(listbox.highlighted_value(), Some("apricot".into()));

    // Wander, then bail out.
    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    assert_eq!(listbox.highlighted_value(), Some("banana".into()));
    listbox.handle_key(Key::Escape, KeyboardModifiers::NONE);
    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), Some("apricot".into()));

    // Reopening starts from the committed value again, not the abandoned
    // highlight.
    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    assert_eq!(listbox.highlighted_value(), Some("apricot".into()));
}

#[test]
fn test_tab_leaves_without_committing() {
    let mut listbox = fruit_listbox(ListboxConfig::new());

    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    listbox.handle_key(Key::Tab, KeyboardModifiers::NONE);

    // Tab is never trapped: the popover closes and the abandoned
    // highlight is discarded.
    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), None);

    // Shift+Tab behaves the same way in the other direction.
    listbox.handle_key(Key::ArrowUp, KeyboardModifiers::NONE);
    listbox.handle_key(Key::Tab, KeyboardModifiers::SHIFT);
    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), None);
}

#[test]
fn test_typeahead_buffer_refines_then_expires() {
    let mut listbox = fruit_listbox(ListboxConfig::new());
    let start = Instant::now();

    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    listbox.handle_key(Key::Char('a'), KeyboardModifiers::NONE);
    listbox.handle_key(Key::Char('p'), KeyboardModifiers::NONE);
    assert_eq!(listbox.highlighted_value(), Some("apple".into()));

    listbox.handle_key(Key::Char('r'), KeyboardModifiers::NONE);
    assert_eq!(listbox.highlighted_value(), Some("apricot".into()));

    // After the idle window the buffer is gone; the next character starts
    // a fresh query.
    listbox.pump_at(start + TYPEAHEAD_IDLE_TIMEOUT + Duration::from_millis(5));
    listbox.handle_key(Key::Char('b'), KeyboardModifiers::NONE);
    assert_eq!(listbox.highlighted_value(), Some("banana".into()));
}

#[test]
fn test_select_on_type_commits_while_closed() {
    let mut listbox = fruit_listbox(ListboxConfig::new().with_select_on_type(true));

    listbox.handle_key(Key::Char('b'), KeyboardModifiers::NONE);

    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), Some("banana".into()));
}

#[test]
fn test_closed_typeahead_without_select_on_type_is_inert() {
    let mut listbox = fruit_listbox(ListboxConfig::new());

    listbox.handle_key(Key::Char('b'), KeyboardModifiers::NONE);

    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), None);
}

#[test]
fn test_option_click_beats_the_deferred_blur() {
    let mut listbox = fruit_listbox(ListboxConfig::new());
    let start = Instant::now();

    listbox.mouse().button_pointer_down(MouseButton::Left);
    listbox.mouse().button_pointer_up(MouseButton::Left);

    // Pressing the option steals focus from the root; the blur arrives
    // first but is deferred, so the click completes the selection.
    listbox.focus().blur();
    listbox.mouse().pointer_moved();
    listbox.mouse().option_pointer_down(MouseButton::Left);
    listbox
        .mouse()
        .option_pointer_up("apple".into(), MouseButton::Left);

    assert_eq!(listbox.value(), Some("apple".into()));

    // Nothing left to fire: the commit's close swept the pending blur.
    listbox.pump_at(start + BLUR_DEFER_FRAME + Duration::from_millis(1));
    assert!(!listbox.is_expanded());
    assert_eq!(listbox.interpreter().pending_timer_count(), 0);
}

#[test]
fn test_unmediated_blur_closes_without_committing() {
    let mut listbox = fruit_listbox(ListboxConfig::new());
    let start = Instant::now();

    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    listbox.focus().blur();
    listbox.pump_at(start + BLUR_DEFER_FRAME + Duration::from_millis(1));

    assert!(!listbox.is_expanded());
    assert_eq!(listbox.value(), None);
}

#[test]
fn test_controlled_commit_waits_for_the_owner() {
    let mut listbox = fruit_listbox(ListboxConfig::controlled("apple"));
    let committed: Arc<Mutex<Vec<OptionValue>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let committed = Arc::clone(&committed);
        listbox.value_changed().connect(move |value: &OptionValue| {
            committed.lock().push(value.clone());
        });
    }

    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    listbox.handle_key(Key::Enter, KeyboardModifiers::NONE);

    // The commit was proposed but not applied.
    assert_eq!(*committed.lock(), vec![OptionValue::new("apricot")]);
    assert_eq!(listbox.value(), Some("apple".into()));

    // The owner accepts and feeds the value back on its next tick.
    let external = committed.lock().last().cloned();
    listbox.sync_controlled_value(external.as_ref());
    assert_eq!(listbox.value(), Some("apricot".into()));
}

#[test]
fn test_one_transition_notification_per_handled_event() {
    let mut listbox = fruit_listbox(ListboxConfig::new());
    let notifications = Arc::new(AtomicUsize::new(0));
    {
        let notifications = Arc::clone(&notifications);
        listbox.interpreter().transitioned.connect(move |_| {
            notifications.fetch_add(1, Ordering::SeqCst);
        });
    }

    // Right-click is rejected by the machine: no notification.
    listbox.mouse().button_pointer_down(MouseButton::Right);
    assert_eq!(notifications.load(Ordering::SeqCst), 0);

    // A left press carries an origin update plus the press itself.
    listbox.mouse().button_pointer_down(MouseButton::Left);
    assert_eq!(notifications.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unmount_cancels_every_pending_timer() {
    let mut listbox = fruit_listbox(ListboxConfig::new());

    listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
    listbox.handle_key(Key::Char('a'), KeyboardModifiers::NONE);
    listbox.focus().blur();
    assert!(listbox.interpreter().pending_timer_count() > 0);

    listbox.unmount();
    assert_eq!(listbox.interpreter().pending_timer_count(), 0);
}
