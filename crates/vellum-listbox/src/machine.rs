//! The listbox interaction state machine.
//!
//! This module is pure: given the current state, context, an incoming
//! event, and the live option registry, [`transition`] computes the next
//! state, the next context, and a list of side-effect directives. It
//! performs no I/O, touches no clocks, and never panics; malformed events
//! (a value that is no longer registered, a right click, an event with no
//! transition defined for the current state) degrade to `None`, which the
//! interpreter treats as a silent no-op.
//!
//! Two auxiliary signals that classically live outside a statechart — "has
//! the mouse moved since the popover opened" and "which surface received
//! the pointer-down" — are modeled here as explicit context fields driven
//! by the [`ListboxEvent::MouseMoved`] and [`ListboxEvent::PointerOriginSet`]
//! events, so the machine stays the single source of truth and every
//! disambiguation rule is deterministically testable.

use crate::registry::{NodeHandle, OptionRegistry, OptionValue};

/// The interaction states of a listbox.
///
/// The machine is persistent: there is no terminal state, and every open
/// state can return to [`Idle`](Self::Idle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListboxState {
    /// Closed, nothing highlighted.
    Idle,
    /// Open; highlight follows keyboard or mouse, but hover only moves it
    /// once the mouse has actually moved since open.
    Navigating,
    /// Open; highlight strictly key-driven. Hover never steals it until
    /// the mouse moves again. Guards against hosts that fire a synthetic
    /// hover when a popover opens under a stationary cursor.
    NavigatingWithKeys,
    /// Open; a pointer-down started on an option and the machine is
    /// waiting to see whether it completes as a click.
    Interacting,
    /// Open; actively consuming a typeahead buffer. An overlay of
    /// [`Navigating`](Self::Navigating).
    Searching,
}

impl ListboxState {
    /// Whether the popover is open in this state.
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// The surface that received the most recent pointer-down.
///
/// A pointer-up only completes a click when a tracked surface started it;
/// this is what keeps a "blur closed the list" click from immediately
/// reopening it, and what disqualifies a down-on-one-element,
/// up-on-another sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOrigin {
    /// The listbox button.
    Button,
    /// The option list.
    OptionList,
}

/// Machine-owned context, mutable only via transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListboxContext {
    /// The committed selection.
    pub value: Option<OptionValue>,
    /// The highlighted-but-not-committed option.
    pub navigation_value: Option<OptionValue>,
    /// Handle used to focus/scroll the highlighted option.
    pub navigation_node: Option<NodeHandle>,
    /// Buffered typeahead characters.
    pub typeahead_query: Option<String>,
    /// Whether an external owner controls `value`. Fixed at creation. When
    /// set, commits only propose via the change callback; `value` itself
    /// moves only on an explicit [`ListboxEvent::ValueChange`].
    pub is_controlled: bool,
    /// Whether a typeahead match while closed commits as the new value.
    /// Policy flag fixed at creation, not a state.
    pub select_on_type: bool,
    /// Latched true on the first mouse movement after open; reset on every
    /// close. Gates whether hover may move the highlight.
    pub mouse_moved: bool,
    /// The surface that received the current pointer-down, if any.
    pub pointer_origin: Option<PointerOrigin>,
}

impl ListboxContext {
    /// Create the initial context for a listbox instance.
    pub fn new(initial_value: Option<OptionValue>, is_controlled: bool, select_on_type: bool) -> Self {
        Self {
            value: initial_value,
            navigation_value: None,
            navigation_node: None,
            typeahead_query: None,
            is_controlled,
            select_on_type,
            mouse_moved: false,
            pointer_origin: None,
        }
    }
}

impl Default for ListboxContext {
    fn default() -> Self {
        Self::new(None, false, false)
    }
}

/// Events dispatched into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListboxEvent {
    /// Pointer-down on the button.
    ButtonPointerDown {
        /// True for a secondary-button press; ignored by every state.
        right_click: bool,
    },
    /// Pointer-up completing a click that started on the button.
    ButtonFinishClick {
        /// True for a secondary-button release; ignored by every state.
        right_click: bool,
    },
    /// Pointer-down on an option.
    OptionStartClick {
        /// True for a secondary-button press; ignored by every state.
        right_click: bool,
    },
    /// Pointer-up on an option.
    OptionFinishClick {
        /// The clicked option's value.
        value: OptionValue,
        /// True for a secondary-button release; never commits.
        right_click: bool,
    },
    /// The listbox lost focus (already deferred by the focus mediator).
    Blur,
    /// The mouse left the option list.
    ClearNavSelection,
    /// Mouse hover over an option.
    Navigate {
        /// The hovered option's value.
        value: OptionValue,
        /// The hovered option's node.
        node: NodeHandle,
    },
    /// Keyboard-driven highlight change (arrows, Home, End).
    KeyDownNavigate {
        /// The target option's value.
        value: OptionValue,
        /// The target option's node.
        node: NodeHandle,
    },
    /// Characters appended to the typeahead buffer.
    KeyDownSearch {
        /// The newly typed text.
        query: String,
    },
    /// Enter pressed.
    KeyDownEnter {
        /// Reserved per-option disable flag; blocks the commit when set.
        disabled: bool,
    },
    /// Space pressed.
    KeyDownSpace {
        /// Reserved per-option disable flag; blocks the commit when set.
        disabled: bool,
    },
    /// Escape pressed.
    KeyDownEscape,
    /// Tab pressed. Closes without trapping focus.
    KeyDownTab,
    /// Shift+Tab pressed. Closes without trapping focus.
    KeyDownShiftTab,
    /// A typeahead match was found for the buffered query.
    UpdateAfterTypeahead {
        /// The matched option's value.
        value: OptionValue,
        /// The matched option's node.
        node: NodeHandle,
    },
    /// The typeahead idle timeout elapsed.
    ClearTypeahead,
    /// A committed value arrives (hidden-field change or controlled
    /// propagation). Legal from every state.
    ValueChange {
        /// The new committed value.
        value: OptionValue,
    },
    /// Revalidate context fields against the live registry. Not a user
    /// event; dispatched when the registry changes under the machine.
    GetDerivedData,
    /// The mouse moved since the popover opened.
    MouseMoved,
    /// A pointer-down/up surface was tracked or cleared.
    PointerOriginSet {
        /// The new origin, or `None` to clear it.
        origin: Option<PointerOrigin>,
    },
}

/// Side-effect directives returned by a transition.
///
/// The machine never touches host handles itself; it only records which
/// handle should receive focus/scroll and which value to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Invoke the value-change callback with the committed value.
    EmitChange(OptionValue),
    /// Focus/scroll the given node into view.
    Focus(NodeHandle),
}

/// The result of a handled event.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The next state.
    pub state: ListboxState,
    /// The next context.
    pub context: ListboxContext,
    /// Effects to apply, in order, after state and context are committed.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: ListboxState, context: ListboxContext) -> Self {
        Self {
            state,
            context,
            effects: Vec::new(),
        }
    }

    fn with_effects(state: ListboxState, context: ListboxContext, effects: Vec<Effect>) -> Self {
        Self {
            state,
            context,
            effects,
        }
    }
}

/// Clear everything that must not survive a close: highlight, typeahead
/// buffer, and the mouse-moved latch. The committed value is preserved.
fn closed_context(ctx: &ListboxContext) -> ListboxContext {
    ListboxContext {
        navigation_value: None,
        navigation_node: None,
        typeahead_query: None,
        mouse_moved: false,
        ..ctx.clone()
    }
}

/// The entry the highlight lands on when the popover opens: the committed
/// value when it is still registered, otherwise the first option.
fn open_target(ctx: &ListboxContext, registry: &OptionRegistry) -> Option<(OptionValue, NodeHandle)> {
    ctx.value
        .as_ref()
        .and_then(|v| registry.get(v))
        .or_else(|| registry.first())
        .map(|entry| (entry.value.clone(), entry.node))
}

/// Open (or reopen) into a fresh context with the highlight on the open
/// target. Resets the mouse-moved latch so a stationary cursor cannot
/// steal the highlight right after open.
fn opened_context(ctx: &ListboxContext, registry: &OptionRegistry) -> (ListboxContext, Vec<Effect>) {
    let mut next = closed_context(ctx);
    let mut effects = Vec::new();
    if let Some((value, node)) = open_target(ctx, registry) {
        next.navigation_value = Some(value);
        next.navigation_node = Some(node);
        effects.push(Effect::Focus(node));
    }
    (next, effects)
}

/// Commit a value: close, update `value` unless an external owner holds
/// it, and announce the commit through the change callback either way.
fn committed(ctx: &ListboxContext, value: OptionValue) -> (ListboxContext, Vec<Effect>) {
    let mut next = closed_context(ctx);
    if !next.is_controlled {
        next.value = Some(value.clone());
    }
    (next, vec![Effect::EmitChange(value)])
}

/// Compute the transition for `(state, event)` against the live registry.
///
/// Returns `None` when no transition is defined; the interpreter treats
/// that as a deliberate, silent no-op. Unhandled events in non-relevant
/// states (a hover while closed, a stray finish-click) are common and must
/// not warn or throw.
pub fn transition(
    state: ListboxState,
    ctx: &ListboxContext,
    event: &ListboxEvent,
    registry: &OptionRegistry,
) -> Option<Transition> {
    use ListboxEvent as E;
    use ListboxState as S;

    match event {
        // --------------------------------------------------------------
        // Events legal from every state
        // --------------------------------------------------------------
        E::ValueChange { value } => {
            let mut next = ctx.clone();
            next.value = Some(value.clone());
            Some(Transition::with_effects(
                state,
                next,
                vec![Effect::EmitChange(value.clone())],
            ))
        }

        E::GetDerivedData => {
            let mut next = ctx.clone();
            let stale = next
                .navigation_value
                .as_ref()
                .is_some_and(|v| !registry.contains(v));
            if stale {
                next.navigation_value = None;
                next.navigation_node = None;
            }
            Some(Transition::new(state, next))
        }

        E::PointerOriginSet { origin } => {
            let mut next = ctx.clone();
            next.pointer_origin = *origin;
            Some(Transition::new(state, next))
        }

        // --------------------------------------------------------------
        // Button click sequencing
        // --------------------------------------------------------------
        E::ButtonPointerDown { right_click } => {
            if *right_click {
                return None;
            }
            // Opening (and reopening) always lands in Navigating with the
            // highlight reset to the committed value or the first option,
            // regardless of any prior highlight.
            let (next, effects) = opened_context(ctx, registry);
            Some(Transition::with_effects(S::Navigating, next, effects))
        }

        E::ButtonFinishClick { right_click } => {
            if *right_click {
                return None;
            }
            match state {
                // A blur already closed the popover mid-click; the same
                // physical click's pointer-up must not reopen it. Consume
                // the tracked origin and stay closed.
                S::Idle => {
                    if ctx.pointer_origin == Some(PointerOrigin::Button) {
                        let mut next = ctx.clone();
                        next.pointer_origin = None;
                        Some(Transition::new(S::Idle, next))
                    } else {
                        None
                    }
                }
                // Pressed an option, released on the button: not a click.
                S::Interacting => {
                    let mut next = ctx.clone();
                    next.pointer_origin = None;
                    Some(Transition::new(S::Navigating, next))
                }
                // The opening click's pointer-up completes; stay open.
                S::Navigating | S::NavigatingWithKeys | S::Searching => {
                    let mut next = ctx.clone();
                    next.pointer_origin = None;
                    Some(Transition::new(state, next))
                }
            }
        }

        // --------------------------------------------------------------
        // Option click sequencing
        // --------------------------------------------------------------
        E::OptionStartClick { right_click } => {
            if *right_click || !state.is_open() {
                return None;
            }
            Some(Transition::new(S::Interacting, ctx.clone()))
        }

        E::OptionFinishClick { value, right_click } => {
            if *right_click || !state.is_open() {
                return None;
            }
            // Only a pointer-up whose pointer-down started on a tracked
            // surface counts as a click.
            if ctx.pointer_origin.is_some() && registry.contains(value) {
                let (mut next, effects) = committed(ctx, value.clone());
                next.pointer_origin = None;
                Some(Transition::with_effects(S::Idle, next, effects))
            } else {
                let mut next = ctx.clone();
                next.pointer_origin = None;
                Some(Transition::new(S::Navigating, next))
            }
        }

        // --------------------------------------------------------------
        // Closing events
        // --------------------------------------------------------------
        E::Blur | E::KeyDownEscape | E::KeyDownTab | E::KeyDownShiftTab => {
            if !state.is_open() {
                return None;
            }
            Some(Transition::new(S::Idle, closed_context(ctx)))
        }

        // --------------------------------------------------------------
        // Highlight movement
        // --------------------------------------------------------------
        E::ClearNavSelection => {
            if !state.is_open() {
                return None;
            }
            let mut next = ctx.clone();
            next.navigation_value = None;
            next.navigation_node = None;
            Some(Transition::new(state, next))
        }

        E::Navigate { value, node } => {
            // Hover only moves the highlight once the mouse has really
            // moved since open, and never while keys own the highlight.
            let hover_allowed = matches!(state, S::Navigating | S::Interacting);
            if !hover_allowed || !ctx.mouse_moved || !registry.contains(value) {
                return None;
            }
            let mut next = ctx.clone();
            next.navigation_value = Some(value.clone());
            next.navigation_node = Some(*node);
            Some(Transition::new(state, next))
        }

        E::KeyDownNavigate { value, node } => {
            if !registry.contains(value) {
                return None;
            }
            let mut next = if state.is_open() {
                ctx.clone()
            } else {
                // Keyboard open path, symmetric with the button.
                closed_context(ctx)
            };
            next.navigation_value = Some(value.clone());
            next.navigation_node = Some(*node);
            Some(Transition::with_effects(
                S::NavigatingWithKeys,
                next,
                vec![Effect::Focus(*node)],
            ))
        }

        E::MouseMoved => {
            if !state.is_open() {
                return None;
            }
            let mut next = ctx.clone();
            next.mouse_moved = true;
            let next_state = if state == S::NavigatingWithKeys {
                // Real movement hands the highlight back to the mouse.
                S::Navigating
            } else {
                state
            };
            Some(Transition::new(next_state, next))
        }

        // --------------------------------------------------------------
        // Commit keys
        // --------------------------------------------------------------
        E::KeyDownEnter { disabled } => {
            if *disabled || !state.is_open() {
                return None;
            }
            match ctx.navigation_value.clone() {
                Some(value) => {
                    let (next, effects) = committed(ctx, value);
                    Some(Transition::with_effects(S::Idle, next, effects))
                }
                None => Some(Transition::new(S::Idle, closed_context(ctx))),
            }
        }

        E::KeyDownSpace { disabled } => {
            if *disabled {
                return None;
            }
            if state.is_open() {
                match ctx.navigation_value.clone() {
                    Some(value) => {
                        let (next, effects) = committed(ctx, value);
                        Some(Transition::with_effects(S::Idle, next, effects))
                    }
                    None => Some(Transition::new(S::Idle, closed_context(ctx))),
                }
            } else {
                // Space on the closed button opens, keyboard-style.
                let (next, effects) = opened_context(ctx, registry);
                Some(Transition::with_effects(S::NavigatingWithKeys, next, effects))
            }
        }

        // --------------------------------------------------------------
        // Typeahead
        // --------------------------------------------------------------
        E::KeyDownSearch { query } => {
            let mut next = ctx.clone();
            let mut buffer = next.typeahead_query.take().unwrap_or_default();
            buffer.push_str(query);
            next.typeahead_query = Some(buffer);
            let next_state = if state.is_open() { S::Searching } else { S::Idle };
            Some(Transition::new(next_state, next))
        }

        E::UpdateAfterTypeahead { value, node } => {
            if !registry.contains(value) {
                return None;
            }
            if state.is_open() {
                let mut next = ctx.clone();
                next.navigation_value = Some(value.clone());
                next.navigation_node = Some(*node);
                Some(Transition::with_effects(
                    state,
                    next,
                    vec![Effect::Focus(*node)],
                ))
            } else if ctx.select_on_type {
                // Closed-button typeahead commits directly; the query is
                // consumed by the selection decision.
                let mut next = ctx.clone();
                if !next.is_controlled {
                    next.value = Some(value.clone());
                }
                next.typeahead_query = None;
                Some(Transition::with_effects(
                    S::Idle,
                    next,
                    vec![Effect::EmitChange(value.clone())],
                ))
            } else {
                None
            }
        }

        E::ClearTypeahead => {
            if ctx.typeahead_query.is_none() && state != S::Searching {
                return None;
            }
            let mut next = ctx.clone();
            next.typeahead_query = None;
            let next_state = if state == S::Searching {
                S::Navigating
            } else {
                state
            };
            Some(Transition::new(next_state, next))
        }
    }
}
