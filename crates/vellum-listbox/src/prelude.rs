//! Prelude module for Vellum Listbox.
//!
//! Re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use vellum_listbox::prelude::*;
//! ```

// ============================================================================
// Widget Facade
// ============================================================================

pub use crate::listbox::{FormEntry, Listbox, ListboxConfig};

// ============================================================================
// State Machine
// ============================================================================

pub use crate::machine::{
    Effect, ListboxContext, ListboxEvent, ListboxState, PointerOrigin, Transition,
};

// ============================================================================
// Interpreter
// ============================================================================

pub use crate::interpreter::Interpreter;

// ============================================================================
// Option Registry
// ============================================================================

pub use crate::registry::{NodeHandle, OptionEntry, OptionRegistry, OptionValue, RegistryError};

// ============================================================================
// Input Mediation
// ============================================================================

pub use crate::input::{
    FocusAdapter, Key, KeyboardAdapter, KeyboardModifiers, MouseAdapter, MouseButton, Typeahead,
};

// ============================================================================
// Core Re-exports
// ============================================================================

pub use vellum_core::{ConnectionGuard, ConnectionId, Signal, TimerId, TimerQueue};
