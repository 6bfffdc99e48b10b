//! Vellum Listbox - an accessible single-select listbox for Rust UIs.
//!
//! The crate separates the widget's interaction logic into three layers:
//!
//! - [`machine`]: a pure transition function over explicit states, events,
//!   and a context record. Every interaction rule lives here, and every
//!   rule is testable without a host, a clock, or a pointer device.
//! - [`interpreter`]: drives the machine, applies effects through
//!   [`Signal`](vellum_core::Signal)s, and owns the timer queue that
//!   backs the debounced behaviors.
//! - [`input`]: thin mediators that translate raw keyboard, mouse, and
//!   focus input into machine events.
//!
//! [`Listbox`](listbox::Listbox) wires the layers together for hosts that
//! want a single ready-made widget object.
//!
//! # Example
//!
//! ```
//! use vellum_listbox::prelude::*;
//!
//! let mut listbox = Listbox::new(ListboxConfig::new().with_form_name("fruit"));
//! listbox.register_option("apple", Some("Apple".into())).unwrap();
//! listbox.register_option("banana", Some("Banana".into())).unwrap();
//!
//! // Open with the keyboard, step to the second option, commit.
//! listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
//! listbox.handle_key(Key::ArrowDown, KeyboardModifiers::NONE);
//! listbox.handle_key(Key::Enter, KeyboardModifiers::NONE);
//!
//! assert_eq!(listbox.value(), Some("banana".into()));
//! assert_eq!(listbox.selected_label(), Some("Banana".into()));
//! assert!(!listbox.is_expanded());
//! ```

pub mod input;
pub mod interpreter;
pub mod listbox;
pub mod machine;
pub mod prelude;
pub mod registry;

pub use input::{FocusAdapter, Key, KeyboardAdapter, KeyboardModifiers, MouseAdapter, MouseButton};
pub use interpreter::Interpreter;
pub use listbox::{FormEntry, Listbox, ListboxConfig};
pub use machine::{Effect, ListboxContext, ListboxEvent, ListboxState, PointerOrigin, Transition};
pub use registry::{NodeHandle, OptionEntry, OptionRegistry, OptionValue, RegistryError};
