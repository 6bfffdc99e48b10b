//! Interaction mediators: translate raw host input into machine events.
//!
//! Each mediator is independently testable and owns exactly one concern:
//!
//! - [`keyboard`]: key presses, arrow-key index arithmetic, commit keys
//! - [`mouse`]: click sequencing, hover, the mouse-moved latch, pointer
//!   origin tracking
//! - [`typeahead`]: the debounced search buffer and prefix matching
//! - [`focus`]: the one-frame deferred blur

pub mod focus;
pub mod keyboard;
pub mod mouse;
pub mod typeahead;

pub use focus::{FocusAdapter, BLUR_DEFER_FRAME};
pub use keyboard::{Key, KeyboardAdapter, KeyboardModifiers};
pub use mouse::{MouseAdapter, MouseButton};
pub use typeahead::{Typeahead, TYPEAHEAD_IDLE_TIMEOUT};
