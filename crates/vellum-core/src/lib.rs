//! Core services for Vellum widgets.
//!
//! This crate provides the foundational components that Vellum widget
//! crates build on:
//!
//! - **Signal/Slot System**: Type-safe notification between widgets and
//!   their consumers
//! - **Timer Queue**: Cancellable one-shot timers carrying payloads,
//!   pumped by the embedding framework
//! - **Error Types**: Shared error taxonomy and `Result` alias
//! - **Logging**: `tracing` targets for filtering
//!
//! # Signal/Slot Example
//!
//! ```
//! use vellum_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use vellum_core::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//!
//! // Schedule a payload for later delivery
//! let id = timers.schedule(Duration::from_millis(300), "clear-buffer");
//!
//! // ...and cancel it if fresh input arrives first
//! timers.cancel(id).unwrap();
//! ```

mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use error::{CoreError, Result, SignalError, TimerError};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{TimerId, TimerQueue};
