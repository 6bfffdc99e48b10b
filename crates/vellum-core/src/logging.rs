//! Logging facilities for Vellum.
//!
//! Vellum uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every log line carries an explicit target from [`targets`] so subsystems
//! can be filtered with standard `tracing` directives, e.g.
//! `RUST_LOG=vellum_listbox::interpreter=trace`.

/// Target names for log filtering.
///
/// Every `tracing` call site in the workspace uses one of these.
pub mod targets {
    /// Timer queue target.
    pub const TIMER: &str = "vellum_core::timer";
    /// Listbox interpreter target (event dispatch and transitions).
    pub const INTERPRETER: &str = "vellum_listbox::interpreter";
    /// Typeahead mediator target.
    pub const TYPEAHEAD: &str = "vellum_listbox::typeahead";
}
