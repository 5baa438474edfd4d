//! Logging facilities for Horizon Quill.
//!
//! Quill uses the `tracing` crate for instrumentation. To see logs, install
//! a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem, e.g.
/// `RUST_LOG=quill::editor=trace`.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "quill_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "quill_core::signal";
    /// Editing operations target.
    pub const EDITOR: &str = "quill::editor";
    /// Display layout target.
    pub const LAYOUT: &str = "quill::layout";
    /// Repaint/damage target.
    pub const PAINT: &str = "quill::paint";
}
