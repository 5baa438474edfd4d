//! Core types for Horizon Quill.
//!
//! This crate provides the foundational pieces shared by the editing engine
//! and its hosts:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Input Events**: The normalized pointer/key/paste/focus event model
//! - **Geometry**: Points, sizes, rectangles, and colors
//! - **Errors**: Boundary errors for host-provided services
//!
//! # Signal Example
//!
//! ```
//! use horizon_quill_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

mod error;
mod event;
mod geometry;
pub mod logging;
pub mod signal;

pub use error::{ClipboardError, ClipboardResult};
pub use event::{
    ClipboardId, InputEvent, Key, KeyEvent, KeyboardModifiers, PasteEvent, PointerEvent,
    PointerPhase,
};
pub use geometry::{Color, Point, Rect, Size};
pub use signal::{ConnectionId, Signal};
