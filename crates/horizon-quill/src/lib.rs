//! Text-input editing engine for Horizon toolkits.
//!
//! Quill is the common core behind editable text fields: storage with
//! copy-on-first-edit semantics, a coalescing single-level undo log,
//! byte-offset cursor/selection tracking that never splits a UTF-8
//! sequence, display expansion (control-character escapes, tab stops,
//! password masking, greedy word wrap), and a minimal-damage repaint
//! protocol.
//!
//! The central type is [`TextInput`]. Hosts hand it normalized input
//! events and supply fonts, paint, and clipboard through the traits in
//! [`traits`]; everything else — editing, selection, undo, and deciding
//! which pixels changed — lives here.
//!
//! # Example
//!
//! ```
//! use horizon_quill::TextInput;
//!
//! let mut field = TextInput::single_line();
//! field.set_text("hello");
//! field.replace(0, 0, "say ");
//! assert_eq!(field.text(), "say hello");
//!
//! field.undo();
//! assert_eq!(field.text(), "hello");
//! ```

mod buffer;
mod damage;
mod editor;
mod kind;
pub mod layout;
mod selection;
pub mod traits;
mod undo;
pub mod validator;

pub use buffer::TextBuffer;
pub use damage::Damage;
pub use editor::{NotifyPolicy, TextInput};
pub use kind::InputKind;
pub use layout::{ExpandedLine, LineLayout, MAX_EXPAND, SECRET_GLYPH};
pub use selection::Selection;
pub use traits::{Clipboard, FontId, FontMetrics, PaintSurface};
pub use undo::{FieldId, SharedUndoLog, UndoLog};
pub use validator::{FloatValidator, IntValidator, ValidationState, Validator};

// Host-facing event and geometry types come from the core crate.
pub use horizon_quill_core::{
    ClipboardError, ClipboardId, ClipboardResult, Color, InputEvent, Key, KeyEvent,
    KeyboardModifiers, PasteEvent, Point, PointerEvent, PointerPhase, Rect, Signal, Size,
};
