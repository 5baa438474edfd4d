//! Normalized input events consumed by the editing engine.
//!
//! Platform backends translate native OS messages into these types before
//! handing them to a field's `handle_event`. The engine never sees raw
//! platform events: pointer coordinates are already widget-local, key events
//! carry decoded UTF-8 text alongside the keysym, and clipboard data arrives
//! asynchronously as a [`PasteEvent`].

use crate::geometry::Point;

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held (Windows key, Cmd on macOS).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Control + Shift modifiers.
    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        control: true,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// Navigation and editing keysyms the editing engine consumes.
///
/// Printable input does not arrive through this enum: it is carried as
/// decoded UTF-8 text on [`KeyEvent::text`]. Letter variants exist only for
/// control chords (Ctrl+C, Ctrl+Z, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    /// Letter key, identified case-insensitively (for chords).
    Char(char),
    /// A keysym the engine does not interpret.
    Unknown,
}

/// A key press delivered to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Decoded UTF-8 text produced by the key, if any.
    pub text: Option<String>,
    /// The keysym, for navigation and chords.
    pub key: Key,
    /// Modifiers held at press time.
    pub modifiers: KeyboardModifiers,
}

impl KeyEvent {
    /// A plain printable-text event.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            key: Key::Unknown,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A bare keysym event with no text.
    pub fn key(key: Key) -> Self {
        Self {
            text: None,
            key,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A keysym event with modifiers.
    pub fn key_with(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self {
            text: None,
            key,
            modifiers,
        }
    }
}

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Button went down.
    Press,
    /// Pointer moved with the button held.
    Drag,
    /// Button was released.
    Release,
}

/// A pointer event in widget-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Where the gesture is, relative to the widget origin.
    pub position: Point,
    /// Press/drag/release.
    pub phase: PointerPhase,
    /// Click count: 1 = single, 2 = double, 3 = triple.
    pub clicks: u32,
    /// Modifiers held during the gesture.
    pub modifiers: KeyboardModifiers,
}

impl PointerEvent {
    /// A single press at `position`.
    pub fn press(position: Point) -> Self {
        Self {
            position,
            phase: PointerPhase::Press,
            clicks: 1,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A drag to `position`.
    pub fn drag(position: Point) -> Self {
        Self {
            position,
            phase: PointerPhase::Drag,
            clicks: 1,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A release at `position`.
    pub fn release(position: Point) -> Self {
        Self {
            position,
            phase: PointerPhase::Release,
            clicks: 1,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// Same event with a different click count.
    pub fn with_clicks(mut self, clicks: u32) -> Self {
        self.clicks = clicks;
        self
    }

    /// Same event with modifiers.
    pub fn with_modifiers(mut self, modifiers: KeyboardModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Which clipboard a transfer targets.
///
/// X11-style platforms distinguish the implicit selection from the explicit
/// cut/copy clipboard; other platforms map both to the same store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardId {
    /// The implicit text-selection clipboard.
    Selection,
    /// The explicit cut/copy/paste clipboard.
    Standard,
}

/// Clipboard data delivered to a field.
///
/// A paste request is asynchronous: the field asks its host for the clipboard
/// contents and the data arrives later as this event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    /// The pasted text.
    pub text: String,
    /// Which clipboard delivered it.
    pub clipboard: ClipboardId,
}

/// The sum of events a field's `handle_event` consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer press/drag/release.
    Pointer(PointerEvent),
    /// Key press.
    Key(KeyEvent),
    /// Clipboard data arriving.
    Paste(PasteEvent),
    /// The field gained keyboard focus.
    FocusIn,
    /// The field lost keyboard focus.
    FocusOut,
}
