//! Seams to the host toolkit.
//!
//! The engine does not rasterize text, own a window, or talk to the OS
//! clipboard. Hosts supply those services through the traits here; the
//! engine calls them and nothing else. All three are object-safe so hosts
//! can hand in `&mut dyn` at event- and paint-time without committing to a
//! concrete type in the field itself.

use horizon_quill_core::{ClipboardId, ClipboardResult, Color, Rect};

/// Identifies a face in the host's font store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontId(pub u32);

/// Text measurement supplied by the host.
///
/// Measurements must be deterministic for a fixed `(font, size)` pair within
/// one redraw cycle; the engine re-measures freely and caches nothing.
pub trait FontMetrics {
    /// Select the face and size subsequent queries measure with.
    fn set_font(&mut self, font: FontId, size: f32);

    /// Width in pixels of `text` in the current font.
    fn text_width(&self, text: &str) -> f32;

    /// Height in pixels of one text line in the current font.
    fn line_height(&self) -> f32;

    /// Distance from the baseline to the bottom of the line box.
    fn descent(&self) -> f32;
}

/// A clipped paint target supplied by the host at paint time.
///
/// The engine never draws outside a surface it was handed; every paint pass
/// is bracketed by `push_clip`/`pop_clip` pairs.
pub trait PaintSurface {
    /// Push a clip rectangle. Nested clips intersect.
    fn push_clip(&mut self, rect: Rect);

    /// Pop the most recent clip rectangle.
    fn pop_clip(&mut self);

    /// Set the color used by subsequent fill and text calls.
    fn set_color(&mut self, color: Color);

    /// Fill a rectangle with the current color.
    fn fill_rect(&mut self, rect: Rect);

    /// Draw a glyph run with its left edge at `x` and baseline at `baseline`.
    fn draw_text(&mut self, text: &str, x: f32, baseline: f32);
}

/// Outbound clipboard access supplied by the host.
///
/// Only storing is synchronous; paste is asynchronous by design — the host
/// requests clipboard contents from the OS and later delivers them to the
/// field as an [`InputEvent::Paste`](horizon_quill_core::InputEvent).
pub trait Clipboard {
    /// Store `text` on the given clipboard.
    fn store(&mut self, text: &str, clipboard: ClipboardId) -> ClipboardResult<()>;
}
