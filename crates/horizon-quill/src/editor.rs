//! The text-input field engine.
//!
//! [`TextInput`] binds the storage, undo, selection, layout, and damage
//! pieces into one editable field. Every mutation funnels through
//! [`replace`](TextInput::replace): it snaps offsets to character
//! boundaries, records the undo delta, moves the caret, and notes the
//! earliest display offset that changed so the next paint touches as little
//! of the screen as possible.
//!
//! The engine is deliberately host-agnostic: fonts, paint, and the OS
//! clipboard come in through the traits in [`crate::traits`], and input
//! arrives as normalized events. Hosts own focus routing and event
//! translation; the field owns everything between "key arrived" and "these
//! pixels changed".
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
//! assert_eq!(field.position(), 4);
//!
//! field.undo();
//! assert_eq!(field.text(), "hello");
//! ```

use unicode_segmentation::UnicodeSegmentation;

use horizon_quill_core::{
    ClipboardId, Color, InputEvent, Key, KeyEvent, PasteEvent, PointerEvent, PointerPhase, Rect,
    Signal,
};

use crate::buffer::TextBuffer;
use crate::damage::Damage;
use crate::kind::InputKind;
use crate::layout::LineLayout;
use crate::selection::{self, Selection};
use crate::traits::{Clipboard, FontId, FontMetrics, PaintSurface};
use crate::undo::{FieldId, SharedUndoLog, UndoLog};
use crate::validator::{FloatValidator, IntValidator, ValidationState, Validator};

/// When the `text_changed` signal fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Fire on every change, as it happens.
    #[default]
    OnChange,
    /// Fire `editing_finished` when focus leaves a changed field; stay
    /// silent during editing.
    OnRelease,
    /// Never fire.
    Never,
}

/// Horizontal padding between the field edge and the first glyph.
const TEXT_INSET: f32 = 1.0;

/// Pixels kept visible past the caret before the view scrolls.
fn scroll_threshold(line_height: f32) -> f32 {
    line_height / 2.0
}

/// An editable text field.
///
/// One engine drives every field flavor; construct with the kind-specific
/// constructors ([`single_line`](Self::single_line),
/// [`multiline`](Self::multiline), [`secret`](Self::secret),
/// [`integer`](Self::integer), [`float`](Self::float),
/// [`file_path`](Self::file_path)).
///
/// # Signals
///
/// - `text_changed`: the content changed (subject to the notify policy)
/// - `editing_finished`: focus left a modified field, or Enter was pressed
///   in a single-line field
/// - `input_rejected`: a paste failed validation or targeted a read-only
///   field; hosts typically beep or flash
pub struct TextInput {
    id: FieldId,
    kind: InputKind,
    buffer: TextBuffer,
    selection: Selection,
    damage: Damage,
    undo: SharedUndoLog,

    read_only: bool,
    focused: bool,
    changed: bool,
    notify: NotifyPolicy,

    font: FontId,
    font_size: f32,
    bounds: Rect,
    scroll_x: f32,
    scroll_y: f32,
    /// Pixel column vertical navigation aims for, captured when the gesture
    /// starts and held across repeated up/down presses.
    sticky_column: f32,
    was_up_down: bool,

    text_color: Color,
    background: Color,
    selection_color: Color,
    cursor_color: Color,

    /// Emitted when the content changes.
    pub text_changed: Signal<String>,
    /// Emitted when editing concludes on a modified field.
    pub editing_finished: Signal<()>,
    /// Emitted when input is rejected (validation failure, read-only paste).
    pub input_rejected: Signal<()>,
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new(InputKind::Normal)
    }
}

impl TextInput {
    /// Create a field of the given kind with its own undo log.
    pub fn new(kind: InputKind) -> Self {
        Self {
            id: FieldId::next(),
            kind,
            buffer: TextBuffer::new(),
            selection: Selection::default(),
            damage: Damage::Full,
            undo: UndoLog::shared(),
            read_only: false,
            focused: false,
            changed: false,
            notify: NotifyPolicy::default(),
            font: FontId::default(),
            font_size: 14.0,
            bounds: Rect::default(),
            scroll_x: 0.0,
            scroll_y: 0.0,
            sticky_column: 0.0,
            was_up_down: false,
            text_color: Color::BLACK,
            background: Color::WHITE,
            selection_color: Color::from_rgba8(0x33, 0x66, 0xCC, 0xFF),
            cursor_color: Color::BLACK,
            text_changed: Signal::new(),
            editing_finished: Signal::new(),
            input_rejected: Signal::new(),
        }
    }

    /// A plain single-line field.
    pub fn single_line() -> Self {
        Self::new(InputKind::Normal)
    }

    /// A multi-line field, optionally word-wrapped to the field width.
    pub fn multiline(wrap: bool) -> Self {
        Self::new(InputKind::Multiline { wrap })
    }

    /// A password field; content displays masked and never leaves via the
    /// clipboard.
    pub fn secret() -> Self {
        Self::new(InputKind::Secret)
    }

    /// An integer field; pastes must parse as signed decimal or `0x` hex.
    pub fn integer() -> Self {
        Self::new(InputKind::Integer)
    }

    /// A float field; pastes must parse as a decimal number.
    pub fn float() -> Self {
        Self::new(InputKind::Float)
    }

    /// A file-path field; edits like a plain field, tagged for host chrome.
    pub fn file_path() -> Self {
        Self::new(InputKind::FilePath)
    }

    /// Share an undo log between the fields of one editing context.
    ///
    /// A shared log remembers only the most recently edited field, so
    /// switching fields forgets the previous field's undo step.
    pub fn with_undo_log(mut self, undo: SharedUndoLog) -> Self {
        self.undo = undo;
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The field kind.
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Whether the field rejects edits.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Set read-only mode.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Set read-only using builder pattern.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// The notify policy for `text_changed`.
    pub fn notify_policy(&self) -> NotifyPolicy {
        self.notify
    }

    /// Set when `text_changed` fires.
    pub fn set_notify_policy(&mut self, policy: NotifyPolicy) {
        self.notify = policy;
    }

    /// Maximum content size in bytes.
    pub fn max_size(&self) -> usize {
        self.buffer.max_size()
    }

    /// Cap the content size; insertions that would exceed it are truncated.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.buffer.set_max_size(max_size);
    }

    /// Set max size using builder pattern.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.buffer.set_max_size(max_size);
        self
    }

    /// The font used for measuring and painting.
    pub fn set_font(&mut self, font: FontId, size: f32) {
        self.font = font;
        self.font_size = size;
        self.damage.mark_all();
    }

    /// The rectangle the text is laid out and painted in.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Move/resize the field. Resizing resets the scroll so the layout
    /// re-derives with the caret visible.
    pub fn set_bounds(&mut self, bounds: Rect) {
        if bounds.width() != self.bounds.width() {
            self.scroll_x = 0.0;
        }
        if bounds.height() != self.bounds.height() {
            self.scroll_y = 0.0;
        }
        self.bounds = bounds;
        self.damage.mark_all();
    }

    /// Set bounds using builder pattern.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the text color.
    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
        self.damage.mark_all();
    }

    /// Set the background color.
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
        self.damage.mark_all();
    }

    /// Set the selection highlight color.
    pub fn set_selection_color(&mut self, color: Color) {
        self.selection_color = color;
        self.damage.mark_all();
    }

    /// Set the caret color.
    pub fn set_cursor_color(&mut self, color: Color) {
        self.cursor_color = color;
        self.damage.mark_all();
    }

    // =========================================================================
    // Text Access
    // =========================================================================

    /// The current text.
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the field is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace the content with a copy of `text`.
    ///
    /// Clears the undo record for this field, moves the caret to the end
    /// (start when read-only), and damages from the first byte that
    /// actually differs. Returns `false` when nothing changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        if !self.prepare_assign(text) {
            return false;
        }
        self.buffer.assign(text);
        self.finish_assign();
        true
    }

    /// Rebind the content to caller-owned constant text without copying.
    ///
    /// The text is only copied into field-owned storage when it is first
    /// edited. Otherwise behaves like [`set_text`](Self::set_text).
    pub fn static_text(&mut self, text: &'static str) -> bool {
        if !self.prepare_assign(text) {
            return false;
        }
        self.buffer.bind_static(text);
        self.finish_assign();
        true
    }

    fn prepare_assign(&mut self, text: &str) -> bool {
        self.changed = false;
        self.undo.borrow_mut().forget(self.id);
        if self.buffer.as_str() == text {
            return false;
        }
        if self.scroll_x != 0.0 || self.scroll_y != 0.0 {
            self.scroll_x = 0.0;
            self.scroll_y = 0.0;
            self.damage.mark_from(0);
        } else {
            // Only the tail from the first differing byte needs repainting.
            let old = self.buffer.as_str().as_bytes();
            let new = text.as_bytes();
            let mut i = 0;
            while i < old.len() && i < new.len() && old[i] == new[i] {
                i += 1;
            }
            self.damage.mark_from(i);
        }
        true
    }

    fn finish_assign(&mut self) {
        let end = if self.read_only { 0 } else { self.buffer.len() };
        self.set_position(end, end);
    }

    // =========================================================================
    // Cursor and Selection
    // =========================================================================

    /// The caret byte offset.
    pub fn position(&self) -> usize {
        self.selection.position()
    }

    /// The selection-anchor byte offset. Equal to `position` when nothing
    /// is selected.
    pub fn mark(&self) -> usize {
        self.selection.mark()
    }

    /// Whether a nonempty span is selected.
    pub fn has_selection(&self) -> bool {
        self.selection.has_selection()
    }

    /// The selected text (empty without a selection).
    pub fn selected_text(&self) -> &str {
        let (b, e) = self.selection.range();
        &self.buffer.as_str()[b..e]
    }

    /// Move the caret and selection anchor.
    ///
    /// Offsets are clamped to the text and snapped to character boundaries;
    /// returns `false` when nothing moved. The minimal repaint region is
    /// recorded as part of the move.
    pub fn set_position(&mut self, position: usize, mark: usize) -> bool {
        self.was_up_down = false;
        self.selection.set(
            self.buffer.as_str(),
            position,
            mark,
            &mut self.damage,
            self.focused,
        )
    }

    /// Select the entire content, caret at the end.
    pub fn select_all(&mut self) -> bool {
        self.set_position(self.buffer.len(), 0)
    }

    // =========================================================================
    // Repaint State
    // =========================================================================

    /// The pending repaint work.
    ///
    /// Hosts poll this after feeding events to decide whether to schedule a
    /// frame; [`paint`](Self::paint) consumes it.
    pub fn pending_damage(&self) -> Damage {
        self.damage
    }

    /// Whether the next paint has anything to do.
    pub fn needs_repaint(&self) -> bool {
        !self.damage.is_clean()
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Delete `[b, e)` and insert `text` at `b`.
    ///
    /// This is the single edit primitive; every other mutation routes here.
    /// `b` and `e` may arrive in either order and out of range — they are
    /// clamped to the text and snapped outward so a multi-byte character is
    /// never split. The caret and mark land just after the insertion. If
    /// the edit would exceed [`max_size`](Self::max_size), the insertion is
    /// truncated to fit. Returns `false` for a no-op.
    pub fn replace(&mut self, b: usize, e: usize, text: &str) -> bool {
        self.was_up_down = false;
        let size = self.buffer.len();
        let mut b = b.min(size);
        let mut e = e.min(size);
        if e < b {
            std::mem::swap(&mut b, &mut e);
        }
        {
            // Snap outward so the deleted range covers whole characters.
            let s = self.buffer.as_str();
            while b > 0 && !s.is_char_boundary(b) {
                b -= 1;
            }
            while e < size && !s.is_char_boundary(e) {
                e += 1;
            }
        }
        if e <= b && text.is_empty() {
            return false;
        }

        // Truncate the insertion so the result never exceeds the cap, and
        // never ends mid-character.
        let mut insert = text;
        if size + insert.len() - (e - b) > self.buffer.max_size() {
            let mut ilen = (self.buffer.max_size() + (e - b)).saturating_sub(size);
            ilen = ilen.min(insert.len());
            while ilen > 0 && !insert.is_char_boundary(ilen) {
                ilen -= 1;
            }
            insert = &insert[..ilen];
            if e <= b && insert.is_empty() {
                return false;
            }
        }

        let secret = self.kind.is_secret();
        if e > b {
            let removed = self.buffer.remove_range(b..e);
            self.undo
                .borrow_mut()
                .record_delete(self.id, b, e, &removed, secret);
        }
        if !insert.is_empty() {
            self.buffer.insert_at(b, insert);
            self.undo.borrow_mut().record_insert(self.id, b, insert.len());
        }

        let old_position = self.selection.position();
        let old_mark = self.selection.mark();
        self.selection.collapse_to(b + insert.len());

        // Insertions into the word at the end of a wrapped line can rewrap
        // from the preceding whitespace; pasted spaces can rewrap the whole
        // paragraph.
        let mut damage_from = b;
        if self.kind.wraps() {
            let bytes = self.buffer.as_str().as_bytes();
            if insert.bytes().any(|c| c == b' ') {
                while damage_from > 0
                    && bytes.get(damage_from).copied().unwrap_or(0) != b'\n'
                {
                    damage_from -= 1;
                }
            } else {
                while damage_from > 0
                    && !bytes
                        .get(damage_from)
                        .copied()
                        .unwrap_or(0)
                        .is_ascii_whitespace()
                {
                    damage_from -= 1;
                }
            }
        }
        damage_from = damage_from.min(old_mark).min(old_position);
        self.damage.mark_from(damage_from);

        tracing::trace!(
            target: "quill::editor",
            b,
            e,
            inserted = insert.len(),
            "replace"
        );
        self.note_changed();
        true
    }

    /// Insert `text` at the caret, replacing any selection.
    pub fn insert_text(&mut self, text: &str) -> bool {
        self.replace(self.selection.position(), self.selection.mark(), text)
    }

    /// Delete `[b, e)`.
    pub fn cut_range(&mut self, b: usize, e: usize) -> bool {
        self.replace(b, e, "")
    }

    /// Delete the selected span.
    pub fn cut_selection(&mut self) -> bool {
        let (b, e) = self.selection.range();
        self.replace(b, e, "")
    }

    /// Undo the most recent coalesced edit.
    ///
    /// The record is inverted in place, so calling this twice redoes the
    /// edit. Returns `false` when the shared log belongs to another field
    /// or holds nothing.
    pub fn undo(&mut self) -> bool {
        self.was_up_down = false;
        let mut log = self.undo.borrow_mut();
        if log.owner() != Some(self.id) || log.is_empty() {
            return false;
        }

        let reinsert_len = log.cut_text().len();
        let remove_len = log.inserted_len();
        let mut b = log.position() - remove_len;
        let line_lookback_from = b;

        if reinsert_len > 0 {
            self.buffer.insert_at(b, log.cut_text());
            b += reinsert_len;
        }
        let removed = if remove_len > 0 {
            self.buffer.remove_range(b..b + remove_len)
        } else {
            String::new()
        };
        log.exchange(removed, b);
        drop(log);

        self.selection.collapse_to(b);

        let mut damage_from = line_lookback_from;
        if self.kind.wraps() {
            let bytes = self.buffer.as_str().as_bytes();
            while damage_from > 0 && bytes.get(damage_from).copied().unwrap_or(0) != b'\n' {
                damage_from -= 1;
            }
        }
        self.damage.mark_from(damage_from);
        self.note_changed();
        true
    }

    fn note_changed(&mut self) {
        self.changed = true;
        if self.notify == NotifyPolicy::OnChange {
            self.text_changed.emit(self.buffer.as_str().to_string());
        }
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Copy the selection to `which` clipboard.
    ///
    /// Returns `false` without a selection. A secret field reports success
    /// but always exports zero-length content — the masked value never
    /// leaves the field.
    pub fn copy(&self, clipboard: &mut dyn Clipboard, which: ClipboardId) -> bool {
        let (b, e) = self.selection.range();
        if b == e {
            return false;
        }
        let e = if self.kind.is_secret() { b } else { e };
        if let Err(err) = clipboard.store(&self.buffer.as_str()[b..e], which) {
            tracing::warn!(target: "quill::editor", %err, "clipboard store failed");
        }
        true
    }

    /// Copy the accumulated contiguous cuts to the standard clipboard.
    ///
    /// Cut-to-end-of-line chords accumulate into the undo log's cut buffer;
    /// this exports that run. No-op for secret fields or an empty run.
    pub fn copy_cuts(&self, clipboard: &mut dyn Clipboard) -> bool {
        if self.kind.is_secret() {
            return false;
        }
        let log = self.undo.borrow();
        if log.cuts().is_empty() {
            return false;
        }
        if let Err(err) = clipboard.store(log.cuts(), ClipboardId::Standard) {
            tracing::warn!(target: "quill::editor", %err, "clipboard store failed");
        }
        true
    }

    /// Apply clipboard data delivered by the host.
    ///
    /// Single-line fields strip trailing whitespace. Integer and float
    /// fields validate the whole incoming text and replace the whole
    /// content; on validation failure the field is unchanged and
    /// `input_rejected` fires. Returns `false` when nothing changed.
    pub fn paste(&mut self, event: &PasteEvent) -> bool {
        if self.read_only {
            self.input_rejected.emit(());
            return false;
        }
        let mut incoming = event.text.as_str();
        if !self.kind.is_multiline() {
            incoming = incoming.trim_end_matches(|c: char| c.is_ascii_whitespace());
        }
        if incoming.is_empty() {
            return false;
        }

        match self.kind {
            InputKind::Integer => {
                let candidate = incoming.trim_start();
                if IntValidator::unbounded().validate(candidate) != ValidationState::Acceptable {
                    tracing::debug!(target: "quill::editor", "integer paste rejected");
                    self.input_rejected.emit(());
                    return false;
                }
                self.replace(0, self.buffer.len(), candidate)
            }
            InputKind::Float => {
                let candidate = incoming.trim_start();
                if FloatValidator::unbounded().validate(candidate) != ValidationState::Acceptable {
                    tracing::debug!(target: "quill::editor", "float paste rejected");
                    self.input_rejected.emit(());
                    return false;
                }
                self.replace(0, self.buffer.len(), candidate)
            }
            _ => self.replace(self.selection.position(), self.selection.mark(), incoming),
        }
    }

    // =========================================================================
    // Word and Line Boundaries
    // =========================================================================

    /// Start of the word at or before `i`.
    ///
    /// Secret fields have no visible word structure, so the whole content
    /// acts as one word.
    pub fn word_start(&self, i: usize) -> usize {
        if self.kind.is_secret() {
            0
        } else {
            selection::word_start(self.buffer.as_str(), i)
        }
    }

    /// End of the word at or after `i`.
    pub fn word_end(&self, i: usize) -> usize {
        if self.kind.is_secret() {
            self.buffer.len()
        } else {
            selection::word_end(self.buffer.as_str(), i)
        }
    }

    /// Start of the display line containing `i`.
    ///
    /// Single-line fields are one line. Unwrapped multi-line fields scan
    /// for the newline; wrapped fields re-derive the layout from the start
    /// of the paragraph and return the visual line boundary.
    pub fn line_start(&self, i: usize, metrics: &dyn FontMetrics) -> usize {
        if !self.kind.is_multiline() {
            return 0;
        }
        let text = self.buffer.as_str();
        let j = selection::paragraph_start(text, i);
        if !self.kind.wraps() {
            return j;
        }
        let layout = self.layout(metrics);
        let mut p = j;
        loop {
            let line = layout.expand(text, p);
            if line.end >= i {
                return line.start;
            }
            p = line.next_start(text);
        }
    }

    /// End of the display line containing `i`.
    pub fn line_end(&self, i: usize, metrics: &dyn FontMetrics) -> usize {
        if !self.kind.is_multiline() {
            return self.buffer.len();
        }
        let text = self.buffer.as_str();
        if !self.kind.wraps() {
            return selection::paragraph_end(text, i);
        }
        let j = selection::paragraph_start(text, i);
        let layout = self.layout(metrics);
        let mut p = j;
        loop {
            let line = layout.expand(text, p);
            if line.end >= i {
                return line.end;
            }
            p = line.next_start(text);
        }
    }

    /// Move the caret to the sticky pixel column within the line starting
    /// at `line_start`.
    ///
    /// The column is captured when a vertical-navigation gesture begins and
    /// held constant across repeated presses. Binary refinement over the
    /// measured widths finds the nearest character boundary. Returns the
    /// new caret offset.
    pub fn up_down_position(
        &mut self,
        line_start: usize,
        keep_mark: bool,
        metrics: &mut dyn FontMetrics,
    ) -> usize {
        metrics.set_font(self.font, self.font_size);
        let target = {
            let m: &dyn FontMetrics = metrics;
            let text = self.buffer.as_str();
            let layout = self.layout(m);
            let line = layout.expand(text, line_start);
            let (mut l, mut r) = (line_start, line.end);
            while l < r {
                let t = l + (r - l + 1) / 2;
                let (width, _) = layout.measure(text, line_start, t, &line.text);
                if width <= self.sticky_column {
                    l = t;
                } else {
                    r = t - 1;
                }
            }
            l
        };
        let mark = if keep_mark {
            self.selection.mark()
        } else {
            target
        };
        self.set_position(target, mark);
        self.was_up_down = true;
        self.selection.position()
    }

    fn layout<'m>(&self, metrics: &'m dyn FontMetrics) -> LineLayout<'m> {
        let mut layout = LineLayout::new(metrics)
            .multiline(self.kind.is_multiline())
            .secret(self.kind.is_secret());
        if self.kind.wraps() {
            layout = layout.wrap_width((self.bounds.width() - 2.0 * TEXT_INSET).max(1.0));
        }
        layout
    }

    fn prev_grapheme(&self, i: usize) -> usize {
        self.buffer.as_str()[..i]
            .grapheme_indices(true)
            .last()
            .map_or(0, |(idx, _)| idx)
    }

    fn next_grapheme(&self, i: usize) -> usize {
        let text = self.buffer.as_str();
        text[i..]
            .graphemes(true)
            .next()
            .map_or(text.len(), |g| i + g.len())
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Feed one normalized event into the field.
    ///
    /// Returns `true` when the field consumed the event. Paste requests are
    /// not made here — hosts observing an unconsumed Ctrl+V chord request
    /// clipboard contents and deliver them later as
    /// [`InputEvent::Paste`].
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        metrics: &mut dyn FontMetrics,
        clipboard: &mut dyn Clipboard,
    ) -> bool {
        match event {
            InputEvent::Pointer(pointer) => match pointer.phase {
                PointerPhase::Press => {
                    let extend = pointer.modifiers.shift;
                    self.handle_pointer(pointer, metrics, extend)
                }
                PointerPhase::Drag => self.handle_pointer(pointer, metrics, true),
                PointerPhase::Release => {
                    self.copy(clipboard, ClipboardId::Selection);
                    true
                }
            },
            InputEvent::Key(key) => self.handle_key(key, metrics, clipboard),
            InputEvent::Paste(paste) => self.paste(paste),
            InputEvent::FocusIn => {
                self.focused = true;
                if self.selection.has_selection() {
                    self.damage
                        .mark_range(self.selection.mark(), self.selection.position());
                } else {
                    // Nothing to erase; run a pass so the caret appears.
                    self.damage.mark_from(self.buffer.len() + 1);
                }
                true
            }
            InputEvent::FocusOut => {
                if self.selection.has_selection() {
                    self.damage
                        .mark_range(self.selection.mark(), self.selection.position());
                } else {
                    self.damage.mark_cursor(self.selection.position());
                }
                self.focused = false;
                if self.changed {
                    self.changed = false;
                    self.editing_finished.emit(());
                }
                true
            }
        }
    }

    /// Place the caret from a pointer gesture.
    ///
    /// Locates the display line under the pointer, then the nearest
    /// character boundary to the pointer's x. Double clicks select words,
    /// triple clicks select lines, and drags extend from the existing mark;
    /// a repeated click that would not grow the selection reverts to
    /// single-click placement.
    fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        metrics: &mut dyn FontMetrics,
        extend: bool,
    ) -> bool {
        self.was_up_down = false;
        if self.buffer.is_empty() {
            self.set_position(0, 0);
            return true;
        }
        metrics.set_font(self.font, self.font_size);

        let (new_position, new_mark) = {
            let m: &dyn FontMetrics = metrics;
            let text = self.buffer.as_str();
            let layout = self.layout(m);
            let height = m.line_height();

            let target_line = if self.kind.is_multiline() {
                (((event.position.y - self.bounds.y()) + self.scroll_y) / height).floor() as i64
            } else {
                0
            };

            let mut line = layout.expand(text, 0);
            let mut remaining = target_line;
            loop {
                remaining -= 1;
                if remaining < 0 || line.is_last(text) {
                    break;
                }
                line = layout.expand(text, line.next_start(text));
            }

            // Walk glyph by glyph to the nearest boundary left of the
            // pointer, then see if the boundary to the right is closer.
            let px = event.position.x - self.bounds.x() - TEXT_INSET + self.scroll_x;
            let (mut l, mut r) = (line.start, line.end);
            let mut left_gap = px;
            while l < r {
                let step = text[l..].chars().next().map_or(1, char::len_utf8);
                let t = l + step;
                let (width, _) = layout.measure(text, line.start, t, &line.text);
                if width <= px {
                    l = t;
                    left_gap = px - width;
                } else {
                    r = t - step;
                }
            }
            if l < line.end {
                let step = text[l..].chars().next().map_or(1, char::len_utf8);
                let (width, _) = layout.measure(text, line.start, l + step, &line.text);
                if width - px < left_gap {
                    l += step;
                }
            }

            let clicked = l;
            let mut new_position = clicked;
            let mut new_mark = if extend { self.selection.mark() } else { clicked };

            if event.clicks > 1 {
                let by_line = event.clicks > 2;
                if new_position == new_mark {
                    if new_position < text.len() {
                        new_position += 1;
                    } else if new_mark > 0 {
                        new_mark -= 1;
                    }
                }
                if new_position >= new_mark {
                    if by_line {
                        new_position = self.line_end(new_position, m);
                        new_mark = self.line_start(new_mark, m);
                    } else {
                        new_position = self.word_end(new_position);
                        new_mark = self.word_start(new_mark);
                    }
                } else if by_line {
                    new_position = self.line_start(new_position, m);
                    new_mark = self.line_end(new_mark, m);
                } else {
                    new_position = self.word_start(new_position);
                    new_mark = self.word_end(new_mark);
                }

                // A repeat click that does not grow the selection reverts
                // to single-click placement.
                let (position, mark) = (self.selection.position(), self.selection.mark());
                let grows = if mark > position {
                    new_mark < position || new_position > mark
                } else {
                    new_mark < mark || new_position > position
                };
                if !extend && !grows {
                    new_position = clicked;
                    new_mark = clicked;
                }
            }
            (new_position, new_mark)
        };

        self.set_position(new_position, new_mark);
        true
    }

    fn handle_key(
        &mut self,
        event: &KeyEvent,
        metrics: &mut dyn FontMetrics,
        clipboard: &mut dyn Clipboard,
    ) -> bool {
        let mods = event.modifiers;
        let position = self.selection.position();

        // Control chords first; their text payload (if any) is not content.
        if mods.control || mods.meta {
            return match event.key {
                Key::Char('a') | Key::Char('A') => {
                    self.select_all();
                    true
                }
                Key::Char('c') | Key::Char('C') => {
                    self.copy(clipboard, ClipboardId::Standard);
                    true
                }
                Key::Char('x') | Key::Char('X') => {
                    if self.read_only {
                        return true;
                    }
                    if self.copy(clipboard, ClipboardId::Standard) {
                        self.cut_selection();
                    }
                    true
                }
                Key::Char('z') | Key::Char('Z') => {
                    self.undo();
                    true
                }
                Key::Char('k') | Key::Char('K') => {
                    if self.read_only {
                        return true;
                    }
                    metrics.set_font(self.font, self.font_size);
                    let end = self.line_end(position, metrics);
                    if position == end && end < self.buffer.len() {
                        // At the line end the chord eats the separator.
                        self.cut_range(position, position + 1);
                    } else {
                        self.cut_range(position, end);
                    }
                    self.copy_cuts(clipboard);
                    true
                }
                Key::Left => {
                    let target = self.word_start(position.saturating_sub(1));
                    self.move_caret(target, mods.shift)
                }
                Key::Right => {
                    let target = self.word_end(position);
                    self.move_caret(target, mods.shift)
                }
                Key::Backspace => {
                    if self.read_only {
                        return true;
                    }
                    if self.has_selection() {
                        self.cut_selection();
                    } else {
                        let start = self.word_start(position.saturating_sub(1));
                        self.cut_range(start, position);
                    }
                    true
                }
                Key::Delete => {
                    if self.read_only {
                        return true;
                    }
                    if self.has_selection() {
                        self.cut_selection();
                    } else {
                        let end = self.word_end(position);
                        self.cut_range(position, end);
                    }
                    true
                }
                // Ctrl+V is the host's cue to request clipboard contents
                // and deliver them as a Paste event.
                _ => false,
            };
        }

        match event.key {
            Key::Left => {
                let target = if self.has_selection() && !mods.shift {
                    self.selection.range().0
                } else {
                    self.prev_grapheme(position)
                };
                self.move_caret(target, mods.shift)
            }
            Key::Right => {
                let target = if self.has_selection() && !mods.shift {
                    self.selection.range().1
                } else {
                    self.next_grapheme(position)
                };
                self.move_caret(target, mods.shift)
            }
            Key::Up => self.vertical_move(false, mods.shift, 1, metrics),
            Key::Down => self.vertical_move(true, mods.shift, 1, metrics),
            Key::PageUp => {
                let n = self.lines_per_page(metrics);
                self.vertical_move(false, mods.shift, n, metrics)
            }
            Key::PageDown => {
                let n = self.lines_per_page(metrics);
                self.vertical_move(true, mods.shift, n, metrics)
            }
            Key::Home => {
                metrics.set_font(self.font, self.font_size);
                let target = self.line_start(position, metrics);
                self.move_caret(target, mods.shift)
            }
            Key::End => {
                metrics.set_font(self.font, self.font_size);
                let target = self.line_end(position, metrics);
                self.move_caret(target, mods.shift)
            }
            Key::Backspace => {
                if self.read_only {
                    return true;
                }
                if self.has_selection() {
                    self.cut_selection();
                } else if position > 0 {
                    let start = self.prev_grapheme(position);
                    self.cut_range(start, position);
                }
                true
            }
            Key::Delete => {
                if self.read_only {
                    return true;
                }
                if self.has_selection() {
                    self.cut_selection();
                } else if position < self.buffer.len() {
                    let end = self.next_grapheme(position);
                    self.cut_range(position, end);
                }
                true
            }
            Key::Enter => {
                if self.kind.is_multiline() {
                    if self.read_only {
                        return true;
                    }
                    self.insert_text("\n");
                } else {
                    self.editing_finished.emit(());
                    self.changed = false;
                }
                true
            }
            // Tab navigates focus; the host owns that.
            Key::Tab | Key::Escape => false,
            _ => {
                if let Some(text) = &event.text {
                    if text.is_empty() {
                        return false;
                    }
                    if self.read_only {
                        return true;
                    }
                    self.insert_text(text);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn move_caret(&mut self, target: usize, extend: bool) -> bool {
        let mark = if extend { self.selection.mark() } else { target };
        self.set_position(target, mark);
        true
    }

    fn lines_per_page(&self, metrics: &mut dyn FontMetrics) -> usize {
        if !self.kind.is_multiline() {
            return 1;
        }
        metrics.set_font(self.font, self.font_size);
        let n = (self.bounds.height() / metrics.line_height()) as usize;
        n.max(1)
    }

    /// Step the caret `count` display lines up or down, aiming for the
    /// sticky column.
    fn vertical_move(
        &mut self,
        down: bool,
        extend: bool,
        count: usize,
        metrics: &mut dyn FontMetrics,
    ) -> bool {
        if !self.kind.is_multiline() {
            return false;
        }
        metrics.set_font(self.font, self.font_size);

        if !self.was_up_down {
            // Capture the column the gesture aims for.
            let position = self.selection.position();
            let column = {
                let m: &dyn FontMetrics = metrics;
                let start = self.line_start(position, m);
                let text = self.buffer.as_str();
                let layout = self.layout(m);
                let line = layout.expand(text, start);
                layout.measure(text, start, position, &line.text).0
            };
            self.sticky_column = column;
        }

        for _ in 0..count {
            let position = self.selection.position();
            let target_start = {
                let m: &dyn FontMetrics = metrics;
                if down {
                    let end = self.line_end(position, m);
                    if end >= self.buffer.len() {
                        None
                    } else {
                        let bytes = self.buffer.as_str().as_bytes();
                        Some(if bytes[end] == b'\n' || bytes[end] == b' ' {
                            end + 1
                        } else {
                            end
                        })
                    }
                } else {
                    let start = self.line_start(position, m);
                    if start == 0 {
                        None
                    } else {
                        Some(self.line_start(start - 1, m))
                    }
                }
            };
            match target_start {
                Some(start) => {
                    self.up_down_position(start, extend, metrics);
                }
                None => {
                    let edge = if down { self.buffer.len() } else { 0 };
                    self.move_caret(edge, extend);
                    self.was_up_down = true;
                    break;
                }
            }
        }
        true
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint the field into `clip`.
    ///
    /// Idempotent: the pending damage is consumed by the first call, and a
    /// repeat call with no intervening edits draws nothing. Partial damage
    /// erases and redraws only from the dirty offset; the cursor-only fast
    /// path touches a sliver around the caret.
    pub fn paint(
        &mut self,
        clip: Rect,
        surface: &mut dyn PaintSurface,
        metrics: &mut dyn FontMetrics,
    ) {
        let damage = self.damage.take();
        if damage.is_clean() {
            return;
        }
        let Some(clip) = clip.intersect(&self.bounds) else {
            return;
        };
        metrics.set_font(self.font, self.font_size);

        let full = matches!(damage, Damage::Full);
        let (mut dirty_from, mut cursor_only) = match damage {
            Damage::Partial { from, cursor_only } => (from, cursor_only),
            _ => (0, false),
        };
        if self.read_only {
            cursor_only = false;
        }

        if !self.focused && self.buffer.is_empty() {
            if !full {
                surface.push_clip(clip);
                surface.set_color(self.background);
                surface.fill_rect(self.bounds);
                surface.pop_clip();
            }
            return;
        }

        let text = self.buffer.as_str().to_string();
        let height = metrics.line_height();
        let threshold = scroll_threshold(height);
        let (sel_start, sel_end) = if self.focused {
            self.selection.range()
        } else {
            (0, 0)
        };
        let position = self.selection.position();

        // First pass: count lines, find the caret, and settle the scroll so
        // there is slack after the caret.
        let mut cur_x = 0.0f32;
        let mut cur_y = 0.0f32;
        let mut lines = 0usize;
        {
            let m: &dyn FontMetrics = metrics;
            let layout = self.layout(m);
            let mut p = 0usize;
            let mut sticky = None;
            let mut scroll_x = self.scroll_x;
            loop {
                let line = layout.expand(&text, p);
                if position >= line.start && position <= line.end {
                    let (width, _) = layout.measure(&text, line.start, position, &line.text);
                    cur_x = width;
                    if self.focused && !self.was_up_down {
                        sticky = Some(cur_x);
                    }
                    cur_y = lines as f32 * height;

                    let view = self.bounds.width() - 2.0 * TEXT_INSET;
                    let mut new_scroll = scroll_x;
                    if cur_x > new_scroll + view - threshold {
                        new_scroll = cur_x + threshold - view;
                        // Never scroll further than the line end plus slack.
                        let (line_width, _) =
                            layout.measure(&text, line.start, line.end, &line.text);
                        let furthest = line_width + 4.0 - view;
                        if furthest < new_scroll {
                            new_scroll = furthest;
                        }
                    } else if cur_x < new_scroll + threshold {
                        new_scroll = cur_x - threshold;
                    }
                    scroll_x = new_scroll.max(0.0);
                }
                lines += 1;
                if line.is_last(&text) {
                    break;
                }
                p = line.next_start(&text);
            }
            if let Some(column) = sticky {
                self.sticky_column = column;
            }
            if scroll_x != self.scroll_x {
                self.scroll_x = scroll_x;
                dirty_from = 0;
                cursor_only = false;
            }
        }

        // Vertical scroll keeps the caret's line on screen.
        if self.kind.is_multiline() {
            let view_h = self.bounds.height();
            let mut new_y = self.scroll_y;
            if cur_y < new_y {
                new_y = cur_y;
            }
            if cur_y > new_y + view_h - height {
                new_y = cur_y - view_h + height;
            }
            new_y = new_y.max(0.0);
            if new_y != self.scroll_y {
                self.scroll_y = new_y;
                dirty_from = 0;
                cursor_only = false;
            }
        } else {
            // Center the one line vertically.
            self.scroll_y = -(self.bounds.height() - height) / 2.0;
        }

        tracing::trace!(
            target: "quill::paint",
            full,
            dirty_from,
            cursor_only,
            lines,
            "painting"
        );

        surface.push_clip(clip);
        let m_line_height = height;
        let x_origin = self.bounds.x() + TEXT_INSET - self.scroll_x;
        let baseline_rise = height - metrics.descent();
        let caret_collapsed = sel_start == sel_end;

        let m: &dyn FontMetrics = metrics;
        let layout = self.layout(m);
        let mut p = 0usize;
        let mut y = -self.scroll_y;
        loop {
            let line = layout.expand(&text, p);
            let top = self.bounds.y() + y;
            let clipped_off_top = y <= -m_line_height;
            let mut skip_text = false;

            if !clipped_off_top {
                if !full {
                    // Lines entirely before the dirty offset keep their
                    // pixels; lines after a caret-only change do too.
                    if line.end < dirty_from || (cursor_only && line.start > dirty_from) {
                        skip_text = true;
                    } else {
                        let mut erase_right = self.bounds.right();
                        let erase_left;
                        if line.start >= dirty_from {
                            erase_left = self.bounds.x();
                            if cursor_only {
                                erase_right = x_origin + 2.0;
                            }
                        } else {
                            let (width, _) =
                                layout.measure(&text, line.start, dirty_from, &line.text);
                            erase_left = x_origin + width;
                            if cursor_only {
                                erase_right = erase_left + 2.0;
                            }
                        }
                        let erase = Rect::new(
                            erase_left - 1.0 - m_line_height / 8.0,
                            top,
                            erase_right - erase_left + 2.0 + m_line_height / 4.0,
                            m_line_height,
                        );
                        surface.push_clip(erase);
                        surface.set_color(self.background);
                        surface.fill_rect(self.bounds);
                        surface.pop_clip();
                    }
                }

                if !skip_text {
                    let baseline = top + baseline_rise;
                    let selected_here =
                        sel_start < sel_end && sel_start <= line.end && sel_end > line.start;
                    if selected_here {
                        // Lead-in, highlighted span, tail.
                        let mut x1 = x_origin;
                        let mut offset1 = 0usize;
                        if sel_start > line.start {
                            let (width, offset) =
                                layout.measure(&text, line.start, sel_start, &line.text);
                            x1 += width;
                            offset1 = offset;
                            surface.set_color(self.text_color);
                            surface.draw_text(&line.text[..offset1], x_origin, baseline);
                        }
                        let (x2, offset2) = if sel_end <= line.end {
                            let (width, offset) =
                                layout.measure(&text, line.start, sel_end, &line.text);
                            (x_origin + width, offset)
                        } else {
                            (self.bounds.right(), line.text.len())
                        };
                        surface.set_color(self.selection_color);
                        surface.fill_rect(Rect::new(x1, top, x2 - x1, m_line_height));
                        surface.set_color(self.text_color.contrast_with(self.selection_color));
                        surface.draw_text(&line.text[offset1..offset2], x1, baseline);
                        if sel_end < line.end {
                            surface.set_color(self.text_color);
                            surface.draw_text(&line.text[offset2..], x2, baseline);
                        }
                    } else {
                        surface.set_color(self.text_color);
                        surface.draw_text(&line.text, x_origin, baseline);
                    }
                }

                // The caret is drawn for its line even when the line's text
                // was skipped, so caret moves repaint without text churn.
                if self.focused
                    && caret_collapsed
                    && position >= line.start
                    && position <= line.end
                {
                    let (width, _) = layout.measure(&text, line.start, position, &line.text);
                    surface.set_color(self.cursor_color);
                    if self.read_only {
                        // A tick under the caret column marks the position
                        // without suggesting editability.
                        surface.fill_rect(Rect::new(
                            x_origin + width - 2.5,
                            top + m_line_height - 2.0,
                            6.0,
                            2.0,
                        ));
                    } else {
                        surface.fill_rect(Rect::new(
                            x_origin + width + 0.5,
                            top,
                            2.0,
                            m_line_height,
                        ));
                    }
                }
            }

            y += m_line_height;
            if line.is_last(&text) {
                p = line.start;
                break;
            }
            p = line.next_start(&text);
            if y >= self.bounds.height() {
                break;
            }
        }

        // Erase anything left below the last line after content shrank.
        if self.kind.is_multiline() && !full && y < self.bounds.height() {
            if !cursor_only || p <= dirty_from {
                let top = self.bounds.y() + y.max(0.0);
                let leftover = Rect::new(
                    self.bounds.x(),
                    top,
                    self.bounds.width(),
                    self.bounds.bottom() - top,
                );
                surface.push_clip(leftover);
                surface.set_color(self.background);
                surface.fill_rect(self.bounds);
                surface.pop_clip();
            }
        }
        surface.pop_clip();
    }
}

impl Drop for TextInput {
    fn drop(&mut self) {
        self.undo.borrow_mut().forget(self.id);
    }
}
