//! End-to-end behavior of the editing engine against mock host services.

use horizon_quill::{
    ClipboardId, Color, Damage, FontId, FontMetrics, InputEvent, Key, KeyEvent, PaintSurface,
    PasteEvent, Point, PointerEvent, Rect, TextInput,
};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fixed-pitch fake font: every code point is 8px wide, lines 16px tall.
struct MonoMetrics;

impl FontMetrics for MonoMetrics {
    fn set_font(&mut self, _font: FontId, _size: f32) {}
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * 8.0
    }
    fn line_height(&self) -> f32 {
        16.0
    }
    fn descent(&self) -> f32 {
        4.0
    }
}

#[derive(Debug, PartialEq)]
enum Op {
    PushClip(Rect),
    PopClip,
    SetColor(Color),
    FillRect(Rect),
    DrawText(String, f32, f32),
}

#[derive(Default)]
struct RecordingSurface {
    ops: Vec<Op>,
}

impl RecordingSurface {
    fn drawing_ops(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::FillRect(_) | Op::DrawText(..)))
            .count()
    }

    fn drawn_text(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::DrawText(text, _, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PaintSurface for RecordingSurface {
    fn push_clip(&mut self, rect: Rect) {
        self.ops.push(Op::PushClip(rect));
    }
    fn pop_clip(&mut self) {
        self.ops.push(Op::PopClip);
    }
    fn set_color(&mut self, color: Color) {
        self.ops.push(Op::SetColor(color));
    }
    fn fill_rect(&mut self, rect: Rect) {
        self.ops.push(Op::FillRect(rect));
    }
    fn draw_text(&mut self, text: &str, x: f32, baseline: f32) {
        self.ops.push(Op::DrawText(text.to_string(), x, baseline));
    }
}

#[derive(Default)]
struct RecordingClipboard {
    stored: Vec<(String, ClipboardId)>,
}

impl horizon_quill::Clipboard for RecordingClipboard {
    fn store(
        &mut self,
        text: &str,
        clipboard: ClipboardId,
    ) -> horizon_quill::ClipboardResult<()> {
        self.stored.push((text.to_string(), clipboard));
        Ok(())
    }
}

const BOUNDS: Rect = Rect::new(0.0, 0.0, 200.0, 64.0);

fn field_in_bounds(mut field: TextInput) -> TextInput {
    field.set_bounds(BOUNDS);
    field
}

// =============================================================================
// Boundary safety
// =============================================================================

#[test]
fn cursor_never_lands_inside_a_multibyte_sequence() {
    setup();
    let mut field = TextInput::single_line();
    // Mixed 1-, 2-, 3-, and 4-byte code points.
    field.set_text("aé€🙂z");
    let text = field.text().to_string();

    for i in 0..=text.len() + 3 {
        field.set_position(i, i);
        assert!(
            text.is_char_boundary(field.position()),
            "requested {i}, stored {}",
            field.position()
        );
        assert_eq!(field.position(), field.mark());
    }
}

#[test]
fn replace_snaps_offsets_outward() {
    setup();
    let mut field = TextInput::single_line();
    field.set_text("a🙂b");
    // 1..3 lies strictly inside the emoji; the deletion widens to cover it.
    field.replace(1, 3, "");
    assert_eq!(field.text(), "ab");
}

// =============================================================================
// Replace / undo round trips
// =============================================================================

#[test]
fn insert_then_undo_restores_text_and_cursor() {
    setup();
    let mut field = TextInput::single_line();
    field.set_text("hello");
    field.set_position(0, 0);

    field.replace(0, 0, "say ");
    assert_eq!(field.text(), "say hello");
    assert_eq!((field.position(), field.mark()), (4, 4));

    assert!(field.undo());
    assert_eq!(field.text(), "hello");
    assert_eq!((field.position(), field.mark()), (0, 0));
}

#[test]
fn delete_then_undo_restores_text() {
    setup();
    let mut field = TextInput::single_line();
    field.set_text("say hello");
    field.set_position(0, 0);

    field.replace(0, 4, "");
    assert_eq!(field.text(), "hello");
    assert!(field.undo());
    assert_eq!(field.text(), "say hello");
}

#[test]
fn replacement_round_trips_through_double_undo() {
    setup();
    let mut field = TextInput::single_line();
    field.set_text("the quick fox");
    field.set_position(4, 4);

    field.replace(4, 9, "lazy");
    assert_eq!(field.text(), "the lazy fox");

    // First undo restores, second redoes.
    assert!(field.undo());
    assert_eq!(field.text(), "the quick fox");
    assert!(field.undo());
    assert_eq!(field.text(), "the lazy fox");
}

#[test]
fn multibyte_round_trip() {
    setup();
    let mut field = TextInput::single_line();
    field.set_text("héllo wörld");
    field.set_position(0, 0);
    let before = field.text().to_string();

    field.replace(2, 8, "アイウ");
    assert_ne!(field.text(), before);
    assert!(field.undo());
    assert_eq!(field.text(), before);
    // The caret lands after the restored span, on a character boundary.
    assert_eq!(field.position(), field.mark());
    assert!(field.text().is_char_boundary(field.position()));
}

// =============================================================================
// Capacity
// =============================================================================

#[test]
fn insertions_clamp_exactly_to_max_size() {
    setup();
    let mut field = TextInput::single_line();
    field.set_max_size(10);
    field.set_text("hello");
    field.replace(5, 5, " world, how are you");
    assert_eq!(field.len(), 10);

    // Already full: further insertions are dropped entirely.
    assert!(!field.replace(10, 10, "!"));
    assert_eq!(field.len(), 10);
}

#[test]
fn clamped_insertion_does_not_split_characters() {
    setup();
    let mut field = TextInput::single_line();
    field.set_max_size(4);
    // "éé" is four bytes; a third 'é' would leave room for one byte only.
    field.replace(0, 0, "ééé");
    assert_eq!(field.text(), "éé");
    assert_eq!(field.len(), 4);
}

// =============================================================================
// Painting
// =============================================================================

#[test]
fn paint_is_idempotent_between_edits() {
    setup();
    let mut metrics = MonoMetrics;
    let mut field = field_in_bounds(TextInput::single_line());
    field.set_text("hello");

    let mut surface = RecordingSurface::default();
    field.paint(BOUNDS, &mut surface, &mut metrics);
    assert!(surface.drawing_ops() > 0);
    assert!(!field.needs_repaint());

    // No intervening edits: the second pass draws nothing.
    let mut surface = RecordingSurface::default();
    field.paint(BOUNDS, &mut surface, &mut metrics);
    assert_eq!(surface.drawing_ops(), 0);
}

#[test]
fn paint_draws_expanded_display_text() {
    setup();
    let mut metrics = MonoMetrics;
    let mut field = field_in_bounds(TextInput::single_line());
    field.set_text("a\u{1}b");

    let mut surface = RecordingSurface::default();
    field.paint(BOUNDS, &mut surface, &mut metrics);
    assert_eq!(surface.drawn_text(), vec!["a^Ab"]);
}

#[test]
fn paint_masks_secret_fields() {
    setup();
    let mut metrics = MonoMetrics;
    let mut field = field_in_bounds(TextInput::secret());
    field.set_text("pw123");

    let mut surface = RecordingSurface::default();
    field.paint(BOUNDS, &mut surface, &mut metrics);
    let drawn = surface.drawn_text().concat();
    assert!(!drawn.contains("pw123"));
    assert_eq!(drawn.chars().count(), 5);
    assert!(drawn.chars().all(|c| c == horizon_quill::SECRET_GLYPH));
}

#[test]
fn edits_repaint_only_from_the_changed_offset() {
    setup();
    let mut metrics = MonoMetrics;
    let mut field = field_in_bounds(TextInput::single_line());
    field.set_text("hello world");
    let mut surface = RecordingSurface::default();
    field.paint(BOUNDS, &mut surface, &mut metrics);

    // Append at the end: damage starts at the edit point, not zero.
    field.replace(11, 11, "!");
    match field.pending_damage() {
        Damage::Partial { from, .. } => assert_eq!(from, 11),
        other => panic!("expected partial damage, got {other:?}"),
    }
}

// =============================================================================
// Selection and dragging
// =============================================================================

#[test]
fn drag_damage_contains_the_selection_symmetric_difference() {
    setup();
    let mut metrics = MonoMetrics;
    let mut field = field_in_bounds(TextInput::single_line());
    field.set_text("hello wide world");
    let mark = 5;
    field.set_position(mark, mark);
    let mut surface = RecordingSurface::default();
    field.paint(BOUNDS, &mut surface, &mut metrics);

    for target in [8usize, 12, 9, 2, 5, 16] {
        let before = field.position();
        field.set_position(target, mark);
        let changed_low = before.min(field.position());
        match field.pending_damage() {
            Damage::Partial { from, .. } => {
                assert!(
                    from <= changed_low,
                    "damage from {from} misses change at {changed_low}"
                );
            }
            Damage::Full => {}
            Damage::Clean => panic!("selection change left no damage"),
        }
        let mut surface = RecordingSurface::default();
        field.paint(BOUNDS, &mut surface, &mut metrics);
        assert!(field.pending_damage().is_clean());
    }
}

// =============================================================================
// Kind-specific behavior
// =============================================================================

#[test]
fn secret_fields_never_export_content() {
    setup();
    let mut field = TextInput::secret();
    field.set_text("pw123");
    field.select_all();

    let mut clipboard = RecordingClipboard::default();
    assert!(field.copy(&mut clipboard, ClipboardId::Standard));
    assert_eq!(clipboard.stored[0].0.len(), 0);
}

#[test]
fn integer_field_rejects_malformed_paste() {
    setup();
    let mut field = TextInput::integer();
    field.set_text("42");
    let ok = field.paste(&PasteEvent {
        text: "3.14".into(),
        clipboard: ClipboardId::Standard,
    });
    assert!(!ok);
    assert_eq!(field.text(), "42");
}

#[test]
fn integer_field_accepts_signed_and_hex_paste() {
    setup();
    let mut field = TextInput::integer();
    field.set_text("0");

    assert!(field.paste(&PasteEvent {
        text: "-17".into(),
        clipboard: ClipboardId::Standard,
    }));
    assert_eq!(field.text(), "-17");

    assert!(field.paste(&PasteEvent {
        text: "  0xFF".into(),
        clipboard: ClipboardId::Standard,
    }));
    assert_eq!(field.text(), "0xFF");
}

#[test]
fn float_field_rejects_trailing_junk() {
    setup();
    let mut field = TextInput::float();
    field.set_text("1.5");
    let ok = field.paste(&PasteEvent {
        text: "2.5e".into(),
        clipboard: ClipboardId::Standard,
    });
    assert!(!ok);
    assert_eq!(field.text(), "1.5");
}

#[test]
fn file_path_field_edits_like_normal_text() {
    setup();
    let mut field = TextInput::file_path();
    field.set_text("/usr/local/bin");
    // '/' joins words, so word motion jumps the whole path.
    assert_eq!(field.word_start(10), 0);
    assert_eq!(field.word_end(0), 14);
    field.replace(0, 0, "~");
    assert_eq!(field.text(), "~/usr/local/bin");
}

// =============================================================================
// Whole-field editing sessions
// =============================================================================

#[test]
fn typing_session_with_undo_and_clipboard() {
    setup();
    let mut metrics = MonoMetrics;
    let mut clipboard = RecordingClipboard::default();
    let mut field = field_in_bounds(TextInput::single_line());

    field.handle_event(&InputEvent::FocusIn, &mut metrics, &mut clipboard);
    for ch in ["h", "i", " ", "t", "h", "e", "r", "e"] {
        let ev = InputEvent::Key(KeyEvent::text(ch));
        field.handle_event(&ev, &mut metrics, &mut clipboard);
    }
    assert_eq!(field.text(), "hi there");

    // The whole burst is one undo step.
    field.undo();
    assert_eq!(field.text(), "");
    field.undo();
    assert_eq!(field.text(), "hi there");

    // Double-click the second word and cut it.
    let double = InputEvent::Pointer(PointerEvent::press(Point::new(41.0, 8.0)).with_clicks(2));
    field.handle_event(&double, &mut metrics, &mut clipboard);
    assert_eq!(field.selected_text(), "there");

    let cut = InputEvent::Key(KeyEvent::key_with(
        Key::Char('x'),
        horizon_quill::KeyboardModifiers::CTRL,
    ));
    field.handle_event(&cut, &mut metrics, &mut clipboard);
    assert_eq!(field.text(), "hi ");
    assert_eq!(clipboard.stored.last().unwrap().0, "there");

    // Paste it back.
    let paste = InputEvent::Paste(PasteEvent {
        text: "there".into(),
        clipboard: ClipboardId::Standard,
    });
    field.handle_event(&paste, &mut metrics, &mut clipboard);
    assert_eq!(field.text(), "hi there");
}

#[test]
fn wrapped_field_navigates_by_visual_lines() {
    setup();
    let mut metrics = MonoMetrics;
    let mut clipboard = RecordingClipboard::default();
    // 62px bounds → 60px wrap width → "aaa bbb" / "ccc" (8px glyphs).
    let mut field = TextInput::multiline(true);
    field.set_bounds(Rect::new(0.0, 0.0, 62.0, 64.0));
    field.set_text("aaa bbb ccc");
    field.set_position(1, 1);

    let down = InputEvent::Key(KeyEvent::key(Key::Down));
    field.handle_event(&down, &mut metrics, &mut clipboard);
    // One visual line down, same column: inside "ccc".
    assert_eq!(field.position(), 9);

    let home = InputEvent::Key(KeyEvent::key(Key::Home));
    field.handle_event(&home, &mut metrics, &mut clipboard);
    assert_eq!(field.position(), 8);

    let end = InputEvent::Key(KeyEvent::key(Key::End));
    field.handle_event(&end, &mut metrics, &mut clipboard);
    assert_eq!(field.position(), 11);
}

#[test]
fn shared_undo_log_remembers_only_the_last_field() {
    setup();
    let undo = horizon_quill::UndoLog::shared();
    let mut name = TextInput::single_line().with_undo_log(undo.clone());
    let mut city = TextInput::single_line().with_undo_log(undo);

    name.insert_text("Ada");
    city.insert_text("London");

    assert!(!name.undo(), "name's undo belongs to city now");
    assert!(city.undo());
    assert_eq!(city.text(), "");
    assert_eq!(name.text(), "Ada");
}
