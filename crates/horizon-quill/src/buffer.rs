//! Text storage for a field.
//!
//! A field often displays a caller-supplied constant string that is never
//! edited; copying it eagerly would waste time in programs that update field
//! values rapidly. The buffer therefore holds a tagged source: either a
//! borrowed `&'static str` (zero-copy, read-only) or an owned `String`. The
//! first mutation materializes the borrow into owned storage, which then
//! grows geometrically so repeated small edits amortize to O(1) allocation.

/// Extra bytes reserved on first materialization so a few characters can be
/// inserted before the next reallocation.
const FIRST_GROWTH_SLACK: usize = 9;

/// Default cap on stored bytes.
const DEFAULT_MAX_SIZE: usize = 32_767;

#[derive(Debug, Clone)]
enum Store {
    /// Caller-owned constant text; copied into owned storage on first edit.
    Static(&'static str),
    /// Heap storage owned by the buffer.
    Owned(String),
}

/// The character data of a field.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    store: Store,
    max_size: usize,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            store: Store::Static(""),
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    /// The stored text.
    pub fn as_str(&self) -> &str {
        match &self.store {
            Store::Static(s) => s,
            Store::Owned(s) => s.as_str(),
        }
    }

    /// Length of the stored text in bytes.
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Whether the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The byte at `index`. Panics if out of range.
    pub fn byte_at(&self, index: usize) -> u8 {
        self.as_str().as_bytes()[index]
    }

    /// Maximum number of bytes the buffer will hold.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Set the maximum number of bytes. Existing content is not truncated;
    /// the cap applies to subsequent edits.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    /// Whether the text lives in owned, mutable storage.
    pub fn is_materialized(&self) -> bool {
        matches!(self.store, Store::Owned(_))
    }

    /// Rebind to externally-owned constant text without copying.
    ///
    /// Returns `false` (and changes nothing) when the new text equals the
    /// current content.
    pub fn bind_static(&mut self, text: &'static str) -> bool {
        if self.as_str() == text {
            return false;
        }
        self.store = Store::Static(text);
        true
    }

    /// Replace the content with a copy of `text`.
    ///
    /// Returns `false` when the new text equals the current content.
    pub fn assign(&mut self, text: &str) -> bool {
        if self.as_str() == text {
            return false;
        }
        self.materialize(text.len());
        match &mut self.store {
            Store::Owned(s) => {
                s.clear();
                s.push_str(text);
            }
            Store::Static(_) => unreachable!("materialize always produces owned storage"),
        }
        true
    }

    /// Ensure owned storage with room for at least `needed` bytes, copying
    /// current content in. Capacity doubles until it fits, so interactive
    /// typing reallocates O(log n) times.
    pub fn materialize(&mut self, needed: usize) {
        match &mut self.store {
            Store::Static(text) => {
                let mut owned = String::with_capacity(needed.max(text.len()) + FIRST_GROWTH_SLACK);
                owned.push_str(text);
                self.store = Store::Owned(owned);
            }
            Store::Owned(owned) => {
                if owned.capacity() < needed {
                    let mut capacity = owned.capacity().max(1);
                    while capacity < needed {
                        capacity *= 2;
                    }
                    owned.reserve(capacity - owned.len());
                }
            }
        }
    }

    /// Remove `range` and return the removed text.
    ///
    /// Callers guarantee the bounds are char boundaries within the text;
    /// the edit primitive snaps them before calling.
    pub fn remove_range(&mut self, range: std::ops::Range<usize>) -> String {
        debug_assert!(self.as_str().is_char_boundary(range.start));
        debug_assert!(self.as_str().is_char_boundary(range.end));
        self.materialize(self.len());
        match &mut self.store {
            Store::Owned(s) => {
                let removed = s[range.clone()].to_string();
                s.replace_range(range, "");
                removed
            }
            Store::Static(_) => unreachable!("materialize always produces owned storage"),
        }
    }

    /// Insert `text` at byte offset `at`.
    ///
    /// Callers guarantee `at` is a char boundary within the text.
    pub fn insert_at(&mut self, at: usize, text: &str) {
        debug_assert!(self.as_str().is_char_boundary(at));
        self.materialize(self.len() + text.len());
        match &mut self.store {
            Store::Owned(s) => s.insert_str(at, text),
            Store::Static(_) => unreachable!("materialize always produces owned storage"),
        }
    }
}
