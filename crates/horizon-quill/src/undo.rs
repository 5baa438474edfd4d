//! Single-level undo for text fields.
//!
//! The log holds exactly one coalesced record: the bytes the most recent
//! contiguous edit series removed (`cut`) and how many bytes it inserted.
//! Adjacent edits at the same boundary merge into the record, so a typing
//! burst or a run of backspaces undoes as one step. Undoing inverts the
//! record in place; a second undo therefore redoes the original edit.
//!
//! One log serves a whole editing context and remembers only the most
//! recently edited field — editing another field claims the log and the
//! previous field's undo state is gone. Hosts share a log between fields via
//! [`UndoLog::shared`]; tests instantiate independent logs.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a field, used to tag undo ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(u64);

impl FieldId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An undo log shared by the fields of one editing context.
pub type SharedUndoLog = Rc<RefCell<UndoLog>>;

/// The single-slot edit record.
///
/// Capacity of the internal buffers only ever grows, so interactive typing
/// does not churn the allocator.
#[derive(Debug, Default)]
pub struct UndoLog {
    /// Bytes removed by the pending edit series.
    cut: String,
    /// Bytes inserted by the pending edit series.
    inserted: usize,
    /// Offset just past the pending edit.
    at: usize,
    /// The field whose edit the record describes.
    owner: Option<FieldId>,
    /// The last contiguous run of cuts, kept for the cut-accumulation
    /// clipboard shortcut even after a subsequent insertion.
    yank: String,
}

impl UndoLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log wrapped for sharing between fields.
    pub fn shared() -> SharedUndoLog {
        Rc::new(RefCell::new(Self::new()))
    }

    /// The field currently owning the record.
    pub fn owner(&self) -> Option<FieldId> {
        self.owner
    }

    /// Whether there is nothing to undo.
    pub fn is_empty(&self) -> bool {
        self.cut.is_empty() && self.inserted == 0
    }

    /// Bytes the pending record would re-insert on undo.
    pub fn cut_text(&self) -> &str {
        &self.cut
    }

    /// Number of bytes the pending record would remove on undo.
    pub fn inserted_len(&self) -> usize {
        self.inserted
    }

    /// Offset just past the pending edit.
    pub fn position(&self) -> usize {
        self.at
    }

    /// The accumulated contiguous cuts, for clipboard export.
    pub fn cuts(&self) -> &str {
        &self.yank
    }

    /// Drop the record if `field` owns it (field destroyed or its value
    /// rebound wholesale).
    pub fn forget(&mut self, field: FieldId) {
        if self.owner == Some(field) {
            self.owner = None;
            self.cut.clear();
            self.inserted = 0;
            self.at = 0;
        }
    }

    /// Record that `field` removed `removed` from `[b, e)`.
    ///
    /// Three coalescing cases: a deletion continuing at the record's
    /// position extends the cut at its end (Delete key held down), a
    /// deletion ending at the record's position with no pending insertion
    /// extends it at the front (a backspace run), and a deletion consuming
    /// part of a pending insertion just shrinks the insertion. Anything
    /// else starts a fresh record.
    pub fn record_delete(&mut self, field: FieldId, b: usize, e: usize, removed: &str, secret: bool) {
        let owned = self.owner == Some(field);
        if owned && b == self.at {
            self.cut.push_str(removed);
        } else if owned && e == self.at && self.inserted == 0 {
            self.cut.insert_str(0, removed);
        } else if owned && e == self.at && (e - b) < self.inserted {
            self.inserted -= e - b;
        } else {
            self.cut.clear();
            self.cut.push_str(removed);
            self.inserted = 0;
        }
        self.owner = Some(field);
        self.at = b;
        if secret {
            self.yank.clear();
        } else {
            self.yank.clear();
            self.yank.push_str(&self.cut);
        }
    }

    /// Record that `field` inserted `len` bytes at `b`.
    ///
    /// Contiguous with the pending record, the insertion grows it; otherwise
    /// the previous cut is dropped and a pure insertion starts.
    pub fn record_insert(&mut self, field: FieldId, b: usize, len: usize) {
        if self.owner == Some(field) && b == self.at {
            self.inserted += len;
        } else {
            self.cut.clear();
            self.inserted = len;
        }
        self.owner = Some(field);
        self.at = b + len;
    }

    /// Swap the record after an undo was applied.
    ///
    /// `removed` is the text the undo cut back out (the record's previous
    /// insertion) and `at` the offset just past the re-inserted cut. The
    /// swapped record makes the next undo redo the original edit.
    pub fn exchange(&mut self, removed: String, at: usize) {
        self.inserted = self.cut.len();
        self.cut.clear();
        self.cut.push_str(&removed);
        if !removed.is_empty() {
            self.yank.clear();
            self.yank.push_str(&removed);
        }
        self.at = at;
    }
}
