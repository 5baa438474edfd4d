//! Minimal-update tracking for a field.
//!
//! After an edit, everything from the earliest changed byte to the end of
//! the field may need repainting, but nothing before it does. The tracker
//! records that earliest offset between paints; the paint pass consumes it
//! and erases/redraws only from there, so unchanged characters do not blink.
//!
//! Within one cycle the state only ever widens (a lower offset, or full
//! damage); it never un-marks. Consuming resets to clean.

/// Pending repaint work for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Damage {
    /// Nothing to repaint.
    #[default]
    Clean,
    /// Repaint from byte offset `from` to the end of the field.
    Partial {
        from: usize,
        /// Only the caret glyph changed; the paint pass may erase just a
        /// sliver around it.
        cursor_only: bool,
    },
    /// Repaint the whole field.
    Full,
}

impl Damage {
    /// Whether nothing is pending.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Mark everything dirty.
    pub fn mark_all(&mut self) {
        *self = Self::Full;
    }

    /// Mark dirty from `offset` to the end.
    ///
    /// Narrows an existing partial region (the lower offset wins) and clears
    /// the cursor-only fast path. No-op when a full repaint is already
    /// pending.
    pub fn mark_from(&mut self, offset: usize) {
        match *self {
            Self::Full => {}
            Self::Partial { from, .. } => {
                *self = Self::Partial {
                    from: from.min(offset),
                    cursor_only: false,
                };
            }
            Self::Clean => {
                *self = Self::Partial {
                    from: offset,
                    cursor_only: false,
                };
            }
        }
    }

    /// Mark a range dirty; equivalent to `mark_from` of the lower bound.
    pub fn mark_range(&mut self, a: usize, b: usize) {
        self.mark_from(a.min(b));
    }

    /// Mark only the caret at `offset` dirty.
    ///
    /// The optimization applies only when nothing else is pending; any
    /// pending region already covers the caret.
    pub fn mark_cursor(&mut self, offset: usize) {
        if self.is_clean() {
            *self = Self::Partial {
                from: offset,
                cursor_only: true,
            };
        }
    }

    /// Consume the pending state, resetting to clean.
    pub fn take(&mut self) -> Damage {
        std::mem::take(self)
    }
}
