//! Field flavors.
//!
//! One engine drives every input widget; the kind selects the behavioral
//! variant: how text is displayed, whether newlines are literal, and what
//! pasted content must look like.

/// The behavioral variant of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Plain single-line text.
    #[default]
    Normal,
    /// Multi-line text; newlines break lines and tabs align to columns.
    Multiline {
        /// Wrap long lines at word boundaries to the field width.
        wrap: bool,
    },
    /// Password entry: every code point displays as a mask glyph, and the
    /// selection never exports its real content.
    Secret,
    /// Integer entry: pasted text must be an optionally-signed decimal or
    /// `0x`-prefixed hexadecimal number.
    Integer,
    /// Floating-point entry: pasted text must be a decimal number with
    /// optional fraction and exponent.
    Float,
    /// File-path entry: edits like Normal; the kind tags the field so hosts
    /// can add path chrome (directory buttons, completion).
    FilePath,
}

impl InputKind {
    /// Whether the field holds multiple display lines.
    pub fn is_multiline(&self) -> bool {
        matches!(self, Self::Multiline { .. })
    }

    /// Whether long lines wrap at word boundaries.
    pub fn wraps(&self) -> bool {
        matches!(self, Self::Multiline { wrap: true })
    }

    /// Whether displayed text is masked.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret)
    }

    /// Whether pasted content is validated before it is accepted.
    pub fn validates_paste(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}
