//! Error types for Horizon Quill.
//!
//! The editing engine itself has no fatal errors: rejected operations return
//! `false` and leave state unchanged. Errors exist only at the boundary to
//! external collaborators.

use thiserror::Error;

/// Errors reported by a host clipboard implementation.
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// No clipboard backend is available in this environment.
    #[error("clipboard unavailable")]
    Unavailable,

    /// The backend failed to store or retrieve data.
    #[error("clipboard transfer failed: {0}")]
    Transfer(String),
}

/// Result type for clipboard operations.
pub type ClipboardResult<T> = Result<T, ClipboardError>;
