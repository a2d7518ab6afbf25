//! Error types for rendering.

use thiserror::Error;

/// Fatal render failures. Per-node problems are placeholders, not errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The composition text is not valid JSON.
    #[error("malformed composition input: {0}")]
    MalformedInput(#[from] serde_json::Error),
}
