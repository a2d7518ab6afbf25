//! Error types for registry discovery.

use std::path::PathBuf;

use thiserror::Error;

use crate::manifest::ManifestError;

/// Errors that end a discovery run.
///
/// Unreadable files and directories are not errors; they are logged and
/// skipped while the run continues.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No scan root produced a single component. Nothing is written.
    #[error("no components discovered under {}", root.display())]
    Empty { root: PathBuf },

    /// The TSX grammar could not be loaded into the parser.
    #[error("failed to load TSX grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// The manifest could not be serialized or written.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
