//! Registry Manifest
//!
//! The persisted summary of one discovery run (`ai.json` by default):
//!
//! ```json
//! {
//!   "generated_at": "2026-01-01T00:00:00Z",
//!   "version": "1.0.0",
//!   "total_components": 1,
//!   "components": { "card": { "description": "...", "schema": {}, "category": "layout", "file": "src/ai/card.tsx", "source": "agentinterface" } },
//!   "sources": { "agentinterface": ["card"] }
//! }
//! ```
//!
//! The manifest is regenerated wholesale on every run and written with a
//! single atomic rename, so readers never see a partial registry.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::types::ComponentMetadata;

/// Format version stamped into every manifest.
pub const MANIFEST_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to access manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A discovered component, keyed by type in [`Manifest::components`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schema: Value,
    pub category: String,
    pub file: PathBuf,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub total_components: usize,
    pub components: IndexMap<String, ManifestEntry>,
    pub sources: IndexMap<String, Vec<String>>,
}

impl Manifest {
    /// Project discovered metadata into a manifest stamped with the current time.
    ///
    /// Types are expected to be unique. If one repeats, the first occurrence
    /// is kept so that `components` and `sources` always agree.
    pub fn from_components(components: impl IntoIterator<Item = ComponentMetadata>) -> Self {
        let mut entries: IndexMap<String, ManifestEntry> = IndexMap::new();
        let mut sources: IndexMap<String, Vec<String>> = IndexMap::new();

        for component in components {
            if entries.contains_key(&component.kind) {
                continue;
            }
            sources
                .entry(component.source.clone())
                .or_default()
                .push(component.kind.clone());
            entries.insert(
                component.kind,
                ManifestEntry {
                    description: component.description,
                    schema: component.schema,
                    category: component.category,
                    file: component.file,
                    source: component.source,
                },
            );
        }

        Self {
            generated_at: Utc::now(),
            version: MANIFEST_VERSION.to_string(),
            total_components: entries.len(),
            components: entries,
            sources,
        }
    }

    /// Read a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Overwrite `path` atomically with this manifest as pretty JSON.
    ///
    /// The JSON is written to a temporary file next to `path` and renamed
    /// into place. Concurrent writers race on the rename; the last one wins.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let io_err = |source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(self)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        file.write_all(b"\n").map_err(io_err)?;
        file.persist(path).map_err(|err| io_err(err.error))?;
        Ok(())
    }

    /// Component types in manifest order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}
