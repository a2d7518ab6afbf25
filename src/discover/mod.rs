//! Registry Discovery
//!
//! Scans TSX sources for exported component metadata and writes the
//! registry manifest.
//!
//! # Example
//!
//! ```ignore
//! use agentinterface::discover::{Discovery, DiscoveryConfig};
//!
//! let mut discovery = Discovery::new(DiscoveryConfig::default().with_ecosystem(false))?;
//! let manifest = discovery.build(Path::new("."))?;
//! println!("{} components", manifest.total_components);
//! ```
//!
//! # Scan roots
//!
//! 1. **Library mode**: the root's `package.json` names the component
//!    library itself. Only `src/ai` is scanned.
//! 2. **Consumer mode**: anything else. In order:
//!    - the installed library under `node_modules/<library>/src/ai`
//!    - the project's conventional component directories
//!    - the first few dependencies shipping `src/components/ai` or `src/ai`
//!
//! Scan order decides precedence. Types must be unique across a run: the
//! first declaration of a type is kept and later ones are dropped with a
//! warning.

mod error;
pub mod extract;
pub mod literal;
pub mod scanner;

pub use error::DiscoveryError;
pub use extract::Extractor;
pub use scanner::{scan, ScanRules};

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::manifest::Manifest;
use crate::types::ComponentMetadata;

// ============================================================================
// Configuration
// ============================================================================

/// Everything a discovery run needs to know about the project layout.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Package name of the component library.
    pub library_name: String,
    /// Project descriptor file read for the project name.
    pub descriptor: String,
    /// Manifest path. Relative paths resolve against the discovery root.
    pub output: PathBuf,
    pub rules: ScanRules,
    /// Component directory inside the library package.
    pub library_dir: PathBuf,
    pub library_depth: usize,
    /// Conventional component directories of a consuming project.
    pub project_dirs: Vec<PathBuf>,
    pub project_depth: usize,
    /// Whether to look inside third-party dependencies at all.
    pub ecosystem: bool,
    /// Maximum number of dependencies inspected.
    pub ecosystem_limit: usize,
    /// Component subpaths tried per dependency; the first that exists wins.
    pub ecosystem_dirs: Vec<(PathBuf, usize)>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            library_name: "agentinterface".to_string(),
            descriptor: "package.json".to_string(),
            output: PathBuf::from("ai.json"),
            rules: ScanRules::default(),
            library_dir: PathBuf::from("src/ai"),
            library_depth: 1,
            project_dirs: [
                "src/components/ai",
                "components/ai",
                "web/src/components/ai",
                "app/components/ai",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            project_depth: 2,
            ecosystem: true,
            ecosystem_limit: 20,
            ecosystem_dirs: vec![
                (PathBuf::from("src/components/ai"), 2),
                (PathBuf::from("src/ai"), 1),
            ],
        }
    }
}

impl DiscoveryConfig {
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_ecosystem(mut self, enabled: bool) -> Self {
        self.ecosystem = enabled;
        self
    }

    pub fn with_library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = name.into();
        self
    }

    /// Where the manifest for `root` is written.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output)
    }
}

// ============================================================================
// Project descriptor
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct ProjectDescriptor {
    name: Option<String>,
}

/// The `name` declared in the descriptor at `root`, if any.
pub fn declared_name(root: &Path, descriptor: &str) -> Option<String> {
    let path = root.join(descriptor);
    let text = fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<ProjectDescriptor>(&text) {
        Ok(descriptor) => descriptor.name.filter(|name| !name.is_empty()),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "unreadable project descriptor");
            None
        }
    }
}

/// Project name: the declared name, else the directory's base name.
pub fn project_name(root: &Path, descriptor: &str) -> String {
    declared_name(root, descriptor).unwrap_or_else(|| {
        let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        resolved
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    })
}

/// How a discovery root relates to the component library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectKind {
    /// The root is the library itself.
    Library,
    /// The root consumes the library; `name` tags its own components.
    Consumer { name: String },
}

impl ProjectKind {
    pub fn detect(root: &Path, config: &DiscoveryConfig) -> Self {
        match declared_name(root, &config.descriptor) {
            Some(name) if name == config.library_name => ProjectKind::Library,
            _ => ProjectKind::Consumer {
                name: project_name(root, &config.descriptor),
            },
        }
    }
}

// ============================================================================
// Registry Builder
// ============================================================================

/// A discovery run: scanner, extractor and configuration.
pub struct Discovery {
    config: DiscoveryConfig,
    extractor: Extractor,
}

impl Discovery {
    pub fn new(config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        Ok(Self {
            config,
            extractor: Extractor::new()?,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover components under `root` and persist the manifest.
    ///
    /// # Errors
    ///
    /// - `DiscoveryError::Empty` when nothing was found. No file is written.
    /// - `DiscoveryError::Manifest` when the manifest cannot be written.
    pub fn build(&mut self, root: &Path) -> Result<Manifest, DiscoveryError> {
        let components = self.discover(root)?;
        let manifest = Manifest::from_components(components);
        let path = self.config.output_path(root);
        manifest.write(&path)?;
        tracing::info!(
            path = %path.display(),
            components = manifest.total_components,
            sources = manifest.sources.len(),
            "wrote registry"
        );
        Ok(manifest)
    }

    /// Discover components under `root` without writing anything.
    pub fn discover(&mut self, root: &Path) -> Result<Vec<ComponentMetadata>, DiscoveryError> {
        let mut found = Vec::new();

        match ProjectKind::detect(root, &self.config) {
            ProjectKind::Library => {
                tracing::info!(library = %self.config.library_name, "detected library project");
                let dir = root.join(&self.config.library_dir);
                let source = self.config.library_name.clone();
                self.scan_into(&dir, self.config.library_depth, &source, root, &mut found);
            }
            ProjectKind::Consumer { name } => {
                tracing::info!(project = %name, "detected consumer project");
                self.scan_library(root, &mut found);
                self.scan_project(root, &name, &mut found);
                if self.config.ecosystem {
                    self.scan_ecosystem(root, &mut found);
                }
            }
        }

        dedupe(&mut found);
        if found.is_empty() {
            return Err(DiscoveryError::Empty {
                root: root.to_path_buf(),
            });
        }
        Ok(found)
    }

    fn scan_library(&mut self, root: &Path, found: &mut Vec<ComponentMetadata>) {
        let dir = root
            .join(&self.config.rules.dependency_dir)
            .join(&self.config.library_name)
            .join(&self.config.library_dir);
        if !dir.is_dir() {
            tracing::debug!(path = %dir.display(), "library not installed");
            return;
        }
        let source = self.config.library_name.clone();
        self.scan_into(&dir, self.config.library_depth, &source, root, found);
    }

    fn scan_project(&mut self, root: &Path, name: &str, found: &mut Vec<ComponentMetadata>) {
        let dirs = self.config.project_dirs.clone();
        for relative in dirs {
            let dir = root.join(&relative);
            if dir.is_dir() {
                tracing::info!(path = %relative.display(), "found project components");
                self.scan_into(&dir, self.config.project_depth, name, root, found);
            }
        }
    }

    fn scan_ecosystem(&mut self, root: &Path, found: &mut Vec<ComponentMetadata>) {
        let modules = root.join(&self.config.rules.dependency_dir);
        if !modules.is_dir() {
            return;
        }

        let entries = match fs::read_dir(&modules) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(path = %modules.display(), error = %err, "skipping unreadable dependencies");
                return;
            }
        };

        let mut packages: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
            .filter(|(name, _)| !name.starts_with('.') && *name != self.config.library_name)
            .collect();
        packages.sort();
        packages.truncate(self.config.ecosystem_limit);

        for (name, path) in packages {
            let candidate = self
                .config
                .ecosystem_dirs
                .iter()
                .map(|(relative, depth)| (path.join(relative), *depth))
                .find(|(dir, _)| dir.is_dir());
            if let Some((dir, depth)) = candidate {
                self.scan_into(&dir, depth, &name, root, found);
            }
        }
    }

    fn scan_into(
        &mut self,
        dir: &Path,
        depth: usize,
        source: &str,
        root: &Path,
        found: &mut Vec<ComponentMetadata>,
    ) {
        tracing::info!(source, path = %dir.display(), "scanning components");
        for file in scan(dir, depth, &self.config.rules) {
            let text = match fs::read_to_string(&file) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(file = %file.display(), error = %err, "skipping unreadable file");
                    continue;
                }
            };
            if let Some(metadata) = self.extractor.extract(&text, &file, root) {
                tracing::info!(source, component = %metadata.kind, "{}", metadata.description);
                found.push(metadata.with_source(source));
            }
        }
    }
}

/// Keep the first declaration of each type.
fn dedupe(found: &mut Vec<ComponentMetadata>) {
    let mut seen: HashMap<String, String> = HashMap::new();
    found.retain(|component| match seen.entry(component.kind.clone()) {
        Entry::Occupied(first) => {
            tracing::warn!(
                component = %component.kind,
                kept = %first.get(),
                dropped = %component.source,
                "duplicate component type"
            );
            false
        }
        Entry::Vacant(slot) => {
            slot.insert(component.source.clone());
            true
        }
    });
}

/// Run discovery with the default configuration and write the manifest.
pub fn build(root: &Path) -> Result<Manifest, DiscoveryError> {
    Discovery::new(DiscoveryConfig::default())?.build(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    }

    #[test]
    fn detects_library_by_descriptor_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DiscoveryConfig::default();

        write(dir.path(), "package.json", r#"{ "name": "agentinterface" }"#);
        assert_eq!(ProjectKind::detect(dir.path(), &config), ProjectKind::Library);

        write(dir.path(), "package.json", r#"{ "name": "demo-app", "version": "1.0.0" }"#);
        assert_eq!(
            ProjectKind::detect(dir.path(), &config),
            ProjectKind::Consumer {
                name: "demo-app".to_string()
            }
        );
    }

    #[test]
    fn project_name_falls_back_to_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("my-site");
        fs::create_dir_all(&root).expect("mkdir");
        assert_eq!(project_name(&root, "package.json"), "my-site");

        write(&root, "package.json", r#"{ "version": "1.0.0" }"#);
        assert_eq!(project_name(&root, "package.json"), "my-site");

        write(&root, "package.json", "not json");
        assert_eq!(project_name(&root, "package.json"), "my-site");
    }

    #[test]
    fn dedupe_keeps_first_source() {
        let component = |kind: &str, source: &str| ComponentMetadata {
            kind: kind.to_string(),
            description: String::new(),
            schema: serde_json::Value::Null,
            category: "general".to_string(),
            file: PathBuf::from("x.tsx"),
            source: source.to_string(),
        };
        let mut found = vec![
            component("card", "agentinterface"),
            component("chart", "demo-app"),
            component("card", "demo-app"),
        ];
        dedupe(&mut found);

        let kept: Vec<_> = found.iter().map(|c| (c.kind.as_str(), c.source.as_str())).collect();
        assert_eq!(kept, vec![("card", "agentinterface"), ("chart", "demo-app")]);
    }

    #[test]
    fn output_path_resolves_against_root() {
        let config = DiscoveryConfig::default();
        assert_eq!(
            config.output_path(Path::new("/project")),
            PathBuf::from("/project/ai.json")
        );
        let config = config.with_output("/tmp/registry.json");
        assert_eq!(
            config.output_path(Path::new("/project")),
            PathBuf::from("/tmp/registry.json")
        );
    }
}
