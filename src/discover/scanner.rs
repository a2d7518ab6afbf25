//! Source Scanner
//!
//! Collects candidate source files under a root, bounded in depth. Hidden
//! entries and dependency directories are never entered, symlinks are not
//! followed, and an unreadable subtree is logged and left out.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// What counts as a source file and which directories to stay out of.
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// File extension without the dot, e.g. `tsx`.
    pub extension: String,
    /// Directory name that holds third-party dependencies, e.g. `node_modules`.
    pub dependency_dir: String,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            extension: "tsx".to_string(),
            dependency_dir: "node_modules".to_string(),
        }
    }
}

impl ScanRules {
    fn is_skipped(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || name.contains(self.dependency_dir.as_str())
    }

    fn is_source(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == self.extension.as_str())
    }
}

/// Every source file under `root`, at most `max_depth` directories down.
///
/// Files directly in `root` are at depth 0, so `max_depth = 1` also covers
/// immediate subdirectories. Results are sorted by path.
pub fn scan(root: &Path, max_depth: usize, rules: &ScanRules) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .max_depth(max_depth.saturating_add(1))
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !rules.is_skipped(entry));

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if rules.is_source(&entry) => files.push(entry.into_path()),
            Ok(_) => {}
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                tracing::warn!(path = %path, error = %err, "skipping unreadable entry");
            }
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, "export {};\n").expect("write");
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|p| {
                p.strip_prefix(root)
                    .expect("under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn respects_depth_bound() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.tsx");
        touch(dir.path(), "one/b.tsx");
        touch(dir.path(), "one/two/c.tsx");

        let rules = ScanRules::default();
        assert_eq!(relative(dir.path(), scan(dir.path(), 0, &rules)), vec!["a.tsx"]);
        assert_eq!(
            relative(dir.path(), scan(dir.path(), 1, &rules)),
            vec!["a.tsx", "one/b.tsx"]
        );
        assert_eq!(
            relative(dir.path(), scan(dir.path(), 2, &rules)),
            vec!["a.tsx", "one/b.tsx", "one/two/c.tsx"]
        );
    }

    #[test]
    fn skips_hidden_and_dependency_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "card.tsx");
        touch(dir.path(), "card.ts");
        touch(dir.path(), ".cache/hidden.tsx");
        touch(dir.path(), "node_modules/pkg/dep.tsx");
        touch(dir.path(), "nested/node_modules/dep.tsx");

        let files = relative(dir.path(), scan(dir.path(), 3, &ScanRules::default()));
        assert_eq!(files, vec!["card.tsx"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_left_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "a.tsx");
        touch(dir.path(), "locked/b.tsx");
        touch(dir.path(), "open/c.tsx");

        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");
        // Permission bits do not bind a privileged user.
        let enforced = fs::read_dir(&locked).is_err();

        let files = relative(dir.path(), scan(dir.path(), 2, &ScanRules::default()));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore");

        if enforced {
            assert_eq!(files, vec!["a.tsx", "open/c.tsx"]);
        } else {
            assert_eq!(files, vec!["a.tsx", "locked/b.tsx", "open/c.tsx"]);
        }
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = scan(&dir.path().join("absent"), 2, &ScanRules::default());
        assert!(files.is_empty());
    }
}
