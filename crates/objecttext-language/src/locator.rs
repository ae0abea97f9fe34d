//! Finding a compiled grammar library on disk.
//!
//! This module provides the `GrammarLocator` trait for looking up grammar
//! libraries, and `LocalGrammarLocator` as the default filesystem-based
//! implementation.

use std::path::{Path, PathBuf};

use crate::GrammarProfile;

/// Trait for resolving where grammar libraries may live.
///
/// Kept separate from the loader so lookups can be tested without touching the
/// filesystem.
pub trait GrammarLocator {
    /// Directories to search, in priority order.
    fn search_dirs(&self) -> Vec<PathBuf>;

    /// Check if a candidate file exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Default implementation using the local filesystem.
pub struct LocalGrammarLocator {
    config_dir: Option<PathBuf>,
    extra_dirs: Vec<PathBuf>,
}

impl LocalGrammarLocator {
    /// Create a locator rooted at the user's config directory.
    pub fn new() -> Self {
        Self {
            config_dir: dirs::config_dir(),
            extra_dirs: Vec::new(),
        }
    }

    /// Create a locator with a custom config directory.
    pub fn with_config_dir(config_dir: Option<PathBuf>) -> Self {
        Self {
            config_dir,
            extra_dirs: Vec::new(),
        }
    }

    /// Add directories searched before the config directory.
    pub fn with_extra_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.extra_dirs.extend(dirs);
        self
    }

    /// `<config_dir>/objecttext/grammars`
    pub fn grammars_dir(&self) -> Option<PathBuf> {
        self.config_dir
            .as_ref()
            .map(|p| p.join("objecttext").join("grammars"))
    }
}

impl Default for LocalGrammarLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarLocator for LocalGrammarLocator {
    fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.extra_dirs.clone();
        dirs.extend(self.grammars_dir());
        dirs
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// File names a compiled grammar library may have.
///
/// Covers `tree-sitter build` output (`objecttext.so`) and the conventional
/// `libtree-sitter-objecttext` names from Makefile builds.
pub fn library_file_names(grammar: &str) -> Vec<String> {
    let mut names = Vec::new();
    for ext in ["so", "dylib", "dll"] {
        names.push(format!("{grammar}.{ext}"));
    }
    names.push(format!("libtree-sitter-{grammar}.so"));
    names.push(format!("libtree-sitter-{grammar}.dylib"));
    names.push(format!("tree-sitter-{grammar}.dll"));
    names
}

/// Find the first existing grammar library for `profile`.
pub fn locate(locator: &dyn GrammarLocator, profile: &GrammarProfile) -> Option<PathBuf> {
    let names = library_file_names(profile.name);
    for dir in locator.search_dirs() {
        for name in &names {
            let candidate = dir.join(name);
            tracing::trace!("Looking for grammar library at {:?}", candidate);
            if locator.exists(&candidate) {
                tracing::debug!("Found {} grammar at {:?}", profile.name, candidate);
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OBJECT_TEXT;
    use std::collections::HashSet;

    /// Mock locator for testing
    struct MockGrammarLocator {
        dirs: Vec<PathBuf>,
        files: HashSet<PathBuf>,
    }

    impl GrammarLocator for MockGrammarLocator {
        fn search_dirs(&self) -> Vec<PathBuf> {
            self.dirs.clone()
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.contains(path)
        }
    }

    #[test]
    fn test_library_file_names() {
        let names = library_file_names("objecttext");
        assert_eq!(names[0], "objecttext.so");
        assert!(names.contains(&"objecttext.dylib".to_string()));
        assert!(names.contains(&"libtree-sitter-objecttext.so".to_string()));
        assert!(names.contains(&"tree-sitter-objecttext.dll".to_string()));
    }

    #[test]
    fn test_locate_prefers_earlier_dirs() {
        let first = PathBuf::from("/opt/grammars");
        let second = PathBuf::from("/home/user/.config/objecttext/grammars");
        let locator = MockGrammarLocator {
            dirs: vec![first.clone(), second.clone()],
            files: [
                second.join("objecttext.so"),
                first.join("libtree-sitter-objecttext.so"),
            ]
            .into_iter()
            .collect(),
        };

        assert_eq!(
            locate(&locator, &OBJECT_TEXT),
            Some(first.join("libtree-sitter-objecttext.so"))
        );
    }

    #[test]
    fn test_locate_nothing_found() {
        let locator = MockGrammarLocator {
            dirs: vec![PathBuf::from("/nowhere")],
            files: HashSet::new(),
        };
        assert_eq!(locate(&locator, &OBJECT_TEXT), None);
    }

    #[test]
    fn test_local_locator_grammars_dir() {
        let locator = LocalGrammarLocator::with_config_dir(Some(PathBuf::from("/cfg")));
        assert_eq!(
            locator.grammars_dir(),
            Some(PathBuf::from("/cfg/objecttext/grammars"))
        );

        let locator = locator.with_extra_dirs([PathBuf::from("/extra")]);
        assert_eq!(
            locator.search_dirs(),
            vec![
                PathBuf::from("/extra"),
                PathBuf::from("/cfg/objecttext/grammars")
            ]
        );
    }

    #[test]
    fn test_local_locator_finds_real_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("objecttext.so"), b"").unwrap();

        let locator =
            LocalGrammarLocator::with_config_dir(None).with_extra_dirs([dir.path().to_path_buf()]);
        assert_eq!(
            locate(&locator, &OBJECT_TEXT),
            Some(dir.path().join("objecttext.so"))
        );
    }
}
