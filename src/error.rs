//! Grammar load failures

use objecttext_language::{GrammarProfile, LibraryError};
use std::path::PathBuf;

/// Why a grammar could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The accessor returned a null language table
    NullLanguage,
    /// The table's ABI version is outside what the runtime supports
    IncompatibleVersion {
        version: usize,
        min: usize,
        max: usize,
    },
    /// The runtime refused the language
    Rejected(String),
    MissingNodeKind(String),
    MissingField(String),
    MissingSupertype(String),
    InvalidQuery(String),
    Library(LibraryError),
    LibraryNotFound { searched: Vec<PathBuf> },
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::NullLanguage => write!(f, "language accessor returned null"),
            LoadFailure::IncompatibleVersion { version, min, max } => write!(
                f,
                "incompatible language version {version}, expected {min} through {max}"
            ),
            LoadFailure::Rejected(msg) => write!(f, "rejected by runtime: {msg}"),
            LoadFailure::MissingNodeKind(kind) => write!(f, "missing node kind `{kind}`"),
            LoadFailure::MissingField(field) => write!(f, "missing field `{field}`"),
            LoadFailure::MissingSupertype(kind) => write!(f, "missing supertype `{kind}`"),
            LoadFailure::InvalidQuery(msg) => write!(f, "invalid highlights query: {msg}"),
            LoadFailure::Library(e) => write!(f, "{e}"),
            LoadFailure::LibraryNotFound { searched } => {
                write!(f, "no grammar library found")?;
                if !searched.is_empty() {
                    let dirs: Vec<String> =
                        searched.iter().map(|p| p.display().to_string()).collect();
                    write!(f, " (searched {})", dirs.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// A grammar load failure attributed to a grammar.
///
/// Displays as `Error loading <grammar> grammar: <reason>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarLoadError {
    pub grammar: String,
    pub failure: LoadFailure,
}

impl GrammarLoadError {
    pub fn new(profile: &GrammarProfile, failure: LoadFailure) -> Self {
        Self {
            grammar: profile.display_name.to_string(),
            failure,
        }
    }
}

impl std::fmt::Display for GrammarLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error loading {} grammar: {}", self.grammar, self.failure)
    }
}

impl std::error::Error for GrammarLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.failure {
            LoadFailure::Library(e) => Some(e),
            _ => None,
        }
    }
}
