//! Resolving and opening the compiled grammar library.

use std::path::{Path, PathBuf};

use objecttext_language::{locate, GrammarLibrary, GrammarLocator, GrammarProfile};

use crate::error::{GrammarLoadError, LoadFailure};

/// Environment variable naming a compiled grammar library
pub const GRAMMAR_LIB_ENV: &str = "OBJECTTEXT_GRAMMAR_LIB";

/// Read `OBJECTTEXT_GRAMMAR_LIB`, ignoring empty values
pub fn library_from_env() -> Option<PathBuf> {
    std::env::var_os(GRAMMAR_LIB_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Pick the grammar library. Order: the explicit (command line) path, the
/// environment, the configured path, then the first match found by `locator`.
pub fn resolve_library_path(
    explicit: Option<&Path>,
    env: Option<PathBuf>,
    configured: Option<&Path>,
    locator: &dyn GrammarLocator,
    profile: &GrammarProfile,
) -> Result<PathBuf, GrammarLoadError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env {
        tracing::debug!("Using grammar library from {}: {:?}", GRAMMAR_LIB_ENV, path);
        return Ok(path);
    }
    if let Some(path) = configured {
        tracing::debug!("Using configured grammar library: {:?}", path);
        return Ok(path.to_path_buf());
    }
    locate(locator, profile).ok_or_else(|| {
        GrammarLoadError::new(
            profile,
            LoadFailure::LibraryNotFound {
                searched: locator.search_dirs(),
            },
        )
    })
}

/// Open the library at `path` and resolve the accessor `symbol`
pub fn open_library(
    path: &Path,
    symbol: &str,
    profile: &GrammarProfile,
) -> Result<GrammarLibrary, GrammarLoadError> {
    GrammarLibrary::open(path, symbol)
        .map_err(|e| GrammarLoadError::new(profile, LoadFailure::Library(e)))
}
