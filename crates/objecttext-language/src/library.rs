//! Compiled grammar libraries loaded with dlopen
//!
//! `tree-sitter build` produces a shared library exporting the grammar's
//! accessor. Loading it at runtime lets the check run against whatever
//! artifact the grammar toolchain produced, without linking it in.

use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};

use crate::{GrammarBinding, RawLanguageFn};

/// Errors raised while opening a grammar library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    Open { path: PathBuf, message: String },
    Symbol { symbol: String, message: String },
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Open { path, message } => {
                write!(f, "failed to open {}: {message}", path.display())
            }
            LibraryError::Symbol { symbol, message } => {
                write!(f, "symbol {symbol} not found: {message}")
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// A dynamically loaded grammar and its resolved accessor.
///
/// The language table lives inside the library's memory, so the library stays
/// open for as long as this value exists.
pub struct GrammarLibrary {
    path: PathBuf,
    symbol: String,
    accessor: RawLanguageFn,
    _library: Library,
}

impl GrammarLibrary {
    /// Open `path` and resolve `symbol` as a language accessor
    pub fn open(path: &Path, symbol: &str) -> Result<Self, LibraryError> {
        tracing::debug!("Opening grammar library {:?} (symbol {})", path, symbol);

        // SAFETY: loading runs the library's initialisers. Grammar libraries
        // produced by tree-sitter have none beyond static table data.
        let library = unsafe { Library::new(path) }.map_err(|e| LibraryError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // SAFETY: tree-sitter accessors take no arguments and return a pointer
        // to the language table, matching `RawLanguageFn`.
        let accessor = unsafe {
            let symbol_fn: Symbol<RawLanguageFn> =
                library
                    .get(symbol.as_bytes())
                    .map_err(|e| LibraryError::Symbol {
                        symbol: symbol.to_string(),
                        message: e.to_string(),
                    })?;
            *symbol_fn
        };

        tracing::info!("Loaded grammar library {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            symbol: symbol.to_string(),
            accessor,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl GrammarBinding for GrammarLibrary {
    fn raw_language_fn(&self) -> RawLanguageFn {
        self.accessor
    }
}

impl std::fmt::Debug for GrammarLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarLibrary")
            .field("path", &self.path)
            .field("symbol", &self.symbol)
            .finish()
    }
}
