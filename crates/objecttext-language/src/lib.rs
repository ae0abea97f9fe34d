//! Object Text grammar binding
//!
//! Object Text is the Halfling Engine's object notation, used by Cosmoteer
//! `.rules` files. The compiled grammar exposes a single C accessor,
//! `tree_sitter_objecttext`, returning the parser tables. This crate knows how
//! to reach that accessor (statically linked or from a grammar shared library)
//! and what a correctly loaded grammar must expose.

use std::path::Path;

pub use tree_sitter_language::LanguageFn;

mod library;
mod locator;

pub use library::{GrammarLibrary, LibraryError};
pub use locator::{library_file_names, locate, GrammarLocator, LocalGrammarLocator};

/// The C ABI shared by every tree-sitter language accessor.
pub type RawLanguageFn = unsafe extern "C" fn() -> *const ();

/// The highlights query for Object Text.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../queries/highlights.scm");

/// Anything that can hand out a grammar's raw language accessor.
pub trait GrammarBinding {
    /// Return the zero-argument accessor for the compiled language table.
    fn raw_language_fn(&self) -> RawLanguageFn;
}

/// Binding for a grammar linked into the binary (e.g. a `tree-sitter-*` crate's
/// `LANGUAGE` constant).
#[derive(Clone, Copy)]
pub struct StaticBinding {
    raw: RawLanguageFn,
}

impl StaticBinding {
    pub fn new(language: LanguageFn) -> Self {
        Self {
            raw: language.into_raw(),
        }
    }

    /// Wrap a bare accessor function.
    ///
    /// # Safety
    ///
    /// `raw` must either return a null pointer or a pointer to a language
    /// table produced by the tree-sitter generator that stays valid for the
    /// life of the process.
    pub unsafe fn from_raw(raw: RawLanguageFn) -> Self {
        Self { raw }
    }
}

impl GrammarBinding for StaticBinding {
    fn raw_language_fn(&self) -> RawLanguageFn {
        self.raw
    }
}

impl std::fmt::Debug for StaticBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticBinding")
            .field("raw", &(self.raw as *const ()))
            .finish()
    }
}

/// Static expectations for a loaded grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarProfile {
    /// Grammar name as declared in `grammar.js`
    pub name: &'static str,
    /// Human readable name used in diagnostics
    pub display_name: &'static str,
    /// Exported accessor symbol
    pub symbol: &'static str,
    /// File extensions (without the dot)
    pub file_extensions: &'static [&'static str],
    /// Named node kinds the parse tables must contain
    pub node_kinds: &'static [&'static str],
    /// Field names the parse tables must contain
    pub field_names: &'static [&'static str],
    /// Supertype node kinds
    pub supertypes: &'static [&'static str],
    /// Highlight query that must compile against the grammar
    pub highlights_query: &'static str,
}

impl GrammarProfile {
    /// Detect whether a file belongs to this grammar by its extension
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.file_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

impl std::fmt::Display for GrammarProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Profile of the Object Text grammar.
pub const OBJECT_TEXT: GrammarProfile = GrammarProfile {
    name: "objecttext",
    display_name: "Object Text",
    symbol: "tree_sitter_objecttext",
    file_extensions: &["rules"],
    node_kinds: &[
        "source_file",
        "assignment",
        "list",
        "block",
        "extension",
        "reference",
        "number",
        "expression",
        "unary_expression",
        "binary_expression",
        "function_call",
        "bool",
        "identifier",
        "value",
        "comment",
        "string",
        "virbatim",
        "bare_string",
    ],
    field_names: &["key", "value", "left", "operator", "right"],
    supertypes: &["expression"],
    highlights_query: HIGHLIGHTS_QUERY,
};
