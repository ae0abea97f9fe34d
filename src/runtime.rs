//! Turning a binding's raw language table into a `tree_sitter::Language`.

use std::marker::PhantomData;

use objecttext_language::{GrammarBinding, GrammarProfile, LanguageFn};
use tree_sitter::{Language, Parser, LANGUAGE_VERSION, MIN_COMPATIBLE_LANGUAGE_VERSION};

use crate::error::{GrammarLoadError, LoadFailure};

/// First ABI version whose tables list their supertypes
pub const SUPERTYPE_ABI_VERSION: usize = 15;

/// A language handle accepted by the runtime.
///
/// Borrows the binding it came from: for dynamically loaded grammars the
/// table lives in the library's memory and must not be used after unload.
pub struct LoadedGrammar<'b> {
    language: Language,
    abi_version: usize,
    _binding: PhantomData<&'b ()>,
}

impl<'b> LoadedGrammar<'b> {
    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn abi_version(&self) -> usize {
        self.abi_version
    }

    pub fn node_kind_count(&self) -> usize {
        self.language.node_kind_count()
    }

    pub fn field_count(&self) -> usize {
        self.language.field_count()
    }

    /// Whether a named node kind with this name exists
    pub fn has_named_node_kind(&self, kind: &str) -> bool {
        self.language.id_for_node_kind(kind, true) != 0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.language.field_id_for_name(field).is_some()
    }

    /// Supertype node kinds recorded in the tables, or `None` for tables
    /// older than ABI 15, which do not carry them.
    pub fn supertypes(&self) -> Option<Vec<&'static str>> {
        if self.abi_version < SUPERTYPE_ABI_VERSION {
            return None;
        }
        Some(
            self.language
                .supertypes()
                .iter()
                .filter_map(|&id| self.language.node_kind_for_id(id))
                .collect(),
        )
    }

    /// Whether `kind` is a supertype. Without supertype metadata this falls
    /// back to requiring a named node kind of that name.
    pub fn has_supertype(&self, kind: &str) -> bool {
        match self.supertypes() {
            Some(supertypes) => supertypes.contains(&kind),
            None => self.has_named_node_kind(kind),
        }
    }

    /// A parser already set to this language
    pub fn parser(&self) -> Result<Parser, tree_sitter::LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl std::fmt::Debug for LoadedGrammar<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedGrammar")
            .field("abi_version", &self.abi_version)
            .field("node_kind_count", &self.node_kind_count())
            .finish()
    }
}

/// Build a runtime language from a binding's accessor.
///
/// A null table is reported without ever reaching the runtime. Version
/// compatibility is checked before the table is handed to a parser.
pub fn construct_language<'b, B>(
    binding: &'b B,
    profile: &GrammarProfile,
) -> Result<LoadedGrammar<'b>, GrammarLoadError>
where
    B: GrammarBinding + ?Sized,
{
    let raw = binding.raw_language_fn();

    // SAFETY: bindings hand out tree-sitter accessors, which take no
    // arguments and have no side effects.
    let table = unsafe { raw() };
    if table.is_null() {
        tracing::error!("{} accessor returned a null language table", profile.name);
        return Err(GrammarLoadError::new(profile, LoadFailure::NullLanguage));
    }

    // SAFETY: the accessor returned a non-null table owned by the binding,
    // which outlives the returned handle.
    let language = Language::new(unsafe { LanguageFn::from_raw(raw) });

    let abi_version = language.abi_version();
    if !(MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&abi_version) {
        tracing::error!(
            "{} language version {} unsupported by runtime ({}..={})",
            profile.name,
            abi_version,
            MIN_COMPATIBLE_LANGUAGE_VERSION,
            LANGUAGE_VERSION
        );
        return Err(GrammarLoadError::new(
            profile,
            LoadFailure::IncompatibleVersion {
                version: abi_version,
                min: MIN_COMPATIBLE_LANGUAGE_VERSION,
                max: LANGUAGE_VERSION,
            },
        ));
    }

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| GrammarLoadError::new(profile, LoadFailure::Rejected(e.to_string())))?;

    tracing::debug!(
        "Constructed {} language (ABI {}, {} node kinds)",
        profile.name,
        abi_version,
        language.node_kind_count()
    );

    Ok(LoadedGrammar {
        language,
        abi_version,
        _binding: PhantomData,
    })
}
