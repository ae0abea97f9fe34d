//! Grammar-load smoke test
//!
//! Acquires the language table from a binding, hands it to the runtime and
//! checks the result against the grammar's profile. Failure always surfaces
//! as a `GrammarLoadError` whose message starts with
//! `Error loading <grammar> grammar`.

use objecttext_language::{GrammarBinding, GrammarProfile};
use serde::Serialize;
use tree_sitter::Query;

use crate::error::{GrammarLoadError, LoadFailure};
use crate::runtime::{construct_language, LoadedGrammar};

/// Which profile checks run after the language is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    pub node_kinds: bool,
    pub fields: bool,
    pub queries: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            node_kinds: true,
            fields: true,
            queries: true,
        }
    }
}

/// Summary of a successful load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub grammar: String,
    pub abi_version: usize,
    pub node_kind_count: usize,
    pub field_count: usize,
    pub checked_node_kinds: usize,
    pub checked_supertypes: usize,
    pub checked_fields: usize,
    /// Number of highlight query patterns, if the query was checked
    pub query_patterns: Option<usize>,
}

/// Construct the language and verify it against `profile`, keeping the handle.
pub fn verify<'b, B>(
    binding: &'b B,
    profile: &GrammarProfile,
    options: CheckOptions,
) -> Result<(LoadedGrammar<'b>, LoadReport), GrammarLoadError>
where
    B: GrammarBinding + ?Sized,
{
    let grammar = construct_language(binding, profile)?;
    let report = check_profile(&grammar, profile, options)?;
    Ok((grammar, report))
}

/// Run the smoke test with every check enabled.
pub fn run_test<B>(binding: &B, profile: &GrammarProfile) -> Result<LoadReport, GrammarLoadError>
where
    B: GrammarBinding + ?Sized,
{
    run_test_with(binding, profile, CheckOptions::default())
}

pub fn run_test_with<B>(
    binding: &B,
    profile: &GrammarProfile,
    options: CheckOptions,
) -> Result<LoadReport, GrammarLoadError>
where
    B: GrammarBinding + ?Sized,
{
    verify(binding, profile, options).map(|(_, report)| report)
}

fn check_profile(
    grammar: &LoadedGrammar<'_>,
    profile: &GrammarProfile,
    options: CheckOptions,
) -> Result<LoadReport, GrammarLoadError> {
    let fail = |failure| GrammarLoadError::new(profile, failure);

    let mut checked_node_kinds = 0;
    if options.node_kinds {
        for kind in profile.node_kinds {
            if !grammar.has_named_node_kind(kind) {
                return Err(fail(LoadFailure::MissingNodeKind(kind.to_string())));
            }
            checked_node_kinds += 1;
        }
    }

    let mut checked_supertypes = 0;
    if options.node_kinds {
        for kind in profile.supertypes {
            if !grammar.has_supertype(kind) {
                return Err(fail(LoadFailure::MissingSupertype(kind.to_string())));
            }
            checked_supertypes += 1;
        }
    }

    let mut checked_fields = 0;
    if options.fields {
        for field in profile.field_names {
            if !grammar.has_field(field) {
                return Err(fail(LoadFailure::MissingField(field.to_string())));
            }
            checked_fields += 1;
        }
    }

    let query_patterns = if options.queries && !profile.highlights_query.trim().is_empty() {
        let query = Query::new(grammar.language(), profile.highlights_query)
            .map_err(|e| fail(LoadFailure::InvalidQuery(e.to_string())))?;
        Some(query.pattern_count())
    } else {
        None
    };

    tracing::info!(
        "{} grammar verified: ABI {}, {} node kinds, {} fields",
        profile.display_name,
        grammar.abi_version(),
        grammar.node_kind_count(),
        grammar.field_count()
    );

    Ok(LoadReport {
        grammar: profile.name.to_string(),
        abi_version: grammar.abi_version(),
        node_kind_count: grammar.node_kind_count(),
        field_count: grammar.field_count(),
        checked_node_kinds,
        checked_supertypes,
        checked_fields,
        query_patterns,
    })
}

/// Outcome of a smoke test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Unverified,
    Verified(LoadReport),
    Failed(GrammarLoadError),
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified(_))
    }
}

/// A smoke test that transitions out of `Unverified` exactly once.
pub struct SmokeTest<'a, B: ?Sized> {
    binding: &'a B,
    profile: &'a GrammarProfile,
    options: CheckOptions,
    state: Verification,
}

impl<'a, B> SmokeTest<'a, B>
where
    B: GrammarBinding + ?Sized,
{
    pub fn new(binding: &'a B, profile: &'a GrammarProfile) -> Self {
        Self {
            binding,
            profile,
            options: CheckOptions::default(),
            state: Verification::Unverified,
        }
    }

    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> &Verification {
        &self.state
    }

    /// Run the test. Later calls return the recorded outcome.
    pub fn run(&mut self) -> &Verification {
        if self.state == Verification::Unverified {
            self.state = match run_test_with(self.binding, self.profile, self.options) {
                Ok(report) => Verification::Verified(report),
                Err(e) => {
                    tracing::warn!("{}", e);
                    Verification::Failed(e)
                }
            };
        }
        &self.state
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use objecttext_language::{StaticBinding, OBJECT_TEXT};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const JSON: GrammarProfile = GrammarProfile {
        name: "json",
        display_name: "JSON",
        symbol: "tree_sitter_json",
        file_extensions: &["json"],
        node_kinds: &["document", "object", "pair", "array", "string", "number"],
        field_names: &["key", "value"],
        supertypes: &[],
        highlights_query: tree_sitter_json::HIGHLIGHTS_QUERY,
    };

    static NULL_CALLS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn counting_null_language() -> *const () {
        NULL_CALLS.fetch_add(1, Ordering::SeqCst);
        std::ptr::null()
    }

    fn json_binding() -> StaticBinding {
        StaticBinding::new(tree_sitter_json::LANGUAGE)
    }

    #[test]
    fn test_run_test_passes_for_reference_grammar() {
        let report = run_test(&json_binding(), &JSON).unwrap();
        assert_eq!(report.grammar, "json");
        assert_eq!(report.checked_node_kinds, JSON.node_kinds.len());
        assert_eq!(report.checked_fields, 2);
        assert!(report.query_patterns.unwrap() > 0);
    }

    #[test]
    fn test_missing_node_kind_fails() {
        let err = run_test(&json_binding(), &OBJECT_TEXT).unwrap_err();
        assert_eq!(
            err.failure,
            LoadFailure::MissingNodeKind("source_file".to_string())
        );
        assert!(err
            .to_string()
            .starts_with("Error loading Object Text grammar"));
    }

    #[test]
    fn test_missing_supertype_fails() {
        let profile = GrammarProfile {
            supertypes: &["no_such_supertype"],
            ..JSON
        };
        let err = run_test(&json_binding(), &profile).unwrap_err();
        assert_eq!(
            err.failure,
            LoadFailure::MissingSupertype("no_such_supertype".to_string())
        );
        assert!(err
            .to_string()
            .starts_with("Error loading JSON grammar: missing supertype"));
    }

    #[test]
    fn test_missing_field_fails() {
        let profile = GrammarProfile {
            field_names: &["key", "operator"],
            ..JSON
        };
        let err = run_test(&json_binding(), &profile).unwrap_err();
        assert_eq!(err.failure, LoadFailure::MissingField("operator".to_string()));
    }

    #[test]
    fn test_invalid_query_fails() {
        let profile = GrammarProfile {
            highlights_query: "(no_such_node) @comment",
            ..JSON
        };
        let err = run_test(&json_binding(), &profile).unwrap_err();
        assert!(matches!(err.failure, LoadFailure::InvalidQuery(_)));
    }

    #[test]
    fn test_disabled_checks_are_skipped() {
        let options = CheckOptions {
            node_kinds: false,
            fields: false,
            queries: false,
        };
        let report = run_test_with(&json_binding(), &OBJECT_TEXT, options).unwrap();
        assert_eq!(report.checked_node_kinds, 0);
        assert_eq!(report.checked_supertypes, 0);
        assert_eq!(report.checked_fields, 0);
        assert_eq!(report.query_patterns, None);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let binding = json_binding();
        let first = run_test(&binding, &JSON).unwrap();
        let second = run_test(&binding, &JSON).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_smoke_test_runs_once() {
        let binding = unsafe { StaticBinding::from_raw(counting_null_language) };
        let mut test = SmokeTest::new(&binding, &OBJECT_TEXT);
        assert_eq!(test.state(), &Verification::Unverified);

        let first = test.run().clone();
        let second = test.run().clone();

        assert_eq!(first, second);
        assert_eq!(NULL_CALLS.load(Ordering::SeqCst), 1);
        match first {
            Verification::Failed(e) => assert_eq!(e.failure, LoadFailure::NullLanguage),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_smoke_test_verifies() {
        let binding = json_binding();
        let mut test = SmokeTest::new(&binding, &JSON);
        assert!(test.run().is_verified());
    }
}
