//! A full check run: verify the grammar, then parse the requested files.

use std::io::Write;
use std::path::PathBuf;

use objecttext_language::{GrammarBinding, GrammarProfile};
use serde::Serialize;

use crate::error::GrammarLoadError;
use crate::probe::{self, ProbeError, ProbeReport};
use crate::smoke::{self, CheckOptions, LoadReport};

#[derive(Debug)]
pub enum CheckError {
    Load(GrammarLoadError),
    Probe(ProbeError),
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckError::Load(e) => write!(f, "{e}"),
            CheckError::Probe(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Load(e) => Some(e),
            CheckError::Probe(e) => Some(e),
        }
    }
}

impl From<GrammarLoadError> for CheckError {
    fn from(e: GrammarLoadError) -> Self {
        CheckError::Load(e)
    }
}

impl From<ProbeError> for CheckError {
    fn from(e: ProbeError) -> Self {
        CheckError::Probe(e)
    }
}

/// Result of a check run, printed by the CLI as text or JSON
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    pub grammar: LoadReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<PathBuf>,
    pub files: Vec<ProbeReport>,
}

impl CheckOutput {
    pub fn with_library(mut self, library: impl Into<PathBuf>) -> Self {
        self.library = Some(library.into());
        self
    }

    /// Number of files whose tree contains errors
    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| f.has_error).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human readable report, one `path:row:col: kind node` line per problem
    pub fn write_text<W: Write>(&self, profile: &GrammarProfile, out: &mut W) -> std::io::Result<()> {
        let from = self
            .library
            .as_ref()
            .map(|path| format!(" from {}", path.display()))
            .unwrap_or_default();
        writeln!(
            out,
            "{} grammar loaded{} (ABI {}, {} node kinds, {} fields)",
            profile.display_name,
            from,
            self.grammar.abi_version,
            self.grammar.node_kind_count,
            self.grammar.field_count
        )?;

        for file in &self.files {
            if file.problems.is_empty() {
                writeln!(out, "{}: ok", file.source)?;
            }
            for problem in &file.problems {
                writeln!(
                    out,
                    "{}:{}:{}: {:?} {}",
                    file.source,
                    problem.row + 1,
                    problem.column + 1,
                    problem.kind,
                    problem.node_kind
                )?;
            }
        }
        Ok(())
    }
}

/// Verify the grammar behind `binding` and parse each of `files` with it.
pub fn run_check<B>(
    binding: &B,
    profile: &GrammarProfile,
    options: CheckOptions,
    files: &[PathBuf],
) -> Result<CheckOutput, CheckError>
where
    B: GrammarBinding + ?Sized,
{
    let (grammar, report) = smoke::verify(binding, profile, options)?;

    let mut probed = Vec::with_capacity(files.len());
    for path in files {
        if !profile.matches_path(path) {
            tracing::warn!(
                "{} does not look like a {} file",
                path.display(),
                profile.display_name
            );
        }
        probed.push(probe::probe_file(&grammar, path)?);
    }

    Ok(CheckOutput {
        grammar: report,
        library: None,
        files: probed,
    })
}
