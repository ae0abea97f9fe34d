//! Parse probe: run the loaded grammar over real files and report syntax errors.

use serde::Serialize;
use std::path::Path;
use tree_sitter::Tree;

use crate::runtime::LoadedGrammar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    Error,
    Missing,
}

/// An `ERROR` or `MISSING` node in a parse tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxProblem {
    pub kind: ProblemKind,
    /// Zero-based row
    pub row: usize,
    /// Zero-based byte column
    pub column: usize,
    /// Node kind the runtime reported (for MISSING nodes, the expected token)
    pub node_kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub source: String,
    pub root_kind: String,
    pub has_error: bool,
    pub problems: Vec<SyntaxProblem>,
}

#[derive(Debug)]
pub enum ProbeError {
    Io(String),
    Language(String),
    ParseFailed(String),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Io(msg) => write!(f, "IO error: {msg}"),
            ProbeError::Language(msg) => write!(f, "Language error: {msg}"),
            ProbeError::ParseFailed(source) => write!(f, "Parser produced no tree for {source}"),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Parse `text` with the loaded grammar. Text need not be valid UTF-8.
pub fn probe_source(
    grammar: &LoadedGrammar<'_>,
    source: &str,
    text: impl AsRef<[u8]>,
) -> Result<ProbeReport, ProbeError> {
    let mut parser = grammar
        .parser()
        .map_err(|e| ProbeError::Language(e.to_string()))?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| ProbeError::ParseFailed(source.to_string()))?;

    let root = tree.root_node();
    let problems = collect_problems(&tree);
    tracing::debug!(
        "Parsed {}: root {}, {} problem(s)",
        source,
        root.kind(),
        problems.len()
    );

    Ok(ProbeReport {
        source: source.to_string(),
        root_kind: root.kind().to_string(),
        has_error: root.has_error(),
        problems,
    })
}

/// Read and parse a file
pub fn probe_file(grammar: &LoadedGrammar<'_>, path: &Path) -> Result<ProbeReport, ProbeError> {
    let text = std::fs::read(path)
        .map_err(|e| ProbeError::Io(format!("{}: {}", path.display(), e)))?;
    probe_source(grammar, &path.display().to_string(), &text)
}

/// Walk the tree depth-first, only descending into subtrees that contain errors.
fn collect_problems(tree: &Tree) -> Vec<SyntaxProblem> {
    let mut problems = Vec::new();
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        let kind = if node.is_error() {
            Some(ProblemKind::Error)
        } else if node.is_missing() {
            Some(ProblemKind::Missing)
        } else {
            None
        };
        if let Some(kind) = kind {
            let position = node.start_position();
            problems.push(SyntaxProblem {
                kind,
                row: position.row,
                column: position.column,
                node_kind: node.kind().to_string(),
            });
        }

        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return problems;
            }
        }
    }
}
