pub mod tracing;

use objecttext_language::GrammarProfile;

/// Profile for the statically linked JSON grammar used as a known-good table.
pub const JSON: GrammarProfile = GrammarProfile {
    name: "json",
    display_name: "JSON",
    symbol: "tree_sitter_json",
    file_extensions: &["json"],
    node_kinds: &["document", "object", "pair", "array", "string", "number"],
    field_names: &["key", "value"],
    supertypes: &[],
    highlights_query: tree_sitter_json::HIGHLIGHTS_QUERY,
};

/// A language table header with an arbitrary ABI version and no real tables.
///
/// Only the version field is ever read: the runtime rejects the table before
/// touching anything else.
#[repr(C)]
pub struct ForgedTable {
    pub abi_version: u32,
    pub rest: [u8; 512],
}
