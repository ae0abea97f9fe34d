//! Loads the compiled Object Text grammar into the tree-sitter runtime and
//! verifies the runtime accepts it.

pub mod check;
pub mod config;
pub mod discovery;
pub mod error;
pub mod probe;
pub mod runtime;
pub mod services;
pub mod smoke;

pub use check::{run_check, CheckError, CheckOutput};
pub use error::{GrammarLoadError, LoadFailure};
pub use runtime::{construct_language, LoadedGrammar};
pub use smoke::{run_test, run_test_with, verify, CheckOptions, LoadReport, SmokeTest, Verification};
