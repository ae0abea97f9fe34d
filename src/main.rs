use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use objecttext_check::check;
use objecttext_check::config::Config;
use objecttext_check::discovery::{self, library_from_env};
use objecttext_check::services::{log_dirs, tracing_setup};
use objecttext_language::{LocalGrammarLocator, OBJECT_TEXT};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Verify that the compiled Object Text grammar loads in the tree-sitter runtime
#[derive(Parser, Debug)]
#[command(name = "objecttext-check")]
#[command(about = "Load the Object Text grammar and optionally parse files with it", long_about = None)]
#[command(version)]
struct Args {
    /// Object Text files to parse once the grammar has loaded
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Path to the compiled grammar library (overrides OBJECTTEXT_GRAMMAR_LIB
    /// and the config file)
    #[arg(long, value_name = "PATH")]
    library: Option<PathBuf>,

    /// Accessor symbol exported by the grammar library
    #[arg(long, value_name = "NAME")]
    symbol: Option<String>,

    /// Extra directory to search for the grammar library (repeatable)
    #[arg(long = "grammar-dir", value_name = "DIR")]
    grammar_dirs: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Write logs to the per-process file in the state directory
    #[arg(long, conflicts_with = "log_file")]
    log_to_state_dir: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Don't compile the bundled highlights query
    #[arg(long)]
    skip_queries: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the directories used by the checker and exit
    #[arg(long)]
    show_paths: bool,
}

fn load_config(args: &Args) -> AnyhowResult<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load user config")?,
    };

    if let Some(symbol) = &args.symbol {
        config.grammar.symbol = symbol.clone();
    }
    config
        .grammar
        .search_dirs
        .splice(0..0, args.grammar_dirs.iter().cloned());
    if args.skip_queries {
        config.checks.queries = false;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    if args.show_paths {
        log_dirs::print_all_paths();
        return Ok(());
    }

    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let log_file = if args.log_to_state_dir {
        log_dirs::cleanup_stale_logs();
        Some(log_dirs::main_log_path())
    } else {
        args.log_file.clone()
    };
    tracing_setup::init_global(log_file.as_deref(), LevelFilter::INFO)
        .context("Failed to initialise logging")?;

    let locator =
        LocalGrammarLocator::new().with_extra_dirs(config.grammar.search_dirs.iter().cloned());
    let library_path = discovery::resolve_library_path(
        args.library.as_deref(),
        library_from_env(),
        config.grammar.library.as_deref(),
        &locator,
        &OBJECT_TEXT,
    )?;
    let library = discovery::open_library(&library_path, &config.grammar.symbol, &OBJECT_TEXT)?;

    let output = check::run_check(&library, &OBJECT_TEXT, config.checks.options(), &args.files)?
        .with_library(library_path);

    if args.json {
        println!("{}", output.to_json()?);
    } else {
        output.write_text(&OBJECT_TEXT, &mut std::io::stdout().lock())?;
    }

    let failed = output.failed_files();
    if failed > 0 {
        anyhow::bail!("{} file(s) contain syntax errors", failed);
    }

    Ok(())
}
