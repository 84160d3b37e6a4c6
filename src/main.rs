use anyhow::Result;
use arcview::index::build::{build_archive, BuildOptions};
use arcview::index::{stats, StoreHandle};
use arcview::output;
use arcview::query::{sorted_matches, QueryEvaluator, SearchMode};
use arcview::router::Location;
use arcview::session::{RenderInstruction, Session};
use arcview::utils::{logging, AppConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "arcview")]
#[command(about = "Search and browse an offline archive of chat transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Archive directory (falls back to $ARCVIEW_ARCHIVE, the config file, then ./public)
    #[arg(short, long, global = true)]
    archive: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the archive documents from a directory of chat text files
    Build {
        /// Directory holding the chat files
        src: PathBuf,

        /// Output directory (defaults to the archive directory)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// File name patterns to include (repeatable)
        #[arg(short = 'g', long = "glob")]
        patterns: Vec<String>,

        /// No progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show archive statistics
    Stats,
    /// Print the conversations matching a query
    Search {
        /// Query text
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,

        /// Match the query as a literal substring instead of words
        #[arg(short, long)]
        pattern: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Print the render instruction a location fragment produces, as JSON
    Render {
        /// Location fragment such as '#/chat/12?q=rust'
        #[arg(default_value = "#/")]
        fragment: String,
    },
    /// Browse the archive interactively (the default)
    Browse {
        /// Location fragment to open at
        #[arg(short, long)]
        location: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let archive = config.resolve_archive_dir(cli.archive.as_deref());

    match cli.command {
        Some(Commands::Build { src, out, patterns, quiet }) => {
            logging::init_stderr();
            let mut options = BuildOptions {
                silent: quiet,
                ..BuildOptions::default()
            };
            if !patterns.is_empty() {
                options.patterns = patterns;
            }
            let out = out.unwrap_or(archive);
            build_archive(&src, &out, &options)?;
        }
        Some(Commands::Stats) => {
            logging::init_stderr();
            let store = StoreHandle::open(&archive)?;
            stats::show_stats(&store)?;
        }
        Some(Commands::Search { query, pattern, json, no_color }) => {
            logging::init_stderr();
            search(&archive, &query.join(" "), pattern, json, !no_color)?;
        }
        Some(Commands::Render { fragment }) => {
            logging::init_stderr();
            render(&archive, &fragment, &config)?;
        }
        Some(Commands::Browse { location }) => browse(archive, location, &config)?,
        None => browse(archive, None, &config)?,
    }

    Ok(())
}

fn search(archive: &Path, query: &str, pattern: bool, json: bool, color: bool) -> Result<()> {
    let store = StoreHandle::open(archive)?;
    let mode = SearchMode::from_pattern_flag(pattern);
    let matches = QueryEvaluator::new(&store).evaluate(query, mode);
    let records = sorted_matches(&store, &matches);

    if json {
        output::print_search_json(&records, query)?;
    } else if records.is_empty() {
        eprintln!("No conversations match {:?}", query);
    } else {
        output::print_search_results(&records, query, color)?;
    }

    Ok(())
}

fn render(archive: &Path, fragment: &str, config: &AppConfig) -> Result<()> {
    let instruction = match StoreHandle::open(archive) {
        Ok(store) => {
            let session = Session::new(&store, Location::parse(fragment), config.session_options());
            session.render()
        }
        Err(err) => {
            tracing::error!(error = %err, "archive failed to load");
            let fatal = RenderInstruction::fatal(&err);
            println!("{}", serde_json::to_string_pretty(&fatal)?);
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(&instruction)?);
    Ok(())
}

#[cfg(feature = "interactive")]
fn browse(archive: PathBuf, location: Option<String>, config: &AppConfig) -> Result<()> {
    let log_path = arcview::utils::get_log_path()?;
    logging::init_file(&log_path)?;
    arcview::tui::run(archive, location, config)
}

#[cfg(not(feature = "interactive"))]
fn browse(_archive: PathBuf, _location: Option<String>, _config: &AppConfig) -> Result<()> {
    anyhow::bail!("arcview was built without the `interactive` feature; use `arcview search` or `arcview render`")
}
