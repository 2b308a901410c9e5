//! `jsoml` command line interface.

mod check;
mod config;
mod render;
mod util;

use clap::{Parser, Subcommand};
use color_eyre::{config::HookBuilder, eyre::Result};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Render and check JSOML documents.
#[derive(Parser, Debug)]
#[command(name = "jsoml", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a document to HTML or to a JSON dump of output nodes
    Render(render::RenderArgs),
    /// Render a document and report every fragment that failed
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    HookBuilder::default()
        .display_env_section(false)
        .issue_url("https://github.com/water-rs/jsoml/issues/new")
        .install()?;

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();

    match cli.command {
        Commands::Render(args) => render::run(args),
        Commands::Check(args) => check::run(args),
    }
}
