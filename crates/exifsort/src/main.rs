//! exifsort CLI - sort photos into a dated directory tree by EXIF capture time.
//!
//! Every JPEG under the source directory that carries a capture timestamp is
//! moved to `<to>/<year>/<year>.<month>.<day>_<hour>.<minute>.<second>.jpg`.
//! Everything else stays where it is.
//!
//! # Usage
//!
//! ```bash
//! # Sort a camera dump
//! exifsort sort --from ./dcim --to ~/Pictures/sorted
//!
//! # Refuse to replace files that already exist at the destination
//! exifsort sort --from ./dcim --to ~/Pictures/sorted --on-conflict fail
//!
//! # View configuration
//! exifsort config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// exifsort - sort photos into a dated directory tree by EXIF capture time.
#[derive(Parser, Debug)]
#[command(name = "exifsort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Move dated images from a source tree into a dated destination tree
    Sort(cli::sort::SortArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match exifsort_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `exifsort config path`."
            );
            exifsort_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("exifsort v{}", exifsort_core::VERSION);

    match cli.command {
        Commands::Sort(args) => cli::sort::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}
