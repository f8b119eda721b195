//! Postermill CLI: batch poster compositing from the command line.
//!
//! Usage:
//!   postermill compose [OPTIONS]   Composite every source image onto the base
//!   postermill preview [OPTIONS]   Show the output names for a source folder
//!   postermill check [OPTIONS]     Inspect the base image and source folder
//!   postermill init [--force]      Write the config file with current defaults

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postermill_common::config::{AppConfig, LoggingConfig};

mod commands;

use commands::{FormatArgs, NamingArgs};

#[derive(Parser)]
#[command(
    name = "postermill",
    about = "Place an image on a template once, then composite a whole folder",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite every image in a folder onto the base image
    Compose {
        /// Base (template) image
        #[arg(long)]
        base: PathBuf,

        /// Folder with the images to place
        #[arg(long)]
        sources: PathBuf,

        /// Output folder (created if missing)
        #[arg(short, long)]
        output: PathBuf,

        /// Placement rectangle in base pixels: x,y,w,h
        #[arg(long)]
        rect: Option<String>,

        /// Center the rectangle on the base
        #[arg(long)]
        center: bool,

        /// Keep the overlay's aspect ratio when applying --rect
        #[arg(long)]
        lock_aspect: bool,

        /// Archive the output folder afterwards: none, zip, tar-gz
        #[arg(long)]
        archive: Option<String>,

        /// Maximum concurrent workers (never more than 4)
        #[arg(long)]
        workers: Option<usize>,

        #[command(flatten)]
        format: FormatArgs,

        #[command(flatten)]
        naming: NamingArgs,
    },

    /// Preview output names for the first files of a folder
    Preview {
        /// Folder with the images to place
        #[arg(long)]
        sources: Option<PathBuf>,

        #[command(flatten)]
        format: FormatArgs,

        #[command(flatten)]
        naming: NamingArgs,
    },

    /// Show base dimensions, eligible sources and the default placement
    Check {
        /// Base (template) image
        #[arg(long)]
        base: PathBuf,

        /// Folder with the images to place
        #[arg(long)]
        sources: Option<PathBuf>,
    },

    /// Write the configuration file with the current defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let logging = if cli.verbose || cli.json_logs {
        LoggingConfig::for_verbosity(cli.verbose, cli.json_logs)
    } else {
        config.logging.clone()
    };
    postermill_common::logging::init_logging(&logging);
    tracing::debug!(
        config = %postermill_common::config::config_file_path().display(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Compose {
            base,
            sources,
            output,
            rect,
            center,
            lock_aspect,
            archive,
            workers,
            format,
            naming,
        } => {
            let options = commands::compose::ComposeOptions {
                base,
                sources,
                output,
                rect,
                center,
                lock_aspect,
                archive: commands::resolve_archive(archive.as_deref(), &config.output)?,
                workers: workers.unwrap_or(config.batch.max_workers),
                format: format.resolve(&config.output)?,
                naming: naming.resolve(&config.naming)?,
            };
            commands::compose::run(options, &config).await
        }
        Commands::Preview {
            sources,
            format,
            naming,
        } => commands::preview::run(
            sources,
            naming.resolve(&config.naming)?,
            format.resolve(&config.output)?,
        ),
        Commands::Check { base, sources } => commands::check::run(base, sources, &config),
        Commands::Init { force } => commands::init::run(force, &config),
    }
}
