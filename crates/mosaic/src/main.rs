//! Mosaic CLI - assembles and packages the practice website.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(about = "Component assembler and production packager for a static website")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the page from its template and section fragments
    Assemble {
        /// Template with placeholder containers
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Directory holding the section fragments
        #[arg(long)]
        components: Option<PathBuf>,

        /// Composed document destination
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the deployable output directory
    Package {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minify HTML and CSS
        #[arg(long)]
        minify: bool,
    },

    /// Preview the packaged site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to the package output)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Re-assemble whenever the template or a fragment changes
    Watch,

    /// Print the rendered blog article panel
    Articles {
        /// Site directory containing data/articles.json
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config = commands::config::load(&cli.config)?;

    match cli.command {
        Commands::Assemble {
            template,
            components,
            output,
        } => {
            commands::assemble::run(&config, template, components, output)?;
        }
        Commands::Package { output, minify } => {
            let minify = if minify { Some(true) } else { None };
            commands::package::run(&config, output, minify)?;
        }
        Commands::Serve { port, dir, no_open } => {
            commands::serve::run(&config, port, dir, !no_open).await?;
        }
        Commands::Watch => {
            commands::watch::run(&config).await?;
        }
        Commands::Articles { root } => {
            commands::articles::run(&config, root).await?;
        }
    }

    Ok(())
}
