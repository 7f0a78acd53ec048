//! # bbg CLI
//!
//! Command-line interface for the bbg static site generator.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bbg")]
#[command(author, version, about = "A small static blog generator", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Build the static site
    Build {
        /// Keep running and rebuild when sources change
        #[arg(long)]
        watch: bool,
    },

    /// Start development server with live rebuilds
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        hostname: String,

        /// Server port
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Open the site in a browser once the server is up
        #[arg(long)]
        open: bool,
    },

    /// Create a new post
    New {
        /// Post title
        title: String,

        /// Publication date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SSZ); defaults to now
        #[arg(long)]
        date: Option<String>,

        /// Override the slug derived from the title
        #[arg(long)]
        slug: Option<String>,

        /// Open the new post in $EDITOR
        #[arg(long)]
        edit: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build { watch: false } => commands::build_site(&cli.config),
        Commands::Build { watch: true } => commands::build_and_watch(&cli.config).await,
        Commands::Serve {
            hostname,
            port,
            open,
        } => commands::serve_site(&cli.config, &hostname, port, open).await,
        Commands::New {
            title,
            date,
            slug,
            edit,
        } => {
            let opts = commands::NewPostOptions { date, slug, edit };
            commands::new_post(&cli.config, &title, opts).map(|_| ())
        }
    }
}
