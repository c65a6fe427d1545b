//! Diary CLI
//!
//! Personal journal static site generator with a live preview server.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Diary.
#[derive(Parser)]
#[command(
    name = "diary",
    version,
    about = "A personal journal static site generator"
)]
struct Cli {
    /// Site root containing _config.yml
    #[arg(short, long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Render the site into the public directory
    Build,
    /// Serve the site, rendering every page on request
    Server {
        /// Port to listen on
        #[arg(short, long, default_value_t = 4000)]
        port: u16,
        /// Address to bind
        #[arg(short, long, default_value = "localhost")]
        ip: String,
        /// Open browser automatically
        #[arg(long)]
        open: bool,
    },
    /// Create a new journal entry
    New {
        /// Entry title (defaults to the current time)
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    diary::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build => {
            diary::cmd::build::run(&cli.dir)?;
        }
        Commands::Server { port, ip, open } => {
            diary::cmd::server::run(&cli.dir, &ip, port, open).await?;
        }
        Commands::New { title } => {
            diary::cmd::new::run(&cli.dir, title.as_deref())?;
        }
    }

    Ok(())
}
