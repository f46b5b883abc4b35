//! Overlay CLI - serves a mobile app's packaged `www` with live copies of
//! locally linked plugins layered on top.

mod commands;
mod discovery;
mod output;
mod server;
mod watcher;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::{Result, miette};
use overlay_core::Platform;
use overlay_engine::OverlayConfig;
use tracing_subscriber::EnvFilter;

/// Port served when none is given.
const DEFAULT_PORT: u16 = 8333;

#[derive(Parser)]
#[command(name = "overlay")]
#[command(
    author,
    version,
    about = "Live-reload overlay server for locally linked plugins"
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Target platform (android or ios)
    #[arg(value_name = "PLATFORM")]
    platform: Option<Platform>,

    /// Port to serve on
    #[arg(value_name = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Project directory containing package.json (auto-detected if not specified)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Directory the shadow copies are written to
    #[arg(long, global = true)]
    shadow_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List local plugins and the rules extracted from them
    List {
        /// Target platform (android or ios)
        #[arg(value_name = "PLATFORM")]
        platform: Option<Platform>,

        /// Show every rule
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // The platform is checked before anything touches the filesystem
    let platform = match &cli.command {
        Some(Commands::List { platform, .. }) => *platform,
        None => cli.platform,
    }
    .ok_or_else(|| {
        miette!("No valid platform found! Expected \"android\" or \"ios\" as an argument")
    })?;

    let project_root = match &cli.project {
        Some(path) => discovery::canonical_project_root(path)?,
        None => discovery::find_project_root()?,
    };

    let mut config = OverlayConfig::new(&project_root, platform);
    if let Some(shadow_dir) = &cli.shadow_dir {
        config = config.with_shadow_root(project_root.join(shadow_dir));
    }

    match cli.command {
        Some(Commands::List { detailed, .. }) => commands::list::execute(config, detailed),
        None => commands::serve::execute(config, cli.port).await,
    }
}

/// Installs the tracing subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "overlay_cli={level},overlay_engine={level},tower_http={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
