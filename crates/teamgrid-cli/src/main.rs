mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{grid::GridSubcommand, project::ProjectSubcommand, user::UserSubcommand};
use std::path::PathBuf;
use teamgrid_core::config::StorageKind;

#[derive(Parser)]
#[command(
    name = "teamgrid",
    about = "Team availability grid: serve the API, manage projects, and mark half-day availability",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .teamgrid/ or .git/)
    #[arg(long, global = true, env = "TEAMGRID_ROOT")]
    root: Option<PathBuf>,

    /// Server origin (default: host and port from .teamgrid/config.yaml)
    #[arg(long, global = true, env = "TEAMGRID_SERVER")]
    server: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .teamgrid/ with a default config
    Init {
        /// Port written to the new config
        #[arg(long)]
        port: Option<u16>,

        /// Storage backend written to the new config
        #[arg(long, value_enum)]
        storage: Option<StorageArg>,
    },

    /// Run the HTTP API and live update stream
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Manage projects, members, and sprints
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// View and edit the availability grid
    Grid {
        #[command(subcommand)]
        subcommand: GridSubcommand,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StorageArg {
    Memory,
    Redb,
}

impl From<StorageArg> for StorageKind {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::Memory => StorageKind::Memory,
            StorageArg::Redb => StorageKind::Redb,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. }
        | Commands::Grid {
            subcommand: GridSubcommand::Watch { .. },
        } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let server = cli.server.as_deref();

    let result = match cli.command {
        Commands::Init { port, storage } => cmd::init::run(&root, port, storage.map(Into::into)),
        Commands::Serve { host, port } => cmd::serve::run(&root, host, port),
        Commands::User { subcommand } => cmd::user::run(&root, server, subcommand, cli.json),
        Commands::Project { subcommand } => {
            cmd::project::run(&root, server, subcommand, cli.json)
        }
        Commands::Grid { subcommand } => cmd::grid::run(&root, server, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
