use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use workbench_core::NodeKind;
use workbench_infrastructure::{ConfigService, WorkbenchPaths};

mod commands;
mod logging;
mod ui;

#[derive(Parser)]
#[command(name = "awb")]
#[command(about = "AWS Workbench - inspect and edit the persisted workbench tree", long_about = None)]
struct Cli {
    /// Directory holding config.toml and state/ (defaults to the platform config dir)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tree
    Show {
        /// Include hidden nodes
        #[arg(long)]
        all: bool,
        /// Only favorites and the folders leading to them
        #[arg(long)]
        favorites: bool,
        /// Case-insensitive label filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Add a node
    Add {
        /// folder, command, note or file
        #[arg(value_parser = parse_kind)]
        kind: NodeKind,
        title: String,
        /// Parent node id (or unique prefix); omitted adds a root
        #[arg(long)]
        parent: Option<String>,
        /// Command id, note text or file path
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove a node and everything below it
    Remove {
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a node under another parent, or to the top level
    Move {
        id: String,
        #[arg(long)]
        parent: Option<String>,
        /// Position among the new siblings
        #[arg(long)]
        index: Option<usize>,
    },
    /// Mark or unmark a favorite
    Favorite {
        id: String,
        #[arg(long)]
        off: bool,
    },
    /// Hide or unhide a node
    Hide {
        id: String,
        #[arg(long)]
        off: bool,
    },
    /// Set the display alias; without ALIAS the alias is cleared
    Alias { id: String, alias: Option<String> },
    /// Show a node's content
    View { id: String },
    /// Change a node's main value
    Edit { id: String, value: String },
    /// Run a node
    Run { id: String },
    /// List registered node types
    Types,
}

fn parse_kind(value: &str) -> std::result::Result<NodeKind, String> {
    value
        .parse()
        .map_err(|_| format!("unknown node kind '{}'", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = WorkbenchPaths::new(cli.base_dir.as_deref())?;
    let loaded = ConfigService::load(&paths.config_file());
    let config = loaded.as_ref().cloned().unwrap_or_default();
    logging::init(&config.log_level);
    if let Err(e) = &loaded {
        tracing::warn!("[Config] Ignoring {}: {}", paths.config_file().display(), e);
    }

    commands::tree::execute(cli.command, &paths, &config).await
}
