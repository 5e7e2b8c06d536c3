mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    achievement::AchievementSubcommand, config::ConfigSubcommand, invite::InviteSubcommand,
    quest::QuestSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "levelup",
    about = "Track progress, unlock achievements, finish quests",
    version,
    propagate_version = true
)]
struct Cli {
    /// Store root (default: nearest directory with .levelup/, else cwd)
    #[arg(long, global = true, env = "LEVELUP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the .levelup store with the built-in catalogs
    Init {
        /// Player name (default: $USER)
        #[arg(long)]
        name: Option<String>,
    },

    /// Show level, XP, skills and unlocks
    Status,

    /// Evaluate a progress snapshot (YAML or JSON file, '-' for stdin)
    Evaluate { file: PathBuf },

    /// Browse achievements
    Achievement {
        #[command(subcommand)]
        subcommand: AchievementSubcommand,
    },

    /// Start, progress and close quests
    Quest {
        #[command(subcommand)]
        subcommand: QuestSubcommand,
    },

    /// Issue invite codes for family members
    Invite {
        #[command(subcommand)]
        subcommand: InviteSubcommand,
    },

    /// Validate the store configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { name } => cmd::init::run(&root, name.as_deref()),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Evaluate { file } => cmd::evaluate::run(&root, &file, cli.json),
        Commands::Achievement { subcommand } => cmd::achievement::run(&root, subcommand, cli.json),
        Commands::Quest { subcommand } => cmd::quest::run(&root, subcommand, cli.json),
        Commands::Invite { subcommand } => cmd::invite::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
