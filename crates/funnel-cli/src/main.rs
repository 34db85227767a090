mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    content::ContentSubcommand, copy::CopySubcommand, persona::PersonaSubcommand,
    suggest::SuggestSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "funnel",
    about = "Plan a marketing funnel: personas, content mapped to five stages, and copy",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .funnel/ or .git/)
    #[arg(long, global = true, env = "FUNNEL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .funnel/ and a default config in the project
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
        /// One-line description of the business, used in suggestions
        #[arg(long)]
        business: Option<String>,
    },

    /// Show personas, library size and per-stage counts
    State,

    /// Manage customer personas
    Persona {
        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },

    /// Manage content assets and their stage placement
    Content {
        #[command(subcommand)]
        subcommand: ContentSubcommand,
    },

    /// List stages below the per-stage goal
    Gaps {
        /// Items wanted per stage (default from config)
        #[arg(long)]
        goal: Option<usize>,
    },

    /// Render, generate, show or save funnel copy
    Copy {
        #[command(subcommand)]
        subcommand: CopySubcommand,
    },

    /// Get persona and content suggestions
    Suggest {
        #[command(subcommand)]
        subcommand: SuggestSubcommand,
    },

    /// Show wizard steps and which are unlocked
    Wizard,

    /// Run the HTTP API and copy proxy
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
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

    let result = match cli.command {
        Commands::Init { name, business } => {
            cmd::init::run(&root, name.as_deref(), business.as_deref())
        }
        Commands::State => cmd::state::run(&root, cli.json),
        Commands::Persona { subcommand } => cmd::persona::run(&root, subcommand, cli.json),
        Commands::Content { subcommand } => cmd::content::run(&root, subcommand, cli.json),
        Commands::Gaps { goal } => cmd::gaps::run(&root, goal, cli.json),
        Commands::Copy { subcommand } => cmd::copy::run(&root, subcommand, cli.json),
        Commands::Suggest { subcommand } => cmd::suggest::run(&root, subcommand, cli.json),
        Commands::Wizard => cmd::wizard::run(&root, cli.json),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
