mod commands;
mod context;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "wafflow")]
#[command(about = "Declarative management of AWS WAFv2 regex pattern sets", long_about = None)]
struct Cli {
    /// State document path (default: state_path from wafflow.yaml, then .wafflow/state.json)
    #[arg(long, global = true, env = "WAFFLOW_STATE")]
    state: Option<PathBuf>,

    /// Resource label; the state address is aws_wafv2_regex_pattern_set.<LABEL>
    #[arg(short, long, global = true, default_value = "default")]
    resource: String,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a regex pattern set from a YAML definition
    Create {
        /// Definition file
        file: PathBuf,
    },
    /// Refresh the state document from AWS
    Read,
    /// Update the regex pattern set in place
    Update {
        /// Definition file
        file: PathBuf,
    },
    /// Create, update or replace to match a definition
    Apply {
        /// Definition file
        file: PathBuf,
        /// Allow replacing the set when name or scope changed
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete the regex pattern set recorded in the state document
    Delete,
    /// Import an existing regex pattern set
    Import {
        /// Identifier in the form ID/NAME/SCOPE
        id: String,
    },
    /// Check a definition without calling AWS
    Validate {
        /// Definition file
        file: PathBuf,
    },
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Commands that never touch AWS or the state document
    match &cli.command {
        Commands::Version => {
            println!("wafflow {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Validate { file } => {
            return commands::validate::handle(file);
        }
        _ => {}
    }

    let ctx = context::Context::load(cli.state, &cli.resource)?;
    let resource = ctx.connect().await;
    let state = ctx.state_manager();
    let address = ctx.address();

    let result = match cli.command {
        Commands::Create { file } => {
            let config = utils::load_definition(&file)?;
            commands::create::handle(&resource, state, address, config).await?
        }
        Commands::Read => commands::read::handle(&resource, state, address).await?,
        Commands::Update { file } => {
            let config = utils::load_definition(&file)?;
            commands::update::handle(&resource, state, address, config).await?
        }
        Commands::Apply { file, yes } => {
            let config = utils::load_definition(&file)?;
            commands::apply::handle(&resource, state, address, config, yes).await?
        }
        Commands::Delete => commands::delete::handle(&resource, state, address).await?,
        Commands::Import { id } => {
            commands::import::handle(&resource, state, address, &id).await?
        }
        Commands::Version | Commands::Validate { .. } => {
            unreachable!("handled before loading settings")
        }
    };

    println!("{} {}", "✓".green().bold(), result);
    Ok(())
}
