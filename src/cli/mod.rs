pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "flashcard")]
#[command(about = "Flashcard CLI - companion tooling for the Flashcard API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint an HS256 bearer token for local development")]
    Token(commands::token::TokenArgs),

    #[command(about = "Probe a running server's health endpoint")]
    Health(commands::health::HealthArgs),

    #[command(about = "Create or reconcile the database schema")]
    InitDb(commands::init::InitDbArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format).await,
        Commands::Health(args) => commands::health::handle(args, output_format).await,
        Commands::InitDb(args) => commands::init::handle(args, output_format).await,
    }
}
