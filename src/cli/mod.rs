pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tgw")]
#[command(about = "Tenant gateway CLI - run the gateway, mint and inspect tokens, check decisions")]
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
    #[command(about = "Run the HTTP gateway")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides TENANT_GATEWAY_PORT / PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Mint and inspect identity tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Show the gateway decision for a path")]
    Check {
        #[arg(help = "Request path, e.g. /api/meetings")]
        path: String,
        #[arg(long, help = "Bearer token to present")]
        token: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Serve { port } => commands::serve::handle(config, port).await,
        Commands::Token { cmd } => commands::token::handle(cmd, &config, output_format),
        Commands::Check { path, token } => {
            commands::check::handle(&path, token.as_deref(), &config, output_format)
        }
    }
}
