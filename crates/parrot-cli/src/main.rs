//! parrot — chat relay for MCP-style tool gateways
//!
//! Subcommands:
//!   serve      run the browser-facing chat frontend
//!   call       invoke a tool or agent once and print the reply
//!   agents     list active agents registered with the gateway
//!   mint       mint a bearer token and print it
//!   clear-db   drop every table in the gateway database

mod db;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use parrot_core::{CommandTokenIssuer, Config, TokenIssuer};
use parrot_relay::{RelayClient, Target};

#[derive(Parser)]
#[command(name = "parrot", version, about = "Chat relay for MCP-style tool gateways")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the browser-facing chat frontend
    Serve {
        /// Listen address, e.g. 127.0.0.1:8000
        #[arg(long)]
        bind: Option<String>,
    },
    /// Invoke a tool or agent once and print the reply
    Call {
        /// The prompt to send
        prompt: String,
        /// Address a fixed tool by name
        #[arg(long, conflicts_with = "agent")]
        tool: Option<String>,
        /// Address an agent's chat capability
        #[arg(long)]
        agent: Option<String>,
    },
    /// List active agents registered with the gateway
    Agents,
    /// Mint a bearer token via the configured issuer and print it
    Mint,
    /// Drop every table in the gateway database
    ClearDb {
        /// SQLite file to wipe (defaults to the configured path)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    debug!("Gateway RPC endpoint: {}", config.gateway.rpc_url());

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.frontend.bind = bind;
            }
            parrot_frontend::serve(&config).await
        }

        Commands::Call {
            prompt,
            tool,
            agent,
        } => {
            let target = match (tool, agent) {
                (Some(name), None) => Target::Tool(name),
                (None, Some(name)) => Target::Agent(name),
                _ => bail!("one of --tool or --agent is required"),
            };
            let client = RelayClient::from_config(&config);
            let reply = client.invoke(&target, &prompt).await?;
            println!("{}", reply);
            Ok(())
        }

        Commands::Agents => {
            let client = RelayClient::from_config(&config);
            let agents = client.list_agents().await?;
            if agents.is_empty() {
                eprintln!("No active agents registered with the gateway.");
            }
            for agent in agents {
                println!("{}", agent.name);
            }
            Ok(())
        }

        Commands::Mint => {
            let issuer = CommandTokenIssuer::new(config.token.clone());
            let token = issuer.mint().await?;
            let expires =
                chrono::Local::now() + chrono::Duration::seconds(config.token.expiry_secs as i64);
            println!("{}", token.as_str());
            eprintln!("expires around {}", expires.format("%Y-%m-%d %H:%M:%S"));
            Ok(())
        }

        Commands::ClearDb { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(&config.gateway.db_path));
            let dropped = db::clear_database(&path)?;
            if dropped == 0 {
                println!("No tables found in {}. Nothing to do.", path.display());
            } else {
                println!("Dropped {} tables from {}.", dropped, path.display());
            }
            Ok(())
        }
    }
}
