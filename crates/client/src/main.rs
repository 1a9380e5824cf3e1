//! Cypher game client binary.
//!
//! Composition root: loads configuration, sets up logging, assembles the
//! session through `client-bootstrap` and runs one subcommand.
//!
//! # Examples
//!
//! ```bash
//! CYPHER_ACCOUNT=0x... cypher start 1.5 --guess "Vitalik Buterin"
//! cypher guess "Jesse Pollak"
//! cypher watch
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

use client_bootstrap::{ClientConfig, SessionBuilder};
use client_frontend_core::FrontendConfig;
use cypher_client::{Client, ConsoleFrontend, commands, logging};

#[derive(Parser, Debug)]
#[command(name = "cypher", version, about = "Daily on-chain KOL guessing game")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current round and your guesses
    Status {
        /// Print the session view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stake tokens and start today's game
    Start {
        /// Stake in whole tokens, e.g. 1.5
        amount: String,
        /// Submit this guess once the game is active
        #[arg(long)]
        guess: Option<String>,
    },
    /// Guess a profile by name
    Guess { name: String },
    /// Claim winnings of a finalized round
    Claim,
    /// Search the catalog by name, handle or ecosystem
    Search { term: String },
    /// Print the spoiler-free share post
    Share,
    /// Follow the session and print notices until Ctrl-C
    Watch,
    /// Catalog target for a round, or for today
    Target {
        #[arg(long)]
        round: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 1. Load configuration from environment
    let client_config = ClientConfig::from_env()?;
    let frontend_config = FrontendConfig::from_env();

    // 2. Setup logging
    let _log_guard = logging::setup_logging(client_config.session_id.as_deref())?;

    tracing::info!("Starting Cypher client");
    tracing::info!(
        "Network: chain {} via {}",
        client_config.evm.chain_id,
        client_config.evm.rpc_url
    );

    // 3. Assemble catalog, contract client and session
    let setup = SessionBuilder::new(client_config).build().await?;
    let controller = setup.controller.clone();
    let decimals = controller.config().game_config.token_decimals;

    let output = match cli.command {
        Command::Watch => {
            let frontend = ConsoleFrontend::new(frontend_config, decimals);
            let client = Client::builder().session(setup).frontend(frontend).build()?;
            client.run().await?;
            tracing::info!("Client shutdown complete");
            return Ok(());
        }
        Command::Status { json } => commands::status(&controller, json)?,
        Command::Start { amount, guess } => {
            commands::start(&controller, &amount, guess.as_deref()).await?
        }
        Command::Guess { name } => commands::guess(&controller, &name).await?,
        Command::Claim => commands::claim(&controller).await?,
        Command::Search { term } => commands::search(&controller, &term),
        Command::Share => commands::share(&controller, &frontend_config.share),
        Command::Target { round } => commands::target(&controller, round).await?,
    };

    println!("{output}");
    setup.shutdown().await;
    Ok(())
}
