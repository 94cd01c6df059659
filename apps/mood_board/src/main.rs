use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    DryRunExecutor, TransactionExecutor, VoteController, WalletBridgeExecutor, WalletSession,
};
use shared::domain::{Identity, Network, ObjectId, PackageId};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod repl;

use commands::HELP;

#[derive(Parser, Debug)]
#[command(about = "Vote your mood on a shared on-chain board")]
struct Args {
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    network: Option<Network>,
    #[arg(long)]
    package_id: Option<PackageId>,
    #[arg(long)]
    board_id: Option<ObjectId>,
    /// Wallet bridge that signs and submits calls; dry run when unset.
    #[arg(long)]
    bridge_url: Option<String>,
    /// Connect this account on startup.
    #[arg(long)]
    identity: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(network) = args.network {
        settings.network = network;
    }
    if let Some(package_id) = args.package_id {
        settings.package_id = Some(package_id);
    }
    if let Some(board_id) = args.board_id {
        settings.board_id = Some(board_id);
    }
    if let Some(raw) = args.bridge_url.as_deref() {
        settings.bridge_url = Some(config::parse_bridge_url(raw).context("--bridge-url")?);
    }
    let (target, board) = settings.vote_target()?;

    let executor: Arc<dyn TransactionExecutor> = match &settings.bridge_url {
        Some(url) => {
            info!(%url, network = %settings.network, "using wallet bridge");
            Arc::new(WalletBridgeExecutor::new(
                url,
                settings.network,
                settings.bridge_timeout,
            )?)
        }
        None => {
            warn!("no wallet bridge configured; votes are logged, not submitted");
            Arc::new(DryRunExecutor::default())
        }
    };

    let session = Arc::new(WalletSession::default());
    if let Some(address) = args.identity {
        session.connect(Identity::new(address));
    }

    let controller = VoteController::new(session.clone(), executor, target, board);
    let printer = tokio::spawn(repl::print_notifications(
        controller.subscribe_notifications(),
    ));

    println!(
        "Mood Board on {} ({})",
        settings.network,
        settings.network.fullnode_url()
    );
    repl::print_board(&controller);
    repl::print_tally(&controller.tally().await);
    println!("{HELP}");

    repl::run(BufReader::new(tokio::io::stdin()), session, controller).await?;
    printer.await.context("notification printer failed")?;

    Ok(())
}
