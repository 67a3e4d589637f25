use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use token_launchpad::chain::RpcConnection;
use token_launchpad::config::Config;
use token_launchpad::reporting::format_report;
use token_launchpad::wallet::{Approval, KeypairWallet, WalletAdapter};
use token_launchpad::{LaunchError, LaunchRequest, LaunchStage, TokenLaunchpad, TokenMetadataInput};

#[derive(Parser, Debug)]
#[command(name = "token-launchpad", version, about = "Solana Token Launchpad")]
struct Cli {
    /// RPC endpoint (overrides RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a token
    Create(CreateArgs),
    /// Show the connected wallet and its SOL balance
    Address,
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    symbol: Option<String>,

    /// Metadata URI (token image / JSON)
    #[arg(long)]
    image_url: Option<String>,

    /// Recorded but not applied; every launch mints 1 token
    #[arg(long)]
    initial_supply: Option<String>,

    /// Ask for approval before signing each transaction
    #[arg(long)]
    approve: bool,

    /// Print the launch report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.rpc_url {
        config.rpc.url = url;
    }

    // ========================================================================
    // Initialize tracing subscriber with EnvFilter
    // ========================================================================
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.monitoring.log_level))
        .context("Failed to create EnvFilter")?;

    let json_logs = config.monitoring.json_logs;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_logs.then(|| fmt::layer().json()))
        .with((!json_logs).then(|| fmt::layer().with_target(false)))
        .init();

    info!("🚀 Starting Solana Token Launchpad...");

    let connection = Arc::new(RpcConnection::new(
        config.rpc.url.clone(),
        config.commitment()?,
        config.confirmation_timeout(),
    ));
    let explorer = config.explorer()?;
    info!("✅ Connected to {} ({})", connection.url(), explorer.cluster());

    match cli.command {
        Command::Address => show_address(&config, &connection).await,
        Command::Create(args) => {
            let mut wallet = KeypairWallet::from_config(&config.wallet)?;
            if args.approve {
                wallet = wallet.with_approval(Approval::Prompt);
            }

            let launchpad = TokenLaunchpad::new(connection, Arc::new(wallet), explorer)
                .with_priority_fee(config.priority_fee());

            let request = LaunchRequest {
                metadata: TokenMetadataInput::from_fields(
                    args.name.as_deref(),
                    args.symbol.as_deref(),
                    args.image_url.as_deref(),
                ),
                initial_supply: args.initial_supply,
            };

            match launchpad.create_token(&request).await {
                Ok(report) => {
                    if args.json {
                        println!("{}", report.to_json()?);
                    } else {
                        println!("{}", format_report(&report));
                    }
                    Ok(())
                }
                Err(e) => {
                    report_failure(&e);
                    Err(e).context("Token creation failed")
                }
            }
        }
    }
}

async fn show_address(config: &Config, connection: &RpcConnection) -> Result<()> {
    let wallet = KeypairWallet::from_config(&config.wallet)?;
    let Some(address) = wallet.public_key() else {
        warn!("⚠️  No wallet connected");
        return Ok(());
    };

    let balance = connection
        .balance(&address)
        .await
        .context("Failed to fetch wallet balance")?;
    let balance_sol = balance as f64 / 1e9;

    println!("{}", address);
    info!("💰 Wallet balance: {:.4} SOL ({} lamports)", balance_sol, balance);
    if balance_sol < config.wallet.min_balance_sol {
        warn!(
            "⚠️  Low wallet balance! Current: {:.4} SOL, Minimum: {:.2} SOL",
            balance_sol, config.wallet.min_balance_sol
        );
    }
    Ok(())
}

fn report_failure(err: &LaunchError) {
    match err {
        LaunchError::WalletNotConnected => {
            error!("❌ No wallet connected; set WALLET_KEYPAIR_PATH or WALLET_PRIVATE_KEY");
        }
        LaunchError::LaunchInFlight => {
            error!("❌ A launch is already running");
        }
        LaunchError::SigningRejected { stage, reason } => {
            error!("❌ Signing rejected during {}: {}", stage, reason);
        }
        LaunchError::Network { stage, source } => {
            error!("❌ Network failure during {}: {}", stage, source);
        }
        LaunchError::Instruction { stage, source } => {
            error!("❌ Could not build {} instructions: {}", stage, source);
        }
        LaunchError::CoSigning { stage, source } => {
            error!("❌ Could not co-sign the {} transaction: {}", stage, source);
        }
    }

    if let Some(stage) = err.stage() {
        if !matches!(stage, LaunchStage::RentQuery | LaunchStage::CreateMint) {
            warn!("⚠️  Earlier launch transactions are already confirmed and were not rolled back");
        }
    }
}
