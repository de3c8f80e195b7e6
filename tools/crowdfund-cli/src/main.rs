//! Crowdfund: command-line front-end for the CrowdFunding contract.
//!
//! Every invocation is one operation: connect, create a campaign, list
//! campaigns, donate, or list donations. `--demo` runs against an
//! in-process ledger seeded with one campaign.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crowdfund_client::config::parse_address;
use crowdfund_client::{
    Address, CallOptions, Campaign, CampaignForm, ClientConfig, ConfirmedTx, ContractClientAdapter,
    CrowdfundingApi, Donation, HttpLedgerRpc, InMemoryLedger, LedgerRpc, LocalKeyWallet,
    NodeWallet, WalletSession,
};

/// Crowdfund: create, browse and fund campaigns
#[derive(Parser, Debug)]
#[command(name = "crowdfund")]
#[command(about = "Command-line client for the CrowdFunding contract")]
struct Args {
    /// JSON-RPC endpoint URL (overrides CROWDFUND_RPC_URL)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Contract address (overrides CROWDFUND_CONTRACT_ADDRESS)
    #[arg(short, long)]
    contract: Option<String>,

    /// Sign locally with this hex private key instead of node accounts
    #[arg(long, env = "CROWDFUND_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Confirmations to wait for after sending
    #[arg(long)]
    confirmations: Option<u64>,

    /// Give up waiting for confirmation after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Run against an in-memory ledger (no node required)
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect the wallet and print the active address
    Connect,

    /// Create a campaign owned by the active address
    Create {
        /// Campaign title
        #[arg(long)]
        title: String,

        /// Campaign description
        #[arg(long)]
        description: String,

        /// Funding target in ether, e.g. 10 or 0.5
        #[arg(long)]
        target: String,

        /// Deadline: YYYY-MM-DD, RFC 3339, or epoch milliseconds
        #[arg(long)]
        deadline: String,

        /// Image URI
        #[arg(long, default_value = "")]
        image: String,
    },

    /// List all campaigns
    Campaigns,

    /// Donate ether to a campaign
    Donate {
        /// Campaign id (pId)
        p_id: usize,

        /// Amount in ether, e.g. 1.5
        amount: String,
    },

    /// List the donations made to a campaign
    Donations {
        /// Campaign id (pId)
        p_id: usize,
    },
}

#[derive(Serialize)]
struct Session<'a> {
    address: Address,
    wallet: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so --json output stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let wallet = build_wallet(&args)?;

    let rpc: Arc<dyn LedgerRpc> = if args.demo {
        let ledger = Arc::new(InMemoryLedger::new().at(config.contract_address));
        seed_demo(&ledger, &config).await?;
        ledger
    } else {
        Arc::new(
            HttpLedgerRpc::new(&config.rpc_url, config.request_timeout())
                .context("failed to create RPC client")?,
        )
    };

    let adapter = ContractClientAdapter::new(config, rpc, Arc::clone(&wallet));
    run(&args, &adapter, wallet.kind()).await
}

/// Environment first, then command-line overrides.
fn load_config(args: &Args) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("invalid CROWDFUND_* environment")?;

    if let Some(endpoint) = &args.endpoint {
        config.rpc_url = endpoint.clone();
    }
    if let Some(contract) = &args.contract {
        config.contract_address = parse_address(contract)?;
    }
    if let Some(confirmations) = args.confirmations {
        config.confirmations = confirmations;
    }
    if args.demo {
        config.poll_interval_ms = 50;
    }
    Ok(config)
}

fn build_wallet(args: &Args) -> Result<Arc<dyn WalletSession>> {
    match &args.private_key {
        Some(_) if args.demo => bail!(
            "--private-key cannot be used with --demo (the demo ledger signs for its dev accounts)"
        ),
        Some(key) => Ok(Arc::new(
            LocalKeyWallet::from_hex(key).context("invalid --private-key")?,
        )),
        None => Ok(Arc::new(NodeWallet::new())),
    }
}

/// One campaign owned by the first dev account, ending in 30 days.
async fn seed_demo(ledger: &Arc<InMemoryLedger>, config: &ClientConfig) -> Result<()> {
    let seeder = ContractClientAdapter::new(
        config.clone(),
        ledger.clone(),
        Arc::new(NodeWallet::new()),
    );
    seeder.connect().await?;

    let deadline = chrono::Utc::now() + chrono::Duration::days(30);
    let form = CampaignForm {
        title: "Community garden".to_string(),
        description: "Raised beds and tools for the neighbourhood garden".to_string(),
        target: "5".to_string(),
        deadline: deadline.format("%Y-%m-%d").to_string(),
        image: "https://example.com/garden.png".to_string(),
    };
    seeder.submit_campaign(&form, CallOptions::default()).await?;
    info!("Demo ledger seeded at {}", ledger.contract_address());
    Ok(())
}

/// Cancel the confirmation wait on Ctrl-C.
fn call_options(args: &Args) -> CallOptions {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no longer waiting for confirmation");
            let _ = cancel_tx.send(true);
        }
    });

    CallOptions {
        timeout: args.timeout.map(Duration::from_secs),
        cancel: Some(cancel_rx),
    }
}

async fn run(args: &Args, api: &dyn CrowdfundingApi, wallet_kind: &str) -> Result<()> {
    match &args.command {
        Command::Connect => {
            let address = api.connect().await?;
            let session = Session {
                address,
                wallet: wallet_kind,
            };
            if args.json {
                print_json(&session)?;
            } else {
                println!("Connected {} ({} wallet)", session.address, session.wallet);
            }
        }
        Command::Create {
            title,
            description,
            target,
            deadline,
            image,
        } => {
            api.connect().await?;
            let form = CampaignForm {
                title: title.clone(),
                description: description.clone(),
                target: target.clone(),
                deadline: deadline.clone(),
                image: image.clone(),
            };
            let confirmed = api.submit_campaign(&form, call_options(args)).await?;
            report_tx("Campaign created", &confirmed, args.json)?;
        }
        Command::Campaigns => {
            let campaigns = api.get_campaigns().await?;
            if args.json {
                print_json(&campaigns)?;
            } else {
                print!("{}", render_campaigns(&campaigns));
            }
        }
        Command::Donate { p_id, amount } => {
            api.connect().await?;
            let confirmed = api.donate(*p_id, amount, call_options(args)).await?;
            report_tx("Donation confirmed", &confirmed, args.json)?;
        }
        Command::Donations { p_id } => {
            let donations = api.get_donations(*p_id).await?;
            if args.json {
                print_json(&donations)?;
            } else {
                print!("{}", render_donations(*p_id, &donations));
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_tx(label: &str, confirmed: &ConfirmedTx, json: bool) -> Result<()> {
    if json {
        return print_json(confirmed);
    }
    println!("{}: {} (block {})", label, confirmed.hash, confirmed.block_number);
    Ok(())
}

fn render_campaigns(campaigns: &[Campaign]) -> String {
    if campaigns.is_empty() {
        return "No campaigns yet\n".to_string();
    }

    let mut out = String::new();
    for c in campaigns {
        out.push_str(&format!(
            "#{} {}\n    owner:    {}\n    raised:   {} / {} ETH\n    deadline: {}\n",
            c.p_id,
            c.title,
            c.owner,
            c.amount_collected,
            c.target,
            format_deadline(c.deadline),
        ));
    }
    out
}

fn render_donations(p_id: usize, donations: &[Donation]) -> String {
    if donations.is_empty() {
        return format!("No donations to campaign #{}\n", p_id);
    }

    donations
        .iter()
        .map(|d| format!("{}  {} ETH\n", d.donator, d.donation))
        .collect()
}

/// Deadlines are stored as epoch milliseconds.
fn format_deadline(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
