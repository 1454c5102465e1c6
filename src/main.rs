//! Devnet wallet CLI
//!
//! A command-line interface for managing local wallets on the Solana devnet.

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use devnet_wallet::cli::{self, AppState, WalletConfig, DEFAULT_WALLET_FILE};
use devnet_wallet::network::{Commitment, DEVNET_URL};
use std::path::PathBuf;

const BANNER: &str = r#"
  ┌──────────────────────────────────┐
  │      ◎  Devnet Wallet  ◎         │
  │  keys · balances · airdrops      │
  └──────────────────────────────────┘
"#;

#[derive(Parser)]
#[command(name = "wallet")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A command-line wallet manager for the Solana devnet", long_about = None)]
struct Cli {
    /// Wallet store file
    #[arg(short, long, env = "WALLET_FILE", default_value = DEFAULT_WALLET_FILE, global = true)]
    wallet_file: PathBuf,

    /// JSON-RPC endpoint
    #[arg(short, long, env = "WALLET_RPC_URL", default_value = DEVNET_URL, global = true)]
    url: String,

    /// Commitment level: processed, confirmed or finalized
    #[arg(long, env = "WALLET_COMMITMENT", default_value = "confirmed", global = true)]
    commitment: Commitment,

    /// Seconds to wait for a transaction to confirm
    #[arg(long, default_value = "60", global = true)]
    confirm_timeout: u64,

    /// Backups of the store file kept on each save (0 disables)
    #[arg(long, default_value = "3", global = true)]
    backups: usize,

    /// Skip refreshing cached balances before the command runs
    #[arg(long, global = true)]
    no_sync: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new wallet with an optional name
    New {
        /// Wallet name (defaults to the public address)
        name: Option<String>,
    },

    /// Select a wallet for default operations
    Select {
        /// Wallet name
        name: String,
    },

    /// Airdrop SOL to the selected wallet
    Airdrop {
        /// Amount in SOL
        #[arg(default_value = cli::DEFAULT_AIRDROP_SOL)]
        amount: String,
    },

    /// Check balance of the selected wallet
    Balance {
        /// Wallet name (defaults to the selected wallet)
        name: Option<String>,
    },

    /// Display network status
    Status,

    /// Transfer SOL to another wallet by name or public address
    Transfer {
        /// Wallet name or public address
        destination: String,

        /// Amount in SOL
        amount: String,

        /// Send without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List all wallets with names and balances
    List {
        /// Display public addresses
        #[arg(short, long)]
        public: bool,
    },
}

fn wants_banner() -> bool {
    let args: Vec<String> = std::env::args().skip(1).collect();
    args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help")
}

fn main() {
    if wants_banner() {
        println!("{}", BANNER);
    }

    let cli = Cli::parse();

    // Initialize logger
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return;
    };

    let config = WalletConfig::default()
        .with_wallet_file(cli.wallet_file)
        .with_url(&cli.url)
        .with_commitment(cli.commitment)
        .with_confirm_timeout(cli.confirm_timeout)
        .with_max_backups(cli.backups)
        .with_sync(!cli.no_sync);

    if let Err(e) = run(config, command) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: WalletConfig, command: Commands) -> cli::CliResult<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let state = AppState::new(config)?;

    rt.block_on(async {
        let mut store = state.load();

        println!(
            "👛 Selected Wallet: {}\n",
            store.selected_wallet.as_deref().unwrap_or("No wallet selected")
        );

        // `status` never touches the store
        let needs_sync = !matches!(command, Commands::Status);
        if state.config.sync_on_start && needs_sync && !store.is_empty() {
            store = cli::cmd_sync(&state, store).await;
        }

        match command {
            Commands::New { name } => {
                cli::cmd_new(&state, store, name.as_deref())?;
            }
            Commands::Select { name } => {
                cli::cmd_select(&state, store, &name)?;
            }
            Commands::Airdrop { amount } => {
                cli::cmd_airdrop(&state, store, Some(amount.as_str())).await?;
            }
            Commands::Balance { name } => {
                cli::cmd_balance(&state, store, name.as_deref()).await?;
            }
            Commands::Status => {
                cli::cmd_status(&state).await?;
            }
            Commands::Transfer {
                destination,
                amount,
                yes,
            } => {
                let mut input = std::io::stdin().lock();
                cli::cmd_transfer(&state, store, &destination, &amount, yes, &mut input).await?;
            }
            Commands::List { public } => {
                cli::cmd_list(&store, public);
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
