//! CLI commands for the wallet
//!
//! Each command receives the current `WalletStore` by value and returns the
//! store it leaves behind. Logical errors (unknown wallet, bad amount) are
//! returned as `Err` with nothing saved. Network failures are reported to the
//! operator and the command still returns normally.

use super::config::WalletConfig;
use crate::core::{format_sol, sol_to_nonzero_lamports, TransactionBuilder};
use crate::crypto::Keypair;
use crate::network::{EpochInfo, NetworkClient, RpcClient, RpcError};
use crate::storage::{SaveOutcome, StoreFile};
use crate::wallet::{reconcile, Destination, WalletStore};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Default airdrop amount in SOL
pub const DEFAULT_AIRDROP_SOL: &str = "1";

/// Application state
pub struct AppState {
    pub config: WalletConfig,
    pub file: StoreFile,
    pub client: Arc<dyn NetworkClient>,
}

impl AppState {
    /// Initialize application state with an RPC client
    pub fn new(config: WalletConfig) -> CliResult<Self> {
        let client = RpcClient::new(config.rpc.clone())?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: WalletConfig, client: Arc<dyn NetworkClient>) -> Self {
        let file = StoreFile::new(config.storage.clone());
        Self {
            config,
            file,
            client,
        }
    }

    /// Load the persisted store
    pub fn load(&self) -> WalletStore {
        self.file.load()
    }

    /// Merge-save and tell the operator if it did not stick
    pub fn save(&self, store: &WalletStore) -> SaveOutcome {
        let outcome = self.file.save(store);
        if let SaveOutcome::Failed { reason } = &outcome {
            eprintln!("⚠️  Error saving wallet data: {}", reason);
        }
        outcome
    }
}

/// Refresh every cached balance and report what moved
pub async fn cmd_sync(state: &AppState, store: WalletStore) -> WalletStore {
    let (store, report) = reconcile(store, state.client.as_ref(), &state.file).await;

    for change in &report.changes {
        println!("   {}", change);
    }
    for (name, err) in &report.failures {
        eprintln!("❌ Error updating balance for {}: {}", name, err);
    }
    if let SaveOutcome::Failed { reason } = &report.save {
        eprintln!("⚠️  Error saving wallet data: {}", reason);
    }
    if report.change_count() > 0 {
        println!("🔄 Updated {} wallet balance(s)\n", report.change_count());
    }

    store
}

/// Create a new wallet
pub fn cmd_new(state: &AppState, mut store: WalletStore, name: Option<&str>) -> CliResult<WalletStore> {
    let key_pair = Keypair::generate();
    let name = store.create(name, &key_pair)?;
    log::info!("Created wallet {} ({})", name, key_pair.pubkey());

    state.save(&store);

    println!("🔐 Wallet created successfully!");
    println!("   🏷️  Name: {}", name);
    println!("   📍 Public key: {}", key_pair.pubkey());

    Ok(store)
}

/// Select the wallet used by default
pub fn cmd_select(state: &AppState, mut store: WalletStore, name: &str) -> CliResult<WalletStore> {
    store.select(name)?;
    state.save(&store);

    println!("👉 Selected wallet changed to: {}", name);
    Ok(store)
}

/// Request devnet funds for the selected (or first) wallet
pub async fn cmd_airdrop(
    state: &AppState,
    store: WalletStore,
    amount: Option<&str>,
) -> CliResult<WalletStore> {
    let amount = amount.unwrap_or(DEFAULT_AIRDROP_SOL);
    let lamports = sol_to_nonzero_lamports(amount)?;
    let (_, wallet) = store.airdrop_target()?;
    let address = wallet.public_key;

    println!(
        "🪂 Airdropping {} SOL to wallet: {}",
        format_sol(lamports),
        address
    );

    let signature = match state.client.request_airdrop(&address, lamports).await {
        Ok(signature) => signature,
        Err(e) => {
            eprintln!("❌ Airdrop failed: {}", e);
            return Ok(store);
        }
    };

    match state.client.confirm_transaction(&signature).await {
        Ok(()) => {
            println!("✅ Airdrop completed successfully.");
            println!("   Signature: {}", signature);
        }
        Err(e) => eprintln!("❌ Airdrop {} was not confirmed: {}", signature, e),
    }

    Ok(store)
}

/// Refresh and print one wallet's balance
pub async fn cmd_balance(
    state: &AppState,
    mut store: WalletStore,
    name: Option<&str>,
) -> CliResult<WalletStore> {
    let (name, address) = {
        let (name, wallet) = store.resolve(name)?;
        (name.to_string(), wallet.public_key)
    };

    let balance = match state.client.get_balance(&address).await {
        Ok(balance) => balance,
        Err(e) => {
            eprintln!("❌ Error fetching balance: {}", e);
            return Ok(store);
        }
    };

    if let Some(wallet) = store.wallets.get_mut(&name) {
        wallet.balance = balance;
    }
    state.save(&store);

    println!("💰 Wallet balance: {} SOL", format_sol(balance));
    Ok(store)
}

/// Cluster figures shown by `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatus {
    pub epoch: EpochInfo,
    pub slot: u64,
    pub transaction_count: u64,
}

/// Query epoch, slot and transaction count
pub async fn network_status(client: &dyn NetworkClient) -> Result<NetworkStatus, RpcError> {
    Ok(NetworkStatus {
        epoch: client.epoch_info().await?,
        slot: client.slot().await?,
        transaction_count: client.transaction_count().await?,
    })
}

/// Print cluster status
pub async fn cmd_status(state: &AppState) -> CliResult<()> {
    match network_status(state.client.as_ref()).await {
        Ok(status) => {
            println!("🌐 Network Status ({})", state.config.rpc.url);
            println!("   ├─ Current Epoch: {}", status.epoch.epoch);
            println!("   ├─ Block Height: {}", status.epoch.block_height);
            println!("   ├─ Current Slot: {}", status.slot);
            println!("   └─ Transaction Count: {}", status.transaction_count);
        }
        Err(e) => eprintln!("❌ Error fetching network status: {}", e),
    }

    Ok(())
}

/// One line per wallet, in store order
pub fn wallet_lines(store: &WalletStore, show_public: bool) -> Vec<String> {
    store
        .wallets
        .iter()
        .enumerate()
        .map(|(i, (name, wallet))| {
            if show_public {
                format!(
                    "{}. {}: {} Balance: {} SOL",
                    i + 1,
                    name,
                    wallet.public_key,
                    format_sol(wallet.balance)
                )
            } else {
                format!(
                    "{}. {}: Balance: {} SOL",
                    i + 1,
                    name,
                    format_sol(wallet.balance)
                )
            }
        })
        .collect()
}

/// List all wallets
pub fn cmd_list(store: &WalletStore, show_public: bool) {
    if store.is_empty() {
        println!("📭 No wallets found. Create one with: wallet new");
        return;
    }

    println!("📋 Wallets:");
    for line in wallet_lines(store, show_public) {
        println!("   {}", line);
    }
}

/// Ask the operator to approve a transfer; anything but y/yes declines
pub fn read_approval<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "Do you want to approve the transaction? (y/N): ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Send SOL from the selected wallet. Unless `auto_approve` is set, the
/// operator's answer is read from `input`.
pub async fn cmd_transfer<R: BufRead>(
    state: &AppState,
    store: WalletStore,
    destination: &str,
    amount: &str,
    auto_approve: bool,
    input: &mut R,
) -> CliResult<WalletStore> {
    let (from_name, key_pair) = {
        let (name, wallet) = store.require_selected()?;
        (name.to_string(), wallet.keypair()?)
    };
    let lamports = sol_to_nonzero_lamports(amount)?;
    let destination = store.resolve_destination(destination)?;

    let to = destination.address();
    match &destination {
        Destination::Wallet { name, .. } => {
            println!("📤 Transfer {} SOL: {} → {} ({})", format_sol(lamports), from_name, name, to)
        }
        Destination::Address(_) => {
            println!("📤 Transfer {} SOL: {} → {}", format_sol(lamports), from_name, to)
        }
    }

    let blockhash = match state.client.latest_blockhash().await {
        Ok(blockhash) => blockhash,
        Err(e) => {
            eprintln!("❌ Error fetching recent blockhash: {}", e);
            return Ok(store);
        }
    };

    let builder = TransactionBuilder::new()
        .to(to)
        .lamports(lamports)
        .recent_blockhash(blockhash);
    let message = builder.build(key_pair.pubkey())?;

    match state.client.fee_for_message(&message.to_base64()).await {
        Ok(Some(fee)) => println!("   Estimated transaction fee: {} SOL", format_sol(fee)),
        Ok(None) => println!("   Could not get the estimated transaction fee"),
        Err(e) => {
            log::warn!("Fee estimation failed: {}", e);
            println!("   Could not get the estimated transaction fee");
        }
    }

    let approved = auto_approve || read_approval(input, &mut io::stdout())?;
    if !approved {
        println!("🚫 Transfer not approved.");
        return Ok(store);
    }

    let tx = builder.build_and_sign(&key_pair)?;
    let signature = match state.client.send_transaction(&tx.to_base64()?).await {
        Ok(signature) => signature,
        Err(e) => {
            eprintln!("❌ Transfer failed: {}", e);
            return Ok(store);
        }
    };
    log::info!("Sent transfer {} from {}", signature, from_name);

    match state.client.confirm_transaction(&signature).await {
        Ok(()) => {
            println!("✅ Transfer completed successfully.");
            println!("   Transaction signature: {}", signature);
        }
        Err(e) => eprintln!("❌ Transfer {} was not confirmed: {}", signature, e),
    }

    Ok(store)
}
