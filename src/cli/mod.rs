//! Command-line front end: configuration and one handler per command

pub mod commands;
pub mod config;

pub use commands::{
    cmd_airdrop, cmd_balance, cmd_list, cmd_new, cmd_select, cmd_status, cmd_sync,
    cmd_transfer, network_status, read_approval, wallet_lines, AppState, CliResult,
    NetworkStatus, DEFAULT_AIRDROP_SOL,
};
pub use config::{WalletConfig, DEFAULT_WALLET_FILE};
