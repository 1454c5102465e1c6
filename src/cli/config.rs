//! Runtime configuration

use crate::network::{Commitment, RpcConfig};
use crate::storage::StorageConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default store file, relative to the working directory
pub const DEFAULT_WALLET_FILE: &str = "wallets.json";

/// Everything a command invocation needs to know about its environment
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub storage: StorageConfig,
    pub rpc: RpcConfig,
    /// Refresh cached balances before running the command
    pub sync_on_start: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: PathBuf::from(DEFAULT_WALLET_FILE),
                max_backups: 3,
            },
            rpc: RpcConfig::default(),
            sync_on_start: true,
        }
    }
}

impl WalletConfig {
    pub fn with_wallet_file(mut self, path: PathBuf) -> Self {
        self.storage.path = path;
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.rpc.url = url.to_string();
        self
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.rpc.commitment = commitment;
        self
    }

    pub fn with_confirm_timeout(mut self, secs: u64) -> Self {
        self.rpc.confirm_timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.storage.max_backups = max_backups;
        self
    }

    pub fn with_sync(mut self, sync_on_start: bool) -> Self {
        self.sync_on_start = sync_on_start;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::DEVNET_URL;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.storage.path, PathBuf::from("wallets.json"));
        assert_eq!(config.rpc.url, DEVNET_URL);
        assert_eq!(config.rpc.commitment, Commitment::Confirmed);
        assert!(config.sync_on_start);
    }

    #[test]
    fn test_overrides() {
        let config = WalletConfig::default()
            .with_wallet_file(PathBuf::from("/tmp/w.json"))
            .with_url("http://127.0.0.1:8899")
            .with_commitment(Commitment::Finalized)
            .with_confirm_timeout(5)
            .with_max_backups(0)
            .with_sync(false);

        assert_eq!(config.storage.path, PathBuf::from("/tmp/w.json"));
        assert_eq!(config.rpc.url, "http://127.0.0.1:8899");
        assert_eq!(config.rpc.commitment, Commitment::Finalized);
        assert_eq!(config.rpc.confirm_timeout, Duration::from_secs(5));
        assert_eq!(config.storage.max_backups, 0);
        assert!(!config.sync_on_start);
    }
}
