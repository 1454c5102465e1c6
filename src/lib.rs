//! Devnet Wallet: a local wallet manager for the Solana devnet
//!
//! This crate provides:
//! - Ed25519 key pairs with base58 addresses
//! - A JSON wallet store with merge-on-save persistence
//! - Balance reconciliation against the cluster
//! - Devnet airdrops and signed SOL transfers over JSON-RPC
//!
//! # Example
//!
//! ```rust
//! use devnet_wallet::crypto::Keypair;
//! use devnet_wallet::storage::StoreFile;
//! use devnet_wallet::wallet::WalletStore;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let file = StoreFile::at(dir.path().join("wallets.json"));
//!
//! // Create a wallet and select it
//! let mut store = WalletStore::new();
//! store.create(Some("alice"), &Keypair::generate()).unwrap();
//! store.select("alice").unwrap();
//!
//! // Merge it into whatever is already on disk
//! assert!(file.save(&store).is_saved());
//! assert!(file.load().get("alice").is_some());
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod network;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use crate::core::{format_sol, sol_to_lamports, TransactionBuilder, LAMPORTS_PER_SOL};
pub use crypto::{Keypair, Pubkey};
pub use network::{NetworkClient, RpcClient};
pub use storage::{SaveOutcome, StoreFile};
pub use wallet::{reconcile, WalletRecord, WalletStore};
