//! Wallet module for the local store and balance reconciliation

pub mod reconcile;
pub mod store;

pub use reconcile::{reconcile, BalanceChange, Direction, ReconcileReport};
pub use store::{Destination, WalletError, WalletRecord, WalletStore};
