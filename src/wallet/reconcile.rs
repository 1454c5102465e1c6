//! Balance reconciliation
//!
//! Refreshes every cached balance from the network, one wallet at a time.
//! A failed query is recorded and skipped; the remaining wallets are still
//! refreshed and the result is merge-saved.

use super::store::WalletStore;
use crate::core::format_sol;
use crate::network::{NetworkClient, RpcError};
use crate::storage::{SaveOutcome, StoreFile};
use std::fmt;

/// Direction of a balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

/// A wallet whose cached balance differed from the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    pub name: String,
    pub previous: u64,
    pub current: u64,
}

impl BalanceChange {
    pub fn direction(&self) -> Direction {
        if self.current > self.previous {
            Direction::Increase
        } else {
            Direction::Decrease
        }
    }

    /// Absolute change in lamports
    pub fn magnitude(&self) -> u64 {
        self.current.abs_diff(self.previous)
    }
}

impl fmt::Display for BalanceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.direction() {
            Direction::Increase => "increased",
            Direction::Decrease => "decreased",
        };
        write!(
            f,
            "Wallet {} balance {} by {} SOL",
            self.name,
            verb,
            format_sol(self.magnitude())
        )
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug)]
pub struct ReconcileReport {
    pub changes: Vec<BalanceChange>,
    pub failures: Vec<(String, RpcError)>,
    pub save: SaveOutcome,
}

impl ReconcileReport {
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }
}

/// Refresh every wallet's cached balance, then merge-save the store
pub async fn reconcile(
    mut store: WalletStore,
    client: &dyn NetworkClient,
    file: &StoreFile,
) -> (WalletStore, ReconcileReport) {
    let mut changes = Vec::new();
    let mut failures = Vec::new();

    for (name, wallet) in store.wallets.iter_mut() {
        match client.get_balance(&wallet.public_key).await {
            Ok(balance) => {
                if balance != wallet.balance {
                    let change = BalanceChange {
                        name: name.clone(),
                        previous: wallet.balance,
                        current: balance,
                    };
                    log::info!("{}", change);
                    changes.push(change);
                }
                wallet.balance = balance;
            }
            Err(e) => {
                log::warn!("Error updating balance for {}: {}", name, e);
                failures.push((name.clone(), e));
            }
        }
    }

    let save = file.save(&store);
    if !changes.is_empty() {
        log::info!("Updated {} wallet balance(s)", changes.len());
    }

    (
        store,
        ReconcileReport {
            changes,
            failures,
            save,
        },
    )
}
