//! In-memory `NetworkClient` for tests

use super::rpc::{EpochInfo, NetworkClient, RpcError};
use crate::crypto::Pubkey;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeNetwork {
    pub balances: Mutex<HashMap<Pubkey, u64>>,
    pub unreachable: Mutex<HashSet<Pubkey>>,
    pub airdrops: Mutex<Vec<(Pubkey, u64)>>,
    pub sent: Mutex<Vec<String>>,
    pub fee: Option<u64>,
    pub fail_airdrop: bool,
    pub fail_confirm: bool,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self {
            fee: Some(5_000),
            ..Default::default()
        }
    }

    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        self.balances.lock().unwrap().insert(address, lamports);
    }

    /// Make balance queries for `address` fail
    pub fn fail_balance(&self, address: Pubkey) {
        self.unreachable.lock().unwrap().insert(address);
    }
}

#[async_trait]
impl NetworkClient for FakeNetwork {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        if self.unreachable.lock().unwrap().contains(address) {
            return Err(RpcError::Rpc {
                code: -32005,
                message: "node is unhealthy".to_string(),
            });
        }
        Ok(*self.balances.lock().unwrap().get(address).unwrap_or(&0))
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<String, RpcError> {
        if self.fail_airdrop {
            return Err(RpcError::Rpc {
                code: 429,
                message: "airdrop limit reached".to_string(),
            });
        }
        self.airdrops.lock().unwrap().push((*address, lamports));
        Ok(format!("airdrop-{}", address))
    }

    async fn confirm_transaction(&self, signature: &str) -> Result<(), RpcError> {
        if self.fail_confirm {
            return Err(RpcError::ConfirmationTimeout(signature.to_string()));
        }
        Ok(())
    }

    async fn latest_blockhash(&self) -> Result<[u8; 32], RpcError> {
        Ok([4u8; 32])
    }

    async fn fee_for_message(&self, _message_base64: &str) -> Result<Option<u64>, RpcError> {
        Ok(self.fee)
    }

    async fn send_transaction(&self, transaction_base64: &str) -> Result<String, RpcError> {
        self.sent
            .lock()
            .unwrap()
            .push(transaction_base64.to_string());
        Ok(format!("sig-{}", self.sent.lock().unwrap().len()))
    }

    async fn epoch_info(&self) -> Result<EpochInfo, RpcError> {
        Ok(EpochInfo {
            epoch: 512,
            slot_index: 10,
            slots_in_epoch: 432_000,
            absolute_slot: 221_184_010,
            block_height: 209_000_000,
            transaction_count: None,
        })
    }

    async fn slot(&self) -> Result<u64, RpcError> {
        Ok(221_184_010)
    }

    async fn transaction_count(&self) -> Result<u64, RpcError> {
        Ok(42)
    }
}
