//! JSON-RPC network client
//!
//! `NetworkClient` is the seam between wallet logic and the cluster. The CLI
//! talks to `RpcClient`; tests substitute an in-memory implementation.

use crate::crypto::Pubkey;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Network client errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },
    #[error("Transaction {0} was not confirmed in time")]
    ConfirmationTimeout(String),
}

/// Commitment level for reads and confirmations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl Default for Commitment {
    fn default() -> Self {
        Commitment::Confirmed
    }
}

impl std::str::FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level: {}", other)),
        }
    }
}

/// Epoch information reported by the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub epoch: u64,
    pub slot_index: u64,
    pub slots_in_epoch: u64,
    pub absolute_slot: u64,
    pub block_height: u64,
    #[serde(default)]
    pub transaction_count: Option<u64>,
}

/// Operations the wallet needs from the cluster
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Balance of an account in lamports
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError>;

    /// Ask the faucet for funds; returns the airdrop signature
    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<String, RpcError>;

    /// Wait until a signature reaches the configured commitment
    async fn confirm_transaction(&self, signature: &str) -> Result<(), RpcError>;

    /// Recent blockhash that transactions are signed against
    async fn latest_blockhash(&self) -> Result<[u8; 32], RpcError>;

    /// Fee in lamports for a base64 message, `None` if the blockhash expired
    async fn fee_for_message(&self, message_base64: &str) -> Result<Option<u64>, RpcError>;

    /// Broadcast a base64 transaction; returns its signature
    async fn send_transaction(&self, transaction_base64: &str) -> Result<String, RpcError>;

    async fn epoch_info(&self) -> Result<EpochInfo, RpcError>;

    async fn slot(&self) -> Result<u64, RpcError>;

    async fn transaction_count(&self) -> Result<u64, RpcError>;
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub commitment: Commitment,
    pub request_timeout: Duration,
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEVNET_URL.to_string(),
            commitment: Commitment::Confirmed,
            request_timeout: Duration::from_secs(30),
            confirm_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Public devnet endpoint
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Responses wrapped in `{ context, value }`
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    confirmation_status: Option<Commitment>,
}

/// HTTP JSON-RPC client
pub struct RpcClient {
    http: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        log::debug!("rpc #{} {}", id, method);
        let response: RpcResponse<T> = self
            .http
            .post(&self.config.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} returned no result", method)))
    }

    fn commitment_param(&self) -> Value {
        json!({ "commitment": self.config.commitment.as_str() })
    }

    async fn signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>, RpcError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": true }]),
            )
            .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }
}

#[async_trait]
impl NetworkClient for RpcClient {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        let balance: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_base58(), self.commitment_param()]),
            )
            .await?;
        Ok(balance.value)
    }

    async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<String, RpcError> {
        self.call(
            "requestAirdrop",
            json!([address.to_base58(), lamports, self.commitment_param()]),
        )
        .await
    }

    async fn confirm_transaction(&self, signature: &str) -> Result<(), RpcError> {
        let deadline = Instant::now() + self.config.confirm_timeout;

        loop {
            match self.signature_status(signature).await? {
                Some(status) if status.err.is_some() => {
                    return Err(RpcError::TransactionFailed {
                        signature: signature.to_string(),
                        reason: status.err.map(|e| e.to_string()).unwrap_or_default(),
                    });
                }
                Some(SignatureStatus {
                    confirmation_status: Some(level),
                    ..
                }) if level >= self.config.commitment => {
                    log::debug!("{} reached {}", signature, level.as_str());
                    return Ok(());
                }
                _ => {}
            }

            if Instant::now() >= deadline {
                return Err(RpcError::ConfirmationTimeout(signature.to_string()));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn latest_blockhash(&self) -> Result<[u8; 32], RpcError> {
        let latest: WithContext<BlockhashValue> = self
            .call("getLatestBlockhash", json!([self.commitment_param()]))
            .await?;

        let bytes = bs58::decode(&latest.value.blockhash)
            .into_vec()
            .map_err(|e| RpcError::InvalidResponse(format!("blockhash: {}", e)))?;
        bytes
            .try_into()
            .map_err(|_| RpcError::InvalidResponse("blockhash is not 32 bytes".to_string()))
    }

    async fn fee_for_message(&self, message_base64: &str) -> Result<Option<u64>, RpcError> {
        let fee: WithContext<Option<u64>> = self
            .call(
                "getFeeForMessage",
                json!([message_base64, self.commitment_param()]),
            )
            .await?;
        Ok(fee.value)
    }

    async fn send_transaction(&self, transaction_base64: &str) -> Result<String, RpcError> {
        self.call(
            "sendTransaction",
            json!([
                transaction_base64,
                {
                    "encoding": "base64",
                    "preflightCommitment": self.config.commitment.as_str(),
                }
            ]),
        )
        .await
    }

    async fn epoch_info(&self) -> Result<EpochInfo, RpcError> {
        self.call("getEpochInfo", json!([self.commitment_param()]))
            .await
    }

    async fn slot(&self) -> Result<u64, RpcError> {
        self.call("getSlot", json!([self.commitment_param()])).await
    }

    async fn transaction_count(&self) -> Result<u64, RpcError> {
        self.call("getTransactionCount", json!([self.commitment_param()]))
            .await
    }
}
