//! Network access
//!
//! Everything the wallet asks of the cluster goes through the
//! `NetworkClient` trait:
//! - Balance queries
//! - Devnet airdrops
//! - Blockhash, fee estimation, broadcast and confirmation
//! - Epoch and slot status

#[cfg(test)]
pub mod fake;
pub mod rpc;

pub use rpc::{
    Commitment, EpochInfo, NetworkClient, RpcClient, RpcConfig, RpcError, DEVNET_URL,
};
