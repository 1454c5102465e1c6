//! Cryptographic utilities for the wallet
//!
//! Ed25519 key pairs and base58 addresses.

pub mod keys;

pub use keys::{KeyError, Keypair, Pubkey, KEYPAIR_LENGTH, PUBKEY_LENGTH, SIGNATURE_LENGTH};
