//! Ed25519 key management for the wallet
//!
//! Provides key pair generation, signing, and verification, plus the
//! base58 `Pubkey` address type used throughout the store.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a public address in bytes
pub const PUBKEY_LENGTH: usize = 32;

/// Length of a keypair secret (`secret ‖ public`) in bytes
pub const KEYPAIR_LENGTH: usize = 64;

/// Length of a signature in bytes
pub const SIGNATURE_LENGTH: usize = 64;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid public address: {0}")]
    InvalidPubkey(String),
    #[error("Invalid private key: expected {} bytes, got {0}", KEYPAIR_LENGTH)]
    InvalidKeyLength(usize),
    #[error("Private key does not match its embedded public key")]
    MismatchedKeypair,
    #[error("Signature verification failed")]
    VerificationFailed,
}

/// A 32-byte account address, displayed as base58
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pubkey([u8; PUBKEY_LENGTH]);

impl Pubkey {
    pub const fn new(bytes: [u8; PUBKEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_LENGTH] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Verify a signature made by the key behind this address
    pub fn verify(&self, message: &[u8], signature: &[u8; SIGNATURE_LENGTH]) -> Result<(), KeyError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| KeyError::VerificationFailed)?;
        key.verify(message, &Signature::from_bytes(signature))
            .map_err(|_| KeyError::VerificationFailed)
    }
}

impl FromStr for Pubkey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| KeyError::InvalidPubkey(s.to_string()))?;
        let bytes: [u8; PUBKEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidPubkey(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_base58())
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A signing key pair
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a key pair from its 64-byte `secret ‖ public` encoding.
    /// The embedded public half must match the secret half.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: &[u8; KEYPAIR_LENGTH] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidKeyLength(bytes.len()))?;
        let signing_key =
            SigningKey::from_keypair_bytes(bytes).map_err(|_| KeyError::MismatchedKeypair)?;
        Ok(Self { signing_key })
    }

    /// The 64-byte `secret ‖ public` encoding
    /// WARNING: Keep this secret!
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_generation() {
        let kp = Keypair::generate();
        assert_eq!(kp.to_bytes().len(), KEYPAIR_LENGTH);
        assert_eq!(&kp.to_bytes()[32..], kp.pubkey().as_bytes());
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Keypair::generate();
        let message = b"transfer 1 SOL";
        let signature = kp.sign(message);

        assert!(kp.pubkey().verify(message, &signature).is_ok());
        assert!(kp.pubkey().verify(b"transfer 2 SOL", &signature).is_err());
    }

    #[test]
    fn test_key_pair_from_bytes() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::from_bytes(&kp1.to_bytes()).unwrap();
        assert_eq!(kp1.pubkey(), kp2.pubkey());
    }

    #[test]
    fn test_key_pair_rejects_bad_input() {
        assert!(matches!(
            Keypair::from_bytes(&[1u8; 32]),
            Err(KeyError::InvalidKeyLength(32))
        ));

        let mut bytes = Keypair::generate().to_bytes();
        bytes[40] ^= 0xff;
        assert!(matches!(
            Keypair::from_bytes(&bytes),
            Err(KeyError::MismatchedKeypair)
        ));
    }

    #[test]
    fn test_pubkey_base58() {
        let system: Pubkey = "11111111111111111111111111111111".parse().unwrap();
        assert_eq!(system, Pubkey::default());

        let kp = Keypair::generate();
        let parsed: Pubkey = kp.pubkey().to_string().parse().unwrap();
        assert_eq!(parsed, kp.pubkey());

        assert!("bob".parse::<Pubkey>().is_err());
        assert!("0OIl".parse::<Pubkey>().is_err());
    }

    #[test]
    fn test_pubkey_serde_as_string() {
        let kp = Keypair::generate();
        let json = serde_json::to_string(&kp.pubkey()).unwrap();
        assert_eq!(json, format!("\"{}\"", kp.pubkey()));

        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kp.pubkey());
        assert!(serde_json::from_str::<Pubkey>("\"abc\"").is_err());
    }
}
