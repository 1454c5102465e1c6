//! In-memory wallet store
//!
//! `WalletStore` is a plain value: commands take it, change it, and hand it
//! back for persistence. Name lookups and selection live here; disk I/O lives
//! in `storage`.

use crate::crypto::{KeyError, Keypair, Pubkey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Wallet not found: {0}")]
    NotFound(String),
    #[error("No wallet selected")]
    NoneSelected,
    #[error("Wallets list is empty")]
    NoWallets,
    #[error("Wallet already exists: {0}")]
    AlreadyExists(String),
    #[error("Destination {0:?} is neither a wallet name nor a valid address")]
    InvalidDestination(String),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

/// A named key pair with its last known balance
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub public_key: Pubkey,
    #[serde(with = "secret_bytes")]
    pub private_key: Vec<u8>,
    /// Cached balance in lamports
    #[serde(default)]
    pub balance: u64,
}

impl WalletRecord {
    pub fn from_keypair(key_pair: &Keypair) -> Self {
        Self {
            public_key: key_pair.pubkey(),
            private_key: key_pair.to_bytes().to_vec(),
            balance: 0,
        }
    }

    /// Rebuild the signing key pair
    pub fn keypair(&self) -> Result<Keypair, KeyError> {
        let key_pair = Keypair::from_bytes(&self.private_key)?;
        if key_pair.pubkey() != self.public_key {
            return Err(KeyError::MismatchedKeypair);
        }
        Ok(key_pair)
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("balance", &self.balance)
            .finish()
    }
}

/// All known wallets plus the selected wallet name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStore {
    #[serde(default)]
    pub wallets: BTreeMap<String, WalletRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_wallet: Option<String>,
}

/// Where a transfer is going
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A wallet in the store, by name
    Wallet { name: String, address: Pubkey },
    /// A literal address
    Address(Pubkey),
}

impl Destination {
    pub fn address(&self) -> Pubkey {
        match self {
            Destination::Wallet { address, .. } => *address,
            Destination::Address(address) => *address,
        }
    }
}

impl WalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn get(&self, name: &str) -> Option<&WalletRecord> {
        self.wallets.get(name)
    }

    /// Add a freshly generated key pair. The name defaults to the address.
    pub fn create(&mut self, name: Option<&str>, key_pair: &Keypair) -> Result<String, WalletError> {
        let name = match name {
            Some(n) => n.to_string(),
            None => key_pair.pubkey().to_base58(),
        };
        if self.wallets.contains_key(&name) {
            return Err(WalletError::AlreadyExists(name));
        }
        self.wallets
            .insert(name.clone(), WalletRecord::from_keypair(key_pair));
        Ok(name)
    }

    /// Point the selection at an existing wallet; unknown names leave it unchanged
    pub fn select(&mut self, name: &str) -> Result<(), WalletError> {
        if !self.wallets.contains_key(name) {
            return Err(WalletError::NotFound(name.to_string()));
        }
        self.selected_wallet = Some(name.to_string());
        Ok(())
    }

    /// Selected wallet name, if it still refers to a stored wallet
    pub fn selected(&self) -> Option<(&str, &WalletRecord)> {
        let name = self.selected_wallet.as_deref()?;
        self.wallets.get(name).map(|w| (name, w))
    }

    /// True when the selection names a wallet that is not in the store
    pub fn has_dangling_selection(&self) -> bool {
        matches!(&self.selected_wallet, Some(name) if !self.wallets.contains_key(name))
    }

    /// Source wallet for selection-based commands
    pub fn require_selected(&self) -> Result<(&str, &WalletRecord), WalletError> {
        match &self.selected_wallet {
            None => Err(WalletError::NoneSelected),
            Some(name) => self
                .selected()
                .ok_or_else(|| WalletError::NotFound(name.clone())),
        }
    }

    /// Resolve a wallet by explicit name, falling back to the selection
    pub fn resolve(&self, name: Option<&str>) -> Result<(&str, &WalletRecord), WalletError> {
        match name {
            Some(n) => self
                .wallets
                .get_key_value(n)
                .map(|(k, w)| (k.as_str(), w))
                .ok_or_else(|| WalletError::NotFound(n.to_string())),
            None => self.require_selected(),
        }
    }

    /// Airdrop target: the selection, or the first wallet when nothing is selected
    pub fn airdrop_target(&self) -> Result<(&str, &WalletRecord), WalletError> {
        if self.wallets.is_empty() {
            return Err(WalletError::NoWallets);
        }
        match &self.selected_wallet {
            Some(name) => self
                .selected()
                .ok_or_else(|| WalletError::NotFound(name.clone())),
            None => self
                .wallets
                .iter()
                .next()
                .map(|(k, w)| (k.as_str(), w))
                .ok_or(WalletError::NoWallets),
        }
    }

    /// Resolve a transfer destination. A stored wallet name wins over
    /// parsing the input as an address.
    pub fn resolve_destination(&self, input: &str) -> Result<Destination, WalletError> {
        if let Some(wallet) = self.wallets.get(input) {
            return Ok(Destination::Wallet {
                name: input.to_string(),
                address: wallet.public_key,
            });
        }
        input
            .parse::<Pubkey>()
            .map(Destination::Address)
            .map_err(|_| WalletError::InvalidDestination(input.to_string()))
    }

    /// Union `update` into this store: update wins on name collision and
    /// its selection replaces ours, even when it is `None`.
    pub fn merge(&mut self, update: &WalletStore) {
        for (name, wallet) in &update.wallets {
            self.wallets.insert(name.clone(), wallet.clone());
        }
        self.selected_wallet = update.selected_wallet.clone();
    }
}

/// Private key bytes: written as a JSON array, read from either an array
/// or an index-keyed object (`{"0": 12, "1": 7, ...}`).
mod secret_bytes {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<u8>),
        Indexed(BTreeMap<String, u8>),
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::List(bytes) => Ok(bytes),
            Repr::Indexed(map) => {
                let mut indexed = map
                    .into_iter()
                    .map(|(k, v)| k.parse::<usize>().map(|i| (i, v)))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| D::Error::custom("private key index is not a number"))?;
                indexed.sort_unstable_by_key(|(i, _)| *i);
                if indexed.iter().enumerate().any(|(pos, (i, _))| pos != *i) {
                    return Err(D::Error::custom("private key indices are not contiguous"));
                }
                Ok(indexed.into_iter().map(|(_, v)| v).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[&str]) -> WalletStore {
        let mut store = WalletStore::new();
        for name in names {
            store.create(Some(*name), &Keypair::generate()).unwrap();
        }
        store
    }

    #[test]
    fn test_create_defaults_name_to_address() {
        let mut store = WalletStore::new();
        let kp = Keypair::generate();
        let name = store.create(None, &kp).unwrap();

        assert_eq!(name, kp.pubkey().to_base58());
        let wallet = store.get(&name).unwrap();
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.keypair().unwrap().pubkey(), kp.pubkey());
    }

    #[test]
    fn test_create_rejects_duplicate_name() {
        let mut store = store_with(&["alice"]);
        let before = store.get("alice").unwrap().public_key;

        let result = store.create(Some("alice"), &Keypair::generate());
        assert!(matches!(result, Err(WalletError::AlreadyExists(_))));
        assert_eq!(store.get("alice").unwrap().public_key, before);
    }

    #[test]
    fn test_select_guard() {
        let mut store = store_with(&["alice"]);
        store.select("alice").unwrap();

        let result = store.select("ghost");
        assert!(matches!(result, Err(WalletError::NotFound(ref n)) if n == "ghost"));
        assert_eq!(store.selected_wallet.as_deref(), Some("alice"));
    }

    #[test]
    fn test_dangling_selection_is_not_found() {
        let mut store = store_with(&["alice"]);
        store.selected_wallet = Some("ghost".to_string());

        assert!(store.has_dangling_selection());
        assert!(store.selected().is_none());
        assert!(matches!(
            store.require_selected(),
            Err(WalletError::NotFound(_))
        ));
        assert!(matches!(store.airdrop_target(), Err(WalletError::NotFound(_))));
    }

    #[test]
    fn test_resolve_by_name_or_selection() {
        let mut store = store_with(&["alice", "bob"]);
        assert!(matches!(store.resolve(None), Err(WalletError::NoneSelected)));

        store.select("bob").unwrap();
        assert_eq!(store.resolve(None).unwrap().0, "bob");
        assert_eq!(store.resolve(Some("alice")).unwrap().0, "alice");
        assert!(matches!(
            store.resolve(Some("carol")),
            Err(WalletError::NotFound(_))
        ));
    }

    #[test]
    fn test_airdrop_target() {
        assert!(matches!(
            WalletStore::new().airdrop_target(),
            Err(WalletError::NoWallets)
        ));

        let mut store = store_with(&["zed", "amy"]);
        assert_eq!(store.airdrop_target().unwrap().0, "amy");

        store.select("zed").unwrap();
        assert_eq!(store.airdrop_target().unwrap().0, "zed");
    }

    #[test]
    fn test_destination_prefers_wallet_name() {
        let store = store_with(&["bob"]);
        let bob = store.get("bob").unwrap().public_key;

        let dest = store.resolve_destination("bob").unwrap();
        assert_eq!(dest.address(), bob);
        assert!(matches!(dest, Destination::Wallet { ref name, .. } if name == "bob"));
    }

    #[test]
    fn test_destination_literal_address() {
        let store = store_with(&["bob"]);
        let other = Keypair::generate().pubkey();

        let dest = store.resolve_destination(&other.to_base58()).unwrap();
        assert_eq!(dest, Destination::Address(other));

        assert!(matches!(
            store.resolve_destination("carol"),
            Err(WalletError::InvalidDestination(_))
        ));
    }

    #[test]
    fn test_merge_keeps_untouched_wallets() {
        let mut base = store_with(&["a", "b"]);
        base.select("a").unwrap();
        let a = base.get("a").unwrap().clone();

        let mut update = WalletStore::new();
        let mut b = base.get("b").unwrap().clone();
        b.balance = 77;
        update.wallets.insert("b".to_string(), b.clone());

        base.merge(&update);
        assert_eq!(base.get("a"), Some(&a));
        assert_eq!(base.get("b"), Some(&b));
        assert_eq!(base.selected_wallet, None);
    }

    #[test]
    fn test_record_json_shape() {
        let kp = Keypair::generate();
        let mut record = WalletRecord::from_keypair(&kp);
        record.balance = 100;

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["publicKey"], kp.pubkey().to_base58());
        assert_eq!(value["privateKey"].as_array().unwrap().len(), 64);
        assert_eq!(value["balance"], 100);
    }

    #[test]
    fn test_record_reads_indexed_private_key() {
        let kp = Keypair::generate();
        let indexed: serde_json::Map<String, serde_json::Value> = kp
            .to_bytes()
            .iter()
            .enumerate()
            .map(|(i, b)| (i.to_string(), serde_json::Value::from(*b)))
            .collect();
        let json = serde_json::json!({
            "publicKey": kp.pubkey().to_base58(),
            "privateKey": indexed,
            "balance": 5,
        });

        let record: WalletRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.private_key, kp.to_bytes().to_vec());
        assert_eq!(record.keypair().unwrap().pubkey(), kp.pubkey());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let record = WalletRecord::from_keypair(&Keypair::generate());
        let debug = format!("{:?}", record);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&format!("{:?}", record.private_key)));
    }
}
