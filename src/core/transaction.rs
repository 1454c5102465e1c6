//! Transfer transactions
//!
//! Builds and signs a single system-program transfer in the legacy message
//! format:
//!
//! ```text
//! message     = header(3) | keys: compact-u16 + 32*n | blockhash(32) | instructions
//! instruction = program_index(1) | accounts: compact-u16 + n | data: compact-u16 + n
//! transaction = signatures: compact-u16 + 64*n | message
//! ```

use crate::crypto::{Keypair, Pubkey, SIGNATURE_LENGTH};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

/// The system program owns every wallet account; its id is all zeroes
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new([0u8; 32]);

/// System instruction index for `Transfer`
const SYSTEM_TRANSFER: u32 = 2;

/// Largest serialized transaction the network accepts
pub const MAX_TX_SIZE: usize = 1232;

/// Transaction-related errors
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transfer amount must be greater than zero")]
    ZeroAmount,
    #[error("Transfer has no recipient")]
    MissingRecipient,
    #[error("Signer {signer} is not the fee payer {payer}")]
    WrongSigner { signer: Pubkey, payer: Pubkey },
    #[error("Transaction is not signed")]
    Unsigned,
    #[error("Serialized transaction is {0} bytes, above the {} byte limit", MAX_TX_SIZE)]
    TooLarge(usize),
}

/// Append a compact-u16 length (7 bits per byte, high bit = continuation)
fn encode_len(out: &mut Vec<u8>, mut len: usize) {
    loop {
        let mut byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Unsigned transfer message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMessage {
    pub from: Pubkey,
    pub to: Pubkey,
    pub lamports: u64,
    pub recent_blockhash: [u8; 32],
}

impl TransferMessage {
    pub fn new(from: Pubkey, to: Pubkey, lamports: u64, recent_blockhash: [u8; 32]) -> Self {
        Self {
            from,
            to,
            lamports,
            recent_blockhash,
        }
    }

    /// Account keys in message order: signer first, then writable, then readonly.
    /// A transfer to self references the payer twice.
    fn account_keys(&self) -> Vec<Pubkey> {
        if self.from == self.to {
            vec![self.from, SYSTEM_PROGRAM_ID]
        } else {
            vec![self.from, self.to, SYSTEM_PROGRAM_ID]
        }
    }

    /// Serialize the message; these are the bytes that get signed
    pub fn serialize(&self) -> Vec<u8> {
        let keys = self.account_keys();
        let to_index = if self.from == self.to { 0u8 } else { 1u8 };
        let program_index = (keys.len() - 1) as u8;

        let mut out = Vec::with_capacity(160);
        // required signatures, readonly signed, readonly unsigned
        out.extend_from_slice(&[1, 0, 1]);

        encode_len(&mut out, keys.len());
        for key in &keys {
            out.extend_from_slice(key.as_bytes());
        }
        out.extend_from_slice(&self.recent_blockhash);

        encode_len(&mut out, 1);
        out.push(program_index);
        encode_len(&mut out, 2);
        out.extend_from_slice(&[0, to_index]);

        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
        data.extend_from_slice(&self.lamports.to_le_bytes());
        encode_len(&mut out, data.len());
        out.extend_from_slice(&data);

        out
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.serialize())
    }
}

/// A transfer, optionally signed by the payer
#[derive(Debug, Clone)]
pub struct Transaction {
    pub message: TransferMessage,
    signature: Option<[u8; SIGNATURE_LENGTH]>,
}

impl Transaction {
    pub fn new(message: TransferMessage) -> Self {
        Self {
            message,
            signature: None,
        }
    }

    /// Sign the message with the fee payer's key pair
    pub fn sign(&mut self, key_pair: &Keypair) -> Result<(), TransactionError> {
        if key_pair.pubkey() != self.message.from {
            return Err(TransactionError::WrongSigner {
                signer: key_pair.pubkey(),
                payer: self.message.from,
            });
        }
        self.signature = Some(key_pair.sign(&self.message.serialize()));
        Ok(())
    }

    /// Transaction id: the base58 payer signature
    pub fn id(&self) -> Option<String> {
        self.signature.map(|s| bs58::encode(s).into_string())
    }

    /// Wire encoding
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let signature = self.signature.ok_or(TransactionError::Unsigned)?;
        let message = self.message.serialize();

        let mut out = Vec::with_capacity(1 + SIGNATURE_LENGTH + message.len());
        encode_len(&mut out, 1);
        out.extend_from_slice(&signature);
        out.extend_from_slice(&message);

        if out.len() > MAX_TX_SIZE {
            return Err(TransactionError::TooLarge(out.len()));
        }
        Ok(out)
    }

    pub fn to_base64(&self) -> Result<String, TransactionError> {
        Ok(BASE64.encode(self.serialize()?))
    }
}

/// Builder for a signed transfer
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    to: Option<Pubkey>,
    lamports: u64,
    recent_blockhash: [u8; 32],
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, recipient: Pubkey) -> Self {
        self.to = Some(recipient);
        self
    }

    pub fn lamports(mut self, lamports: u64) -> Self {
        self.lamports = lamports;
        self
    }

    pub fn recent_blockhash(mut self, blockhash: [u8; 32]) -> Self {
        self.recent_blockhash = blockhash;
        self
    }

    /// Build the unsigned message with `payer` as sender and fee payer
    pub fn build(&self, payer: Pubkey) -> Result<TransferMessage, TransactionError> {
        if self.lamports == 0 {
            return Err(TransactionError::ZeroAmount);
        }
        let to = self.to.ok_or(TransactionError::MissingRecipient)?;
        Ok(TransferMessage::new(
            payer,
            to,
            self.lamports,
            self.recent_blockhash,
        ))
    }

    /// Build and sign the transaction
    pub fn build_and_sign(self, key_pair: &Keypair) -> Result<Transaction, TransactionError> {
        let mut tx = Transaction::new(self.build(key_pair.pubkey())?);
        tx.sign(key_pair)?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode_len(&mut out, len);
        out
    }

    #[test]
    fn test_compact_length() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(0x7f), vec![0x7f]);
        assert_eq!(encoded(0x80), vec![0x80, 0x01]);
        assert_eq!(encoded(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encoded(0x4000), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_message_layout() {
        let from = Pubkey::new([1u8; 32]);
        let to = Pubkey::new([2u8; 32]);
        let msg = TransferMessage::new(from, to, 5, [9u8; 32]);
        let bytes = msg.serialize();

        // header + keys + blockhash + 1 instruction (1 + 1+2 + 1+12)
        assert_eq!(bytes.len(), 3 + 1 + 96 + 32 + 1 + 1 + 3 + 13);
        assert_eq!(&bytes[..4], &[1, 0, 1, 3]);
        assert_eq!(&bytes[4..36], from.as_bytes());
        assert_eq!(&bytes[36..68], to.as_bytes());
        assert_eq!(&bytes[68..100], &[0u8; 32]);
        assert_eq!(&bytes[100..132], &[9u8; 32]);

        let ix = &bytes[132..];
        assert_eq!(&ix[..5], &[1, 2, 2, 0, 1]);
        assert_eq!(ix[5], 12);
        assert_eq!(&ix[6..10], &2u32.to_le_bytes());
        assert_eq!(&ix[10..18], &5u64.to_le_bytes());
    }

    #[test]
    fn test_self_transfer_dedups_keys() {
        let me = Pubkey::new([7u8; 32]);
        let bytes = TransferMessage::new(me, me, 1, [0u8; 32]).serialize();
        assert_eq!(bytes[3], 2);
        let ix = &bytes[3 + 1 + 64 + 32..];
        assert_eq!(&ix[..5], &[1, 1, 2, 0, 0]);
    }

    #[test]
    fn test_build_and_sign() {
        let payer = Keypair::generate();
        let recipient = Keypair::generate().pubkey();

        let tx = TransactionBuilder::new()
            .to(recipient)
            .lamports(1_000)
            .recent_blockhash([3u8; 32])
            .build_and_sign(&payer)
            .unwrap();

        let signature = tx.signature.unwrap();
        assert!(payer.pubkey().verify(&tx.message.serialize(), &signature).is_ok());
        let wire = tx.serialize().unwrap();
        assert_eq!(wire[0], 1);
        assert_eq!(&wire[65..], tx.message.serialize().as_slice());
        assert_eq!(bs58::encode(&wire[1..65]).into_string(), tx.id().unwrap());
    }

    #[test]
    fn test_rejects_zero_amount() {
        let payer = Keypair::generate();
        let result = TransactionBuilder::new()
            .to(Keypair::generate().pubkey())
            .build_and_sign(&payer);
        assert!(matches!(result, Err(TransactionError::ZeroAmount)));
    }

    #[test]
    fn test_wrong_signer() {
        let payer = Keypair::generate();
        let other = Keypair::generate();
        let mut tx = Transaction::new(TransferMessage::new(
            payer.pubkey(),
            other.pubkey(),
            10,
            [0u8; 32],
        ));

        assert!(matches!(
            tx.sign(&other),
            Err(TransactionError::WrongSigner { .. })
        ));
        assert!(tx.id().is_none());
        assert!(matches!(tx.serialize(), Err(TransactionError::Unsigned)));
    }

    #[test]
    fn test_requires_recipient() {
        let payer = Keypair::generate();
        let result = TransactionBuilder::new()
            .lamports(10)
            .recent_blockhash([1u8; 32])
            .build_and_sign(&payer);
        assert!(matches!(result, Err(TransactionError::MissingRecipient)));
    }
}
