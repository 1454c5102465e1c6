//! Core wallet primitives
//!
//! This module contains:
//! - Currency amounts (lamports and SOL)
//! - Transfer transactions (legacy message layout and signing)

pub mod amount;
pub mod transaction;

pub use amount::{
    format_sol, sol_to_lamports, sol_to_nonzero_lamports, AmountError, LAMPORTS_PER_SOL,
    SOL_DECIMALS,
};
pub use transaction::{
    Transaction, TransactionBuilder, TransactionError, TransferMessage, MAX_TX_SIZE,
    SYSTEM_PROGRAM_ID,
};
