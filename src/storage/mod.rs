//! Storage module for wallet store persistence

pub mod persistence;

pub use persistence::{SaveOutcome, StorageConfig, StorageError, StoreFile};
