//! Wallet store persistence
//!
//! Loading never fails: a missing or unreadable file yields an empty store.
//! Saving is a merge: the file is re-read and the caller's wallets are
//! layered on top, so a stale in-memory copy cannot drop records written by
//! another invocation. A file that exists but cannot be read or parsed is
//! left untouched and the save fails.

use crate::wallet::WalletStore;
use rand::Rng;
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result of a merge-save
#[derive(Debug)]
pub enum SaveOutcome {
    /// The merged store was written; `wallets` is the number of records on disk
    Saved { wallets: usize },
    /// Nothing was written; the in-memory store is unchanged
    Failed { reason: StorageError },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
    /// Rotating copies of the previous file kept on each save; 0 disables
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("wallets.json"),
            max_backups: 3,
        }
    }
}

/// The on-disk wallet store
#[derive(Debug, Clone)]
pub struct StoreFile {
    config: StorageConfig,
}

impl StoreFile {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Store at `path` with default settings
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageConfig {
            path: path.into(),
            ..Default::default()
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn exists(&self) -> bool {
        self.config.path.exists()
    }

    /// Temp file unique to this process and call, so concurrent saves
    /// never write through the same path
    fn temp_path(&self) -> PathBuf {
        let mut name = self.config.path.as_os_str().to_owned();
        name.push(format!(
            ".{}.{:08x}.tmp",
            std::process::id(),
            rand::thread_rng().gen::<u32>()
        ));
        PathBuf::from(name)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.config.path.as_os_str().to_owned();
        name.push(format!(".backup.{}", index));
        PathBuf::from(name)
    }

    /// Read the store strictly, surfacing I/O and parse errors
    pub fn read(&self) -> Result<WalletStore, StorageError> {
        let file = fs::File::open(&self.config.path)?;
        let store = serde_json::from_reader(BufReader::new(file))?;
        Ok(store)
    }

    /// Load the store, substituting an empty one on any failure
    pub fn load(&self) -> WalletStore {
        match self.read() {
            Ok(store) => {
                log::debug!(
                    "Loaded {} wallet(s) from {}",
                    store.len(),
                    self.config.path.display()
                );
                store
            }
            Err(StorageError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No wallet store at {}", self.config.path.display());
                WalletStore::new()
            }
            Err(e) => {
                log::warn!(
                    "Could not load wallet store {}: {}",
                    self.config.path.display(),
                    e
                );
                WalletStore::new()
            }
        }
    }

    /// Merge `update` into the current file contents and write the result
    pub fn save(&self, update: &WalletStore) -> SaveOutcome {
        match self.try_save(update) {
            Ok(wallets) => SaveOutcome::Saved { wallets },
            Err(reason) => {
                log::error!(
                    "Could not save wallet store {}: {}",
                    self.config.path.display(),
                    reason
                );
                SaveOutcome::Failed { reason }
            }
        }
    }

    fn try_save(&self, update: &WalletStore) -> Result<usize, StorageError> {
        // A file that exists but cannot be read is never replaced
        let mut merged = match self.read() {
            Ok(store) => store,
            Err(StorageError::IoError(e)) if e.kind() == io::ErrorKind::NotFound => {
                WalletStore::new()
            }
            Err(e) => return Err(e),
        };
        merged.merge(update);

        if merged.has_dangling_selection() {
            log::warn!(
                "Selected wallet {:?} is not in the store",
                merged.selected_wallet.as_deref().unwrap_or_default()
            );
        }

        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to temporary file first
        let temp_path = self.temp_path();
        let written = self
            .write_temp(&temp_path, &merged)
            .and_then(|()| self.replace_with(&temp_path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        log::debug!(
            "Saved {} wallet(s) to {}",
            merged.len(),
            self.config.path.display()
        );
        Ok(merged.len())
    }

    fn write_temp(&self, temp_path: &Path, store: &WalletStore) -> Result<(), StorageError> {
        let mut writer = BufWriter::new(fs::File::create(temp_path)?);
        serde_json::to_writer_pretty(&mut writer, store)?;
        writer.flush()?;
        Ok(())
    }

    /// Back up the current file, then move `temp_path` over it
    fn replace_with(&self, temp_path: &Path) -> Result<(), StorageError> {
        if self.config.max_backups > 0 && self.exists() {
            self.rotate_backups()?;
            fs::copy(&self.config.path, self.backup_path(0))?;
        }

        // Atomic rename
        fs::rename(temp_path, &self.config.path)?;
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }
}
