//! Durable client-side storage for the radview client.
//!
//! This crate provides:
//! - A `KeyValueStorage` trait over durable key-value backends
//! - A JSON-file backend (`FileStorage`) that survives restarts
//! - The `CredentialStore`, sole owner of the current credential pair

mod credentials;
mod file;
mod keys;
mod traits;

pub use credentials::{CredentialPair, CredentialStore};
pub use file::FileStorage;
pub use keys::StorageKeys;
pub use traits::KeyValueStorage;

use std::path::PathBuf;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A storage lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create a credential store backed by the given file.
pub fn create_credential_store(path: PathBuf) -> CredentialStore {
    CredentialStore::new(Box::new(FileStorage::new(path)))
}
