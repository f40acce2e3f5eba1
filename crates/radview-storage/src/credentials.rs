//! High-level API for the stored credential pair.

use crate::{KeyValueStorage, StorageError, StorageKeys, StorageResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The access/refresh token pair issued by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Short-lived bearer token attached to authorized requests
    pub access_token: String,
    /// Longer-lived token used only to mint a new access token
    pub refresh_token: String,
}

/// Owner of the current credential pair.
///
/// The pair is persisted as a single record, so callers never observe a
/// half-written pair: either both tokens are present or neither is.
/// Presence of an access token says nothing about its validity; expiry
/// is only discovered when the platform rejects a request.
pub struct CredentialStore {
    storage: Box<dyn KeyValueStorage>,
}

impl CredentialStore {
    /// Create a new credential store with the given storage backend
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Retrieve the current credential pair
    pub fn get(&self) -> StorageResult<Option<CredentialPair>> {
        match self.storage.get(StorageKeys::CREDENTIALS)? {
            Some(json) => {
                let pair: CredentialPair = serde_json::from_str(&json)
                    .map_err(|e| StorageError::Encoding(e.to_string()))?;
                Ok(Some(pair))
            }
            None => Ok(None),
        }
    }

    /// Replace the current credential pair
    pub fn set(&self, pair: &CredentialPair) -> StorageResult<()> {
        let json =
            serde_json::to_string(pair).map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::CREDENTIALS, &json)?;
        debug!("Stored credential pair");
        Ok(())
    }

    /// Replace only the access token, keeping the refresh token unchanged.
    ///
    /// Fails when no pair is stored; a refresh-less pair must never come
    /// into existence.
    pub fn set_access_token(&self, access_token: &str) -> StorageResult<()> {
        let mut pair = self
            .get()?
            .ok_or_else(|| StorageError::NotFound(StorageKeys::CREDENTIALS.to_string()))?;
        pair.access_token = access_token.to_string();
        self.set(&pair)
    }

    /// Retrieve the current access token
    pub fn access_token(&self) -> StorageResult<Option<String>> {
        Ok(self.get()?.map(|pair| pair.access_token))
    }

    /// Retrieve the current refresh token
    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        Ok(self.get()?.map(|pair| pair.refresh_token))
    }

    /// Remove both tokens
    pub fn clear(&self) -> StorageResult<()> {
        let _ = self.storage.delete(StorageKeys::CREDENTIALS)?;
        debug!("Cleared credential pair");
        Ok(())
    }

    /// Check whether an access token is present.
    ///
    /// A pure presence check; no expiry or signature validation.
    pub fn is_authenticated(&self) -> StorageResult<bool> {
        self.storage.has(StorageKeys::CREDENTIALS)
    }
}
