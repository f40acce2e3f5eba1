//! Storage key constants.

/// Storage keys used by the client
pub struct StorageKeys;

impl StorageKeys {
    /// Current credential pair (JSON record)
    pub const CREDENTIALS: &'static str = "credentials";
}
