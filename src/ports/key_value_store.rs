//! Key-value persistence port.
//!
//! The gate persists its whole state as string-serialized JSON documents
//! under a handful of well-known keys. Implementations must make `set`
//! durable before returning; there are no partial or delta writes.

use thiserror::Error;

/// Key holding the serialized `UsageLimits` snapshot.
pub const USAGE_LIMITS_KEY: &str = "usageLimits";

/// Key holding the signed-in user's profile. Read-only for the gate.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be stored by this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend state is unusable (e.g. a poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
