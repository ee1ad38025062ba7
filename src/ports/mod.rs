//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `KeyValueStore` - Durable string storage for the usage snapshot and
//!   the stored user profile

mod key_value_store;

pub use key_value_store::{KeyValueStore, StorageError, CURRENT_USER_KEY, USAGE_LIMITS_KEY};
