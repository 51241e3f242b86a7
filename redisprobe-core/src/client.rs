//! Store client traits behind which the real Redis client sits.
//!
//! The probe never talks to the `redis` crate directly; it goes through
//! these object-safe traits so tests can substitute a scripted stub for
//! the remote server. The production implementation lives in
//! [`redis::RedisConnector`](crate::client::redis::RedisConnector).

use crate::Result;
use crate::config::ConnectionConfig;
use async_trait::async_trait;
use std::collections::HashMap;

pub mod redis;

/// Factory seam for opening store connections.
///
/// # Object Safety
/// The trait is object-safe so the probe can hold `&dyn StoreConnector`
/// and tests can swap in stubs without generics leaking into the probe
/// surface.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Attempts to establish a client connection with the given
    /// configuration.
    ///
    /// # Errors
    /// Returns a classified [`crate::ProbeError`]: connection errors for
    /// transport failures, authentication errors for rejected
    /// credentials, anything else as other.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn StoreClient>>;
}

/// The handful of store operations the probe exercises.
///
/// Methods take `&mut self` because the underlying connection types are
/// exclusive writers; the probe holds exactly one client at a time.
#[async_trait]
pub trait StoreClient: Send {
    /// Liveness check. `Ok(false)` means the server answered but not
    /// positively; the probe treats that as non-success without raising.
    async fn ping(&mut self) -> Result<bool>;

    /// Writes `key = value` with a bounded lifetime in seconds.
    async fn set_with_ttl(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Reads a key back; `Ok(None)` when the key does not exist.
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Deletes a key. Deleting a non-existent key is not an error.
    async fn delete(&mut self, key: &str) -> Result<()>;

    /// Queries server metadata as a flat name → value mapping.
    async fn server_info(&mut self) -> Result<HashMap<String, String>>;
}
