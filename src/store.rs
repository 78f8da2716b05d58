//! etcd connection wrapper

use crate::error::RegistryError;
use etcd_client::{
    Client, ConnectOptions, GetOptions, LeaseKeepAliveStream, LeaseKeeper as EtcdLeaseKeeper,
    PutOptions,
};
use std::time::Duration;
use tracing::info;

/// Shared connection to the coordination store.
///
/// Constructed once at startup and passed into every component; the
/// underlying etcd client is a cheap handle and is cloned per call, so
/// concurrent use from multiple tasks needs no additional locking.
/// There is no automatic reconnect; callers that detect an unusable
/// handle must construct a new connection.
#[derive(Clone)]
pub struct StoreConnection {
    client: Client,
}

impl StoreConnection {
    /// Connect to etcd
    pub async fn connect(
        endpoints: &[String],
        dial_timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let options = ConnectOptions::new()
            .with_connect_timeout(dial_timeout)
            .with_timeout(dial_timeout);

        let client = Client::connect(endpoints, Some(options))
            .await
            .map_err(|e| RegistryError::Connect(format!("Failed to connect to etcd: {}", e)))?;

        info!("Connected to etcd: {:?}", endpoints);
        Ok(Self { client })
    }

    /// Number of keys currently stored at `key`
    pub async fn key_count(&self, key: &str) -> Result<i64, RegistryError> {
        let mut client = self.client.clone();
        let response = client
            .get(key, Some(GetOptions::new().with_count_only()))
            .await
            .map_err(|e| RegistryError::Connect(format!("Failed to read key {}: {}", key, e)))?;
        Ok(response.count())
    }

    /// Grant a lease with the given TTL, returning the lease id
    pub async fn lease_grant(&self, ttl_secs: i64) -> Result<i64, RegistryError> {
        let mut client = self.client.clone();
        let response = client.lease_grant(ttl_secs, None).await.map_err(|e| {
            RegistryError::LeaseCreate(format!("Failed to create etcd lease: {}", e))
        })?;
        Ok(response.id())
    }

    /// Write `value` at `key`, attached to `lease_id`
    pub async fn put_with_lease(
        &self,
        key: &str,
        value: String,
        lease_id: i64,
    ) -> Result<(), RegistryError> {
        let mut client = self.client.clone();
        client
            .put(key, value, Some(PutOptions::new().with_lease(lease_id)))
            .await
            .map_err(|e| {
                RegistryError::RegisterWrite(format!("Failed to write key {}: {}", key, e))
            })?;
        Ok(())
    }

    /// Open a keepalive stream for `lease_id`.
    ///
    /// The returned keeper sends renewal requests; the stream yields
    /// the store's acknowledgements and must be drained.
    pub async fn lease_keep_alive(
        &self,
        lease_id: i64,
    ) -> Result<(EtcdLeaseKeeper, LeaseKeepAliveStream), RegistryError> {
        let mut client = self.client.clone();
        client.lease_keep_alive(lease_id).await.map_err(|e| {
            RegistryError::KeepAliveStart(format!(
                "Failed to open keepalive stream for lease {}: {}",
                lease_id, e
            ))
        })
    }

    /// Delete `key`, returning the number of keys removed
    pub async fn delete(&self, key: &str) -> Result<i64, RegistryError> {
        let mut client = self.client.clone();
        let response = client
            .delete(key, None)
            .await
            .map_err(|e| RegistryError::Delete(format!("Failed to delete key {}: {}", key, e)))?;
        Ok(response.deleted())
    }
}
