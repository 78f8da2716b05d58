//! Lease acquisition and renewal

use crate::error::RegistryError;
use crate::record::ServiceRecord;
use crate::store::StoreConnection;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Acquires a lease, writes the service record under it, and keeps the
/// lease renewed in a background task.
pub struct LeaseKeeper {
    store: StoreConnection,
    cancel: CancellationToken,
}

impl LeaseKeeper {
    /// Create a new lease keeper
    pub fn new(store: StoreConnection, cancel: CancellationToken) -> Self {
        Self { store, cancel }
    }

    /// Register `record` under a fresh lease and start renewal.
    ///
    /// On any failure the error is returned to the caller; the
    /// registrar retries on its next poll tick. At-least-once,
    /// non-blocking retry semantics.
    pub async fn register(
        &self,
        record: &ServiceRecord,
        ttl_secs: i64,
    ) -> Result<(), RegistryError> {
        let lease_id = self.store.lease_grant(ttl_secs).await?;

        let key = record.registration_key();
        let value = serde_json::to_string(&record.node_info())?;
        self.store.put_with_lease(&key, value, lease_id).await?;

        let (keeper, stream) = self.store.lease_keep_alive(lease_id).await?;

        info!("Registered service at {} (lease: {})", key, lease_id);

        let cancel = self.cancel.clone();
        tokio::spawn(renewal_loop(keeper, stream, lease_id, ttl_secs, cancel));

        Ok(())
    }
}

/// Renew the lease and drain acknowledgements until the lease is lost
/// or the process shuts down.
///
/// If the stream ends (lease revoked or the store lost it) the task
/// exits without corrective action; the next registrar poll tick
/// observes the key's absence and re-registers. The availability gap
/// is bounded by one poll interval.
async fn renewal_loop(
    mut keeper: etcd_client::LeaseKeeper,
    mut stream: etcd_client::LeaseKeepAliveStream,
    lease_id: i64,
    ttl_secs: i64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(renewal_interval(ttl_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Renewal task for lease {} stopped by shutdown", lease_id);
                return;
            }
            _ = interval.tick() => {
                if let Err(e) = keeper.keep_alive().await {
                    warn!("Failed to send renewal for lease {}: {}", lease_id, e);
                    return;
                }
                match stream.message().await {
                    Ok(Some(resp)) if resp.ttl() > 0 => {
                        debug!("Lease {} renewed, ttl {}s", lease_id, resp.ttl());
                    }
                    Ok(Some(_)) => {
                        warn!("Lease {} expired at the store", lease_id);
                        return;
                    }
                    Ok(None) => {
                        warn!("Renewal stream for lease {} closed", lease_id);
                        return;
                    }
                    Err(e) => {
                        warn!("Renewal stream error for lease {}: {}", lease_id, e);
                        return;
                    }
                }
            }
        }
    }
}

/// Renewal period: a third of the TTL, at least one second.
fn renewal_interval(ttl_secs: i64) -> Duration {
    Duration::from_secs((ttl_secs as u64 / 3).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewal_interval_fraction_of_ttl() {
        assert_eq!(renewal_interval(30), Duration::from_secs(10));
        assert_eq!(renewal_interval(5), Duration::from_secs(1));
    }

    #[test]
    fn test_renewal_interval_minimum_one_second() {
        assert_eq!(renewal_interval(1), Duration::from_secs(1));
        assert_eq!(renewal_interval(2), Duration::from_secs(1));
    }
}
