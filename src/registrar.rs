//! Registration poll loop

use crate::error::RegistryError;
use crate::lease::LeaseKeeper;
use crate::record::ServiceRecord;
use crate::store::StoreConnection;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a poll tick decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Key present, active renewal keeps it alive
    AlreadyRegistered,

    /// Key absent and never registered before
    Register,

    /// Key absent after a successful registration (lease lost)
    RegisterAfterLoss,
}

/// Classify a poll tick from the observed key count and whether a
/// registration has ever succeeded.
pub fn classify_tick(key_count: i64, was_registered: bool) -> TickAction {
    if key_count > 0 {
        TickAction::AlreadyRegistered
    } else if was_registered {
        TickAction::RegisterAfterLoss
    } else {
        TickAction::Register
    }
}

/// Polls the registration key and (re)registers when it is absent.
pub struct Registrar {
    store: StoreConnection,
    lease_keeper: LeaseKeeper,
    cancel: CancellationToken,
}

impl Registrar {
    /// Create a new registrar
    pub fn new(store: StoreConnection, cancel: CancellationToken) -> Self {
        let lease_keeper = LeaseKeeper::new(store.clone(), cancel.clone());
        Self {
            store,
            lease_keeper,
            cancel,
        }
    }

    /// Run the poll loop until cancelled.
    ///
    /// One tick per TTL period. A failed existence check or a failed
    /// registration is logged and retried on the next tick; nothing
    /// here escalates to a process crash.
    pub async fn run(&self, record: ServiceRecord, ttl_secs: i64) {
        let key = record.registration_key();
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(ttl_secs as u64));
        let mut was_registered = false;

        info!("Starting registration poll loop for {}", key);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Registration poll loop for {} stopped", key);
                    return;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick(&record, &key, ttl_secs, &mut was_registered).await {
                        error!("Registration attempt for {} failed: {}", key, e);
                    }
                }
            }
        }
    }

    async fn tick(
        &self,
        record: &ServiceRecord,
        key: &str,
        ttl_secs: i64,
        was_registered: &mut bool,
    ) -> Result<(), RegistryError> {
        let count = match self.store.key_count(key).await {
            Ok(count) => count,
            Err(e) => {
                // Store unreachable: not fatal, wait for the next tick.
                error!("Failed to check key {}: {}", key, e);
                return Ok(());
            }
        };

        match classify_tick(count, *was_registered) {
            TickAction::AlreadyRegistered => {
                debug!("Key {} present, nothing to do", key);
                Ok(())
            }
            TickAction::Register => {
                info!("Key {} absent, registering", key);
                self.lease_keeper.register(record, ttl_secs).await?;
                *was_registered = true;
                Ok(())
            }
            TickAction::RegisterAfterLoss => {
                warn!("Key {} absent after lease loss, re-registering", key);
                self.lease_keeper.register(record, ttl_secs).await?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_present_is_noop() {
        assert_eq!(classify_tick(1, false), TickAction::AlreadyRegistered);
        assert_eq!(classify_tick(1, true), TickAction::AlreadyRegistered);
    }

    #[test]
    fn test_key_absent_first_time_registers() {
        assert_eq!(classify_tick(0, false), TickAction::Register);
    }

    #[test]
    fn test_key_absent_after_loss_is_distinct() {
        assert_eq!(classify_tick(0, true), TickAction::RegisterAfterLoss);
    }
}
