//! Owning service object wiring the components together

use crate::config::RegistrarConfig;
use crate::error::RegistryError;
use crate::record::ServiceRecord;
use crate::registrar::Registrar;
use crate::shutdown::ShutdownCoordinator;
use crate::store::StoreConnection;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Service registration as a single owned object.
///
/// Construction validates the configuration and connects to the store;
/// the registrar poll loop, the lease renewal task, and the signal
/// wait run as independent tasks sharing only the store connection and
/// the cancellation token.
pub struct RegistryService {
    config: RegistrarConfig,
    record: ServiceRecord,
    store: StoreConnection,
    cancel: CancellationToken,
}

impl RegistryService {
    /// Create a new registry service from a validated configuration
    pub async fn new(config: RegistrarConfig) -> Result<Self, RegistryError> {
        config.validate()?;

        let store = StoreConnection::connect(&config.etcd_endpoints, config.dial_timeout).await?;

        let record = ServiceRecord::new(
            config.namespace.clone(),
            config.service_name.clone(),
            config.advertise_addr.clone(),
            crate::VERSION,
        );

        Ok(Self {
            config,
            record,
            store,
            cancel: CancellationToken::new(),
        })
    }

    /// The record this service registers
    pub fn record(&self) -> &ServiceRecord {
        &self.record
    }

    /// Start the registration poll loop in the background
    pub fn start(&self) {
        let registrar = Registrar::new(self.store.clone(), self.cancel.clone());
        let record = self.record.clone();
        let ttl = self.config.lease_ttl_secs;

        info!(
            "Starting registration for {} (ttl: {}s)",
            record.registration_key(),
            ttl
        );

        tokio::spawn(async move {
            registrar.run(record, ttl).await;
        });
    }

    /// Block until a termination signal arrives, deregister, and
    /// return the exit code the process should report.
    pub async fn run_until_shutdown(&self) -> i32 {
        let mut coordinator = ShutdownCoordinator::new(self.store.clone(), self.cancel.clone());
        coordinator.run(&self.record.registration_key()).await
    }
}
