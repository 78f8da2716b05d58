//! etcd-registrar main binary

use etcd_registrar::config::{self, RegistrarConfig};
use etcd_registrar::error::RegistryError;
use etcd_registrar::RegistryService;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting etcd-registrar v{}", etcd_registrar::VERSION);

    // Load configuration
    let config = load_config()?;
    info!("Configuration loaded successfully");

    // Create the service (validates config, connects to etcd)
    let service = RegistryService::new(config).await?;
    info!(
        "Service record: {} (version {})",
        service.record().registration_key(),
        etcd_registrar::VERSION
    );

    // Start the registration poll loop
    service.start();

    // Wait for a termination signal, deregister, and exit with the
    // signal's status code.
    let exit_code = service.run_until_shutdown().await;
    info!("Shutdown completed, exiting with status {}", exit_code);
    std::process::exit(exit_code);
}

/// Load configuration from environment or file
fn load_config() -> Result<RegistrarConfig, RegistryError> {
    // Try to load from environment variables first
    if let Ok(service_name) = std::env::var("REGISTRAR_SERVICE_NAME") {
        let mut config = RegistrarConfig {
            service_name,
            ..Default::default()
        };
        if let Ok(endpoints) = std::env::var("REGISTRAR_ETCD_ENDPOINTS") {
            config.etcd_endpoints = config::parse_endpoints(&endpoints);
        }
        if let Ok(addr) = std::env::var("REGISTRAR_ADVERTISE_ADDR") {
            config.advertise_addr = addr;
        }
        if let Ok(namespace) = std::env::var("REGISTRAR_NAMESPACE") {
            config.namespace = namespace;
        }
        if let Ok(ttl) = std::env::var("REGISTRAR_LEASE_TTL_SECS") {
            config.lease_ttl_secs = ttl
                .parse()
                .map_err(|e| RegistryError::Configuration(format!("invalid TTL: {}", e)))?;
        }
        if let Ok(timeout) = std::env::var("REGISTRAR_DIAL_TIMEOUT_SECS") {
            let secs: u64 = timeout
                .parse()
                .map_err(|e| RegistryError::Configuration(format!("invalid timeout: {}", e)))?;
            config.dial_timeout = Duration::from_secs(secs);
        }
        return Ok(config);
    }

    // Try to load from config file
    let config_path = std::env::var("REGISTRAR_CONFIG_PATH")
        .unwrap_or_else(|_| "config/registrar.toml".to_string());

    match config::load_from_file(&config_path) {
        Ok(config) => return Ok(config),
        Err(e) => warn!("Failed to load config file {}: {}", config_path, e),
    }

    // Use default configuration
    info!("Using default configuration");
    Ok(RegistrarConfig::default())
}
