//! Configuration for the registrar

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for service registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    /// etcd endpoints
    pub etcd_endpoints: Vec<String>,

    /// Dial timeout for the initial etcd connection
    pub dial_timeout: Duration,

    /// Deployment namespace (first segment of the registration key)
    pub namespace: String,

    /// Service name
    pub service_name: String,

    /// Advertised address (host:port)
    pub advertise_addr: String,

    /// Lease TTL in seconds; the poll interval equals the TTL
    pub lease_ttl_secs: i64,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            etcd_endpoints: vec![crate::DEFAULT_ETCD_ENDPOINT.to_string()],
            dial_timeout: Duration::from_secs(crate::DEFAULT_DIAL_TIMEOUT_SECS),
            namespace: crate::DEFAULT_NAMESPACE.to_string(),
            service_name: "grpc_service".to_string(),
            advertise_addr: "127.0.0.1:3000".to_string(),
            lease_ttl_secs: crate::DEFAULT_LEASE_TTL_SECS,
        }
    }
}

impl RegistrarConfig {
    /// Validate configuration fields.
    ///
    /// Called at construction time; a service object is never built
    /// from an invalid configuration.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.etcd_endpoints.is_empty() {
            return Err(RegistryError::Configuration(
                "at least one etcd endpoint is required".to_string(),
            ));
        }
        if self.etcd_endpoints.iter().any(|e| e.trim().is_empty()) {
            return Err(RegistryError::Configuration(
                "etcd endpoints must be non-empty".to_string(),
            ));
        }
        if self.namespace.is_empty() || self.namespace.contains('/') {
            return Err(RegistryError::Configuration(format!(
                "invalid namespace: {:?}",
                self.namespace
            )));
        }
        if self.service_name.is_empty() || self.service_name.contains('/') {
            return Err(RegistryError::Configuration(format!(
                "invalid service name: {:?}",
                self.service_name
            )));
        }
        if self.advertise_addr.is_empty() {
            return Err(RegistryError::Configuration(
                "advertise address is required".to_string(),
            ));
        }
        if self.lease_ttl_secs <= 0 {
            return Err(RegistryError::Configuration(format!(
                "lease TTL must be positive, got {}",
                self.lease_ttl_secs
            )));
        }
        Ok(())
    }

    /// Poll interval for the registrar loop (one tick per TTL period)
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.lease_ttl_secs as u64)
    }
}

/// Load configuration from a TOML file.
pub fn load_from_file(path: &str) -> Result<RegistrarConfig, RegistryError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| RegistryError::Configuration(format!("failed to read {}: {}", path, e)))?;
    let config: RegistrarConfig = toml::from_str(&content)
        .map_err(|e| RegistryError::Configuration(format!("failed to parse {}: {}", path, e)))?;
    config.validate()?;
    Ok(config)
}

/// Parse a semicolon- or comma-delimited endpoint list.
pub fn parse_endpoints(raw: &str) -> Vec<String> {
    raw.split(|c| c == ';' || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RegistrarConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.namespace, "72changes");
        assert_eq!(config.lease_ttl_secs, 5);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_empty_endpoints() {
        let config = RegistrarConfig {
            etcd_endpoints: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = RegistrarConfig {
            lease_ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_slash_in_service_name() {
        let config = RegistrarConfig {
            service_name: "a/b".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_address() {
        let config = RegistrarConfig {
            advertise_addr: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
etcd_endpoints = ["127.0.0.1:2379"]
namespace = "72changes"
service_name = "grpc_service"
advertise_addr = "127.0.0.1:3000"
lease_ttl_secs = 5

[dial_timeout]
secs = 15
nanos = 0
"#
        )
        .unwrap();

        let config = load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.service_name, "grpc_service");
        assert_eq!(config.dial_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(load_from_file("/nonexistent/registrar.toml").is_err());
    }

    #[test]
    fn test_parse_endpoints_semicolon() {
        let endpoints = parse_endpoints("127.0.0.1:2379;127.0.0.2:2379");
        assert_eq!(endpoints, vec!["127.0.0.1:2379", "127.0.0.2:2379"]);
    }

    #[test]
    fn test_parse_endpoints_comma_and_whitespace() {
        let endpoints = parse_endpoints(" a:2379 , b:2379 ;; ");
        assert_eq!(endpoints, vec!["a:2379", "b:2379"]);
    }
}
