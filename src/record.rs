//! Service record and registration key derivation

use serde::{Deserialize, Serialize};

/// Identity of the service being registered.
///
/// Immutable once constructed; the advertised address does not change
/// after the service binds its listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Deployment namespace
    pub namespace: String,

    /// Service name
    pub service_name: String,

    /// Advertised address (host:port)
    pub address: String,

    /// Service version
    pub version: String,
}

/// Value stored at the registration key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Advertised address
    pub addr: String,

    /// Service version
    pub version: String,
}

impl ServiceRecord {
    /// Create a new service record
    pub fn new(
        namespace: impl Into<String>,
        service_name: impl Into<String>,
        address: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            service_name: service_name.into(),
            address: address.into(),
            version: version.into(),
        }
    }

    /// Derive the registration key for this record.
    ///
    /// One key per (namespace, service_name, address) triple;
    /// re-registering the same triple overwrites, never duplicates.
    pub fn registration_key(&self) -> String {
        format!("/{}/{}/{}", self.namespace, self.service_name, self.address)
    }

    /// Value written at the registration key
    pub fn node_info(&self) -> NodeInfo {
        NodeInfo {
            addr: self.address.clone(),
            version: self.version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_key_format() {
        let record = ServiceRecord::new("72changes", "grpc_service", "127.0.0.1:3000", "0.0.1");
        assert_eq!(
            record.registration_key(),
            "/72changes/grpc_service/127.0.0.1:3000"
        );
    }

    #[test]
    fn test_registration_key_deterministic() {
        let a = ServiceRecord::new("ns", "svc", "10.0.0.1:80", "1.0.0");
        let b = ServiceRecord::new("ns", "svc", "10.0.0.1:80", "1.0.0");
        assert_eq!(a.registration_key(), b.registration_key());
    }

    #[test]
    fn test_registration_key_distinct_triples() {
        let base = ServiceRecord::new("ns", "svc", "10.0.0.1:80", "1.0.0");
        let other_ns = ServiceRecord::new("ns2", "svc", "10.0.0.1:80", "1.0.0");
        let other_name = ServiceRecord::new("ns", "svc2", "10.0.0.1:80", "1.0.0");
        let other_addr = ServiceRecord::new("ns", "svc", "10.0.0.2:80", "1.0.0");

        assert_ne!(base.registration_key(), other_ns.registration_key());
        assert_ne!(base.registration_key(), other_name.registration_key());
        assert_ne!(base.registration_key(), other_addr.registration_key());
    }

    #[test]
    fn test_node_info_round_trip() {
        let record = ServiceRecord::new("72changes", "grpc_service", "127.0.0.1:3000", "0.0.1");
        let encoded = serde_json::to_string(&record.node_info()).unwrap();
        let decoded: NodeInfo = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.addr, "127.0.0.1:3000");
        assert_eq!(decoded.version, "0.0.1");
        assert_eq!(decoded, record.node_info());
    }
}
