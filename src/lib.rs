//! etcd-registrar - Service registration with leased keepalive
//!
//! Registers a running network service under a hierarchical key in
//! etcd, keeps the registration alive by renewing a lease, and removes
//! the key on shutdown. If the process dies without cleanup, the
//! store's TTL expiry removes the key on its own.

pub mod config;
pub mod error;
pub mod lease;
pub mod record;
pub mod registrar;
pub mod service;
pub mod shutdown;
pub mod store;

// Re-export main types for convenience
pub use config::RegistrarConfig;
pub use error::RegistryError;
pub use record::ServiceRecord;
pub use service::RegistryService;

/// Result type for registration operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Advertised service version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default deployment namespace
pub const DEFAULT_NAMESPACE: &str = "72changes";

/// Default etcd endpoint
pub const DEFAULT_ETCD_ENDPOINT: &str = "127.0.0.1:2379";

/// Default lease TTL in seconds; the poll interval equals the TTL
pub const DEFAULT_LEASE_TTL_SECS: i64 = 5;

/// Default dial timeout for the etcd connection in seconds
pub const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 15;
