//! Error types for the registrar

use thiserror::Error;

/// Error type for registration operations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Lease creation error: {0}")]
    LeaseCreate(String),

    #[error("Registration write error: {0}")]
    RegisterWrite(String),

    #[error("Keepalive start error: {0}")]
    KeepAliveStart(String),

    #[error("Deregistration error: {0}")]
    Delete(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}
