//! Error types for Flight Assist.

use std::time::Duration;

use uuid::Uuid;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Conversational gateway errors.
///
/// User-recoverable input (a bad phone prefix, a malformed name, an
/// unrecognized confirmation phrase) is answered conversationally and never
/// surfaces here; these are the cases where the gateway itself cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Empty message from {user_id}")]
    EmptyMessage { user_id: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Search-task errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search task {id} not found")]
    TaskNotFound { id: Uuid },

    #[error("Search timed out after {budget:?}")]
    Timeout { budget: Duration },

    #[error("All {attempted} provider queries failed")]
    AllProvidersFailed { attempted: usize },

    #[error("Invalid search request: {reason}")]
    InvalidRequest { reason: String },
}

/// Flight-data provider errors. Isolated per provider; a single failing
/// source never fails the whole task on its own.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Price-alert / tracking sink errors.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid passenger counts: {reason}")]
    InvalidPassengers { reason: String },
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
