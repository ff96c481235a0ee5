//! Error types for the ReadyNAS poller.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a poll-and-emit cycle.
///
/// Nothing in the crate recovers from these locally: a table either fully
/// succeeds or produces no output at all.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file missing, unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// SNMP-layer failure: transport error, error status or timeout.
    #[error("SNMP query failed: {0}")]
    Query(String),

    /// A display name did not have the `MIB::attribute.index` shape.
    #[error("malformed SNMP display name '{0}'")]
    Format(String),

    /// An SNMP table returned a field its normalizer does not know.
    #[error("unexpected SNMP field '{field}' in {table} table")]
    UnexpectedField { table: &'static str, field: String },

    /// A feature that is deliberately not implemented was requested.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    /// Writing points to the time-series database failed.
    #[error("time-series write failed: {0}")]
    Write(String),

    /// Writing output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
