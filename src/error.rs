//! Error types for configuration building and access.

use crate::adapter::AdaptError;

/// Error returned when building or reading a scan configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A deferred connection identifier was read before being bound.
    #[error("runtime parameter `{0}` has not been bound")]
    UnboundParam(&'static str),
    /// Key-range narrowing was requested before any wire request was staged.
    #[error("no read request staged; narrowing requires a request, not a scan")]
    NoStagedRequest,
    /// The effective request carries no row range.
    #[error("read request carries no row range")]
    MissingRowRange,
    /// The scan adapter rejected the staged scan.
    #[error(transparent)]
    Adapt(#[from] AdaptError),
}
