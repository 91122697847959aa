//! Errors raised while constructing provenance records

/// Errors related to model construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Path has no segments after normalization
    #[error("path is empty")]
    EmptyPath,

    /// Checksum is empty or whitespace
    #[error("checksum is empty")]
    EmptyChecksum,

    /// Activity ended before it started
    #[error("activity ends ({ended_at}) before it starts ({started_at})")]
    InvalidTimeRange {
        /// Start timestamp (RFC 3339)
        started_at: String,
        /// End timestamp (RFC 3339)
        ended_at: String,
    },
}
