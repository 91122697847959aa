//! Workflow error types

/// Errors raised by the workflow registry and its plugins
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// No registered converter handles the format
    #[error("unsupported workflow format: {format}")]
    UnsupportedFormat { format: String },

    /// No registered provider has this name
    #[error("unknown workflow provider: {name}")]
    UnknownProvider { name: String },

    /// Configuration names a plugin absent from the catalog
    #[error("unknown plugin: {name}")]
    UnknownPlugin { name: String },

    /// Converter failed
    #[error("conversion by {converter} failed: {reason}")]
    Conversion { converter: String, reason: String },

    /// Provider failed
    #[error("execution by {provider} failed: {reason}")]
    Execution { provider: String, reason: String },

    /// Plan graph has no topological order
    #[error("plan graph contains a cycle")]
    CyclicPlanGraph,
}

impl WorkflowError {
    /// Check if the error came from plugin code rather than lookup
    #[inline]
    #[must_use]
    pub fn is_plugin_failure(&self) -> bool {
        matches!(self, Self::Conversion { .. } | Self::Execution { .. })
    }
}
