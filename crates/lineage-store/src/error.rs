//! Error types for the provenance store
//!
//! - Insertion rejections (cycle, duplicate, unresolved plan)
//! - Durable journal failures
//! - Plan store failures
//! - Configuration loading

use lineage_model::{ActivityId, CollectionId, PlanId};

/// Main store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Insertion would close a dependency cycle; nothing was applied
    #[error("activity {activity} would close a dependency cycle of {} activities", .cycle.len())]
    CycleDetected {
        activity: ActivityId,
        /// Offending activities, upstream to downstream, starting at `activity`
        cycle: Vec<ActivityId>,
    },

    /// Plan association could not be looked up or persisted
    #[error("plan {plan} could not be resolved: {reason}")]
    UnresolvedPlan { plan: PlanId, reason: PlanStoreError },

    #[error("activity {0} is already stored")]
    DuplicateActivity(ActivityId),

    #[error("activity collection {0} is already stored")]
    DuplicateCollection(CollectionId),

    /// Durable commit failed; the insertion was rolled back
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] JournalError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StoreError {
    /// Check if retrying the same call may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Offending activities of a rejected insertion, if any
    #[must_use]
    pub fn cycle(&self) -> Option<&[ActivityId]> {
        match self {
            Self::CycleDetected { cycle, .. } => Some(cycle),
            _ => None,
        }
    }
}

/// Durable journal errors
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("journal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal record malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Plan store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanStoreError {
    /// A different plan is already stored under this id
    #[error("conflicting plan already stored under {0}")]
    Conflict(PlanId),

    #[error("plan store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_failures_are_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(StoreError::StorageUnavailable(JournalError::Io(io)).is_retryable());
        assert!(!StoreError::DuplicateActivity(ActivityId::new()).is_retryable());
        assert!(!StoreError::CycleDetected {
            activity: ActivityId::new(),
            cycle: vec![],
        }
        .is_retryable());
    }

    #[test]
    fn cycle_error_message_counts_members() {
        let (a, b) = (ActivityId::new(), ActivityId::new());
        let err = StoreError::CycleDetected {
            activity: a,
            cycle: vec![a, b],
        };
        assert!(err.to_string().ends_with("cycle of 2 activities"));
        assert_eq!(err.cycle(), Some(&[a, b][..]));
    }
}
