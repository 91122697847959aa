//! Activity collections: activities recorded as one logical run

use crate::id::{ActivityId, CollectionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Append-only grouping of activities
///
/// Carries no graph semantics; membership only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCollection {
    id: CollectionId,
    activities: BTreeSet<ActivityId>,
    created_at: DateTime<Utc>,
}

impl ActivityCollection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: CollectionId::new(),
            activities: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_activities(mut self, ids: impl IntoIterator<Item = ActivityId>) -> Self {
        self.activities.extend(ids);
        self
    }

    /// Add an activity; returns false if it was already a member
    pub fn insert(&mut self, id: ActivityId) -> bool {
        self.activities.insert(id)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &ActivityId) -> bool {
        self.activities.contains(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Member ids in creation order
    pub fn iter(&self) -> impl Iterator<Item = &ActivityId> {
        self.activities.iter()
    }
}

impl Default for ActivityCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_is_a_set() {
        let a = ActivityId::new();
        let mut collection = ActivityCollection::new().with_activities([a]);
        assert!(!collection.insert(a));
        assert!(collection.insert(ActivityId::new()));
        assert_eq!(collection.len(), 2);
        assert!(collection.contains(&a));
    }
}
