//! Plan persistence collaborator
//!
//! Activities reference plans; the store only needs to look a plan up and
//! persist it when missing.

use crate::error::PlanStoreError;
use dashmap::DashMap;
use lineage_model::{Plan, PlanId};

/// Lookup and persistence of plans
#[cfg_attr(test, mockall::automock)]
pub trait PlanStore: Send + Sync {
    /// Fetch a plan, `Ok(None)` when unknown
    ///
    /// # Errors
    /// Returns [`PlanStoreError::Unavailable`] when the backend fails
    fn get(&self, id: &PlanId) -> Result<Option<Plan>, PlanStoreError>;

    /// Persist a plan
    ///
    /// # Errors
    /// Returns [`PlanStoreError::Conflict`] if a different plan is stored
    /// under the same id
    fn add(&self, plan: Plan) -> Result<(), PlanStoreError>;
}

/// Concurrent in-memory plan store
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: DashMap<PlanId, Plan>,
}

impl InMemoryPlanStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl PlanStore for InMemoryPlanStore {
    fn get(&self, id: &PlanId) -> Result<Option<Plan>, PlanStoreError> {
        Ok(self.plans.get(id).map(|entry| entry.value().clone()))
    }

    fn add(&self, plan: Plan) -> Result<(), PlanStoreError> {
        let id = plan.id();
        match self.plans.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                if existing.get() == &plan {
                    Ok(())
                } else {
                    Err(PlanStoreError::Conflict(id))
                }
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(plan);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_store_round_trip() {
        let store = InMemoryPlanStore::new();
        let plan = Plan::new("train", "python train.py");
        let id = plan.id();

        assert_eq!(store.get(&id).unwrap(), None);
        store.add(plan.clone()).unwrap();
        store.add(plan.clone()).unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(plan));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn plan_store_rejects_conflicting_plan() {
        let store = InMemoryPlanStore::new();
        let plan = Plan::new("train", "python train.py");
        let id = plan.id();
        store.add(plan).unwrap();

        let rival = Plan::new("train", "python train_v2.py").with_id(id);
        assert_eq!(store.add(rival), Err(PlanStoreError::Conflict(id)));
    }
}
