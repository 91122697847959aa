//! Provenance graph store
//!
//! [`ProvenanceStore`] owns the activity table, path indices, relation
//! catalog and collections behind one `RwLock`. Insertion holds the write
//! guard across staging, the acyclicity check and the journal commit, so
//! readers see either none or all of an insertion.

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::journal::{FileJournal, Journal, JournalRecord, MemoryJournal};
use crate::plan_store::{InMemoryPlanStore, PlanStore};
use crate::state::{GraphState, UndoLog};
use lineage_catalog::{ChainSet, Direction, Relation};
use lineage_model::{Activity, ActivityCollection, ActivityId, ArtifactPath, Plan};
use lineage_workflow::PlanDag;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Whether an insertion is new or being replayed from the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Commit {
    Journal,
    Replay,
}

/// Store of immutable activities and the lineage derived from them
pub struct ProvenanceStore {
    config: StoreConfig,
    state: RwLock<GraphState>,
    plans: Arc<dyn PlanStore>,
    journal: Box<dyn Journal>,
}

impl ProvenanceStore {
    /// Create an empty store without replaying `journal`
    #[must_use]
    pub fn new(config: StoreConfig, plans: Arc<dyn PlanStore>, journal: Box<dyn Journal>) -> Self {
        Self {
            config,
            state: RwLock::new(GraphState::default()),
            plans,
            journal,
        }
    }

    /// Volatile store with default configuration
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            StoreConfig::default(),
            Arc::new(InMemoryPlanStore::new()),
            Box::new(MemoryJournal::new()),
        )
    }

    /// Create a store and rebuild its state from `journal`
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] for an invalid configuration,
    /// [`StoreError::StorageUnavailable`] if the journal cannot be read, or
    /// the insertion error of a record that no longer applies
    pub fn open(
        config: StoreConfig,
        plans: Arc<dyn PlanStore>,
        journal: Box<dyn Journal>,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let store = Self::new(config, plans, journal);

        let records = store.journal.replay()?;
        let replayed = records.len();
        for record in records {
            match record {
                JournalRecord::Activity(activity) => {
                    store.insert(activity, Commit::Replay)?;
                }
                JournalRecord::Collection(collection) => {
                    store.insert_collection(collection, Commit::Replay)?;
                }
            }
        }

        info!(
            records = replayed,
            activities = store.activity_count(),
            relations = store.relation_count(),
            "opened provenance store"
        );
        Ok(store)
    }

    /// Open with the journal `config` names: a [`FileJournal`] when
    /// `journal_path` is set, a [`MemoryJournal`] otherwise
    ///
    /// # Errors
    /// As [`open`](Self::open)
    pub fn from_config(config: StoreConfig, plans: Arc<dyn PlanStore>) -> Result<Self, StoreError> {
        let journal: Box<dyn Journal> = match &config.journal_path {
            Some(path) => Box::new(FileJournal::open(path)?),
            None => Box::new(MemoryJournal::new()),
        };
        Self::open(config, plans, journal)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Insert an activity and derive its relations
    ///
    /// All or nothing: on error no index, relation or activity entry from
    /// this call remains. A plan persisted during a rejected call is kept;
    /// plans belong to the plan store.
    ///
    /// # Errors
    /// - [`StoreError::DuplicateActivity`] if the id is already stored
    /// - [`StoreError::UnresolvedPlan`] if the plan cannot be resolved
    /// - [`StoreError::CycleDetected`] if the activity would close a cycle
    /// - [`StoreError::StorageUnavailable`] if the journal commit fails
    pub fn add(&self, activity: Activity) -> Result<ActivityId, StoreError> {
        self.insert(activity, Commit::Journal)
    }

    fn insert(&self, activity: Activity, commit: Commit) -> Result<ActivityId, StoreError> {
        let id = activity.id();
        let mut state = self.state.write();

        if state.activities.contains_key(&id) {
            return Err(StoreError::DuplicateActivity(id));
        }
        self.resolve_plan(activity.plan())?;

        let activity = Arc::new(activity);
        let mut undo = UndoLog::default();
        let staged = state.stage(&activity, &mut undo);
        debug!(
            activity = %id,
            upstream = staged.upstream,
            downstream = staged.downstream,
            "derived relations"
        );

        if let Some(cycle) = state.catalog.find_cycle_through(id) {
            state.rollback(undo);
            warn!(activity = %id, cycle_len = cycle.len(), "rejected activity closing a dependency cycle");
            return Err(StoreError::CycleDetected { activity: id, cycle });
        }

        if commit == Commit::Journal {
            let record = JournalRecord::Activity(Activity::clone(&activity));
            if let Err(err) = self.journal.append(&record) {
                state.rollback(undo);
                error!(activity = %id, error = %err, "journal append failed, insertion rolled back");
                return Err(StoreError::StorageUnavailable(err));
            }
            info!(
                activity = %id,
                plan = %activity.plan().id(),
                relations = staged.upstream + staged.downstream,
                "committed activity"
            );
        }

        Ok(id)
    }

    fn resolve_plan(&self, plan: &Plan) -> Result<(), StoreError> {
        let unresolved = |reason| StoreError::UnresolvedPlan {
            plan: plan.id(),
            reason,
        };
        match self.plans.get(&plan.id()).map_err(unresolved)? {
            Some(_) => Ok(()),
            None => {
                debug!(plan = %plan.id(), name = plan.name(), "persisting new plan");
                self.plans.add(plan.clone()).map_err(unresolved)
            }
        }
    }

    /// Record a collection of activities
    ///
    /// # Errors
    /// [`StoreError::DuplicateCollection`] if the id is already stored,
    /// [`StoreError::StorageUnavailable`] if the journal commit fails
    pub fn add_activity_collection(&self, collection: ActivityCollection) -> Result<(), StoreError> {
        self.insert_collection(collection, Commit::Journal)
    }

    fn insert_collection(&self, collection: ActivityCollection, commit: Commit) -> Result<(), StoreError> {
        let id = collection.id();
        let mut state = self.state.write();
        if state.collections.contains_key(&id) {
            return Err(StoreError::DuplicateCollection(id));
        }

        if commit == Commit::Journal {
            let record = JournalRecord::Collection(collection.clone());
            self.journal.append(&record).map_err(|err| {
                error!(collection = %id, error = %err, "journal append failed");
                StoreError::StorageUnavailable(err)
            })?;
            info!(collection = %id, activities = collection.len(), "committed activity collection");
        }

        state.collections.insert(id, collection);
        Ok(())
    }

    #[must_use]
    pub fn get_all_activity_collections(&self) -> Vec<ActivityCollection> {
        self.state.read().collections.values().cloned().collect()
    }

    #[must_use]
    pub fn get_activity(&self, id: ActivityId) -> Option<Arc<Activity>> {
        self.state.read().activities.get(&id).cloned()
    }

    /// Every activity, in insertion order
    #[must_use]
    pub fn get_all_activities(&self) -> Vec<Arc<Activity>> {
        self.state.read().activities.values().cloned().collect()
    }

    /// Activities that used exactly `path`, in insertion order
    #[must_use]
    pub fn get_activities_by_usage(&self, path: &ArtifactPath) -> Vec<Arc<Activity>> {
        let state = self.state.read();
        Self::resolve(&state, state.index.activities_by_usage(path))
    }

    /// Activities that generated exactly `path`
    ///
    /// With a `checksum` that is non-empty after trimming, only activities
    /// whose generation at `path` has that checksum.
    #[must_use]
    pub fn get_activities_by_generation(
        &self,
        path: &ArtifactPath,
        checksum: Option<&str>,
    ) -> Vec<Arc<Activity>> {
        let state = self.state.read();
        let activities = Self::resolve(&state, state.index.activities_by_generation(path));
        match checksum.map(str::trim).filter(|c| !c.is_empty()) {
            Some(checksum) => activities
                .into_iter()
                .filter(|activity| activity.generates_version(path, checksum))
                .collect(),
            None => activities,
        }
    }

    fn resolve(state: &GraphState, ids: &[ActivityId]) -> Vec<Arc<Activity>> {
        ids.iter()
            .filter_map(|id| state.activities.get(id).cloned())
            .collect()
    }

    #[must_use]
    pub fn get_all_usage_paths(&self) -> Vec<ArtifactPath> {
        self.state.read().index.usage_paths()
    }

    #[must_use]
    pub fn get_all_generation_paths(&self) -> Vec<ArtifactPath> {
        self.state.read().index.generation_paths()
    }

    /// Activities transitively depending on `id`
    ///
    /// `max_depth` counts hops. `None` means the configured
    /// `default_max_depth`, so it is only unbounded when no default is set;
    /// use [`reachable_downstream`](Self::reachable_downstream) for the full
    /// closure regardless of configuration.
    #[must_use]
    pub fn downstream_of(&self, id: ActivityId, max_depth: Option<usize>) -> BTreeSet<ActivityId> {
        let depth = max_depth.or(self.config.default_max_depth);
        self.state.read().catalog.downstream_of(id, depth)
    }

    /// Every activity transitively depending on `id`, ignoring
    /// `default_max_depth`
    ///
    /// Matches the members of [`downstream_chains`](Self::downstream_chains)
    /// when enumeration is not truncated.
    #[must_use]
    pub fn reachable_downstream(&self, id: ActivityId) -> BTreeSet<ActivityId> {
        self.state.read().catalog.downstream_of(id, None)
    }

    /// Activities `id` transitively depends on
    #[must_use]
    pub fn upstream_of(&self, id: ActivityId) -> BTreeSet<ActivityId> {
        self.state.read().catalog.upstream_of(id, None)
    }

    /// Maximal downstream chains from `id`, capped at `max_chains`
    #[must_use]
    pub fn downstream_chains(&self, id: ActivityId) -> ChainSet {
        let chains = self
            .state
            .read()
            .catalog
            .downstream_chains(id, self.config.max_chains);
        self.note_truncation(id, Direction::Downstream, &chains);
        chains
    }

    /// Maximal upstream chains ending at `id`, capped at `max_chains`
    #[must_use]
    pub fn upstream_chains(&self, id: ActivityId) -> ChainSet {
        let chains = self
            .state
            .read()
            .catalog
            .upstream_chains(id, self.config.max_chains);
        self.note_truncation(id, Direction::Upstream, &chains);
        chains
    }

    fn note_truncation(&self, id: ActivityId, direction: Direction, chains: &ChainSet) {
        if chains.truncated {
            warn!(
                activity = %id,
                ?direction,
                max_chains = self.config.max_chains,
                "chain enumeration truncated"
            );
        }
    }

    /// Plans of every activity in the lineage of `id`, connected by their
    /// relations; empty for an unknown activity
    #[must_use]
    pub fn plan_dag(&self, id: ActivityId) -> PlanDag {
        let state = self.state.read();
        let mut dag = PlanDag::new();
        if !state.activities.contains_key(&id) {
            return dag;
        }

        let mut scope = state.catalog.upstream_of(id, None);
        scope.extend(state.catalog.downstream_of(id, None));
        scope.insert(id);

        for (activity_id, activity) in &state.activities {
            if scope.contains(activity_id) {
                dag.add_node(*activity_id, activity.plan().clone());
            }
        }
        for &upstream in &scope {
            for &downstream in state.catalog.neighbours(upstream, Direction::Downstream) {
                if scope.contains(&downstream) {
                    dag.add_edge(upstream, downstream);
                }
            }
        }

        dag
    }

    #[must_use]
    pub fn relations(&self) -> Vec<Relation> {
        self.state.read().catalog.relations().copied().collect()
    }

    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.state.read().catalog.len()
    }

    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.state.read().activities.len()
    }

    /// Whole-graph acyclicity check
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.state.read().catalog.is_acyclic()
    }
}

impl std::fmt::Debug for ProvenanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ProvenanceStore")
            .field("config", &self.config)
            .field("activities", &state.activities.len())
            .field("relations", &state.catalog.len())
            .field("collections", &state.collections.len())
            .finish_non_exhaustive()
    }
}
