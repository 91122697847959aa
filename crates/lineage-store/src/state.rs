//! Graph state guarded by the store lock, and its undo log
//!
//! Staging an activity mutates the activity table, both path indices and
//! the relation catalog, recording one [`Undo`] entry per mutation.
//! Applying the log in reverse restores the exact prior state: every undo
//! removes the most recent entry of its table.

use indexmap::{IndexMap, IndexSet};
use lineage_catalog::{Relation, RelationCatalog};
use lineage_index::PathIndex;
use lineage_model::{Activity, ActivityCollection, ActivityId, ArtifactPath, CollectionId};
use std::sync::Arc;

#[derive(Debug)]
enum Undo {
    ActivityInserted(ActivityId),
    UsageIndexed(ArtifactPath, ActivityId),
    GenerationIndexed(ArtifactPath, ActivityId),
    RelationIndexed(Relation),
}

/// Mutations applied by one insertion, newest last
#[derive(Debug, Default)]
pub(crate) struct UndoLog {
    entries: Vec<Undo>,
}

impl UndoLog {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Relations materialized while staging one activity
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Staged {
    pub(crate) upstream: usize,
    pub(crate) downstream: usize,
}

#[derive(Debug, Default)]
pub(crate) struct GraphState {
    pub(crate) activities: IndexMap<ActivityId, Arc<Activity>>,
    pub(crate) index: PathIndex,
    pub(crate) catalog: RelationCatalog,
    pub(crate) collections: IndexMap<CollectionId, ActivityCollection>,
}

impl GraphState {
    /// Insert `activity` and everything derived from it
    ///
    /// Paths are indexed once per activity even if listed twice. Relations
    /// from an activity to itself are not materialized.
    pub(crate) fn stage(&mut self, activity: &Arc<Activity>, undo: &mut UndoLog) -> Staged {
        let id = activity.id();
        self.activities.insert(id, Arc::clone(activity));
        undo.entries.push(Undo::ActivityInserted(id));

        let usage_paths: IndexSet<&ArtifactPath> = activity
            .usages()
            .iter()
            .map(|usage| usage.entity().path())
            .collect();
        let mut upstream: IndexSet<ActivityId> = IndexSet::new();
        for path in usage_paths {
            self.index.append_usage(path, id);
            undo.entries.push(Undo::UsageIndexed(path.clone(), id));
            upstream.extend(self.index.related_generations(path));
        }

        let generation_paths: IndexSet<&ArtifactPath> = activity
            .generations()
            .iter()
            .map(|generation| generation.entity().path())
            .collect();
        let mut downstream: IndexSet<ActivityId> = IndexSet::new();
        for path in generation_paths {
            self.index.append_generation(path, id);
            undo.entries.push(Undo::GenerationIndexed(path.clone(), id));
            downstream.extend(self.index.related_usages(path));
        }

        let mut staged = Staged::default();
        for source in upstream.into_iter().filter(|&source| source != id) {
            if self.index_relation(Relation::new(id, source), undo) {
                staged.upstream += 1;
            }
        }
        for dependent in downstream.into_iter().filter(|&dependent| dependent != id) {
            if self.index_relation(Relation::new(dependent, id), undo) {
                staged.downstream += 1;
            }
        }

        staged
    }

    fn index_relation(&mut self, relation: Relation, undo: &mut UndoLog) -> bool {
        let added = self.catalog.index(relation);
        if added {
            undo.entries.push(Undo::RelationIndexed(relation));
        }
        added
    }

    /// Revert every mutation recorded in `undo`
    pub(crate) fn rollback(&mut self, undo: UndoLog) {
        for entry in undo.entries.into_iter().rev() {
            match entry {
                Undo::ActivityInserted(id) => {
                    self.activities.shift_remove(&id);
                }
                Undo::UsageIndexed(path, id) => {
                    self.index.pop_usage(&path, id);
                }
                Undo::GenerationIndexed(path, id) => {
                    self.index.pop_generation(&path, id);
                }
                Undo::RelationIndexed(relation) => {
                    self.catalog.remove(&relation);
                }
            }
        }
    }
}
