//! Usage and generation indices keyed by artifact path
//!
//! Provides [`PathIndex`]: two append-only tables mapping a path to the
//! ordered activities that used (or generated) an entity at that path.
//!
//! We use radix_trie keyed by [`ArtifactPath::index_key`] for:
//! - Exact lookups
//! - Ancestor/descendant lookups (path-relation candidates)
//! - Stable iteration over every indexed path

use indexmap::IndexSet;
use lineage_model::{ActivityId, ArtifactPath};
use radix_trie::{Trie, TrieCommon};

/// Which table of the index an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRole {
    /// Activity read an entity at the path
    Usage,
    /// Activity wrote an entity at the path
    Generation,
}

/// Activities indexed under one path
#[derive(Debug, Clone)]
struct IndexedPath {
    path: ArtifactPath,
    activities: Vec<ActivityId>,
}

/// One path → ordered activities table
#[derive(Debug, Default)]
struct PathTable {
    trie: Trie<String, IndexedPath>,
}

impl PathTable {
    fn append(&mut self, path: &ArtifactPath, activity: ActivityId) {
        let key = path.index_key();
        if let Some(entry) = self.trie.get_mut(&key) {
            entry.activities.push(activity);
            return;
        }
        self.trie.insert(
            key,
            IndexedPath {
                path: path.clone(),
                activities: vec![activity],
            },
        );
    }

    fn pop(&mut self, path: &ArtifactPath, activity: ActivityId) -> bool {
        let key = path.index_key();
        let Some(entry) = self.trie.get_mut(&key) else {
            return false;
        };
        if entry.activities.last() != Some(&activity) {
            return false;
        }
        entry.activities.pop();
        if entry.activities.is_empty() {
            self.trie.remove(&key);
        }
        true
    }

    fn get(&self, path: &ArtifactPath) -> &[ActivityId] {
        self.trie
            .get(&path.index_key())
            .map(|entry| entry.activities.as_slice())
            .unwrap_or_default()
    }

    /// Entries whose path is related to `path`: ancestors, itself, descendants
    fn related(&self, path: &ArtifactPath) -> Vec<&IndexedPath> {
        let mut related = Vec::new();

        for ancestor in path.ancestors() {
            if let Some(entry) = self.trie.get(&ancestor.index_key()) {
                related.push(entry);
            }
        }

        let key = path.index_key();
        if let Some(subtrie) = self.trie.get_raw_descendant(&key) {
            related.extend(
                subtrie
                    .iter()
                    .filter(|(k, _)| k.starts_with(key.as_str()))
                    .map(|(_, entry)| entry),
            );
        }

        related
    }

    fn paths(&self) -> Vec<ArtifactPath> {
        self.trie.values().map(|entry| entry.path.clone()).collect()
    }

    fn len(&self) -> usize {
        self.trie.len()
    }
}

/// Path index over usages and generations
///
/// Tables are append-only per key: activities are appended and never
/// reordered. [`PathIndex::pop`] exists only to undo the most recent append
/// of an insertion that was rejected.
///
/// The index has no interior locking; the owning store serializes writers.
#[derive(Debug, Default)]
pub struct PathIndex {
    by_usage: PathTable,
    by_generation: PathTable,
}

impl PathIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, role: IndexRole) -> &PathTable {
        match role {
            IndexRole::Usage => &self.by_usage,
            IndexRole::Generation => &self.by_generation,
        }
    }

    fn table_mut(&mut self, role: IndexRole) -> &mut PathTable {
        match role {
            IndexRole::Usage => &mut self.by_usage,
            IndexRole::Generation => &mut self.by_generation,
        }
    }

    /// Append `activity` under `path`
    pub fn append(&mut self, role: IndexRole, path: &ArtifactPath, activity: ActivityId) {
        self.table_mut(role).append(path, activity);
    }

    /// Undo the latest append of `activity` under `path`
    ///
    /// Returns false (and changes nothing) if `activity` is not the last
    /// entry for `path`. Empty keys are dropped.
    pub fn pop(&mut self, role: IndexRole, path: &ArtifactPath, activity: ActivityId) -> bool {
        self.table_mut(role).pop(path, activity)
    }

    /// Activities indexed under exactly `path`, in insertion order
    #[must_use]
    pub fn activities(&self, role: IndexRole, path: &ArtifactPath) -> &[ActivityId] {
        self.table(role).get(path)
    }

    /// Activities indexed under any path related to `path`
    ///
    /// Equivalent to scanning every key with
    /// [`ArtifactPath::is_related_to`]. Each activity appears once, in the
    /// order first encountered (ancestors first, then `path` and its
    /// descendants).
    #[must_use]
    pub fn related_activities(&self, role: IndexRole, path: &ArtifactPath) -> IndexSet<ActivityId> {
        self.table(role)
            .related(path)
            .into_iter()
            .flat_map(|entry| entry.activities.iter().copied())
            .collect()
    }

    /// Indexed paths related to `path`
    #[must_use]
    pub fn related_paths(&self, role: IndexRole, path: &ArtifactPath) -> Vec<ArtifactPath> {
        self.table(role)
            .related(path)
            .into_iter()
            .map(|entry| entry.path.clone())
            .collect()
    }

    /// Every indexed path, in stable key order
    #[must_use]
    pub fn paths(&self, role: IndexRole) -> Vec<ArtifactPath> {
        self.table(role).paths()
    }

    /// Number of distinct paths in a table
    #[must_use]
    pub fn path_count(&self, role: IndexRole) -> usize {
        self.table(role).len()
    }

    /// Check if both tables are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_usage.len() == 0 && self.by_generation.len() == 0
    }

    /// Append `activity` to the usage table
    pub fn append_usage(&mut self, path: &ArtifactPath, activity: ActivityId) {
        self.append(IndexRole::Usage, path, activity);
    }

    /// Append `activity` to the generation table
    pub fn append_generation(&mut self, path: &ArtifactPath, activity: ActivityId) {
        self.append(IndexRole::Generation, path, activity);
    }

    /// Undo the latest usage append
    pub fn pop_usage(&mut self, path: &ArtifactPath, activity: ActivityId) -> bool {
        self.pop(IndexRole::Usage, path, activity)
    }

    /// Undo the latest generation append
    pub fn pop_generation(&mut self, path: &ArtifactPath, activity: ActivityId) -> bool {
        self.pop(IndexRole::Generation, path, activity)
    }

    /// Activities that used exactly `path`
    #[must_use]
    pub fn activities_by_usage(&self, path: &ArtifactPath) -> &[ActivityId] {
        self.activities(IndexRole::Usage, path)
    }

    /// Activities that generated exactly `path`
    #[must_use]
    pub fn activities_by_generation(&self, path: &ArtifactPath) -> &[ActivityId] {
        self.activities(IndexRole::Generation, path)
    }

    /// Activities that used anything path-related to `path`
    #[must_use]
    pub fn related_usages(&self, path: &ArtifactPath) -> IndexSet<ActivityId> {
        self.related_activities(IndexRole::Usage, path)
    }

    /// Activities that generated anything path-related to `path`
    #[must_use]
    pub fn related_generations(&self, path: &ArtifactPath) -> IndexSet<ActivityId> {
        self.related_activities(IndexRole::Generation, path)
    }

    /// Every used path
    #[must_use]
    pub fn usage_paths(&self) -> Vec<ArtifactPath> {
        self.paths(IndexRole::Usage)
    }

    /// Every generated path
    #[must_use]
    pub fn generation_paths(&self) -> Vec<ArtifactPath> {
        self.paths(IndexRole::Generation)
    }
}
