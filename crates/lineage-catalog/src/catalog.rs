//! Relation catalog: adjacency in both directions plus the relation set

use crate::chains::{enumerate_chains, ChainSet};
use crate::relation::{Direction, Relation};
use indexmap::{IndexMap, IndexSet};
use lineage_model::ActivityId;
use std::collections::{BTreeSet, VecDeque};

/// Every known dependency between activities
///
/// Adjacency is kept in both directions so upstream and downstream walks
/// cost the same. Neighbours keep insertion order, so chain enumeration is
/// deterministic. The relation set guarantees adjacency lists hold no
/// duplicates.
#[derive(Debug, Default, Clone)]
pub struct RelationCatalog {
    /// upstream → activities depending on it
    dependents: IndexMap<ActivityId, Vec<ActivityId>>,
    /// downstream → activities it depends on
    dependencies: IndexMap<ActivityId, Vec<ActivityId>>,
    relations: IndexSet<Relation>,
}

impl RelationCatalog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a relation
    ///
    /// Returns false for self loops and relations already present; neither
    /// changes the catalog.
    pub fn index(&mut self, relation: Relation) -> bool {
        if relation.is_self_loop() || !self.relations.insert(relation) {
            return false;
        }
        self.dependents
            .entry(relation.upstream)
            .or_default()
            .push(relation.downstream);
        self.dependencies
            .entry(relation.downstream)
            .or_default()
            .push(relation.upstream);
        true
    }

    /// Forget a relation, returning whether it was present
    pub fn remove(&mut self, relation: &Relation) -> bool {
        if !self.relations.shift_remove(relation) {
            return false;
        }
        Self::unlink(&mut self.dependents, relation.upstream, relation.downstream);
        Self::unlink(&mut self.dependencies, relation.downstream, relation.upstream);
        true
    }

    fn unlink(
        adjacency: &mut IndexMap<ActivityId, Vec<ActivityId>>,
        from: ActivityId,
        to: ActivityId,
    ) {
        if let Some(neighbours) = adjacency.get_mut(&from) {
            neighbours.retain(|n| *n != to);
            if neighbours.is_empty() {
                adjacency.shift_remove(&from);
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, relation: &Relation) -> bool {
        self.relations.contains(relation)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Relations in insertion order
    pub fn relations(&self) -> impl Iterator<Item = &Relation> + '_ {
        self.relations.iter()
    }

    /// Direct neighbours of `activity` in `direction`
    #[must_use]
    pub fn neighbours(&self, activity: ActivityId, direction: Direction) -> &[ActivityId] {
        let adjacency = match direction {
            Direction::Downstream => &self.dependents,
            Direction::Upstream => &self.dependencies,
        };
        adjacency.get(&activity).map(Vec::as_slice).unwrap_or_default()
    }

    /// Activities transitively depending on `activity`
    ///
    /// `max_depth` counts hops; `Some(0)` yields nothing. The start is never
    /// part of the result.
    #[must_use]
    pub fn downstream_of(&self, activity: ActivityId, max_depth: Option<usize>) -> BTreeSet<ActivityId> {
        self.reach(activity, Direction::Downstream, max_depth)
    }

    /// Activities `activity` transitively depends on
    #[must_use]
    pub fn upstream_of(&self, activity: ActivityId, max_depth: Option<usize>) -> BTreeSet<ActivityId> {
        self.reach(activity, Direction::Upstream, max_depth)
    }

    /// Breadth-first reach from `start`
    #[must_use]
    pub fn reach(
        &self,
        start: ActivityId,
        direction: Direction,
        max_depth: Option<usize>,
    ) -> BTreeSet<ActivityId> {
        let mut seen = BTreeSet::new();
        let mut frontier = VecDeque::from([(start, 0usize)]);

        while let Some((node, depth)) = frontier.pop_front() {
            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            for &next in self.neighbours(node, direction) {
                if next != start && seen.insert(next) {
                    frontier.push_back((next, depth + 1));
                }
            }
        }

        seen
    }

    /// Maximal downstream paths starting at `activity`
    ///
    /// Each chain begins with `activity` and ends at an activity nothing
    /// depends on. At most `limit` chains are returned.
    #[must_use]
    pub fn downstream_chains(&self, activity: ActivityId, limit: usize) -> ChainSet {
        enumerate_chains(activity, limit, |node| {
            self.neighbours(node, Direction::Downstream)
        })
    }

    /// Maximal upstream paths ending at `activity`
    ///
    /// Chains are ordered source first, so each ends with `activity`.
    #[must_use]
    pub fn upstream_chains(&self, activity: ActivityId, limit: usize) -> ChainSet {
        let mut set = enumerate_chains(activity, limit, |node| {
            self.neighbours(node, Direction::Upstream)
        });
        for chain in &mut set.chains {
            chain.reverse();
        }
        set
    }

    /// Activities with at least one relation
    pub fn activities(&self) -> impl Iterator<Item = ActivityId> + '_ {
        let mut seen = IndexSet::new();
        for relation in &self.relations {
            seen.insert(relation.upstream);
            seen.insert(relation.downstream);
        }
        seen.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids<const N: usize>() -> [ActivityId; N] {
        std::array::from_fn(|_| ActivityId::new())
    }

    #[test]
    fn catalog_index_is_idempotent() {
        let [a, b] = ids();
        let mut catalog = RelationCatalog::new();

        assert!(catalog.index(Relation::new(b, a)));
        assert!(!catalog.index(Relation::new(b, a)));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.neighbours(a, Direction::Downstream), &[b]);
        assert_eq!(catalog.neighbours(b, Direction::Upstream), &[a]);
    }

    #[test]
    fn catalog_skips_self_loops() {
        let [a] = ids();
        let mut catalog = RelationCatalog::new();
        assert!(!catalog.index(Relation::new(a, a)));
        assert!(catalog.is_empty());
    }

    #[test]
    fn catalog_remove_unlinks_both_sides() {
        let [a, b] = ids();
        let mut catalog = RelationCatalog::new();
        catalog.index(Relation::new(b, a));

        assert!(catalog.remove(&Relation::new(b, a)));
        assert!(!catalog.remove(&Relation::new(b, a)));
        assert!(catalog.neighbours(a, Direction::Downstream).is_empty());
        assert!(catalog.neighbours(b, Direction::Upstream).is_empty());
        assert_eq!(catalog.activities().count(), 0);
    }

    #[test]
    fn catalog_reach_respects_depth() {
        let [a, b, c] = ids();
        let mut catalog = RelationCatalog::new();
        catalog.index(Relation::new(b, a));
        catalog.index(Relation::new(c, b));

        assert_eq!(catalog.downstream_of(a, None), BTreeSet::from([b, c]));
        assert_eq!(catalog.downstream_of(a, Some(1)), BTreeSet::from([b]));
        assert!(catalog.downstream_of(a, Some(0)).is_empty());
        assert_eq!(catalog.upstream_of(c, None), BTreeSet::from([a, b]));
        assert!(catalog.upstream_of(a, None).is_empty());
    }

    #[test]
    fn catalog_chains_include_root() {
        let [a, b, c] = ids();
        let mut catalog = RelationCatalog::new();
        catalog.index(Relation::new(b, a));
        catalog.index(Relation::new(c, b));

        let down = catalog.downstream_chains(a, 10);
        assert_eq!(down.chains, vec![vec![a, b, c]]);
        assert!(!down.truncated);

        let up = catalog.upstream_chains(c, 10);
        assert_eq!(up.chains, vec![vec![a, b, c]]);
    }

    #[test]
    fn catalog_chains_branch() {
        let [a, b, c] = ids();
        let mut catalog = RelationCatalog::new();
        catalog.index(Relation::new(b, a));
        catalog.index(Relation::new(c, a));

        let down = catalog.downstream_chains(a, 10);
        assert_eq!(down.chains, vec![vec![a, b], vec![a, c]]);
    }

    #[test]
    fn catalog_chains_empty_without_relations() {
        let [a] = ids();
        let catalog = RelationCatalog::new();
        assert!(catalog.downstream_chains(a, 10).is_empty());
        assert!(catalog.upstream_chains(a, 10).is_empty());
    }
}
