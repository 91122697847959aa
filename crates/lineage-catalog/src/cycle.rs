//! Acyclicity checks
//!
//! Relations are projected into a petgraph `DiGraphMap` with edges running
//! upstream → downstream, then checked with `is_cyclic_directed`. Only the
//! reach of the activity being inserted is projected: any new cycle must
//! pass through it.

use crate::catalog::RelationCatalog;
use crate::relation::Direction;
use lineage_model::ActivityId;
use petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeSet, HashMap, VecDeque};

impl RelationCatalog {
    /// Project the relations among `nodes` into a graph
    #[must_use]
    pub fn subgraph(&self, nodes: &BTreeSet<ActivityId>) -> DiGraphMap<ActivityId, ()> {
        let mut graph = DiGraphMap::new();
        for &node in nodes {
            graph.add_node(node);
            for &next in self.neighbours(node, Direction::Downstream) {
                if nodes.contains(&next) {
                    graph.add_edge(node, next, ());
                }
            }
        }
        graph
    }

    /// Project every relation into a graph
    #[must_use]
    pub fn graph(&self) -> DiGraphMap<ActivityId, ()> {
        let mut graph = DiGraphMap::new();
        for relation in self.relations() {
            graph.add_edge(relation.upstream, relation.downstream, ());
        }
        graph
    }

    /// Check the whole catalog
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph())
    }

    /// Activities ordered so every upstream precedes its downstreams
    ///
    /// Returns `None` if the catalog contains a cycle.
    #[must_use]
    pub fn topological_order(&self) -> Option<Vec<ActivityId>> {
        toposort(&self.graph(), None).ok()
    }

    /// Find a cycle reachable from `activity`
    ///
    /// Returns `None` when the relations around `activity` are acyclic.
    /// Otherwise returns the activities of one cycle listed upstream to
    /// downstream, the last depending on the first. When `activity` is on
    /// a cycle the shortest such cycle is reported, starting at `activity`.
    #[must_use]
    pub fn find_cycle_through(&self, activity: ActivityId) -> Option<Vec<ActivityId>> {
        let mut scope = self.reach(activity, Direction::Upstream, None);
        scope.extend(self.reach(activity, Direction::Downstream, None));
        scope.insert(activity);

        let graph = self.subgraph(&scope);
        if !is_cyclic_directed(&graph) {
            return None;
        }

        self.shortest_cycle(activity).or_else(|| {
            tarjan_scc(&graph)
                .into_iter()
                .find(|component| component.len() > 1)
        })
    }

    /// Breadth-first search downstream from `start` back to `start`
    fn shortest_cycle(&self, start: ActivityId) -> Option<Vec<ActivityId>> {
        let mut parent: HashMap<ActivityId, ActivityId> = HashMap::new();
        let mut frontier = VecDeque::from([start]);

        while let Some(node) = frontier.pop_front() {
            for &next in self.neighbours(node, Direction::Downstream) {
                if next == start {
                    let mut cycle = vec![node];
                    let mut cursor = node;
                    while let Some(&prev) = parent.get(&cursor) {
                        cycle.push(prev);
                        cursor = prev;
                    }
                    if cursor != start {
                        cycle.push(start);
                    }
                    cycle.reverse();
                    return Some(cycle);
                }
                if !parent.contains_key(&next) {
                    parent.insert(next, node);
                    frontier.push_back(next);
                }
            }
        }

        None
    }
}
