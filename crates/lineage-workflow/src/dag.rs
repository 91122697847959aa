//! DAG of plans implied by activity lineage
//!
//! Provides [`PlanDag`]: one node per activity (carrying its plan), an edge
//! from every upstream activity to each activity depending on it. This is
//! the shape converters and providers consume.

use crate::error::WorkflowError;
use lineage_model::{ActivityId, Plan, PlanId};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// One step of a plan DAG
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub activity: ActivityId,
    pub plan: Plan,
}

/// Plans connected by activity dependencies
#[derive(Debug, Clone, Default)]
pub struct PlanDag {
    graph: DiGraph<PlanNode, ()>,
    nodes: HashMap<ActivityId, NodeIndex>,
}

impl PlanDag {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the step for `activity`; a second add of the same activity is a no-op
    pub fn add_node(&mut self, activity: ActivityId, plan: Plan) -> NodeIndex {
        if let Some(&index) = self.nodes.get(&activity) {
            return index;
        }
        let index = self.graph.add_node(PlanNode { activity, plan });
        self.nodes.insert(activity, index);
        index
    }

    /// Connect `upstream` → `downstream`
    ///
    /// Returns false if either step is missing or the edge already exists.
    pub fn add_edge(&mut self, upstream: ActivityId, downstream: ActivityId) -> bool {
        let (Some(&from), Some(&to)) = (self.nodes.get(&upstream), self.nodes.get(&downstream))
        else {
            return false;
        };
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    #[must_use]
    pub fn node(&self, activity: ActivityId) -> Option<&PlanNode> {
        self.nodes.get(&activity).map(|&index| &self.graph[index])
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, activity: ActivityId) -> bool {
        self.nodes.contains_key(&activity)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Steps ordered so every upstream precedes its dependents
    ///
    /// # Errors
    /// Returns [`WorkflowError::CyclicPlanGraph`] if no such order exists
    pub fn topological_order(&self) -> Result<Vec<&PlanNode>, WorkflowError> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|index| &self.graph[index]).collect())
            .map_err(|_| WorkflowError::CyclicPlanGraph)
    }

    /// Steps with no upstream (entry points)
    #[must_use]
    pub fn roots(&self) -> Vec<&PlanNode> {
        self.graph
            .node_indices()
            .filter(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|index| &self.graph[index])
            .collect()
    }

    /// Steps nothing depends on (exit points)
    #[must_use]
    pub fn leaves(&self) -> Vec<&PlanNode> {
        self.graph
            .node_indices()
            .filter(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|index| &self.graph[index])
            .collect()
    }

    /// Distinct plans in topological order
    ///
    /// # Errors
    /// Returns [`WorkflowError::CyclicPlanGraph`] if no such order exists
    pub fn plans(&self) -> Result<Vec<&Plan>, WorkflowError> {
        let mut seen: HashSet<PlanId> = HashSet::new();
        Ok(self
            .topological_order()?
            .into_iter()
            .filter(|node| seen.insert(node.plan.id()))
            .map(|node| &node.plan)
            .collect())
    }

    /// Direct upstream steps of `activity`
    #[must_use]
    pub fn upstream_of(&self, activity: ActivityId) -> Vec<&PlanNode> {
        self.neighbours(activity, Direction::Incoming)
    }

    /// Direct dependents of `activity`
    #[must_use]
    pub fn downstream_of(&self, activity: ActivityId) -> Vec<&PlanNode> {
        self.neighbours(activity, Direction::Outgoing)
    }

    fn neighbours(&self, activity: ActivityId, direction: Direction) -> Vec<&PlanNode> {
        let Some(&index) = self.nodes.get(&activity) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(index, direction)
            .map(|next| &self.graph[next])
            .collect()
    }

    /// Underlying graph
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &DiGraph<PlanNode, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(dag: &mut PlanDag, name: &str) -> ActivityId {
        let id = ActivityId::new();
        dag.add_node(id, Plan::new(name, format!("run {name}")));
        id
    }

    #[test]
    fn dag_orders_steps() {
        let mut dag = PlanDag::new();
        let clean = step(&mut dag, "clean");
        let train = step(&mut dag, "train");
        let report = step(&mut dag, "report");
        assert!(dag.add_edge(train, report));
        assert!(dag.add_edge(clean, train));
        assert!(!dag.add_edge(clean, train));

        let names: Vec<&str> = dag
            .topological_order()
            .unwrap()
            .iter()
            .map(|node| node.plan.name())
            .collect();
        assert_eq!(names, vec!["clean", "train", "report"]);
        assert_eq!(dag.roots().len(), 1);
        assert_eq!(dag.roots()[0].activity, clean);
        assert_eq!(dag.leaves()[0].activity, report);
        assert_eq!(dag.edge_count(), 2);
    }

    #[test]
    fn dag_add_node_is_idempotent() {
        let mut dag = PlanDag::new();
        let id = ActivityId::new();
        let first = dag.add_node(id, Plan::new("a", "a"));
        let second = dag.add_node(id, Plan::new("b", "b"));
        assert_eq!(first, second);
        assert_eq!(dag.node_count(), 1);
        assert_eq!(dag.node(id).unwrap().plan.name(), "a");
    }

    #[test]
    fn dag_edge_requires_both_nodes() {
        let mut dag = PlanDag::new();
        let a = step(&mut dag, "a");
        assert!(!dag.add_edge(a, ActivityId::new()));
        assert_eq!(dag.edge_count(), 0);
    }

    #[test]
    fn dag_plans_are_distinct() {
        let plan = Plan::new("shared", "run shared");
        let mut dag = PlanDag::new();
        let (a, b) = (ActivityId::new(), ActivityId::new());
        dag.add_node(a, plan.clone());
        dag.add_node(b, plan);
        dag.add_edge(a, b);

        assert_eq!(dag.plans().unwrap().len(), 1);
        assert_eq!(dag.downstream_of(a)[0].activity, b);
        assert_eq!(dag.upstream_of(b)[0].activity, a);
    }

    #[test]
    fn dag_cycle_has_no_order() {
        let mut dag = PlanDag::new();
        let a = step(&mut dag, "a");
        let b = step(&mut dag, "b");
        dag.add_edge(a, b);
        dag.add_edge(b, a);
        assert_eq!(dag.topological_order().unwrap_err(), WorkflowError::CyclicPlanGraph);
    }
}
