use lineage_catalog::{Relation, RelationCatalog};
use lineage_model::ActivityId;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

fn nodes(count: usize) -> Vec<ActivityId> {
    (0..count).map(|_| ActivityId::new()).collect()
}

/// `k` diamonds in series: top → {left, right} → bottom, bottom is next top
fn diamond_ladder(k: usize) -> (RelationCatalog, ActivityId) {
    let mut catalog = RelationCatalog::new();
    let root = ActivityId::new();
    let mut top = root;
    for _ in 0..k {
        let (left, right, bottom) = (ActivityId::new(), ActivityId::new(), ActivityId::new());
        catalog.index(Relation::new(left, top));
        catalog.index(Relation::new(right, top));
        catalog.index(Relation::new(bottom, left));
        catalog.index(Relation::new(bottom, right));
        top = bottom;
    }
    (catalog, root)
}

proptest! {
    #[test]
    fn prop_rejected_relations_keep_catalog_acyclic(
        node_count in 1..20usize,
        edges in proptest::collection::vec((0..20usize, 0..20usize), 0..50)
    ) {
        let mut catalog = RelationCatalog::new();
        let nodes = nodes(node_count);

        for (up_idx, down_idx) in edges {
            if up_idx < nodes.len() && down_idx < nodes.len() {
                let relation = Relation::new(nodes[down_idx], nodes[up_idx]);
                if catalog.index(relation) && catalog.find_cycle_through(relation.downstream).is_some() {
                    catalog.remove(&relation);
                }
                prop_assert!(catalog.is_acyclic());
            }
        }
    }

    #[test]
    fn prop_chain_members_equal_reach(
        node_count in 2..12usize,
        edges in proptest::collection::vec((0..12usize, 0..12usize), 0..30)
    ) {
        let mut catalog = RelationCatalog::new();
        let nodes = nodes(node_count);

        // Only lower → higher index, so the catalog is a DAG
        for (a, b) in edges {
            let (up, down) = (a.min(b), a.max(b));
            if up != down && down < nodes.len() {
                catalog.index(Relation::new(nodes[down], nodes[up]));
            }
        }

        for &node in &nodes {
            let down = catalog.downstream_chains(node, 100_000);
            prop_assert!(!down.truncated);
            let reach: HashSet<ActivityId> = catalog.downstream_of(node, None).into_iter().collect();
            prop_assert_eq!(down.members(), reach);

            let up = catalog.upstream_chains(node, 100_000);
            for chain in &up.chains {
                prop_assert_eq!(chain.last(), Some(&node));
            }
            let reach: BTreeSet<ActivityId> = up
                .chains
                .iter()
                .flat_map(|chain| chain[..chain.len() - 1].iter().copied())
                .collect();
            prop_assert_eq!(reach, catalog.upstream_of(node, None));
        }
    }
}

#[test]
fn test_diamond_ladder_doubles_chains() {
    for k in 1..=6 {
        let (catalog, root) = diamond_ladder(k);
        let chains = catalog.downstream_chains(root, usize::MAX);
        assert_eq!(chains.len(), 1 << k);
        assert!(!chains.truncated);
        assert!(chains.chains.iter().all(|chain| chain.len() == 2 * k + 1));
    }
}

#[test]
fn test_diamond_ladder_truncates_at_cap() {
    let (catalog, root) = diamond_ladder(12);
    let chains = catalog.downstream_chains(root, 1_000);
    assert_eq!(chains.len(), 1_000);
    assert!(chains.truncated);
    assert_eq!(catalog.downstream_of(root, None).len(), 36);
}

#[test]
fn test_rejects_simple_cycle() {
    let mut catalog = RelationCatalog::new();
    let (n1, n2, n3) = (ActivityId::new(), ActivityId::new(), ActivityId::new());

    catalog.index(Relation::new(n2, n1));
    catalog.index(Relation::new(n3, n2));
    assert!(catalog.find_cycle_through(n3).is_none());

    catalog.index(Relation::new(n1, n3));
    let cycle = catalog.find_cycle_through(n1).unwrap();
    assert_eq!(cycle, vec![n1, n2, n3]);
}

#[test]
fn test_depth_limited_reach() {
    let (catalog, root) = diamond_ladder(3);
    assert_eq!(catalog.downstream_of(root, Some(1)).len(), 2);
    assert_eq!(catalog.downstream_of(root, Some(2)).len(), 3);
    assert!(catalog.downstream_of(root, Some(0)).is_empty());
}
