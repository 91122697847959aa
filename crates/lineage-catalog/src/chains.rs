//! Maximal-path enumeration over relations

use lineage_model::ActivityId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One maximal path, root included
pub type Chain = Vec<ActivityId>;

/// Result of a chain query
///
/// Chain counts grow exponentially on diamond-shaped graphs, so enumeration
/// stops at a caller-supplied limit. `truncated` is set when at least one
/// further chain existed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSet {
    pub chains: Vec<Chain>,
    pub truncated: bool,
}

impl ChainSet {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Every activity appearing in any chain, root excluded
    #[must_use]
    pub fn members(&self) -> HashSet<ActivityId> {
        self.chains
            .iter()
            .flat_map(|chain| chain.iter().skip(1).copied())
            .collect()
    }
}

/// Depth-first enumeration of maximal simple paths from `root`
///
/// A path ends where `neighbours` yields nothing not already on it. A root
/// with no neighbours produces no chains.
pub(crate) fn enumerate_chains<'a, F>(root: ActivityId, limit: usize, neighbours: F) -> ChainSet
where
    F: Fn(ActivityId) -> &'a [ActivityId],
{
    let mut set = ChainSet::default();
    if neighbours(root).is_empty() {
        return set;
    }

    let mut path = vec![root];
    let mut cursors = vec![0usize];
    let mut on_path = HashSet::from([root]);

    while let Some(&node) = path.last() {
        let open: Vec<ActivityId> = neighbours(node)
            .iter()
            .copied()
            .filter(|next| !on_path.contains(next))
            .collect();

        if open.is_empty() {
            if set.chains.len() == limit {
                set.truncated = true;
                break;
            }
            set.chains.push(path.clone());
        } else {
            let depth = path.len() - 1;
            let cursor = cursors[depth];
            if cursor < open.len() {
                cursors[depth] += 1;
                let next = open[cursor];
                path.push(next);
                cursors.push(0);
                on_path.insert(next);
                continue;
            }
        }

        if let Some(done) = path.pop() {
            on_path.remove(&done);
        }
        cursors.pop();
    }

    set
}
