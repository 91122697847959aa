//! Lineage Relation Catalog
//!
//! Dependency relations between activities and the graph queries over them.
//!
//! # Core Concepts
//!
//! - **Relation**: `(downstream, upstream)`, downstream consumed what
//!   upstream produced
//! - **Reach**: transitive upstream/downstream sets with optional depth
//! - **Chains**: maximal paths from an activity, capped against
//!   exponential blow-up
//! - **Cycle check**: petgraph projection of the reach around an activity
//!
//! # Example
//!
//! ```rust
//! use lineage_catalog::{Relation, RelationCatalog};
//! use lineage_model::ActivityId;
//!
//! let (a, b) = (ActivityId::new(), ActivityId::new());
//! let mut catalog = RelationCatalog::new();
//! catalog.index(Relation::new(b, a));
//!
//! assert!(catalog.downstream_of(a, None).contains(&b));
//! assert_eq!(catalog.downstream_chains(a, 100).chains, vec![vec![a, b]]);
//! assert!(catalog.find_cycle_through(a).is_none());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod catalog;
mod chains;
mod cycle;
mod relation;

pub use catalog::RelationCatalog;
pub use chains::{Chain, ChainSet};
pub use relation::{Direction, Relation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
