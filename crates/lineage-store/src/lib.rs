//! Lineage Store
//!
//! Provenance graph store: immutable activities, path indices, derived
//! dependency relations, and lineage queries over them.
//!
//! # Core Concepts
//!
//! - **ProvenanceStore**: single-writer, many-reader store; `add` is atomic
//! - **Insertion**: index usages/generations, derive relations through
//!   path-relation, reject cycles, commit to the journal, or roll back
//! - **Journal**: durable record log, replayed on open
//! - **PlanStore**: collaborator resolving plan associations
//!
//! # Example
//!
//! ```rust
//! use lineage_model::{Activity, ArtifactPath, Entity, Plan};
//! use lineage_store::ProvenanceStore;
//!
//! let store = ProvenanceStore::in_memory();
//!
//! let prepare = Activity::builder(Plan::new("prepare", "python prepare.py"))
//!     .generation(Entity::new("data", "tree1").unwrap())
//!     .build()
//!     .unwrap();
//! let train = Activity::builder(Plan::new("train", "python train.py"))
//!     .usage(Entity::new("data/file.csv", "c1").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let a = store.add(prepare).unwrap();
//! let b = store.add(train).unwrap();
//! assert!(store.downstream_of(a, None).contains(&b));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod journal;
pub mod plan_store;
mod state;
pub mod store;

pub use config::{StoreConfig, DEFAULT_MAX_CHAINS};
pub use error::{ConfigError, JournalError, PlanStoreError, StoreError};
pub use journal::{FileJournal, Journal, JournalRecord, MemoryJournal};
pub use plan_store::{InMemoryPlanStore, PlanStore};
pub use store::ProvenanceStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn store_is_shared_across_threads() {
        let store = Arc::new(ProvenanceStore::in_memory());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let activity = lineage_test_utils::create_step(&format!("step{n}"))
                        .writes(&format!("out{n}.csv"), "c1")
                        .build();
                    store.add(activity).unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.activity_count(), 4);
        assert_eq!(store.get_all_generation_paths().len(), 4);
    }
}
