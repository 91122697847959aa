//! Lineage Model
//!
//! Immutable provenance records.
//!
//! # Core Concepts
//!
//! - [`Entity`]: one content-addressed version of a path
//! - [`ArtifactPath`]: normalized path with the path-relation predicate
//! - [`Checksum`]: version identity of an entity
//! - [`Plan`]: reusable description of a computational step
//! - [`Activity`]: one execution, linking [`Usage`]s to [`Generation`]s
//! - [`ActivityCollection`]: activities recorded as one logical run
//!
//! # Example
//!
//! ```rust
//! use lineage_model::{Activity, Entity, Plan};
//!
//! let plan = Plan::new("report", "python report.py out.csv");
//! let activity = Activity::builder(plan)
//!     .usage(Entity::new("out.csv", "c1").unwrap())
//!     .generation(Entity::new("report.txt", "c2").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(activity.usages().len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod activity;
mod checksum;
mod collection;
mod entity;
mod error;
mod id;
mod path;
mod plan;

pub use activity::{Activity, ActivityBuilder, Association, Generation, Usage};
pub use checksum::Checksum;
pub use collection::ActivityCollection;
pub use entity::{Author, Entity};
pub use error::ModelError;
pub use id::{ActivityId, CollectionId, PlanId};
pub use path::ArtifactPath;
pub use plan::{CommandSlot, Plan};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn activity_serde_round_trip() {
        let plan = Plan::new("train", "python train.py {data}")
            .with_input(CommandSlot::new("data").with_default("data/"));
        let activity = Activity::builder(plan)
            .usage(Entity::new("data/", "tree1").unwrap().with_author(Author::new("Ada")))
            .generation(Entity::new("model.bin", "m1").unwrap())
            .build()
            .unwrap();

        let json = serde_json::to_string(&activity).unwrap();
        let back: Activity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, activity);
        assert_eq!(back.usages()[0].entity().authors().len(), 1);
    }

    #[test]
    fn directory_usage_relates_to_contained_generation() {
        let dir = Entity::new("data", "t1").unwrap();
        let file = Entity::new("data/file.csv", "c1").unwrap();
        assert!(dir.path().is_related_to(file.path()));
    }
}
