//! Lineage Path Index
//!
//! Path-keyed usage and generation indices with radix tree lookup.
//!
//! # Overview
//!
//! - **PathIndex**: `by_usage` / `by_generation` tables, append-only per path
//! - **Related lookup**: activities under any ancestor, equal, or descendant
//!   path, so a generated directory covers the files read from inside it
//!
//! # Example
//!
//! ```rust
//! use lineage_index::{IndexRole, PathIndex};
//! use lineage_model::{ActivityId, ArtifactPath};
//!
//! let mut index = PathIndex::new();
//! let producer = ActivityId::new();
//! index.append(IndexRole::Generation, &ArtifactPath::parse("data").unwrap(), producer);
//!
//! let file = ArtifactPath::parse("data/file.csv").unwrap();
//! assert!(index.related_activities(IndexRole::Generation, &file).contains(&producer));
//! ```

#![warn(missing_docs)]

pub mod path_index;

pub use path_index::{IndexRole, PathIndex};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
