//! Lineage Workflow
//!
//! Plan DAGs derived from activity lineage, and the registry of plugins
//! that export or execute them.
//!
//! # Core Concepts
//!
//! - [`PlanDag`]: one node per activity with its plan, edges upstream →
//!   downstream
//! - [`WorkflowConverter`]: renders a DAG in a workflow language
//! - [`WorkflowProvider`]: executes a DAG and reports produced paths
//! - [`WorkflowRegistry`]: explicit set of converters and providers, built
//!   from a [`RegistryConfig`] over a static [`PluginCatalog`]
//!
//! # Example
//!
//! ```rust
//! use lineage_model::{ActivityId, Plan};
//! use lineage_workflow::{PlanDag, WorkflowRegistry};
//! use std::path::Path;
//!
//! let mut dag = PlanDag::new();
//! let (a, b) = (ActivityId::new(), ActivityId::new());
//! dag.add_node(a, Plan::new("prepare", "python prepare.py"));
//! dag.add_node(b, Plan::new("train", "python train.py"));
//! dag.add_edge(a, b);
//! assert_eq!(dag.roots()[0].activity, a);
//!
//! let registry = WorkflowRegistry::new();
//! assert!(registry.convert(&dag, "cwl", Path::new("."), None).is_err());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod dag;
pub mod error;
pub mod plugin;
pub mod registry;

pub use dag::{PlanDag, PlanNode};
pub use error::WorkflowError;
pub use plugin::{ProviderConfig, WorkflowConverter, WorkflowProvider};
pub use registry::{ConverterFactory, PluginCatalog, ProviderFactory, RegistryConfig, WorkflowRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
