//! Lineage Simulator
//!
//! Seeded random workloads for the provenance store, checking after every
//! insertion that rejections are clean and the relation graph stays a DAG.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod simulator;

pub use simulator::{
    path_pool, run_simulator, SimulatorConfig, SimulatorReport, SimulatorStats, Violation,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
