//! Randomized insertion simulator
//!
//! Drives seeded random activities through a [`ProvenanceStore`] and checks
//! the store invariants after every step:
//! - a rejected insertion leaves activities, relations and index keys as
//!   they were before the attempt
//! - the relation graph stays acyclic
//! - the activity count matches the number of accepted insertions

use lineage_catalog::Relation;
use lineage_model::{Activity, ActivityId, ArtifactPath, Checksum, Entity, ModelError, Plan};
use lineage_store::{ProvenanceStore, StoreError};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{debug, info, warn};

/// Simulator configuration
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of insertion attempts
    pub activities: usize,
    /// Size of the artifact path pool
    pub paths: usize,
    /// Distinct content versions per path
    pub versions: usize,
    /// Upper bound on usages per activity
    pub max_usages: usize,
    /// Upper bound on generations per activity
    pub max_generations: usize,
    pub stop_on_first_violation: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            activities: 1000,
            paths: 32,
            versions: 3,
            max_usages: 3,
            max_generations: 2,
            stop_on_first_violation: false,
        }
    }
}

impl SimulatorConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_activities(mut self, activities: usize) -> Self {
        self.activities = activities;
        self
    }

    #[must_use]
    pub fn with_paths(mut self, paths: usize) -> Self {
        self.paths = paths.max(1);
        self
    }

    #[must_use]
    pub fn with_stop_on_first_violation(mut self, stop: bool) -> Self {
        self.stop_on_first_violation = stop;
        self
    }
}

/// An invariant broken during simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A rejected insertion changed observable state
    RejectionLeftTrace { step: usize, activity: ActivityId },
    /// The relation graph contains a cycle
    GraphCyclic { step: usize },
    /// Stored activity count disagrees with accepted insertions
    CountMismatch {
        step: usize,
        expected: usize,
        actual: usize,
    },
    /// Insertion failed for a reason other than a cycle
    UnexpectedError { step: usize, error: String },
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulatorStats {
    pub attempted: usize,
    pub accepted: usize,
    pub rejected_cycles: usize,
    pub relations: usize,
    pub usage_paths: usize,
    pub generation_paths: usize,
    pub longest_cycle: usize,
}

/// Final report from a run
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: SimulatorStats,
    pub violations: Vec<Violation>,
}

impl SimulatorReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        let stats = &self.stats;

        report.push_str("=== Lineage Simulator Report ===\n\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Path Pool: {}", self.config.paths);
        let _ = writeln!(report, "Insertions Attempted: {}", stats.attempted);
        let _ = writeln!(report, "Insertions Accepted: {}", stats.accepted);
        let _ = writeln!(report, "Rejected (cycle): {}", stats.rejected_cycles);
        let _ = writeln!(report, "Longest Cycle: {}", stats.longest_cycle);
        let _ = writeln!(report, "Relations: {}", stats.relations);
        let _ = writeln!(report, "Usage Paths: {}", stats.usage_paths);
        let _ = writeln!(report, "Generation Paths: {}", stats.generation_paths);
        let _ = writeln!(report, "Violations: {}", self.violations.len());

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, violation) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {violation:?}", i + 1);
            }
        }

        let _ = write!(
            report,
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

/// Observable store state compared around a rejected insertion
#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    activities: usize,
    relations: Vec<Relation>,
    usage_paths: Vec<ArtifactPath>,
    generation_paths: Vec<ArtifactPath>,
}

impl Snapshot {
    fn capture(store: &ProvenanceStore) -> Self {
        Self {
            activities: store.activity_count(),
            relations: store.relations(),
            usage_paths: store.get_all_usage_paths(),
            generation_paths: store.get_all_generation_paths(),
        }
    }
}

/// Path pool shaped as shallow directories holding a few files each
///
/// Every fifth entry is a directory, the rest are files inside the most
/// recent directory, so generations of a directory relate to usages of its
/// files.
#[must_use]
pub fn path_pool(size: usize) -> Vec<String> {
    (0..size.max(1))
        .map(|i| {
            let dir = i / 5;
            if i % 5 == 0 {
                format!("d{dir}")
            } else {
                format!("d{dir}/f{i}.dat")
            }
        })
        .collect()
}

fn random_entity(
    rng: &mut StdRng,
    pool: &[String],
    config: &SimulatorConfig,
) -> Result<Entity, ModelError> {
    let path = &pool[rng.gen_range(0..pool.len())];
    let version = rng.gen_range(0..config.versions.max(1));
    let content = format!("{path}@{version}");
    Ok(Entity::from_parts(
        ArtifactPath::parse(path)?,
        Checksum::compute(content.as_bytes()),
    ))
}

fn random_activity(
    rng: &mut StdRng,
    step: usize,
    pool: &[String],
    config: &SimulatorConfig,
) -> Result<Activity, ModelError> {
    let plan = Plan::new(format!("step{step}"), format!("run step{step}"));
    let mut builder = Activity::builder(plan);
    for _ in 0..rng.gen_range(0..=config.max_usages) {
        builder = builder.usage(random_entity(rng, pool, config)?);
    }
    for _ in 0..rng.gen_range(1..=config.max_generations.max(1)) {
        builder = builder.generation(random_entity(rng, pool, config)?);
    }
    builder.build()
}

/// Run the simulator against `store`
///
/// The store is expected to start empty; prior contents only shift the
/// accepted-count check.
pub fn run_simulator(config: SimulatorConfig, store: &ProvenanceStore) -> SimulatorReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let pool = path_pool(config.paths);
    let baseline = store.activity_count();

    let mut stats = SimulatorStats::default();
    let mut violations = Vec::new();

    info!(
        seed = config.seed,
        activities = config.activities,
        paths = pool.len(),
        "starting simulation"
    );

    for step in 0..config.activities {
        let found = violations.len();
        stats.attempted += 1;

        let activity = match random_activity(&mut rng, step, &pool, &config) {
            Ok(activity) => activity,
            Err(err) => {
                violations.push(Violation::UnexpectedError {
                    step,
                    error: err.to_string(),
                });
                continue;
            }
        };
        let id = activity.id();
        let before = Snapshot::capture(store);

        match store.add(activity) {
            Ok(_) => stats.accepted += 1,
            Err(StoreError::CycleDetected { cycle, .. }) => {
                stats.rejected_cycles += 1;
                stats.longest_cycle = stats.longest_cycle.max(cycle.len());
                debug!(step, activity = %id, cycle_len = cycle.len(), "insertion rejected");

                if Snapshot::capture(store) != before {
                    violations.push(Violation::RejectionLeftTrace { step, activity: id });
                }
            }
            Err(err) => violations.push(Violation::UnexpectedError {
                step,
                error: err.to_string(),
            }),
        }

        if !store.is_acyclic() {
            violations.push(Violation::GraphCyclic { step });
        }
        let actual = store.activity_count();
        if actual != baseline + stats.accepted {
            violations.push(Violation::CountMismatch {
                step,
                expected: baseline + stats.accepted,
                actual,
            });
        }

        if violations.len() > found {
            warn!(step, count = violations.len() - found, "invariant violation");
            if config.stop_on_first_violation {
                break;
            }
        }
    }

    stats.relations = store.relation_count();
    stats.usage_paths = store.get_all_usage_paths().len();
    stats.generation_paths = store.get_all_generation_paths().len();

    info!(
        accepted = stats.accepted,
        rejected = stats.rejected_cycles,
        violations = violations.len(),
        "simulation finished"
    );

    SimulatorReport {
        config,
        stats,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_pool_mixes_directories_and_files() {
        let pool = path_pool(7);
        assert_eq!(pool[0], "d0");
        assert_eq!(pool[1], "d0/f1.dat");
        assert_eq!(pool[5], "d1");
        assert_eq!(path_pool(0), vec!["d0".to_string()]);
    }

    #[test]
    fn random_activity_always_generates() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = SimulatorConfig::default();
        let pool = path_pool(config.paths);
        for step in 0..50 {
            let activity = random_activity(&mut rng, step, &pool, &config).unwrap();
            assert!(!activity.generations().is_empty());
            assert!(activity.usages().len() <= config.max_usages);
        }
    }

    #[test]
    fn random_entity_checksum_is_content_digest() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = SimulatorConfig::default().with_paths(1);
        let entity = random_entity(&mut rng, &path_pool(1), &config).unwrap();

        let versions: Vec<Checksum> = (0..config.versions)
            .map(|v| Checksum::compute(format!("d0@{v}").as_bytes()))
            .collect();
        assert_eq!(entity.path().to_string(), "d0");
        assert!(versions.contains(entity.checksum()));
    }

    #[test]
    fn report_text_marks_result() {
        let report = SimulatorReport {
            config: SimulatorConfig::default(),
            stats: SimulatorStats::default(),
            violations: vec![Violation::GraphCyclic { step: 3 }],
        };
        let text = report.generate_text();
        assert!(text.contains("GraphCyclic"));
        assert!(text.ends_with("=== Result: FAIL ===\n"));
    }
}
