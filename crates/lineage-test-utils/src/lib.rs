//! Testing utilities for the lineage workspace
//!
//! Shared fixtures for entities, plans and activities.

#![allow(missing_docs)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use lineage_model::{Activity, ActivityId, Author, CommandSlot, Entity, Plan};

pub fn create_entity(path: &str, checksum: &str) -> Entity {
    Entity::new(path, checksum).unwrap()
}

pub fn create_authored_entity(path: &str, checksum: &str, author: &str) -> Entity {
    create_entity(path, checksum).with_author(Author::new(author).with_email(format!("{author}@example.org")))
}

pub fn create_plan(name: &str) -> Plan {
    Plan::new(name, format!("python {name}.py"))
}

/// Plan with one input and one output slot, e.g. `python clean.py {input} {output}`
pub fn create_io_plan(name: &str, input: &str, output: &str) -> Plan {
    Plan::new(name, format!("python {name}.py {{input}} {{output}}"))
        .with_input(CommandSlot::new("input").with_default(input))
        .with_output(CommandSlot::new("output").with_default(output))
}

/// Fixed instant so timestamps in fixtures are reproducible
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Step fixture: `create_step("train").reads("data", "t1").writes("model.bin", "m1").build()`
#[derive(Debug, Clone)]
pub struct StepFixture {
    plan: Plan,
    id: Option<ActivityId>,
    reads: Vec<Entity>,
    writes: Vec<Entity>,
    offset_secs: i64,
}

pub fn create_step(name: &str) -> StepFixture {
    StepFixture {
        plan: create_plan(name),
        id: None,
        reads: Vec::new(),
        writes: Vec::new(),
        offset_secs: 0,
    }
}

impl StepFixture {
    #[must_use]
    pub fn plan(mut self, plan: Plan) -> Self {
        self.plan = plan;
        self
    }

    #[must_use]
    pub fn id(mut self, id: ActivityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn reads(mut self, path: &str, checksum: &str) -> Self {
        self.reads.push(create_entity(path, checksum));
        self
    }

    #[must_use]
    pub fn writes(mut self, path: &str, checksum: &str) -> Self {
        self.writes.push(create_entity(path, checksum));
        self
    }

    /// Start this many seconds after [`epoch`], run for one second
    #[must_use]
    pub fn at(mut self, offset_secs: i64) -> Self {
        self.offset_secs = offset_secs;
        self
    }

    pub fn build(self) -> Activity {
        let start = epoch() + Duration::seconds(self.offset_secs);
        let mut builder = Activity::builder(self.plan)
            .started_at(start)
            .ended_at(start + Duration::seconds(1));
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        for entity in self.reads {
            builder = builder.usage(entity);
        }
        for entity in self.writes {
            builder = builder.generation(entity);
        }
        builder.build().unwrap()
    }
}

/// `prepare` writes `data/`, `train` reads `data/file.csv` and writes
/// `model.bin`, `report` reads `model.bin`
pub fn create_pipeline() -> Vec<Activity> {
    vec![
        create_step("prepare").writes("data", "tree1").at(0).build(),
        create_step("train")
            .reads("data/file.csv", "c1")
            .writes("model.bin", "m1")
            .at(10)
            .build(),
        create_step("report").reads("model.bin", "m1").writes("report.txt", "r1").at(20).build(),
    ]
}
