//! Activities: immutable records of one execution
//!
//! An [`Activity`] links the entity versions a plan run read ([`Usage`]) to
//! the versions it wrote ([`Generation`]). Activities are built once through
//! [`ActivityBuilder`] and never change afterwards.

use crate::entity::Entity;
use crate::error::ModelError;
use crate::id::ActivityId;
use crate::path::ArtifactPath;
use crate::plan::Plan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The plan an activity executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub plan: Plan,
}

/// An activity read this entity version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Usage {
    entity: Entity,
}

impl Usage {
    #[inline]
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }

    #[inline]
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }
}

/// An activity produced this entity version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Generation {
    entity: Entity,
}

impl Generation {
    #[inline]
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }

    #[inline]
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }
}

/// Record of one finished execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    id: ActivityId,
    association: Association,
    usages: Vec<Usage>,
    generations: Vec<Generation>,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

impl Activity {
    /// Start building an activity that executed `plan`
    #[must_use]
    pub fn builder(plan: Plan) -> ActivityBuilder {
        ActivityBuilder::new(plan)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ActivityId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn association(&self) -> &Association {
        &self.association
    }

    #[inline]
    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.association.plan
    }

    #[inline]
    #[must_use]
    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    #[inline]
    #[must_use]
    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    #[inline]
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[inline]
    #[must_use]
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    /// Whether any generation at `path` has the given checksum
    ///
    /// `checksum` is trimmed the way [`Checksum::new`](crate::Checksum::new)
    /// trims stored checksums.
    #[must_use]
    pub fn generates_version(&self, path: &ArtifactPath, checksum: &str) -> bool {
        let checksum = checksum.trim();
        self.generations
            .iter()
            .any(|g| g.entity.path() == path && g.entity.checksum().as_str() == checksum)
    }
}

/// Builder for [`Activity`]
///
/// Duplicate entities are recorded once per role.
#[derive(Debug, Clone)]
pub struct ActivityBuilder {
    id: Option<ActivityId>,
    plan: Plan,
    usages: Vec<Usage>,
    generations: Vec<Generation>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl ActivityBuilder {
    #[must_use]
    pub fn new(plan: Plan) -> Self {
        Self {
            id: None,
            plan,
            usages: Vec::new(),
            generations: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Use a known identifier instead of generating one
    #[must_use]
    pub fn id(mut self, id: ActivityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn usage(mut self, entity: Entity) -> Self {
        let usage = Usage::new(entity);
        if !self.usages.contains(&usage) {
            self.usages.push(usage);
        }
        self
    }

    #[must_use]
    pub fn generation(mut self, entity: Entity) -> Self {
        let generation = Generation::new(entity);
        if !self.generations.contains(&generation) {
            self.generations.push(generation);
        }
        self
    }

    #[must_use]
    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    #[must_use]
    pub fn ended_at(mut self, at: DateTime<Utc>) -> Self {
        self.ended_at = Some(at);
        self
    }

    /// Finish the record
    ///
    /// Missing timestamps default to now; a missing start defaults to the end.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidTimeRange`] if the activity ends before
    /// it starts
    pub fn build(self) -> Result<Activity, ModelError> {
        let ended_at = self.ended_at.unwrap_or_else(Utc::now);
        let started_at = self.started_at.unwrap_or(ended_at);

        if ended_at < started_at {
            return Err(ModelError::InvalidTimeRange {
                started_at: started_at.to_rfc3339(),
                ended_at: ended_at.to_rfc3339(),
            });
        }

        Ok(Activity {
            id: self.id.unwrap_or_default(),
            association: Association { plan: self.plan },
            usages: self.usages,
            generations: self.generations,
            started_at,
            ended_at,
        })
    }
}
