//! Entities: one version of one path

use crate::checksum::Checksum;
use crate::error::ModelError;
use crate::path::ArtifactPath;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Person credited for an entity version
///
/// Identity is `(name, email)`; affiliation is descriptive only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

impl Author {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            affiliation: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    fn identity(&self) -> (&str, Option<&str>) {
        (&self.name, self.email.as_deref())
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Author {}

impl PartialOrd for Author {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Author {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Content-addressed version of a path
///
/// Two entities are equal iff path and checksum are equal; authors are
/// metadata supplied by the caller and do not take part in identity. A new
/// version of a path is a new `Entity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    path: ArtifactPath,
    checksum: Checksum,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    authors: BTreeSet<Author>,
}

impl Entity {
    /// Parse path and checksum into an entity
    ///
    /// # Errors
    /// Returns error if the path or checksum is empty
    pub fn new(path: &str, checksum: impl Into<String>) -> Result<Self, ModelError> {
        Ok(Self::from_parts(
            ArtifactPath::parse(path)?,
            Checksum::new(checksum)?,
        ))
    }

    #[must_use]
    pub fn from_parts(path: ArtifactPath, checksum: Checksum) -> Self {
        Self {
            path,
            checksum,
            authors: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: Author) -> Self {
        self.authors.insert(author);
        self
    }

    #[must_use]
    pub fn with_authors(mut self, authors: impl IntoIterator<Item = Author>) -> Self {
        self.authors.extend(authors);
        self
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &ArtifactPath {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    #[inline]
    #[must_use]
    pub fn authors(&self) -> &BTreeSet<Author> {
        &self.authors
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.checksum == other.checksum
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.checksum.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn entity_equality_ignores_authors() {
        let a = Entity::new("out.csv", "c1").unwrap().with_author(Author::new("Ada"));
        let b = Entity::new("./out.csv", "c1").unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn entity_new_version_differs() {
        let v1 = Entity::new("out.csv", "c1").unwrap();
        let v2 = Entity::new("out.csv", "c2").unwrap();
        assert_ne!(v1, v2);
    }

    #[test]
    fn entity_rejects_bad_input() {
        assert!(matches!(Entity::new("", "c1"), Err(ModelError::EmptyPath)));
        assert!(matches!(Entity::new("a", ""), Err(ModelError::EmptyChecksum)));
    }

    #[test]
    fn author_identity_is_name_and_email() {
        let a = Author::new("Ada").with_email("ada@example.org").with_affiliation("SDSC");
        let b = Author::new("Ada").with_email("ada@example.org");
        let c = Author::new("Ada");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let entity = Entity::new("x", "c1").unwrap().with_authors([a, b, c]);
        assert_eq!(entity.authors().len(), 2);
    }

    #[test]
    fn entity_serde_skips_empty_authors() {
        let entity = Entity::new("data/x.csv", "c1").unwrap();
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json, serde_json::json!({"path": "data/x.csv", "checksum": "c1"}));
    }
}
