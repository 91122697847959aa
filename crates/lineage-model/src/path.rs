//! Artifact paths and the path-relation predicate
//!
//! Provides [`ArtifactPath`], a normalized segment-based path. Two paths are
//! *related* when they are equal or one is an ancestor directory of the
//! other, so a generated directory covers every file later read from inside
//! it.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Normalized path of a tracked artifact
///
/// Normalization drops empty and `.` segments, so `./data//raw/` and
/// `data/raw` are the same path. Absolute paths stay absolute and never
/// relate to relative ones.
///
/// # Examples
/// - `data` is an ancestor of `data/file.csv`
/// - `data` is NOT an ancestor of `database.csv`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactPath {
    absolute: bool,
    segments: Vec<String>,
}

impl ArtifactPath {
    /// Parse and normalize a path
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyPath`] if no segment remains
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let absolute = raw.starts_with('/');
        let segments: Vec<String> = raw
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(ModelError::EmptyPath);
        }

        Ok(Self { absolute, segments })
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a parsed path has at least one segment
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path started at the filesystem root
    #[inline]
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Last segment
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Parent directory, `None` for a single-segment path
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            absolute: self.absolute,
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append a segment, returning a new path
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyPath`] if `child` normalizes to nothing
    pub fn join(&self, child: &str) -> Result<Self, ModelError> {
        let tail = Self::parse(child)?;
        let mut joined = self.clone();
        joined.segments.extend(tail.segments);
        Ok(joined)
    }

    /// Strict ancestors, nearest last (`a`, `a/b` for `a/b/c`)
    pub fn ancestors(&self) -> impl Iterator<Item = ArtifactPath> + '_ {
        (1..self.segments.len()).map(move |len| Self {
            absolute: self.absolute,
            segments: self.segments[..len].to_vec(),
        })
    }

    /// Check if this path equals or contains `other`
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.absolute == other.absolute
            && self.segments.len() <= other.segments.len()
            && self.segments[..] == other.segments[..self.segments.len()]
    }

    /// Check if this path strictly contains `other`
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.segments.len() < other.segments.len() && self.is_prefix_of(other)
    }

    /// Path-relation: equal, or one is an ancestor directory of the other
    #[inline]
    #[must_use]
    pub fn is_related_to(&self, other: &Self) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    /// Segment-terminated key used for prefix indexing
    ///
    /// Every segment is followed by `/`, so string prefixes of the key are
    /// exactly the keys of this path's ancestors (`data/` is a prefix of
    /// `data/file.csv/` but not of `database.csv/`).
    #[must_use]
    pub fn index_key(&self) -> String {
        let mut key = String::new();
        if self.absolute {
            key.push('/');
        }
        for seg in &self.segments {
            key.push_str(seg);
            key.push('/');
        }
        key
    }
}

impl Display for ArtifactPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for ArtifactPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ArtifactPath {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for ArtifactPath {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ArtifactPath> for String {
    fn from(value: ArtifactPath) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> ArtifactPath {
        ArtifactPath::parse(raw).unwrap()
    }

    #[test]
    fn path_normalizes_segments() {
        assert_eq!(p("./data//raw/"), p("data/raw"));
        assert_eq!(p("data/raw").segments(), &["data", "raw"]);
        assert_eq!(p("./data//raw/").to_string(), "data/raw");
    }

    #[test]
    fn path_rejects_empty() {
        assert!(matches!(ArtifactPath::parse(""), Err(ModelError::EmptyPath)));
        assert!(matches!(ArtifactPath::parse("."), Err(ModelError::EmptyPath)));
        assert!(matches!(ArtifactPath::parse("/"), Err(ModelError::EmptyPath)));
    }

    #[test]
    fn path_absolute_display() {
        let abs = p("/srv/data");
        assert!(abs.is_absolute());
        assert_eq!(abs.to_string(), "/srv/data");
    }

    #[test]
    fn path_parent_and_file_name() {
        let path = p("a/b/c.txt");
        assert_eq!(path.file_name(), "c.txt");
        assert_eq!(path.parent(), Some(p("a/b")));
        assert!(p("a").parent().is_none());
    }

    #[test]
    fn path_join() {
        let joined = p("data").join("raw/x.csv").unwrap();
        assert_eq!(joined, p("data/raw/x.csv"));
        assert!(p("data").join("./").is_err());
    }

    #[test]
    fn path_ancestors() {
        let ancestors: Vec<String> = p("a/b/c").ancestors().map(|a| a.to_string()).collect();
        assert_eq!(ancestors, vec!["a", "a/b"]);
        assert_eq!(p("a").ancestors().count(), 0);
    }

    #[test]
    fn path_related_directory_covers_file() {
        let dir = p("data");
        let file = p("data/file.csv");
        assert!(dir.is_ancestor_of(&file));
        assert!(dir.is_related_to(&file));
        assert!(file.is_related_to(&dir));
        assert!(dir.is_related_to(&dir));
    }

    #[test]
    fn path_related_respects_segment_boundaries() {
        let dir = p("data");
        let other = p("database.csv");
        assert!(!dir.is_related_to(&other));
        assert!(!p("data/a").is_related_to(&p("data/b")));
    }

    #[test]
    fn path_absolute_and_relative_never_relate() {
        assert!(!p("/data").is_related_to(&p("data/x")));
    }

    #[test]
    fn path_index_key_is_segment_terminated() {
        assert_eq!(p("data/file.csv").index_key(), "data/file.csv/");
        assert_eq!(p("/srv").index_key(), "/srv/");
        assert!(p("data/file.csv").index_key().starts_with(&p("data").index_key()));
        assert!(!p("database.csv").index_key().starts_with(&p("data").index_key()));
    }

    #[test]
    fn path_serde_round_trips_as_string() {
        let json = serde_json::to_string(&p("./a/b")).unwrap();
        assert_eq!(json, "\"a/b\"");
        let back: ArtifactPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p("a/b"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn segments() -> impl Strategy<Value = Vec<String>> {
            proptest::collection::vec("[a-c]{1,3}", 1..5)
        }

        proptest! {
            #[test]
            fn relation_is_symmetric(a in segments(), b in segments()) {
                let a = ArtifactPath::parse(&a.join("/")).unwrap();
                let b = ArtifactPath::parse(&b.join("/")).unwrap();
                prop_assert_eq!(a.is_related_to(&b), b.is_related_to(&a));
            }

            #[test]
            fn relation_matches_index_key_prefix(a in segments(), b in segments()) {
                let a = ArtifactPath::parse(&a.join("/")).unwrap();
                let b = ArtifactPath::parse(&b.join("/")).unwrap();
                let (ka, kb) = (a.index_key(), b.index_key());
                prop_assert_eq!(a.is_related_to(&b), ka.starts_with(&kb) || kb.starts_with(&ka));
            }
        }
    }
}
