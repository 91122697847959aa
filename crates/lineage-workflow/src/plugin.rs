//! Workflow plugin interfaces
//!
//! Converters render a [`PlanDag`] in an external workflow language;
//! providers execute one. The store never calls either: it only supplies
//! the DAG.

use crate::dag::PlanDag;
use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Exports plan DAGs to workflow description languages
pub trait WorkflowConverter: Send + Sync {
    /// Plugin name, unique within a registry
    fn name(&self) -> &str;

    /// Format names this converter produces, e.g. `cwl`
    fn formats(&self) -> Vec<String>;

    /// Render `dag` in `format`
    ///
    /// `output`, when given, is the file the caller will write the result
    /// to; converters may use it to compute relative paths.
    ///
    /// # Errors
    /// Returns [`WorkflowError::UnsupportedFormat`] for formats not listed
    /// by [`formats`](Self::formats), [`WorkflowError::Conversion`] otherwise
    fn convert(
        &self,
        dag: &PlanDag,
        basedir: &Path,
        output: Option<&Path>,
        format: &str,
    ) -> Result<String, WorkflowError>;

    /// Check if `format` is listed, ignoring ASCII case
    fn supports(&self, format: &str) -> bool {
        self.formats()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(format))
    }
}

/// Executes plan DAGs on some backend
pub trait WorkflowProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run every step of `dag` and return the paths produced
    ///
    /// # Errors
    /// Returns [`WorkflowError::Execution`] when the backend fails
    fn execute(
        &self,
        dag: &PlanDag,
        basedir: &Path,
        config: &ProviderConfig,
    ) -> Result<Vec<PathBuf>, WorkflowError>;
}

/// Backend-specific key/value settings passed to a provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig {
    values: BTreeMap<String, String>,
}

impl ProviderConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ProviderConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
