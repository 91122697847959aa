//! Registry of workflow converters and providers
//!
//! Provides [`WorkflowRegistry`], populated either directly or from a
//! [`RegistryConfig`] naming entries of a static [`PluginCatalog`].

use crate::dag::PlanDag;
use crate::error::WorkflowError;
use crate::plugin::{ProviderConfig, WorkflowConverter, WorkflowProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Constructor for a converter
pub type ConverterFactory = fn() -> Arc<dyn WorkflowConverter>;

/// Constructor for a provider
pub type ProviderFactory = fn() -> Arc<dyn WorkflowProvider>;

/// Plugins to enable, by catalog name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub converters: Vec<String>,
    #[serde(default)]
    pub providers: Vec<String>,
}

impl RegistryConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_converter(mut self, name: impl Into<String>) -> Self {
        self.converters.push(name.into());
        self
    }

    #[must_use]
    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        self.providers.push(name.into());
        self
    }
}

/// Every plugin compiled into the binary, by name
#[derive(Default, Clone)]
pub struct PluginCatalog {
    converters: BTreeMap<String, ConverterFactory>,
    providers: BTreeMap<String, ProviderFactory>,
}

impl PluginCatalog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_converter(mut self, name: impl Into<String>, factory: ConverterFactory) -> Self {
        self.converters.insert(name.into(), factory);
        self
    }

    #[must_use]
    pub fn with_provider(mut self, name: impl Into<String>, factory: ProviderFactory) -> Self {
        self.providers.insert(name.into(), factory);
        self
    }

    pub fn converter_names(&self) -> impl Iterator<Item = &str> {
        self.converters.keys().map(String::as_str)
    }

    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("converters", &self.converters.keys().collect::<Vec<_>>())
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Active converters and providers
///
/// Converters are consulted in registration order; the first one listing a
/// format handles it.
#[derive(Default, Clone)]
pub struct WorkflowRegistry {
    converters: Vec<Arc<dyn WorkflowConverter>>,
    providers: Vec<Arc<dyn WorkflowProvider>>,
}

impl WorkflowRegistry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate the plugins `config` enables
    ///
    /// # Errors
    /// Returns [`WorkflowError::UnknownPlugin`] for a name missing from
    /// `catalog`
    pub fn from_config(config: &RegistryConfig, catalog: &PluginCatalog) -> Result<Self, WorkflowError> {
        let mut registry = Self::new();

        for name in &config.converters {
            let factory = catalog
                .converters
                .get(name)
                .ok_or_else(|| WorkflowError::UnknownPlugin { name: name.clone() })?;
            registry.register_converter(factory());
        }

        for name in &config.providers {
            let factory = catalog
                .providers
                .get(name)
                .ok_or_else(|| WorkflowError::UnknownPlugin { name: name.clone() })?;
            registry.register_provider(factory());
        }

        Ok(registry)
    }

    pub fn register_converter(&mut self, converter: Arc<dyn WorkflowConverter>) {
        debug!(converter = converter.name(), "registered workflow converter");
        self.converters.push(converter);
    }

    /// Register a provider, replacing any provider with the same name
    pub fn register_provider(&mut self, provider: Arc<dyn WorkflowProvider>) {
        debug!(provider = provider.name(), "registered workflow provider");
        self.providers.retain(|known| known.name() != provider.name());
        self.providers.push(provider);
    }

    /// `(converter, formats)` for every converter, in registration order
    #[must_use]
    pub fn discover(&self) -> Vec<(&str, Vec<String>)> {
        self.converters
            .iter()
            .map(|converter| (converter.name(), converter.formats()))
            .collect()
    }

    /// Every supported format, flattened, in registration order
    #[must_use]
    pub fn supported_formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = Vec::new();
        for converter in &self.converters {
            for format in converter.formats() {
                if !formats.iter().any(|known| known.eq_ignore_ascii_case(&format)) {
                    formats.push(format);
                }
            }
        }
        formats
    }

    #[must_use]
    pub fn converter_for(&self, format: &str) -> Option<Arc<dyn WorkflowConverter>> {
        self.converters
            .iter()
            .find(|converter| converter.supports(format))
            .cloned()
    }

    #[must_use]
    pub fn provider(&self, name: &str) -> Option<Arc<dyn WorkflowProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.name() == name)
            .cloned()
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }

    /// Render `dag` in `format` with the first converter supporting it
    ///
    /// # Errors
    /// Returns [`WorkflowError::UnsupportedFormat`] when nobody handles
    /// `format`, or whatever the converter returns
    pub fn convert(
        &self,
        dag: &PlanDag,
        format: &str,
        basedir: &Path,
        output: Option<&Path>,
    ) -> Result<String, WorkflowError> {
        let converter = self
            .converter_for(format)
            .ok_or_else(|| WorkflowError::UnsupportedFormat {
                format: format.to_string(),
            })?;
        debug!(
            converter = converter.name(),
            format,
            steps = dag.node_count(),
            "converting plan dag"
        );
        converter.convert(dag, basedir, output, format)
    }

    /// Execute `dag` with the named provider
    ///
    /// # Errors
    /// Returns [`WorkflowError::UnknownProvider`] for an unregistered name,
    /// [`WorkflowError::CyclicPlanGraph`] if `dag` has no topological
    /// order, or whatever the provider returns
    pub fn execute(
        &self,
        provider: &str,
        dag: &PlanDag,
        basedir: &Path,
        config: &ProviderConfig,
    ) -> Result<Vec<PathBuf>, WorkflowError> {
        let backend = self
            .provider(provider)
            .ok_or_else(|| WorkflowError::UnknownProvider {
                name: provider.to_string(),
            })?;
        dag.topological_order()?;
        debug!(provider, steps = dag.node_count(), "executing plan dag");
        backend.execute(dag, basedir, config)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty() && self.providers.is_empty()
    }
}

impl fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field(
                "converters",
                &self.converters.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("providers", &self.provider_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_model::{ActivityId, Plan};
    use pretty_assertions::assert_eq;

    struct Listing {
        name: &'static str,
        formats: &'static [&'static str],
    }

    impl WorkflowConverter for Listing {
        fn name(&self) -> &str {
            self.name
        }

        fn formats(&self) -> Vec<String> {
            self.formats.iter().map(ToString::to_string).collect()
        }

        fn convert(
            &self,
            dag: &PlanDag,
            _basedir: &Path,
            _output: Option<&Path>,
            format: &str,
        ) -> Result<String, WorkflowError> {
            let steps: Vec<String> = dag
                .topological_order()?
                .iter()
                .map(|node| node.plan.render_command())
                .collect();
            Ok(format!("# {} via {}\n{}", format, self.name, steps.join("\n")))
        }
    }

    struct Echo;

    impl WorkflowProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn execute(
            &self,
            dag: &PlanDag,
            basedir: &Path,
            config: &ProviderConfig,
        ) -> Result<Vec<PathBuf>, WorkflowError> {
            if config.get("fail").is_some() {
                return Err(WorkflowError::Execution {
                    provider: "echo".into(),
                    reason: "asked to fail".into(),
                });
            }
            Ok(dag
                .leaves()
                .iter()
                .map(|node| basedir.join(node.plan.name()))
                .collect())
        }
    }

    fn two_step_dag() -> PlanDag {
        let mut dag = PlanDag::new();
        let (a, b) = (ActivityId::new(), ActivityId::new());
        dag.add_node(a, Plan::new("prepare", "python prepare.py"));
        dag.add_node(b, Plan::new("report", "python report.py"));
        dag.add_edge(a, b);
        dag
    }

    fn cwl() -> Arc<dyn WorkflowConverter> {
        Arc::new(Listing {
            name: "cwl-exporter",
            formats: &["cwl"],
        })
    }

    fn echo() -> Arc<dyn WorkflowProvider> {
        Arc::new(Echo)
    }

    #[test]
    fn registry_first_converter_wins() {
        let mut registry = WorkflowRegistry::new();
        registry.register_converter(cwl());
        registry.register_converter(Arc::new(Listing {
            name: "multi",
            formats: &["CWL", "yaml"],
        }));

        assert_eq!(registry.supported_formats(), vec!["cwl", "yaml"]);
        assert_eq!(registry.converter_for("cwl").unwrap().name(), "cwl-exporter");
        assert_eq!(registry.converter_for("YAML").unwrap().name(), "multi");
        assert_eq!(registry.discover().len(), 2);
    }

    #[test]
    fn registry_convert_dispatches() {
        let mut registry = WorkflowRegistry::new();
        registry.register_converter(cwl());

        let text = registry
            .convert(&two_step_dag(), "cwl", Path::new("."), None)
            .unwrap();
        assert_eq!(text, "# cwl via cwl-exporter\npython prepare.py\npython report.py");
    }

    #[test]
    fn registry_unsupported_format() {
        let registry = WorkflowRegistry::new();
        let err = registry
            .convert(&two_step_dag(), "snakemake", Path::new("."), None)
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::UnsupportedFormat {
                format: "snakemake".into()
            }
        );
    }

    #[test]
    fn registry_execute_and_unknown_provider() {
        let mut registry = WorkflowRegistry::new();
        registry.register_provider(echo());
        registry.register_provider(echo());
        assert_eq!(registry.provider_names(), vec!["echo"]);

        let outputs = registry
            .execute("echo", &two_step_dag(), Path::new("/work"), &ProviderConfig::new())
            .unwrap();
        assert_eq!(outputs, vec![PathBuf::from("/work/report")]);

        let failed = registry
            .execute(
                "echo",
                &two_step_dag(),
                Path::new("/work"),
                &ProviderConfig::new().with("fail", "yes"),
            )
            .unwrap_err();
        assert!(failed.is_plugin_failure());

        assert!(matches!(
            registry.execute("toil", &two_step_dag(), Path::new("."), &ProviderConfig::new()),
            Err(WorkflowError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn registry_execute_rejects_cyclic_dag() {
        let mut registry = WorkflowRegistry::new();
        registry.register_provider(echo());

        let mut dag = PlanDag::new();
        let (a, b) = (ActivityId::new(), ActivityId::new());
        dag.add_node(a, Plan::new("a", "a"));
        dag.add_node(b, Plan::new("b", "b"));
        dag.add_edge(a, b);
        dag.add_edge(b, a);

        assert_eq!(
            registry
                .execute("echo", &dag, Path::new("."), &ProviderConfig::new())
                .unwrap_err(),
            WorkflowError::CyclicPlanGraph
        );
    }

    #[test]
    fn registry_from_config() {
        let catalog = PluginCatalog::new()
            .with_converter("cwl", cwl)
            .with_provider("echo", echo);

        let config = RegistryConfig::new().with_converter("cwl").with_provider("echo");
        let registry = WorkflowRegistry::from_config(&config, &catalog).unwrap();
        assert_eq!(registry.supported_formats(), vec!["cwl"]);
        assert!(registry.provider("echo").is_some());

        let unknown = RegistryConfig::new().with_converter("nextflow");
        assert_eq!(
            WorkflowRegistry::from_config(&unknown, &catalog).unwrap_err(),
            WorkflowError::UnknownPlugin {
                name: "nextflow".into()
            }
        );

        assert!(WorkflowRegistry::from_config(&RegistryConfig::new(), &catalog)
            .unwrap()
            .is_empty());
    }
}
