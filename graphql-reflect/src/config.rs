//! Settings of a schema generation run.

use std::fmt;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::name;
use serde_json_bytes::Value;

use crate::hooks::NoopSchemaGeneratorHooks;
use crate::hooks::SchemaGeneratorHooks;

/// Names of the root operation types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopLevelNames {
    pub query: Name,
    pub mutation: Name,
    pub subscription: Name,
}

impl Default for TopLevelNames {
    fn default() -> Self {
        TopLevelNames {
            query: name!("Query"),
            mutation: name!("Mutation"),
            subscription: name!("Subscription"),
        }
    }
}

#[derive(Clone)]
pub struct SchemaGeneratorConfig {
    /// Qualified name prefixes of the classes that may be reflected. Empty allows every class.
    pub supported_packages: Vec<String>,
    pub top_level_names: TopLevelNames,
    pub hooks: Arc<dyn SchemaGeneratorHooks>,
}

impl SchemaGeneratorConfig {
    pub fn new(supported_packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SchemaGeneratorConfig {
            supported_packages: supported_packages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SchemaGeneratorHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_top_level_names(mut self, top_level_names: TopLevelNames) -> Self {
        self.top_level_names = top_level_names;
        self
    }

    pub(crate) fn is_supported(&self, qualified_name: &str) -> bool {
        self.supported_packages.is_empty()
            || self
                .supported_packages
                .iter()
                .any(|package| qualified_name.starts_with(package.as_str()))
    }
}

impl Default for SchemaGeneratorConfig {
    fn default() -> Self {
        SchemaGeneratorConfig {
            supported_packages: Vec::new(),
            top_level_names: TopLevelNames::default(),
            hooks: Arc::new(NoopSchemaGeneratorHooks),
        }
    }
}

impl fmt::Debug for SchemaGeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaGeneratorConfig")
            .field("supported_packages", &self.supported_packages)
            .field("top_level_names", &self.top_level_names)
            .finish_non_exhaustive()
    }
}

/// A root object whose public functions become fields of a root operation type.
#[derive(Clone, Debug)]
pub struct TopLevelObject {
    /// Qualified name of the registered class.
    pub class: String,
    /// The instance functions are invoked on. Without it the resolution source is used.
    pub instance: Option<Value>,
}

impl TopLevelObject {
    pub fn new(class: impl Into<String>) -> Self {
        TopLevelObject {
            class: class.into(),
            instance: None,
        }
    }

    pub fn with_instance(mut self, instance: Value) -> Self {
        self.instance = Some(instance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_packages_filter_by_prefix() {
        let config = SchemaGeneratorConfig::new(["shop::model"]);
        assert!(config.is_supported("shop::model::Widget"));
        assert!(!config.is_supported("billing::Invoice"));
        assert!(SchemaGeneratorConfig::default().is_supported("anything"));
    }
}
