use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::factory::Dependencies;
use crate::spec::FieldSpec;
use crate::store::DeepMerge;

/// Root configuration container.
///
/// `pubsub` and `persistent_structure` are deliberately not defaulted when
/// deserializing: a file that omits them yields dependencies that
/// `FluxFactory::init` rejects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Pub/sub primitive backing every broker.
    pub pubsub: Option<PubSubKind>,
    /// Merge strategy for field state, or `"none"` to opt out.
    pub persistent_structure: Option<PersistenceKind>,
    /// Entities to generate: namespace -> field spec.
    #[serde(default)]
    pub entities: IndexMap<String, FieldSpec>,
}

/// Built-in pub/sub primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PubSubKind {
    /// In-process dispatcher delivering on the calling thread.
    Synchronous,
}

/// Built-in persistent-structure choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceKind {
    /// Structural deep merge with reference-preserving no-op merges.
    DeepMerge,
    /// Explicit opt-out (`"none"`): values are replaced outright.
    #[serde(rename = "none")]
    Disabled,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            pubsub: Some(PubSubKind::Synchronous),
            persistent_structure: Some(PersistenceKind::DeepMerge),
            entities: IndexMap::new(),
        }
    }
}

impl FactoryConfig {
    /// Map the configured kinds onto capability implementations.
    pub fn dependencies(&self) -> Dependencies {
        let mut deps = Dependencies::new();
        if let Some(PubSubKind::Synchronous) = self.pubsub {
            deps = deps.with_pubsub(Dispatcher::factory());
        }
        match self.persistent_structure {
            Some(PersistenceKind::DeepMerge) => {
                deps = deps.with_persistent_structure(Arc::new(DeepMerge));
            }
            Some(PersistenceKind::Disabled) => {
                deps = deps.without_persistent_structure();
            }
            None => {}
        }
        deps
    }
}
