//! Namespace registry: dependency injection, construction order, caches.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──init──→ Ready ──make*──→ Ready ──destructor──→ Uninitialized
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::action::ActionSurface;
use crate::config::FactoryConfig;
use crate::constant::Constant;
use crate::dispatcher::{Broker, PubSubFactory};
use crate::error::FactoryError;
use crate::spec::FieldSpec;
use crate::store::{PersistentStructure, ReplaceValue, StateContainer};

/// Whether the persistent-structure capability is used.
///
/// Leaving it `Unspecified` is rejected by [`FluxFactory::init`]; opting
/// out has to be explicit.
#[derive(Clone, Default)]
pub enum Persistence {
    #[default]
    Unspecified,
    Disabled,
    Enabled(Arc<dyn PersistentStructure>),
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Persistence::Unspecified => write!(f, "Unspecified"),
            Persistence::Disabled => write!(f, "Disabled"),
            Persistence::Enabled(_) => write!(f, "Enabled(..)"),
        }
    }
}

/// Capabilities injected once through [`FluxFactory::init`].
#[derive(Clone, Default)]
pub struct Dependencies {
    pub pubsub: Option<PubSubFactory>,
    pub persistence: Persistence,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pubsub(mut self, pubsub: PubSubFactory) -> Self {
        self.pubsub = Some(pubsub);
        self
    }

    pub fn with_persistent_structure(mut self, structure: Arc<dyn PersistentStructure>) -> Self {
        self.persistence = Persistence::Enabled(structure);
        self
    }

    pub fn without_persistent_structure(mut self) -> Self {
        self.persistence = Persistence::Disabled;
        self
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("pubsub", &self.pubsub.as_ref().map(|_| ".."))
            .field("persistence", &self.persistence)
            .finish()
    }
}

struct Injected {
    pubsub: PubSubFactory,
    strategy: Arc<dyn PersistentStructure>,
}

/// Owner of the four namespace-keyed caches.
///
/// A namespace is present in all four caches or in none.
#[derive(Default)]
pub struct FluxFactory {
    deps: Option<Injected>,
    constants: HashMap<String, Arc<Constant>>,
    dispatchers: HashMap<String, Arc<Broker>>,
    actions: HashMap<String, Arc<ActionSurface>>,
    stores: HashMap<String, Arc<StateContainer>>,
}

impl FluxFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ready factory from a loaded configuration and generate every
    /// entity it declares.
    pub fn from_config(config: &FactoryConfig) -> Result<Self, FactoryError> {
        let mut factory = Self::new();
        factory.init(config.dependencies())?;
        factory.make_all(&config.entities)?;
        Ok(factory)
    }

    /// Inject dependencies.
    ///
    /// # Errors
    /// `FactoryError::Configuration` if already initialised, if the pub/sub
    /// capability is missing, or if persistence intent is unspecified.
    pub fn init(&mut self, deps: Dependencies) -> Result<(), FactoryError> {
        if self.deps.is_some() {
            return Err(FactoryError::configuration(
                "Dependencies already injected; call destructor() first",
            ));
        }

        let pubsub = deps
            .pubsub
            .ok_or_else(|| FactoryError::configuration("A pub/sub capability is required"))?;

        let strategy: Arc<dyn PersistentStructure> = match deps.persistence {
            Persistence::Unspecified => {
                return Err(FactoryError::configuration(
                    "Persistent structure must be enabled or explicitly disabled",
                ))
            }
            Persistence::Disabled => Arc::new(ReplaceValue),
            Persistence::Enabled(structure) => structure,
        };

        self.deps = Some(Injected { pubsub, strategy });
        tracing::debug!("Factory dependencies injected");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.deps.is_some()
    }

    /// Generate Constant, Broker, Action and State for `namespace`.
    ///
    /// A namespace that already exists is a cache hit and nothing is rebuilt,
    /// even if `spec` differs.
    ///
    /// # Errors
    /// `FactoryError::State` before `init`, `FactoryError::Format` for an
    /// empty namespace or an invalid spec. Nothing is cached on error.
    pub fn make(&mut self, namespace: &str, spec: &FieldSpec) -> Result<(), FactoryError> {
        let Some(deps) = self.deps.as_ref() else {
            return Err(FactoryError::state(
                "Dependencies not injected; call init() before make()",
            ));
        };
        if namespace.is_empty() {
            return Err(FactoryError::format("Namespace can not be empty"));
        }
        spec.validate()?;

        if self.stores.contains_key(namespace) {
            tracing::trace!(namespace = %namespace, "Namespace cache hit");
            return Ok(());
        }

        // The four caches are filled together, so a store miss means a miss
        // in all of them.
        let constant = Arc::new(Constant::build(spec)?);
        let broker = Arc::new(Broker::new(namespace, (deps.pubsub)()));
        let action = Arc::new(ActionSurface::build(spec, &constant, &broker)?);
        let store = StateContainer::build(
            namespace,
            spec,
            &constant,
            &broker,
            Arc::clone(&deps.strategy),
        )?;

        self.constants.insert(namespace.to_string(), constant);
        self.dispatchers.insert(namespace.to_string(), broker);
        self.actions.insert(namespace.to_string(), action);
        self.stores.insert(namespace.to_string(), store);

        tracing::info!(namespace = %namespace, fields = spec.len(), "Namespace generated");
        Ok(())
    }

    /// Mapping form of [`make`](Self::make): one call per `(namespace, spec)`.
    ///
    /// Stops at the first error; namespaces built before it stay cached.
    pub fn make_all<I, K, S>(&mut self, specs: I) -> Result<(), FactoryError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: AsRef<str>,
        S: Borrow<FieldSpec>,
    {
        for (namespace, spec) in specs {
            self.make(namespace.as_ref(), spec.borrow())?;
        }
        Ok(())
    }

    pub fn use_action(&self, namespace: &str) -> Option<Arc<ActionSurface>> {
        self.actions.get(namespace).cloned()
    }

    pub fn use_constant(&self, namespace: &str) -> Option<Arc<Constant>> {
        self.constants.get(namespace).cloned()
    }

    pub fn use_dispatcher(&self, namespace: &str) -> Option<Arc<Broker>> {
        self.dispatchers.get(namespace).cloned()
    }

    pub fn use_store(&self, namespace: &str) -> Option<Arc<StateContainer>> {
        self.stores.get(namespace).cloned()
    }

    /// Generated namespaces, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detach every container, drop every cache, forget the dependencies.
    pub fn destructor(&mut self) {
        for store in self.stores.values() {
            store.detach();
        }
        let count = self.stores.len();

        self.constants.clear();
        self.dispatchers.clear();
        self.actions.clear();
        self.stores.clear();
        self.deps = None;

        tracing::debug!(namespaces = count, "Factory torn down");
    }
}

impl std::fmt::Debug for FluxFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluxFactory")
            .field("ready", &self.is_ready())
            .field("namespaces", &self.namespaces())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::store::DeepMerge;

    fn deps() -> Dependencies {
        Dependencies::new()
            .with_pubsub(Dispatcher::factory())
            .with_persistent_structure(Arc::new(DeepMerge))
    }

    fn spec() -> FieldSpec {
        FieldSpec::new().field("gender", ["gender"])
    }

    #[test]
    fn test_init_requires_pubsub() {
        let mut factory = FluxFactory::new();
        let err = factory
            .init(Dependencies::new().without_persistent_structure())
            .unwrap_err();
        assert!(matches!(err, FactoryError::Configuration { .. }));
        assert!(!factory.is_ready());
    }

    #[test]
    fn test_init_requires_explicit_persistence() {
        let mut factory = FluxFactory::new();
        let err = factory
            .init(Dependencies::new().with_pubsub(Dispatcher::factory()))
            .unwrap_err();
        assert!(matches!(err, FactoryError::Configuration { .. }));
    }

    #[test]
    fn test_init_twice_fails() {
        let mut factory = FluxFactory::new();
        factory.init(deps()).unwrap();
        assert!(matches!(
            factory.init(deps()),
            Err(FactoryError::Configuration { .. })
        ));
    }

    #[test]
    fn test_failed_make_caches_nothing() {
        let mut factory = FluxFactory::new();
        factory.init(deps()).unwrap();
        let bad = spec().field("_bad", ["x"]);
        assert!(factory.make("UserProfile", &bad).is_err());
        assert!(factory.use_constant("UserProfile").is_none());
        assert!(factory.use_dispatcher("UserProfile").is_none());
        assert!(factory.namespaces().is_empty());
    }

    #[test]
    fn test_second_make_reuses_first_build() {
        let mut factory = FluxFactory::new();
        factory.init(deps()).unwrap();
        factory.make("UserProfile", &spec()).unwrap();
        let constant = factory.use_constant("UserProfile").unwrap();
        let broker = factory.use_dispatcher("UserProfile").unwrap();

        factory.make("UserProfile", &spec()).unwrap();
        assert!(Arc::ptr_eq(&constant, &factory.use_constant("UserProfile").unwrap()));
        assert!(broker.ptr_eq(&factory.use_dispatcher("UserProfile").unwrap()));

        factory.destructor();
        factory.init(deps()).unwrap();
        factory.make("UserProfile", &spec()).unwrap();
        assert!(!Arc::ptr_eq(&constant, &factory.use_constant("UserProfile").unwrap()));
        assert!(!broker.ptr_eq(&factory.use_dispatcher("UserProfile").unwrap()));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let mut factory = FluxFactory::new();
        factory.init(deps()).unwrap();
        assert!(matches!(
            factory.make("", &spec()),
            Err(FactoryError::Format { .. })
        ));
    }

    #[test]
    fn test_destructor_resets() {
        let mut factory = FluxFactory::new();
        factory.init(deps()).unwrap();
        factory.make("UserProfile", &spec()).unwrap();
        factory.destructor();

        assert!(!factory.is_ready());
        assert!(factory.namespaces().is_empty());
        assert!(matches!(
            factory.make("UserProfile", &spec()),
            Err(FactoryError::State { .. })
        ));
        factory.init(deps()).unwrap();
    }
}
