//! State container for one namespace.
//!
//! The container subscribes its handler chain to the namespace broker at
//! construction. Matching actions reach per-field setters, which by default
//! merge the payload into the field state and emit a change only when the
//! merge produced a new value.

mod emitter;
mod merge;
mod pipeline;

pub use emitter::{ChangeListener, ListenerId};
pub use merge::{DeepMerge, FieldState, PersistentStructure, ReplaceValue};

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use crate::constant::Constant;
use crate::dispatcher::{Broker, DispatchToken, Envelope, Payload};
use crate::error::FactoryError;
use crate::naming;
use crate::spec::FieldSpec;

use emitter::ChangeEmitter;
use pipeline::HandlerChain;

/// Field setter. Receives the action payload without its kind.
pub type Setter = Arc<dyn Fn(&StateContainer, &Payload) + Send + Sync>;

/// Observation hook called with every envelope after the field stages.
pub type PayloadHook = Arc<dyn Fn(&Envelope) + Send + Sync>;

pub struct StateContainer {
    namespace: String,
    /// getter name -> raw field key
    getters: HashMap<String, String>,
    state: RwLock<IndexMap<String, FieldState>>,
    setters: RwLock<IndexMap<String, Setter>>,
    hook: RwLock<Option<PayloadHook>>,
    strategy: Arc<dyn PersistentStructure>,
    chain: HandlerChain,
    emitter: ChangeEmitter,
    broker: Broker,
    dispatch_token: DispatchToken,
}

impl StateContainer {
    /// Build the container and subscribe it to `broker`.
    ///
    /// `strategy` is `DeepMerge` (or another persistent structure) when the
    /// capability is configured, `ReplaceValue` otherwise.
    pub fn build(
        namespace: &str,
        spec: &FieldSpec,
        constant: &Constant,
        broker: &Broker,
        strategy: Arc<dyn PersistentStructure>,
    ) -> Result<Arc<Self>, FactoryError> {
        let mut getters = HashMap::with_capacity(spec.len());
        let mut state = IndexMap::with_capacity(spec.len());
        let mut setters: IndexMap<String, Setter> = IndexMap::with_capacity(spec.len());
        let mut chain = HandlerChain::default();

        for field in spec.keys() {
            let kind = constant.action_type(field).ok_or_else(|| {
                FactoryError::format(format!("No action type registered for field '{}'", field))
            })?;

            getters.insert(naming::getter_method_name(field), field.to_string());
            state.insert(field.to_string(), strategy.empty());
            setters.insert(field.to_string(), default_setter(field));
            chain = chain.then(pipeline::field_filter(field.to_string(), kind.to_string()));
        }
        let chain = chain.then(pipeline::payload_hook());

        let store = Arc::new_cyclic(|weak: &Weak<StateContainer>| {
            let weak = weak.clone();
            let dispatch_token = broker.subscribe(Arc::new(move |envelope: &Envelope| {
                if let Some(store) = weak.upgrade() {
                    store.chain.run(&store, envelope);
                }
            }));

            StateContainer {
                namespace: namespace.to_string(),
                getters,
                state: RwLock::new(state),
                setters: RwLock::new(setters),
                hook: RwLock::new(None),
                strategy,
                chain,
                emitter: ChangeEmitter::default(),
                broker: broker.clone(),
                dispatch_token,
            }
        });

        tracing::debug!(
            namespace = %namespace,
            token = %store.dispatch_token,
            stages = store.chain.len(),
            "State container subscribed"
        );
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Token of this container's broker subscription.
    pub fn dispatch_token(&self) -> &DispatchToken {
        &self.dispatch_token
    }

    /// Number of stages in the handler chain (one per field plus the hook).
    pub fn stage_count(&self) -> usize {
        self.chain.len()
    }

    /// Stop receiving actions from the broker.
    ///
    /// Returns `false` if the container was already detached.
    pub fn detach(&self) -> bool {
        let removed = self.broker.unsubscribe(&self.dispatch_token);
        if removed {
            tracing::debug!(namespace = %self.namespace, "State container detached");
        }
        removed
    }

    // -- Getters --------------------------------------------------------------

    /// Plain snapshot of a field's current value, by raw field key.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.state
            .read()
            .get(field)
            .map(|state| self.strategy.to_plain(state))
    }

    /// Plain snapshot by generated getter name (`getBirthday`).
    pub fn call_getter(&self, name: &str) -> Option<Value> {
        self.getters.get(name).and_then(|field| self.get(field))
    }

    /// The persistent value itself, for reference comparisons.
    pub fn field_state(&self, field: &str) -> Option<FieldState> {
        self.state.read().get(field).cloned()
    }

    /// Raw field keys in declaration order.
    pub fn fields(&self) -> Vec<String> {
        self.state.read().keys().cloned().collect()
    }

    // -- Setters --------------------------------------------------------------

    /// Replace the setter run when `field`'s action kind is dispatched.
    ///
    /// # Errors
    /// `FactoryError::Format` if the container has no such field.
    pub fn set_setter<F>(&self, field: &str, setter: F) -> Result<(), FactoryError>
    where
        F: Fn(&StateContainer, &Payload) + Send + Sync + 'static,
    {
        let mut setters = self.setters.write();
        let slot = setters.get_mut(field).ok_or_else(|| self.unknown_field(field))?;
        *slot = Arc::new(setter);
        Ok(())
    }

    /// Restore the merging setter for `field`.
    pub fn reset_setter(&self, field: &str) -> Result<(), FactoryError> {
        let mut setters = self.setters.write();
        let slot = setters.get_mut(field).ok_or_else(|| self.unknown_field(field))?;
        *slot = default_setter(field);
        Ok(())
    }

    /// Install the observation hook run after the field stages.
    pub fn set_payload_hook<F>(&self, hook: F)
    where
        F: Fn(&Envelope) + Send + Sync + 'static,
    {
        *self.hook.write() = Some(Arc::new(hook));
    }

    pub fn clear_payload_hook(&self) {
        *self.hook.write() = None;
    }

    /// Merge `data` into `field` and emit a change iff the state changed.
    ///
    /// Returns whether a change was emitted.
    ///
    /// # Errors
    /// `FactoryError::Format` if the container has no such field.
    pub fn merge_field(&self, field: &str, data: &Value) -> Result<bool, FactoryError> {
        let changed = {
            let mut state = self.state.write();
            let current = state.get_mut(field).ok_or_else(|| self.unknown_field(field))?;
            let next = self.strategy.merge_deep(current, data);
            if Arc::ptr_eq(&next, current) {
                false
            } else {
                *current = next;
                true
            }
        };

        if changed {
            tracing::debug!(namespace = %self.namespace, field = %field, "Field changed");
            self.emit_change(field, data);
        } else {
            tracing::trace!(namespace = %self.namespace, field = %field, "Merge left field unchanged");
        }
        Ok(changed)
    }

    // -- Change stream --------------------------------------------------------

    pub fn emit_change(&self, field: &str, data: &Value) {
        self.emitter.emit(field, data);
    }

    pub fn add_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        self.emitter.add(Arc::new(listener))
    }

    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        self.emitter.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.emitter.len()
    }

    // -- Dispatch internals ---------------------------------------------------

    /// Setter lookup happens per dispatch so replaced setters take effect
    /// immediately. No lock is held while the setter runs.
    fn apply_setter(&self, field: &str, payload: &Payload) {
        let setter = self.setters.read().get(field).cloned();
        if let Some(setter) = setter {
            setter(self, payload);
        }
    }

    fn run_payload_hook(&self, envelope: &Envelope) {
        let hook = self.hook.read().clone();
        if let Some(hook) = hook {
            hook(envelope);
        }
    }

    fn unknown_field(&self, field: &str) -> FactoryError {
        FactoryError::format(format!(
            "Namespace '{}' has no field '{}'",
            self.namespace, field
        ))
    }
}

impl Drop for StateContainer {
    fn drop(&mut self) {
        self.broker.unsubscribe(&self.dispatch_token);
    }
}

impl std::fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer")
            .field("namespace", &self.namespace)
            .field("dispatch_token", &self.dispatch_token)
            .finish_non_exhaustive()
    }
}

fn default_setter(field: &str) -> Setter {
    let field = field.to_string();
    Arc::new(move |store: &StateContainer, payload: &Payload| {
        let data = Value::Object(payload.clone());
        if let Err(err) = store.merge_field(&field, &data) {
            tracing::warn!(error = %err, "Default setter failed");
        }
    })
}
