//! Merge strategies for field state.
//!
//! The container picks one strategy at construction. `DeepMerge` returns the
//! very same `Arc` when a merge changes nothing, which is what the
//! container's dirty check relies on.

use std::sync::Arc;

use serde_json::{Map, Value};

/// Persistent value of one field.
pub type FieldState = Arc<Value>;

/// Persistent-structure capability.
pub trait PersistentStructure: Send + Sync {
    /// Initial state of every field.
    fn empty(&self) -> FieldState;

    /// Merge `incoming` into `current`.
    ///
    /// Must return a clone of `current` (pointer-equal) iff nothing changed.
    fn merge_deep(&self, current: &FieldState, incoming: &Value) -> FieldState;

    /// Plain snapshot handed out by getters.
    fn to_plain(&self, state: &FieldState) -> Value {
        state.as_ref().clone()
    }
}

/// Structural deep merge over JSON values.
///
/// Objects merge key by key, keeping first-insertion order. Anything else,
/// arrays included, is replaced by the incoming value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepMerge;

impl PersistentStructure for DeepMerge {
    fn empty(&self) -> FieldState {
        Arc::new(Value::Object(Map::new()))
    }

    fn merge_deep(&self, current: &FieldState, incoming: &Value) -> FieldState {
        let merged = deep_merge(current, incoming);
        if merged == **current {
            Arc::clone(current)
        } else {
            Arc::new(merged)
        }
    }
}

fn deep_merge(base: &Value, incoming: &Value) -> Value {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => {
            let mut out = base.clone();
            for (key, value) in incoming {
                let next = match out.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                out.insert(key.clone(), next);
            }
            Value::Object(out)
        }
        (_, incoming) => incoming.clone(),
    }
}

/// Used when no persistent-structure capability is configured: every write
/// replaces the value outright and always counts as a change.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceValue;

impl PersistentStructure for ReplaceValue {
    fn empty(&self) -> FieldState {
        Arc::new(Value::Null)
    }

    fn merge_deep(&self, _current: &FieldState, incoming: &Value) -> FieldState {
        Arc::new(incoming.clone())
    }
}
