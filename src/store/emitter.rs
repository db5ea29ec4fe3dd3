//! Change-notification stream of a state container.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

/// Observer called with `(field_key, raw_data)` on every change.
pub type ChangeListener = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Handle returned by `add_change_listener`, used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct ChangeEmitter {
    inner: Mutex<EmitterInner>,
}

#[derive(Default)]
struct EmitterInner {
    next_id: u64,
    listeners: Vec<(ListenerId, ChangeListener)>,
}

impl ChangeEmitter {
    pub(crate) fn add(&self, listener: ChangeListener) -> ListenerId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        inner.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    pub(crate) fn emit(&self, field: &str, data: &Value) {
        let listeners: Vec<ChangeListener> = self
            .inner
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(field, data);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_emit_remove() {
        let emitter = ChangeEmitter::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let id = emitter.add(Arc::new(move |field: &str, data: &Value| {
            s.lock().push((field.to_string(), data.clone()))
        }));
        assert_eq!(emitter.len(), 1);

        emitter.emit("gender", &json!({"gender": "f"}));
        assert!(emitter.remove(id));
        assert!(!emitter.remove(id));
        emitter.emit("gender", &json!({"gender": "m"}));

        assert_eq!(
            *seen.lock(),
            vec![("gender".to_string(), json!({"gender": "f"}))]
        );
    }
}
