//! Default synchronous pub/sub primitive.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{DispatchToken, Envelope, Handler, PubSub, PubSubFactory};

const TOKEN_PREFIX: &str = "ID_";

/// Synchronous dispatcher with `ID_<n>` tokens.
///
/// The handler list is snapshotted before delivery. A handler subscribed
/// mid-dispatch waits for the next dispatch; one unsubscribed mid-dispatch
/// is skipped if it has not run yet.
#[derive(Default)]
pub struct Dispatcher {
    inner: Mutex<DispatcherInner>,
}

#[derive(Default)]
struct DispatcherInner {
    last_id: u64,
    handlers: IndexMap<DispatchToken, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory producing a fresh `Dispatcher` per call.
    pub fn factory() -> PubSubFactory {
        Arc::new(|| Arc::new(Dispatcher::new()) as Arc<dyn PubSub>)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().handlers.len()
    }
}

impl PubSub for Dispatcher {
    fn subscribe(&self, handler: Handler) -> DispatchToken {
        let mut inner = self.inner.lock();
        inner.last_id += 1;
        let token = DispatchToken::new(format!("{}{}", TOKEN_PREFIX, inner.last_id));
        inner.handlers.insert(token.clone(), handler);
        token
    }

    fn unsubscribe(&self, token: &DispatchToken) -> bool {
        self.inner.lock().handlers.shift_remove(token).is_some()
    }

    fn dispatch(&self, envelope: &Envelope) {
        let handlers: Vec<(DispatchToken, Handler)> = self
            .inner
            .lock()
            .handlers
            .iter()
            .map(|(token, handler)| (token.clone(), Arc::clone(handler)))
            .collect();
        for (token, handler) in handlers {
            if !self.inner.lock().handlers.contains_key(&token) {
                continue;
            }
            handler(envelope);
        }
    }
}
