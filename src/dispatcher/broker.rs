//! Per-namespace broker with view/server entry points.

use std::sync::Arc;

use super::{DispatchToken, Envelope, Handler, Message, PayloadSource, PubSub};

/// Wraps one pub/sub instance and tags every message with its origin.
#[derive(Clone)]
pub struct Broker {
    namespace: Arc<str>,
    hub: Arc<dyn PubSub>,
}

impl Broker {
    pub fn new(namespace: &str, hub: Arc<dyn PubSub>) -> Self {
        Self {
            namespace: Arc::from(namespace),
            hub,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Publish an action raised by the view layer.
    pub fn publish_from_view(&self, action: Message) {
        self.publish(PayloadSource::ViewAction, action);
    }

    /// Publish an action raised by an external (server) source.
    pub fn publish_from_server(&self, action: Message) {
        self.publish(PayloadSource::ServerAction, action);
    }

    fn publish(&self, source: PayloadSource, action: Message) {
        tracing::trace!(
            namespace = %self.namespace,
            source = %source,
            kind = %action.kind,
            "Publishing action"
        );
        self.dispatch(&Envelope { source, action });
    }

    /// Deliver an already-tagged envelope to every subscriber.
    pub fn dispatch(&self, envelope: &Envelope) {
        self.hub.dispatch(envelope);
    }

    pub fn subscribe(&self, handler: Handler) -> DispatchToken {
        self.hub.subscribe(handler)
    }

    pub fn unsubscribe(&self, token: &DispatchToken) -> bool {
        self.hub.unsubscribe(token)
    }

    /// Whether both brokers share the same underlying pub/sub instance.
    pub fn ptr_eq(&self, other: &Broker) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.hub), Arc::as_ptr(&other.hub))
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
