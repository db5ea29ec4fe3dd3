//! Message types, the pub/sub capability, and the per-namespace broker.
//!
//! # Flow
//!
//! ```text
//! ActionFn ──→ Broker::publish_from_view ──→ PubSub::dispatch ──→ handlers
//!                 (wraps in Envelope)          (registration order)
//! ```

mod broker;
mod hub;

pub use broker::Broker;
pub use hub::Dispatcher;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// Named arguments of an action, without its kind.
pub type Payload = Map<String, Value>;

/// Subscriber callback registered with a pub/sub primitive.
pub type Handler = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Constructor for independent pub/sub instances, one per namespace.
pub type PubSubFactory = Arc<dyn Fn() -> Arc<dyn PubSub> + Send + Sync>;

/// Opaque registration token returned by [`PubSub::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DispatchToken(String);

impl DispatchToken {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DispatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publish/subscribe primitive consumed by the broker.
///
/// Implementations deliver synchronously, on the calling thread, to every
/// current subscriber in registration order. They must not hold internal
/// locks while a handler runs: handlers may publish again.
pub trait PubSub: Send + Sync {
    fn subscribe(&self, handler: Handler) -> DispatchToken;

    /// Returns `false` if the token was not registered.
    fn unsubscribe(&self, token: &DispatchToken) -> bool;

    fn dispatch(&self, envelope: &Envelope);
}

/// Where an action originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PayloadSource {
    #[serde(rename = "VIEW_ACTION")]
    ViewAction,
    #[serde(rename = "SERVER_ACTION")]
    ServerAction,
}

impl PayloadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadSource::ViewAction => "VIEW_ACTION",
            PayloadSource::ServerAction => "SERVER_ACTION",
        }
    }
}

impl fmt::Display for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action: its kind plus the named arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub kind: String,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Message {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Payload::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// A message tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub source: PayloadSource,
    pub action: Message,
}
