//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

use flux_factory::{
    DeepMerge, Dependencies, DispatchToken, Dispatcher, Envelope, FieldSpec, FluxFactory,
    PubSub, PubSubFactory, StateContainer,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const PROFILE: &str = "UserProfile";

pub type EnvelopeLog = Arc<Mutex<Vec<Envelope>>>;
pub type ChangeLog = Arc<Mutex<Vec<(String, Value)>>>;

/// Five-field profile entity used across the suites.
pub fn all_data_fields() -> FieldSpec {
    FieldSpec::new()
        .field("profileName", ["name"])
        .field("birthday", ["year", "month", "day"])
        .field("gender", ["gender"])
        .field("hometown", ["cityId", "countryId"])
        .field("relationship", ["status", "relatedUserId"])
}

pub fn standard_deps() -> Dependencies {
    Dependencies::new()
        .with_pubsub(Dispatcher::factory())
        .with_persistent_structure(Arc::new(DeepMerge))
}

/// Factory after `init`, with no namespaces yet.
pub fn ready_factory() -> FluxFactory {
    let mut factory = FluxFactory::new();
    factory.init(standard_deps()).expect("init failed");
    factory
}

/// Factory with `UserProfile` generated.
pub fn profile_factory() -> FluxFactory {
    let mut factory = ready_factory();
    factory
        .make(PROFILE, &all_data_fields())
        .expect("make failed");
    factory
}

/// Record every change notification of `store`.
pub fn record_changes(store: &StateContainer) -> ChangeLog {
    let log: ChangeLog = Arc::new(Mutex::new(Vec::new()));
    let l = log.clone();
    store.add_change_listener(move |field: &str, data: &Value| {
        l.lock().push((field.to_string(), data.clone()))
    });
    log
}

// -- Pub/sub spy ----------------------------------------------------------------

/// Dispatcher that also records every envelope it is asked to deliver.
pub struct RecordingPubSub {
    inner: Dispatcher,
    log: EnvelopeLog,
}

impl PubSub for RecordingPubSub {
    fn subscribe(&self, handler: flux_factory::dispatcher::Handler) -> DispatchToken {
        self.inner.subscribe(handler)
    }

    fn unsubscribe(&self, token: &DispatchToken) -> bool {
        self.inner.unsubscribe(token)
    }

    fn dispatch(&self, envelope: &Envelope) {
        self.log.lock().push(envelope.clone());
        self.inner.dispatch(envelope);
    }
}

/// Factory whose brokers all share one envelope log.
pub fn recording_factory() -> (FluxFactory, EnvelopeLog) {
    let log: EnvelopeLog = Arc::new(Mutex::new(Vec::new()));
    let l = log.clone();
    let pubsub: PubSubFactory = Arc::new(move || {
        Arc::new(RecordingPubSub {
            inner: Dispatcher::new(),
            log: l.clone(),
        }) as Arc<dyn PubSub>
    });

    let mut factory = FluxFactory::new();
    factory
        .init(
            Dependencies::new()
                .with_pubsub(pubsub)
                .with_persistent_structure(Arc::new(DeepMerge)),
        )
        .expect("init failed");
    factory
        .make(PROFILE, &all_data_fields())
        .expect("make failed");
    (factory, log)
}

// -- Config files ---------------------------------------------------------------

/// Write `content` to a temporary `config.toml`.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
