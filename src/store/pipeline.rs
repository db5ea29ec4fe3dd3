//! Handler chain run by a state container for every envelope.
//!
//! ```text
//! envelope ─→ [field 1 filter] ─→ [field 2 filter] ─→ ... ─→ [payload hook]
//! ```
//!
//! Every stage runs for every envelope. Kinds are unique per field, so at
//! most one filter actually calls a setter.

use crate::dispatcher::Envelope;

use super::StateContainer;

pub(crate) type Stage = Box<dyn Fn(&StateContainer, &Envelope) + Send + Sync>;

#[derive(Default)]
pub(crate) struct HandlerChain {
    stages: Vec<Stage>,
}

impl HandlerChain {
    pub(crate) fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub(crate) fn run(&self, store: &StateContainer, envelope: &Envelope) {
        for stage in &self.stages {
            stage(store, envelope);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.stages.len()
    }
}

/// Call `field`'s setter with the payload when the kind matches.
pub(crate) fn field_filter(field: String, kind: String) -> Stage {
    Box::new(move |store: &StateContainer, envelope: &Envelope| {
        if envelope.action.kind == kind {
            store.apply_setter(&field, &envelope.action.payload);
        }
    })
}

/// Hand the raw envelope to the container's payload hook.
pub(crate) fn payload_hook() -> Stage {
    Box::new(|store: &StateContainer, envelope: &Envelope| store.run_payload_hook(envelope))
}
