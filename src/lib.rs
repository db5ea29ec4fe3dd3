//! Declarative generator for unidirectional data flow.
//!
//! A namespace plus a [`FieldSpec`] (field key -> setter parameter names)
//! produces four cooperating objects:
//!
//! ```text
//! ActionSurface ──→ Broker ──→ StateContainer ──→ change listeners
//!   updateX(..)    (tags VIEW/SERVER)   (merge + dirty check)
//!        └──────── Constant (DataFields / ActionTypes) ────────┘
//! ```
//!
//! [`FluxFactory`] builds them in that order and caches them per namespace.
//!
//! ```ignore
//! let mut factory = FluxFactory::new();
//! factory.init(
//!     Dependencies::new()
//!         .with_pubsub(Dispatcher::factory())
//!         .with_persistent_structure(Arc::new(DeepMerge)),
//! )?;
//! factory.make("UserProfile", &FieldSpec::new().field("birthday", ["year", "month", "day"]))?;
//!
//! let actions = factory.use_action("UserProfile").unwrap();
//! actions.call("updateBirthday", ["1990", "01", "02"])?;
//! let birthday = factory.use_store("UserProfile").unwrap().call_getter("getBirthday");
//! ```

pub mod action;
pub mod config;
pub mod constant;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod logging;
pub mod naming;
pub mod spec;
pub mod store;

pub use action::{ActionFn, ActionSurface};
pub use constant::Constant;
pub use dispatcher::{
    Broker, DispatchToken, Dispatcher, Envelope, Message, Payload, PayloadSource, PubSub,
    PubSubFactory,
};
pub use error::FactoryError;
pub use factory::{Dependencies, FluxFactory, Persistence};
pub use spec::FieldSpec;
pub use store::{DeepMerge, PersistentStructure, ReplaceValue, StateContainer};
