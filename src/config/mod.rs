//! TOML configuration: which capabilities to inject and which entities to
//! generate.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{FactoryConfig, PersistenceKind, PubSubKind};
