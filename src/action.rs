//! Generated action setters.

use indexmap::IndexMap;
use serde_json::Value;

use crate::constant::Constant;
use crate::dispatcher::{Broker, Message};
use crate::error::FactoryError;
use crate::naming;
use crate::spec::FieldSpec;

/// One generated setter, e.g. `updateBirthday(year, month, day)`.
#[derive(Debug, Clone)]
pub struct ActionFn {
    name: String,
    kind: String,
    params: Vec<String>,
    broker: Broker,
}

impl ActionFn {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Action kind attached to every message this setter publishes.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Build the message from positional arguments and publish it as a view
    /// action.
    ///
    /// Fewer arguments than declared are allowed; trailing parameters are
    /// then absent from the message.
    ///
    /// # Errors
    /// `FactoryError::Arity` if more arguments than declared parameters are
    /// given. Nothing is published in that case.
    pub fn invoke<I, V>(&self, args: I) -> Result<(), FactoryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        if args.len() > self.params.len() {
            return Err(FactoryError::Arity {
                setter: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
            });
        }

        let mut message = Message::new(self.kind.as_str());
        for (param, value) in self.params.iter().zip(args) {
            message.payload.insert(param.clone(), value);
        }

        self.broker.publish_from_view(message);
        Ok(())
    }
}

/// All setters of one namespace, keyed by setter name.
#[derive(Debug)]
pub struct ActionSurface {
    setters: IndexMap<String, ActionFn>,
}

impl ActionSurface {
    /// Generate one setter per field.
    ///
    /// The kind is looked up in the constant table by value rather than
    /// derived again, so the tables stay the single source of kinds.
    pub fn build(spec: &FieldSpec, constant: &Constant, broker: &Broker) -> Result<Self, FactoryError> {
        let mut setters = IndexMap::with_capacity(spec.len());

        for (field, params) in spec.iter() {
            let kind = constant.action_type(field).ok_or_else(|| {
                FactoryError::format(format!("No action type registered for field '{}'", field))
            })?;
            let name = naming::setter_method_name(field);
            setters.insert(
                name.clone(),
                ActionFn {
                    name,
                    kind: kind.to_string(),
                    params: params.to_vec(),
                    broker: broker.clone(),
                },
            );
        }

        Ok(Self { setters })
    }

    /// Setter by generated name (`updateBirthday`).
    pub fn get(&self, name: &str) -> Option<&ActionFn> {
        self.setters.get(name)
    }

    /// Setter by raw field key (`birthday`).
    pub fn for_field(&self, field: &str) -> Option<&ActionFn> {
        self.get(&naming::setter_method_name(field))
    }

    /// Invoke a setter by name.
    ///
    /// # Errors
    /// `FactoryError::Format` for an unknown setter, otherwise as
    /// [`ActionFn::invoke`].
    pub fn call<I, V>(&self, name: &str, args: I) -> Result<(), FactoryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.get(name)
            .ok_or_else(|| FactoryError::format(format!("Unknown action '{}'", name)))?
            .invoke(args)
    }

    /// Setter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.setters.keys().map(String::as_str)
    }
}
