//! Field specifications: field key -> setter parameter names.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::FactoryError;
use crate::naming::{self, DerivedNames};

/// Ordered mapping from raw field key to the parameter names of its setter.
///
/// Declaration order is kept: handler stages and constant tables follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSpec {
    fields: IndexMap<String, Vec<String>>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field declaration.
    pub fn field<I, S>(mut self, key: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(key.into(), params.into_iter().map(Into::into).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parameter names declared for `key`.
    pub fn params(&self, key: &str) -> Option<&[String]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Validate the naming contract and return derived names in declaration order.
    ///
    /// # Errors
    /// `FactoryError::Format` if the spec is empty, a key is reserved, or two
    /// keys collapse to the same store field key or setter name.
    pub fn validate(&self) -> Result<Vec<DerivedNames>, FactoryError> {
        if self.fields.is_empty() {
            return Err(FactoryError::format("Field spec must declare at least one field"));
        }

        let mut seen: HashMap<String, &str> = HashMap::with_capacity(self.fields.len());
        let mut setters: HashMap<String, &str> = HashMap::with_capacity(self.fields.len());
        let mut derived = Vec::with_capacity(self.fields.len());

        for key in self.fields.keys() {
            naming::check_field_key(key).map_err(FactoryError::format)?;

            let names = DerivedNames::derive(key);
            if let Some(previous) = seen.insert(names.store_field_key.clone(), key) {
                return Err(FactoryError::format(format!(
                    "Data source keys '{}' and '{}' both map to '{}'",
                    previous, key, names.store_field_key
                )));
            }
            // The getter is derived from the setter, so this covers both.
            if let Some(previous) = setters.insert(names.setter.clone(), key) {
                return Err(FactoryError::format(format!(
                    "Data source keys '{}' and '{}' both derive setter '{}'",
                    previous, key, names.setter
                )));
            }
            derived.push(names);
        }

        Ok(derived)
    }
}

impl<K, I, S> FromIterator<(K, I)> for FieldSpec
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(FieldSpec::new(), |spec, (key, params)| spec.field(key, params))
    }
}
