//! Key-mirrored constant tables for one namespace.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::FactoryError;
use crate::naming;
use crate::spec::FieldSpec;

/// Symbol tables of a namespace.
///
/// Both tables map every key to itself, so lookups return a value that was
/// written on purpose rather than a truthy key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constant {
    #[serde(rename = "DataFields")]
    data_fields: IndexMap<String, String>,
    #[serde(rename = "ActionTypes")]
    action_types: IndexMap<String, String>,
}

impl Constant {
    /// Build the tables from a validated spec.
    pub fn build(spec: &FieldSpec) -> Result<Self, FactoryError> {
        let derived = spec.validate()?;

        let mut data_fields = IndexMap::with_capacity(derived.len());
        let mut action_types = IndexMap::with_capacity(derived.len());
        for names in derived {
            data_fields.insert(names.store_field_key.clone(), names.store_field_key);
            action_types.insert(names.action_type_key.clone(), names.action_type_key);
        }

        Ok(Self {
            data_fields,
            action_types,
        })
    }

    /// `DataFields` table: `BIRTHDAY -> BIRTHDAY`.
    pub fn data_fields(&self) -> &IndexMap<String, String> {
        &self.data_fields
    }

    /// `ActionTypes` table: `UPDATE_BIRTHDAY -> UPDATE_BIRTHDAY`.
    pub fn action_types(&self) -> &IndexMap<String, String> {
        &self.action_types
    }

    /// Resolve the store field constant of a raw field key.
    pub fn data_field(&self, raw: &str) -> Option<&str> {
        self.data_fields
            .get(&naming::store_field_key(raw))
            .map(String::as_str)
    }

    /// Resolve the action kind of a raw field key.
    pub fn action_type(&self, raw: &str) -> Option<&str> {
        self.action_types
            .get(&naming::action_type_key(raw))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_key_mirrored() {
        let spec = FieldSpec::new()
            .field("profileName", ["name"])
            .field("birthday", ["year", "month", "day"]);
        let constant = Constant::build(&spec).unwrap();

        let fields: Vec<_> = constant.data_fields().iter().collect();
        assert_eq!(
            fields,
            vec![
                (&"PROFILE_NAME".to_string(), &"PROFILE_NAME".to_string()),
                (&"BIRTHDAY".to_string(), &"BIRTHDAY".to_string()),
            ]
        );
        assert_eq!(constant.action_type("birthday"), Some("UPDATE_BIRTHDAY"));
        assert_eq!(constant.data_field("profileName"), Some("PROFILE_NAME"));
        assert_eq!(constant.action_type("missing"), None);
    }

    #[test]
    fn test_serializes_with_table_names() {
        let constant = Constant::build(&FieldSpec::new().field("gender", ["gender"])).unwrap();
        let json = serde_json::to_value(&constant).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "DataFields": {"GENDER": "GENDER"},
                "ActionTypes": {"UPDATE_GENDER": "UPDATE_GENDER"}
            })
        );
    }

    #[test]
    fn test_invalid_spec_rejected() {
        assert!(Constant::build(&FieldSpec::new()).is_err());
    }
}
