//! Message payload decoding.
//!
//! A payload is a flat JSON object. Values are kept as their raw JSON
//! text so that type inference sees exactly what the producer sent
//! (`1.10` keeps both decimal digits). Fields are held in a `BTreeMap`,
//! which fixes the column order of generated statements to lexicographic
//! order by field name.

use replicator_types::is_valid_identifier;
use serde_json::value::RawValue;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Errors raised while decoding a payload.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("payload is not a JSON object: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("field '{0}' holds a nested object or array")]
    NestedValue(String),

    #[error("payload has no fields")]
    Empty,

    #[error("field name '{0}' is not a valid column name")]
    InvalidFieldName(String),
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// JSON `null`
    Null,
    /// Any JSON scalar as text; strings are unquoted and unescaped
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    fn from_raw(field: &str, raw: &RawValue) -> Result<Self, MessageError> {
        let text = raw.get().trim();
        match text.as_bytes().first() {
            Some(b'"') => Ok(FieldValue::Text(serde_json::from_str::<String>(text)?)),
            Some(b'{') | Some(b'[') => Err(MessageError::NestedValue(field.to_string())),
            _ if text == "null" => Ok(FieldValue::Null),
            _ => Ok(FieldValue::Text(text.to_string())),
        }
    }
}

/// A decoded message: field name → value, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fields: BTreeMap<String, FieldValue>,
}

impl Message {
    /// Decode a flat JSON object payload.
    pub fn from_json(payload: &[u8]) -> Result<Self, MessageError> {
        let raw: BTreeMap<String, Box<RawValue>> = serde_json::from_slice(payload)?;
        if raw.is_empty() {
            return Err(MessageError::Empty);
        }

        let mut fields = BTreeMap::new();
        for (name, value) in raw {
            if !is_valid_identifier(&name) {
                return Err(MessageError::InvalidFieldName(name));
            }
            let value = FieldValue::from_raw(&name, &value)?;
            fields.insert(name, value);
        }
        Ok(Self { fields })
    }

    /// Build a message from already-decoded fields.
    pub fn from_fields(
        fields: impl IntoIterator<Item = (String, FieldValue)>,
    ) -> Result<Self, MessageError> {
        let fields: BTreeMap<String, FieldValue> = fields.into_iter().collect();
        if fields.is_empty() {
            return Err(MessageError::Empty);
        }
        if let Some(name) = fields.keys().find(|name| !is_valid_identifier(name)) {
            return Err(MessageError::InvalidFieldName(name.clone()));
        }
        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in statement order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Split into (key filter, data fields) by the table's key columns.
    pub fn partition<'a>(
        &'a self,
        key_columns: &BTreeSet<String>,
    ) -> (
        Vec<(&'a str, &'a FieldValue)>,
        Vec<(&'a str, &'a FieldValue)>,
    ) {
        self.fields()
            .partition(|(name, _)| key_columns.contains(*name))
    }
}
