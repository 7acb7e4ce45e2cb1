//! INSERT/UPDATE/DELETE generation from decoded messages.
//!
//! Every value is coerced with the configured [`ValueCoercer`] and then
//! quoted with [`quote_literal`]. Columns appear in message field order,
//! which [`Message`] fixes to lexicographic order.

use crate::error::{ReplicatorError, Result};
use crate::message::{FieldValue, Message};
use replicator_types::{quote_literal, ValueCoercer};
use std::collections::BTreeSet;

/// Builds DML text for one message at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementBuilder {
    coercer: ValueCoercer,
}

impl StatementBuilder {
    pub fn new(coercer: ValueCoercer) -> Self {
        Self { coercer }
    }

    pub fn coercer(&self) -> &ValueCoercer {
        &self.coercer
    }

    /// `INSERT INTO <table> (<col>, ...) VALUES ('<val>', ...)`
    pub fn insert(&self, table: &str, message: &Message) -> Result<String> {
        let mut columns = Vec::with_capacity(message.len());
        let mut values = Vec::with_capacity(message.len());
        for (name, value) in message.fields() {
            columns.push(name);
            values.push(self.literal(value));
        }

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            values.join(", ")
        ))
    }

    /// `UPDATE <table> SET <col>='<val>', ... WHERE <key>='<val>' AND ...`
    ///
    /// Fails with [`ReplicatorError::MissingKeyFields`] when the message
    /// carries no key column, rather than updating every row.
    pub fn update(
        &self,
        table: &str,
        message: &Message,
        key_columns: &BTreeSet<String>,
    ) -> Result<String> {
        let (filter, data) = message.partition(key_columns);
        let filter = self.filter_clause(table, &filter, key_columns)?;
        if data.is_empty() {
            return Err(ReplicatorError::NothingToUpdate {
                table: table.to_string(),
            });
        }

        let assignments: Vec<String> = data
            .iter()
            .map(|(name, value)| format!("{}={}", name, self.literal(value)))
            .collect();

        Ok(format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            assignments.join(", "),
            filter
        ))
    }

    /// `DELETE FROM <table> WHERE <key>='<val>' AND ...`
    ///
    /// Data fields are ignored. Fails like [`StatementBuilder::update`] when
    /// no key column is present.
    pub fn delete(
        &self,
        table: &str,
        message: &Message,
        key_columns: &BTreeSet<String>,
    ) -> Result<String> {
        let (filter, _) = message.partition(key_columns);
        let filter = self.filter_clause(table, &filter, key_columns)?;
        Ok(format!("DELETE FROM {table} WHERE {filter}"))
    }

    fn filter_clause(
        &self,
        table: &str,
        filter: &[(&str, &FieldValue)],
        key_columns: &BTreeSet<String>,
    ) -> Result<String> {
        if filter.is_empty() {
            return Err(ReplicatorError::MissingKeyFields {
                table: table.to_string(),
                keys: key_columns.iter().cloned().collect(),
            });
        }

        let predicates: Vec<String> = filter
            .iter()
            .map(|(name, value)| match value {
                FieldValue::Null => format!("{name} IS NULL"),
                FieldValue::Text(_) => format!("{}={}", name, self.literal(value)),
            })
            .collect();
        Ok(predicates.join(" AND "))
    }

    fn literal(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::Null => "NULL".to_string(),
            FieldValue::Text(raw) => quote_literal(&self.coercer.coerce(raw)),
        }
    }
}
