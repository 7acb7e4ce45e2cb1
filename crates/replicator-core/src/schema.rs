//! Table definitions for replicated subjects.
//!
//! Column types are opaque, dialect-specific strings such as
//! `nvarchar(38)` or `decimal(18,3)`; they are copied into DDL verbatim.

use replicator_types::is_valid_identifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Error type for table definition checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Table declares no columns
    #[error("Table '{0}' declares no columns")]
    NoColumns(String),

    /// Column name is not a plain identifier
    #[error("Column name '{column}' in table '{table}' is not a valid identifier")]
    InvalidColumnName { table: String, column: String },

    /// Column type is blank
    #[error("Column '{column}' in table '{table}' has an empty type")]
    EmptyColumnType { table: String, column: String },

    /// Column declared more than once
    #[error("Column '{column}' is declared twice in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Key column missing from the column list
    #[error("Key column '{column}' is not a column of table '{table}'")]
    UnknownKeyColumn { table: String, column: String },
}

/// A single column declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name
    #[serde(alias = "Name")]
    pub name: String,

    /// Dialect-specific column type, copied into DDL verbatim
    #[serde(rename = "type", alias = "Type")]
    pub sql_type: String,

    /// Whether the column accepts NULL. Columns are NOT NULL unless marked.
    #[serde(default, alias = "null", alias = "Null")]
    pub nullable: bool,
}

impl ColumnSpec {
    /// Create a NOT NULL column.
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: false,
        }
    }

    /// Create a nullable column.
    pub fn nullable(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
        }
    }
}

/// A replicated table: its columns and the key columns that identify rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    /// Table name, as derived from the subject
    pub name: String,

    /// Columns in declaration order
    pub columns: Vec<ColumnSpec>,

    /// Names of the columns that identify a row
    pub key_columns: BTreeSet<String>,
}

impl TableDefinition {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnSpec>,
        key_columns: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            key_columns: key_columns.into_iter().collect(),
        }
    }

    /// Check column names, types and key membership.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !is_valid_identifier(&column.name) {
                return Err(SchemaError::InvalidColumnName {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
            if column.sql_type.trim().is_empty() {
                return Err(SchemaError::EmptyColumnType {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        if let Some(missing) = self.key_columns.iter().find(|k| !seen.contains(k.as_str())) {
            return Err(SchemaError::UnknownKeyColumn {
                table: self.name.clone(),
                column: missing.clone(),
            });
        }

        Ok(())
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_key_column(&self, name: &str) -> bool {
        self.key_columns.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freight() -> TableDefinition {
        TableDefinition::new(
            "frt_freight",
            vec![
                ColumnSpec::new("freight_key", "nvarchar(38)"),
                ColumnSpec::new("ref_address", "nvarchar(400)"),
                ColumnSpec::nullable("ref_amount", "decimal(18,3)"),
            ],
            vec!["freight_key".to_string()],
        )
    }

    #[test]
    fn test_valid_definition() {
        let table = freight();
        assert!(table.validate().is_ok());
        assert!(table.is_key_column("freight_key"));
        assert!(!table.is_key_column("ref_amount"));
        assert!(table.get_column("ref_amount").unwrap().nullable);
    }

    #[test]
    fn test_unknown_key_column() {
        let mut table = freight();
        table.key_columns.insert("freight_id".to_string());
        assert_eq!(
            table.validate(),
            Err(SchemaError::UnknownKeyColumn {
                table: "frt_freight".to_string(),
                column: "freight_id".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_and_duplicate_columns() {
        let mut table = freight();
        table.columns.push(ColumnSpec::new("ref address", "int"));
        assert!(matches!(
            table.validate(),
            Err(SchemaError::InvalidColumnName { .. })
        ));

        let mut table = freight();
        table.columns.push(ColumnSpec::new("ref_address", "int"));
        assert!(matches!(
            table.validate(),
            Err(SchemaError::DuplicateColumn { .. })
        ));

        let mut table = freight();
        table.columns.push(ColumnSpec::new("priority", " "));
        assert!(matches!(
            table.validate(),
            Err(SchemaError::EmptyColumnType { .. })
        ));
    }

    #[test]
    fn test_no_columns() {
        let table = TableDefinition::new("t", vec![], Vec::<String>::new());
        assert_eq!(table.validate(), Err(SchemaError::NoColumns("t".to_string())));
    }

    #[test]
    fn test_column_spec_deserialization() {
        let column: ColumnSpec =
            serde_json::from_str(r#"{"name": "ref_amount", "type": "decimal(18,3)"}"#).unwrap();
        assert!(!column.nullable);

        let legacy: ColumnSpec =
            serde_json::from_str(r#"{"Name": "note", "Type": "nvarchar(50)", "Null": true}"#)
                .unwrap();
        assert_eq!(legacy, ColumnSpec::nullable("note", "nvarchar(50)"));
    }
}
