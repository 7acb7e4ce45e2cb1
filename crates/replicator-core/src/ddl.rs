//! DDL generation for replicated tables.

use crate::schema::TableDefinition;

/// Trait for generating table DDL.
pub trait ToDdl {
    /// Generate a complete CREATE TABLE statement.
    fn to_create_table(&self, table: &TableDefinition) -> String;

    /// Generate a DROP TABLE statement.
    fn to_drop_table(&self, table_name: &str) -> String;
}

/// Plain ANSI-style DDL generator.
///
/// Column types are emitted exactly as declared, so the same generator
/// serves every dialect whose types are spelled in the configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiDdl;

impl ToDdl for AnsiDdl {
    fn to_create_table(&self, table: &TableDefinition) -> String {
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let null_clause = if column.nullable { "NULL" } else { "NOT NULL" };
                format!(
                    "  {} {} {}",
                    column.name,
                    column.sql_type.trim(),
                    null_clause
                )
            })
            .collect();

        format!(
            "CREATE TABLE {} (\n{}\n)",
            table.name,
            column_defs.join(",\n")
        )
    }

    fn to_drop_table(&self, table_name: &str) -> String {
        format!("DROP TABLE {table_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSpec;

    #[test]
    fn test_create_table() {
        let table = TableDefinition::new(
            "frt_freight",
            vec![
                ColumnSpec::new("freight_key", "nvarchar(38)"),
                ColumnSpec::new("ref_address", "nvarchar(400)"),
                ColumnSpec::nullable("ref_amount", "decimal(18,3)"),
            ],
            vec!["freight_key".to_string()],
        );

        assert_eq!(
            AnsiDdl.to_create_table(&table),
            "CREATE TABLE frt_freight (\n  freight_key nvarchar(38) NOT NULL,\n  ref_address nvarchar(400) NOT NULL,\n  ref_amount decimal(18,3) NULL\n)"
        );
    }

    #[test]
    fn test_single_column_has_no_trailing_comma() {
        let table = TableDefinition::new(
            "t",
            vec![ColumnSpec::new("id", "int")],
            Vec::<String>::new(),
        );
        let sql = AnsiDdl.to_create_table(&table);
        assert_eq!(sql, "CREATE TABLE t (\n  id int NOT NULL\n)");
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(AnsiDdl.to_drop_table("frt_freight"), "DROP TABLE frt_freight");
    }
}
