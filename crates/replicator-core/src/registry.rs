//! Schema registry: replicated table name → definition.
//!
//! The registry is owned by a [`crate::Replicator`] and lives as long as it
//! does. All mutations happen under one async mutex which stays held while
//! DDL runs, so concurrent `init` calls for the same table issue a single
//! CREATE TABLE.

use crate::ddl::{AnsiDdl, ToDdl};
use crate::error::{ReplicatorError, Result};
use crate::executor::{ExecError, SqlExecutor};
use crate::schema::TableDefinition;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What `init` did for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The table was already registered; no DDL was issued.
    AlreadyRegistered,
    /// CREATE TABLE succeeded.
    Created,
    /// CREATE TABLE reported that the table already exists in the database.
    AlreadyExisted,
}

/// Registered tables and the lifecycle of their DDL.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: Mutex<HashMap<String, TableDefinition>>,
    drop_before_create: bool,
    ddl: AnsiDdl,
}

impl SchemaRegistry {
    /// Create an empty registry.
    ///
    /// With `drop_before_create`, each first-time `init` drops the table
    /// before creating it.
    pub fn new(drop_before_create: bool) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            drop_before_create,
            ddl: AnsiDdl,
        }
    }

    /// Register a table and create it, unless it is already registered.
    ///
    /// A CREATE TABLE that fails with [`ExecError::AlreadyExists`] still
    /// registers the table. Any other failure is returned and leaves the
    /// registry unchanged, so a later `init` retries.
    pub async fn init<E: SqlExecutor + ?Sized>(
        &self,
        executor: &E,
        definition: TableDefinition,
    ) -> Result<InitOutcome> {
        definition.validate()?;

        let mut tables = self.tables.lock().await;
        if tables.contains_key(&definition.name) {
            debug!(table = %definition.name, "table already registered");
            return Ok(InitOutcome::AlreadyRegistered);
        }

        if self.drop_before_create {
            let sql = self.ddl.to_drop_table(&definition.name);
            if let Err(e) = executor.exec(&sql).await {
                debug!(table = %definition.name, error = %e, "drop before create failed, ignoring");
            }
        }

        let sql = self.ddl.to_create_table(&definition);
        let outcome = match executor.exec(&sql).await {
            Ok(_) => {
                info!(table = %definition.name, "created table");
                InitOutcome::Created
            }
            Err(ExecError::AlreadyExists(message)) => {
                warn!(table = %definition.name, %message, "table already exists");
                InitOutcome::AlreadyExisted
            }
            Err(e) => return Err(e.into()),
        };

        tables.insert(definition.name.clone(), definition);
        Ok(outcome)
    }

    /// Drop a table and forget its registration.
    ///
    /// The DROP is issued whether or not the table is registered; execution
    /// errors are returned unchanged.
    pub async fn drop_table<E: SqlExecutor + ?Sized>(
        &self,
        executor: &E,
        table_name: &str,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        executor.exec(&self.ddl.to_drop_table(table_name)).await?;
        tables.remove(table_name);
        info!(table = %table_name, "dropped table");
        Ok(())
    }

    /// Key columns of a registered table.
    pub async fn key_columns(&self, table_name: &str) -> Result<BTreeSet<String>> {
        self.tables
            .lock()
            .await
            .get(table_name)
            .map(|table| table.key_columns.clone())
            .ok_or_else(|| ReplicatorError::TableNotFound(table_name.to_string()))
    }

    /// Full definition of a registered table.
    pub async fn definition(&self, table_name: &str) -> Option<TableDefinition> {
        self.tables.lock().await.get(table_name).cloned()
    }

    pub async fn contains(&self, table_name: &str) -> bool {
        self.tables.lock().await.contains_key(table_name)
    }

    /// Registered table names, sorted.
    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.lock().await.keys().cloned().collect();
        names.sort();
        names
    }
}
