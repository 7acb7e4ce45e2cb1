//! Replicator facade.
//!
//! [`Replicator`] owns a [`SchemaRegistry`] and a [`SqlExecutor`] and is
//! the surface consumed by whatever delivers messages. Every operation
//! resolves the subject first, so a malformed subject never reaches the
//! database.

use crate::config::ReplicatorConfig;
use crate::error::Result;
use crate::executor::SqlExecutor;
use crate::message::Message;
use crate::registry::{InitOutcome, SchemaRegistry};
use crate::schema::{ColumnSpec, TableDefinition};
use crate::statement::StatementBuilder;
use replicator_types::{build_table_name, table_name_for_root, EventKind, Subject, ValueCoercer};
use std::path::Path;
use tracing::{debug, info};

/// Behaviour switches for a [`Replicator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicatorOptions {
    pub coercer: ValueCoercer,
    /// Drop each table before its first CREATE TABLE
    pub drop_before_create: bool,
    /// Log generated SQL at info level
    pub debug: bool,
}

impl From<&ReplicatorConfig> for ReplicatorOptions {
    fn from(config: &ReplicatorConfig) -> Self {
        Self {
            coercer: config.coercer(),
            drop_before_create: config.drop_replicated_tables,
            debug: config.debug,
        }
    }
}

/// Translates subject + payload messages into SQL and executes it.
pub struct Replicator<E: SqlExecutor> {
    executor: E,
    registry: SchemaRegistry,
    builder: StatementBuilder,
    debug: bool,
}

impl<E: SqlExecutor> Replicator<E> {
    /// Create a replicator with an empty registry.
    pub fn new(executor: E, options: ReplicatorOptions) -> Self {
        Self {
            executor,
            registry: SchemaRegistry::new(options.drop_before_create),
            builder: StatementBuilder::new(options.coercer),
            debug: options.debug,
        }
    }

    /// Create a replicator and initialise every declared subject in order.
    ///
    /// Stops at the first failure; tables initialised before it stay
    /// registered and created.
    pub async fn load(executor: E, config: &ReplicatorConfig) -> Result<Self> {
        let replicator = Self::new(executor, ReplicatorOptions::from(config));
        for subject in &config.subjects {
            let definition = subject.table_definition()?;
            replicator.init_table(definition).await?;
        }
        info!(
            tables = config.subjects.len(),
            "replicator initialised from configuration"
        );
        Ok(replicator)
    }

    /// Load a configuration file and initialise its subjects.
    pub async fn from_config_file(executor: E, path: impl AsRef<Path>) -> Result<Self> {
        let config = ReplicatorConfig::from_file(path)?;
        Self::load(executor, &config).await
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Register and create the table for `subject`.
    ///
    /// `subject` is a full `<root>.<table>.<event>` subject. Initialising an
    /// already registered table is a no-op.
    pub async fn init(
        &self,
        subject: &str,
        columns: Vec<ColumnSpec>,
        key_columns: Vec<String>,
    ) -> Result<InitOutcome> {
        let table_name = build_table_name(subject)?;
        self.init_table(TableDefinition::new(table_name, columns, key_columns))
            .await
    }

    /// Register and create a table from a ready definition.
    pub async fn init_table(&self, definition: TableDefinition) -> Result<InitOutcome> {
        self.registry.init(&self.executor, definition).await
    }

    /// Drop the table for a subject or `<root>.<table>` pair.
    pub async fn drop_table(&self, subject: &str) -> Result<()> {
        let table_name = table_name_for_root(subject)?;
        self.registry.drop_table(&self.executor, &table_name).await
    }

    /// Insert the payload as a new row. Returns the affected row count.
    pub async fn insert(&self, subject: &str, payload: &[u8]) -> Result<u64> {
        self.apply(subject, payload, Some(EventKind::Insert)).await
    }

    /// Update the row identified by the payload's key fields.
    pub async fn update(&self, subject: &str, payload: &[u8]) -> Result<u64> {
        self.apply(subject, payload, Some(EventKind::Update)).await
    }

    /// Delete the row identified by the payload's key fields.
    pub async fn delete(&self, subject: &str, payload: &[u8]) -> Result<u64> {
        self.apply(subject, payload, Some(EventKind::Delete)).await
    }

    /// Apply a message, taking the operation from `kind` or, when absent,
    /// from the subject's event segment.
    pub async fn apply(
        &self,
        subject: &str,
        payload: &[u8],
        kind: Option<EventKind>,
    ) -> Result<u64> {
        let sql = self.statement(subject, payload, kind).await?;
        if self.debug {
            info!(subject = %subject, sql = %sql, "executing");
        } else {
            debug!(subject = %subject, sql = %sql, "executing");
        }
        Ok(self.executor.exec(&sql).await?)
    }

    /// Build the statement a message would execute, without executing it.
    pub async fn statement(
        &self,
        subject: &str,
        payload: &[u8],
        kind: Option<EventKind>,
    ) -> Result<String> {
        let parsed = Subject::parse(subject)?;
        let table_name = parsed.table_name()?;
        let kind = match kind {
            Some(kind) => kind,
            None => parsed.event_kind()?,
        };

        let key_columns = self.registry.key_columns(&table_name).await?;
        let message = Message::from_json(payload)?;

        match kind {
            EventKind::Insert => self.builder.insert(&table_name, &message),
            EventKind::Update => self.builder.update(&table_name, &message, &key_columns),
            EventKind::Delete => self.builder.delete(&table_name, &message, &key_columns),
        }
    }
}
