//! Data-access seam.
//!
//! The replicator only produces SQL text. Running it is delegated to a
//! [`SqlExecutor`], implemented per database in the `replicator-postgresql`
//! and `replicator-mysql` crates.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors reported by a [`SqlExecutor`].
///
/// Implementations must report "table already exists" as
/// [`ExecError::AlreadyExists`] so schema initialisation can tell a benign
/// re-create from a genuine DDL failure.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Executes SQL text against a relational store.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute one statement, returning the number of affected rows.
    async fn exec(&self, sql: &str) -> Result<u64, ExecError>;
}

#[async_trait]
impl<T: SqlExecutor + ?Sized> SqlExecutor for Arc<T> {
    async fn exec(&self, sql: &str) -> Result<u64, ExecError> {
        (**self).exec(sql).await
    }
}

#[async_trait]
impl<T: SqlExecutor + ?Sized> SqlExecutor for Box<T> {
    async fn exec(&self, sql: &str) -> Result<u64, ExecError> {
        (**self).exec(sql).await
    }
}

/// Executor that logs statements instead of running them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

#[async_trait]
impl SqlExecutor for DryRunExecutor {
    async fn exec(&self, sql: &str) -> Result<u64, ExecError> {
        info!(sql = %sql, "dry run: statement not executed");
        Ok(0)
    }
}
