//! PostgreSQL executor for sql-replicator.
//!
//! Runs generated statements over a single `tokio-postgres` connection and
//! reports SQLSTATE `42P07` (duplicate_table) as
//! [`ExecError::AlreadyExists`].

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use replicator_core::{ExecError, SqlExecutor};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};
use tracing::error;

/// [`SqlExecutor`] backed by a PostgreSQL connection.
#[derive(Clone)]
pub struct PostgreSQLExecutor {
    client: Arc<Mutex<Client>>,
}

impl PostgreSQLExecutor {
    /// Connect using a `postgresql://` connection string.
    ///
    /// The connection is driven by a spawned task for the lifetime of the
    /// client.
    pub async fn connect(connection_string: &str) -> anyhow::Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .context("Failed to connect to PostgreSQL replica")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL replica connection closed");
            }
        });

        Ok(Self::from_client(Arc::new(Mutex::new(client))))
    }

    /// Wrap an existing shared client.
    pub fn from_client(client: Arc<Mutex<Client>>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SqlExecutor for PostgreSQLExecutor {
    async fn exec(&self, sql: &str) -> Result<u64, ExecError> {
        let client = self.client.lock().await;
        client.execute(sql, &[]).await.map_err(|e| {
            if is_already_exists(e.code()) {
                ExecError::AlreadyExists(e.to_string())
            } else {
                ExecError::Other(anyhow!(e).context(format!("PostgreSQL rejected: {sql}")))
            }
        })
    }
}

/// Whether a SQLSTATE reports that the created table already exists.
fn is_already_exists(code: Option<&SqlState>) -> bool {
    code == Some(&SqlState::DUPLICATE_TABLE)
}
