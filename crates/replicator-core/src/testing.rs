//! In-memory executor for tests.

use crate::executor::{ExecError, SqlExecutor};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Kind of failure a [`RecordingExecutor`] reports for scripted statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    AlreadyExists,
    Other,
}

/// Records every statement it is asked to execute.
///
/// Statements starting with a prefix registered through
/// [`RecordingExecutor::fail_on`] are recorded and then fail.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    statements: Mutex<Vec<String>>,
    failures: Mutex<Vec<(String, FailureKind)>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail statements that start with `prefix`.
    pub fn fail_on(&self, prefix: &str, kind: FailureKind) {
        lock(&self.failures).push((prefix.to_string(), kind));
    }

    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    /// Statements executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        lock(&self.statements).clone()
    }

    pub fn count_matching(&self, prefix: &str) -> usize {
        lock(&self.statements)
            .iter()
            .filter(|sql| sql.starts_with(prefix))
            .count()
    }

    pub fn clear(&self) {
        lock(&self.statements).clear();
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    async fn exec(&self, sql: &str) -> Result<u64, ExecError> {
        lock(&self.statements).push(sql.to_string());

        let failure = lock(&self.failures)
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix.as_str()))
            .map(|(_, kind)| *kind);
        match failure {
            Some(FailureKind::AlreadyExists) => {
                Err(ExecError::AlreadyExists(format!("scripted failure: {sql}")))
            }
            Some(FailureKind::Other) => Err(anyhow::anyhow!("scripted failure: {sql}").into()),
            None => Ok(1),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
