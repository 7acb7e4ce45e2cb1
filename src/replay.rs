//! Replay of JSON Lines message envelopes.
//!
//! Each non-blank line is one envelope:
//!
//! ```json
//! {"subject": "frt.freight.created", "data": {"freight_key": "K1"}}
//! {"subject": "frt.freight.sync", "op": "update", "data": {"freight_key": "K1", "ref_amount": 2}}
//! ```
//!
//! Without `op`, the subject's event segment selects the operation.

use anyhow::Context;
use replicator_core::{EventKind, Replicator, SqlExecutor};
use serde::Deserialize;
use serde_json::value::RawValue;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

/// One delivered message.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub subject: String,
    #[serde(default)]
    pub op: Option<EventKind>,
    pub data: Box<RawValue>,
}

/// Counters for a replay run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Messages applied successfully
    pub applied: usize,
    /// Messages that failed (only non-zero with `continue_on_error`)
    pub failed: usize,
    /// Rows reported affected by the database
    pub rows: u64,
}

/// Apply every envelope read from `reader`, in order.
///
/// Stops at the first failing line unless `continue_on_error` is set, in
/// which case failures are logged and counted.
pub async fn replay<E, R>(
    replicator: &Replicator<E>,
    reader: R,
    continue_on_error: bool,
) -> anyhow::Result<ReplayStats>
where
    E: SqlExecutor,
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        match apply_line(replicator, &line).await {
            Ok(rows) => {
                stats.applied += 1;
                stats.rows += rows;
            }
            Err(e) if continue_on_error => {
                warn!(line = line_number, error = %format!("{e:#}"), "skipping message");
                stats.failed += 1;
            }
            Err(e) => return Err(e.context(format!("Line {line_number}"))),
        }
    }

    info!(
        applied = stats.applied,
        failed = stats.failed,
        rows = stats.rows,
        "replay finished"
    );
    Ok(stats)
}

async fn apply_line<E: SqlExecutor>(replicator: &Replicator<E>, line: &str) -> anyhow::Result<u64> {
    let envelope: Envelope = serde_json::from_str(line).context("Invalid message envelope")?;
    let rows = replicator
        .apply(&envelope.subject, envelope.data.get().as_bytes(), envelope.op)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use replicator_core::testing::{FailureKind, RecordingExecutor};
    use replicator_core::{ColumnSpec, ReplicatorOptions};

    async fn replicator() -> Replicator<RecordingExecutor> {
        let replicator = Replicator::new(RecordingExecutor::new(), ReplicatorOptions::default());
        replicator
            .init(
                "frt.freight.init",
                vec![
                    ColumnSpec::new("freight_key", "nchar(38)"),
                    ColumnSpec::new("ref_amount", "decimal(18,3)"),
                ],
                vec!["freight_key".to_string()],
            )
            .await
            .unwrap();
        replicator.executor().clear();
        replicator
    }

    #[tokio::test]
    async fn test_replay_in_order() {
        let replicator = replicator().await;
        let input = concat!(
            r#"{"subject": "frt.freight.created", "data": {"freight_key": "K1", "ref_amount": 1.10}}"#,
            "\n\n",
            r#"{"subject": "frt.freight.sync", "op": "update", "data": {"freight_key": "K1", "ref_amount": 2.5}}"#,
            "\n",
            r#"{"subject": "frt.freight.deleted", "data": {"freight_key": "K1"}}"#,
            "\n",
        );

        let stats = replay(&replicator, input.as_bytes(), false).await.unwrap();

        assert_eq!(
            stats,
            ReplayStats {
                applied: 3,
                failed: 0,
                rows: 3
            }
        );
        assert_eq!(
            replicator.executor().statements(),
            vec![
                "INSERT INTO frt_freight (freight_key, ref_amount) VALUES ('K1', '1.10')",
                "UPDATE frt_freight SET ref_amount='2.5' WHERE freight_key='K1'",
                "DELETE FROM frt_freight WHERE freight_key='K1'",
            ]
        );
    }

    #[tokio::test]
    async fn test_replay_stops_at_first_failure() {
        let replicator = replicator().await;
        let input = concat!(
            r#"{"subject": "frt.freight.deleted", "data": {"ref_amount": 1}}"#,
            "\n",
            r#"{"subject": "frt.freight.created", "data": {"freight_key": "K1"}}"#,
            "\n",
        );

        let err = replay(&replicator, input.as_bytes(), false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Line 1"));
        assert!(replicator.executor().statements().is_empty());
    }

    #[tokio::test]
    async fn test_replay_continue_on_error() {
        let replicator = replicator().await;
        replicator
            .executor()
            .fail_on("INSERT INTO", FailureKind::Other);
        let input = concat!(
            "not json\n",
            r#"{"subject": "frt.freight.created", "data": {"freight_key": "K1"}}"#,
            "\n",
            r#"{"subject": "frt.freight.deleted", "data": {"freight_key": "K1"}}"#,
            "\n",
        );

        let stats = replay(&replicator, input.as_bytes(), true).await.unwrap();
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.failed, 2);
    }
}
