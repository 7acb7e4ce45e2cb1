//! Core of the message-to-SQL replicator.
//!
//! Messages arrive as a subject (`<root>.<table>.<event>`) plus a flat JSON
//! payload. The replicator resolves the subject to a table, looks up the
//! table's key columns in the [`SchemaRegistry`], coerces every payload
//! value to typed literal text and hands the resulting statement to a
//! [`SqlExecutor`].
//!
//! # Architecture
//!
//! ```text
//! replicator-types  (subjects, value coercion, literal quoting)
//!    │
//! replicator-core (this crate)
//!    ├── message     payload → ordered field map
//!    ├── schema      column/table definitions
//!    ├── ddl         CREATE/DROP TABLE text
//!    ├── statement   INSERT/UPDATE/DELETE text
//!    ├── registry    table name → definition, idempotent init
//!    ├── executor    data-access seam
//!    └── replicator  facade used by message consumers
//!    │
//! replicator-postgresql / replicator-mysql  (SqlExecutor implementations)
//! ```
//!
//! # Example
//!
//! ```rust
//! use replicator_core::testing::RecordingExecutor;
//! use replicator_core::{ColumnSpec, Replicator, ReplicatorOptions};
//!
//! # tokio_test_block(async {
//! let replicator = Replicator::new(RecordingExecutor::new(), ReplicatorOptions::default());
//! replicator
//!     .init(
//!         "frt.freight.init",
//!         vec![
//!             ColumnSpec::new("freight_key", "nvarchar(38)"),
//!             ColumnSpec::new("ref_amount", "decimal(18,3)"),
//!         ],
//!         vec!["freight_key".to_string()],
//!     )
//!     .await
//!     .unwrap();
//!
//! replicator
//!     .insert("frt.freight.created", br#"{"freight_key": "K1", "ref_amount": 1.10}"#)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(
//!     replicator.executor().statements().last().unwrap(),
//!     "INSERT INTO frt_freight (freight_key, ref_amount) VALUES ('K1', '1.10')"
//! );
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod config;
pub mod ddl;
pub mod error;
pub mod executor;
pub mod message;
pub mod registry;
pub mod replicator;
pub mod schema;
pub mod statement;
pub mod testing;

pub use config::{ConfigError, ConfigFormat, ReplicatorConfig, SubjectConfig};
pub use ddl::{AnsiDdl, ToDdl};
pub use error::{ReplicatorError, Result};
pub use executor::{DryRunExecutor, ExecError, SqlExecutor};
pub use message::{FieldValue, Message, MessageError};
pub use registry::{InitOutcome, SchemaRegistry};
pub use replicator::{Replicator, ReplicatorOptions};
pub use schema::{ColumnSpec, SchemaError, TableDefinition};
pub use statement::StatementBuilder;

// Re-exported so consumers need a single dependency.
pub use replicator_types::{
    build_table_name, table_name_for_root, Coerced, EventKind, Subject, SubjectError,
    ValueCoercer,
};
