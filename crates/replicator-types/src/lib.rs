//! Pure conversions used by the replicator.
//!
//! This crate holds the parts of replication that never touch a database:
//!
//! - [`subject`]: `root.table.event` subjects → table names
//! - [`coerce`]: raw textual JSON values → typed SQL literal text
//! - [`literal`]: quoting of literal text for embedding into SQL
//!
//! # Example
//!
//! ```rust
//! use replicator_types::{build_table_name, quote_literal, ValueCoercer};
//!
//! assert_eq!(build_table_name("frt.freight.created").unwrap(), "frt_freight");
//!
//! let coercer = ValueCoercer::default();
//! assert_eq!(coercer.coerce("2019-09-11T00:00:00.000Z"), "2019-09-11 00:00:00");
//! assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
//! ```

pub mod coerce;
pub mod literal;
pub mod subject;

pub use coerce::{Coerced, FloatWidth, ValueCoercer, DEFAULT_FLOAT_PRECISION};
pub use literal::{is_valid_identifier, quote_literal};
pub use subject::{build_table_name, table_name_for_root, EventKind, Subject, SubjectError};
