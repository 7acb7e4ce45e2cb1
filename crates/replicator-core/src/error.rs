//! Error types for replicator operations.

use crate::config::ConfigError;
use crate::executor::ExecError;
use crate::message::MessageError;
use crate::schema::SchemaError;
use replicator_types::SubjectError;
use thiserror::Error;

/// Errors returned by the replicator facade and its components.
#[derive(Debug, Error)]
pub enum ReplicatorError {
    /// The subject does not follow `<root>.<table>.<event>`.
    #[error("Invalid subject format: {0}")]
    InvalidSubjectFormat(#[from] SubjectError),

    /// The payload is not a flat JSON object.
    #[error("Malformed message: {0}")]
    MalformedMessage(MessageError),

    /// A payload field name cannot be used as a column name.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// The table derived from the subject was never initialised.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// An update or delete carried none of the table's key columns.
    #[error("Message for table '{table}' carries none of the key columns {keys:?}")]
    MissingKeyFields { table: String, keys: Vec<String> },

    /// An update carried key columns only.
    #[error("Message for table '{table}' has no data fields to update")]
    NothingToUpdate { table: String },

    /// The table definition is inconsistent.
    #[error("Invalid table definition: {0}")]
    Schema(#[from] SchemaError),

    /// The data-access layer rejected a statement.
    #[error("Statement execution failed: {0}")]
    Exec(#[from] ExecError),

    /// The configuration document could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<MessageError> for ReplicatorError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::InvalidFieldName(name) => ReplicatorError::InvalidIdentifier(name),
            other => ReplicatorError::MalformedMessage(other),
        }
    }
}

/// Result type alias for replicator operations.
pub type Result<T> = std::result::Result<T, ReplicatorError>;
