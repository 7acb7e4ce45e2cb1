//! Replicator configuration document.
//!
//! ```json
//! {
//!   "decimalSign": ".",
//!   "digitSeparator": ",",
//!   "debug": false,
//!   "dropReplicatedTables": false,
//!   "subjects": [
//!     {
//!       "subjectRoot": "frt.freight",
//!       "columns": [
//!         { "name": "freight_key", "type": "nvarchar(38)" },
//!         { "name": "ref_amount", "type": "decimal(18,3)", "nullable": true }
//!       ],
//!       "dataKeys": ["freight_key"]
//!     }
//!   ]
//! }
//! ```
//!
//! The same document may be written as YAML or TOML; the format is picked
//! from the file extension.

use crate::schema::{ColumnSpec, TableDefinition};
use replicator_types::{table_name_for_root, SubjectError, ValueCoercer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid subject declaration '{subject_root}': {source}")]
    Subject {
        subject_root: String,
        #[source]
        source: SubjectError,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

fn default_decimal_sign() -> char {
    '.'
}

fn default_digit_separator() -> Option<char> {
    Some(',')
}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplicatorConfig {
    /// Character separating integer and fraction digits in payload values
    #[serde(default = "default_decimal_sign", alias = "DecimalSign")]
    pub decimal_sign: char,

    /// Character grouping integer digits in payload values
    #[serde(default = "default_digit_separator", alias = "DigitSeparator")]
    pub digit_separator: Option<char>,

    /// Log generated SQL at info level instead of debug
    #[serde(default, alias = "Debug")]
    pub debug: bool,

    /// Drop each table before creating it on first init
    #[serde(default, alias = "DropReplicatedTables")]
    pub drop_replicated_tables: bool,

    /// Declared subjects, initialised in order
    #[serde(default, alias = "Subjects")]
    pub subjects: Vec<SubjectConfig>,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        Self {
            decimal_sign: default_decimal_sign(),
            digit_separator: default_digit_separator(),
            debug: false,
            drop_replicated_tables: false,
            subjects: Vec::new(),
        }
    }
}

/// A declared subject: the table it maps to and that table's columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfig {
    /// `<root>.<table>` or a full `<root>.<table>.<event>` subject
    #[serde(alias = "SubjectRoot")]
    pub subject_root: String,

    #[serde(alias = "Columns")]
    pub columns: Vec<ColumnSpec>,

    /// Key column names
    #[serde(default, alias = "DataKeys")]
    pub data_keys: Vec<String>,
}

impl SubjectConfig {
    pub fn table_name(&self) -> Result<String, ConfigError> {
        table_name_for_root(&self.subject_root).map_err(|source| ConfigError::Subject {
            subject_root: self.subject_root.clone(),
            source,
        })
    }

    pub fn table_definition(&self) -> Result<TableDefinition, ConfigError> {
        Ok(TableDefinition::new(
            self.table_name()?,
            self.columns.clone(),
            self.data_keys.iter().cloned(),
        ))
    }
}

impl ReplicatorConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, ConfigFormat::from_path(path))
    }

    /// Parse and validate a configuration document.
    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(text)?,
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
            ConfigFormat::Toml => toml::from_str(text)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check number formatting and every subject declaration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.digit_separator == Some(self.decimal_sign) {
            return Err(ConfigError::Invalid(format!(
                "decimalSign and digitSeparator are both '{}'",
                self.decimal_sign
            )));
        }
        if self.decimal_sign.is_ascii_digit() {
            return Err(ConfigError::Invalid(format!(
                "decimalSign '{}' is a digit",
                self.decimal_sign
            )));
        }

        for subject in &self.subjects {
            subject
                .table_definition()?
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }

    /// Value coercer for the configured number formatting.
    pub fn coercer(&self) -> ValueCoercer {
        ValueCoercer::new(self.decimal_sign, self.digit_separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JSON: &str = r#"{
        "decimalSign": ".",
        "digitSeparator": ",",
        "debug": true,
        "dropReplicatedTables": false,
        "subjects": [
            {
                "subjectRoot": "frt.freight",
                "columns": [
                    { "name": "freight_key", "type": "nvarchar(38)" },
                    { "name": "ref_address", "type": "nvarchar(400)" },
                    { "name": "ref_amount", "type": "decimal(18,3)", "nullable": true }
                ],
                "dataKeys": ["freight_key"]
            }
        ]
    }"#;

    #[test]
    fn test_parse_json() {
        let config = ReplicatorConfig::parse(JSON, ConfigFormat::Json).unwrap();
        assert!(config.debug);
        assert_eq!(config.subjects.len(), 1);

        let table = config.subjects[0].table_definition().unwrap();
        assert_eq!(table.name, "frt_freight");
        assert!(table.is_key_column("freight_key"));
        assert!(table.get_column("ref_amount").unwrap().nullable);
        assert!(!table.get_column("ref_address").unwrap().nullable);
    }

    #[test]
    fn test_defaults() {
        let config = ReplicatorConfig::parse("{}", ConfigFormat::Json).unwrap();
        assert_eq!(config, ReplicatorConfig::default());
        assert_eq!(config.coercer(), ValueCoercer::default());
    }

    #[test]
    fn test_legacy_pascal_case_keys() {
        let config = ReplicatorConfig::parse(
            r#"{
                "DecimalSign": ",",
                "DigitSeparator": ".",
                "Subjects": [
                    {
                        "SubjectRoot": "frt.freight.init",
                        "Columns": [{ "Name": "freight_key", "Type": "nchar(38)", "Null": false }],
                        "DataKeys": ["freight_key"]
                    }
                ]
            }"#,
            ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(config.decimal_sign, ',');
        assert_eq!(config.subjects[0].table_name().unwrap(), "frt_freight");
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
decimalSign: "."
subjects:
  - subjectRoot: inv.item
    columns:
      - name: item_id
        type: int
      - name: label
        type: varchar(80)
        nullable: true
    dataKeys: [item_id]
"#;
        let config = ReplicatorConfig::parse(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.subjects[0].table_name().unwrap(), "inv_item");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
dropReplicatedTables = true

[[subjects]]
subjectRoot = "inv.item"
dataKeys = ["item_id"]
columns = [
    { name = "item_id", type = "int" },
    { name = "label", type = "varchar(80)", nullable = true },
]
"#;
        let config = ReplicatorConfig::parse(toml, ConfigFormat::Toml).unwrap();
        assert!(config.drop_replicated_tables);
        assert_eq!(config.subjects[0].columns.len(), 2);
    }

    #[test]
    fn test_rejects_same_decimal_sign_and_separator() {
        let err = ReplicatorConfig::parse(
            r#"{"decimalSign": ",", "digitSeparator": ","}"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_subject_root() {
        let err = ReplicatorConfig::parse(
            r#"{"subjects": [{"subjectRoot": "frt", "columns": [{"name": "a", "type": "int"}]}]}"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Subject { .. }));
    }

    #[test]
    fn test_rejects_unknown_data_key() {
        let err = ReplicatorConfig::parse(
            r#"{"subjects": [{"subjectRoot": "a.b", "columns": [{"name": "a", "type": "int"}], "dataKeys": ["b"]}]}"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(JSON.as_bytes()).unwrap();

        let config = ReplicatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.subjects[0].subject_root, "frt.freight");
        assert_eq!(
            ConfigFormat::from_path(Path::new("replicator.YML")),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("replicator.toml")),
            ConfigFormat::Toml
        );
    }

    #[test]
    fn test_missing_file() {
        let err = ReplicatorConfig::from_file("/nonexistent/replicator.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
