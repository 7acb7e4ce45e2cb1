//! Subject resolution.
//!
//! Messages name their origin with a dot-delimited subject of the form
//! `<root>.<table>.<event>`, e.g. `frt.freight.created`. The first two
//! segments identify the target table, the last one the kind of change.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of dot-separated segments in a well-formed subject.
const SUBJECT_SEGMENTS: usize = 3;

/// Errors raised while resolving a subject.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubjectError {
    #[error(
        "subject '{subject}' has {segments} segment(s); expected <root>.<table>.<event>"
    )]
    InvalidFormat { subject: String, segments: usize },

    #[error("subject '{subject}' resolves to invalid table name '{table}'")]
    InvalidTableName { subject: String, table: String },

    #[error("unknown event kind '{0}'")]
    UnknownEvent(String),
}

/// A parsed `<root>.<table>.<event>` subject.
///
/// Segments are stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub root: String,
    pub table: String,
    pub event: String,
}

impl Subject {
    /// Parse a subject, requiring exactly three segments.
    pub fn parse(subject: &str) -> Result<Self, SubjectError> {
        let normalized = subject.trim().to_lowercase();
        let segments: Vec<&str> = normalized.split('.').collect();
        if segments.len() != SUBJECT_SEGMENTS {
            return Err(SubjectError::InvalidFormat {
                subject: subject.to_string(),
                segments: segments.len(),
            });
        }

        Ok(Self {
            root: segments[0].to_string(),
            table: segments[1].to_string(),
            event: segments[2].to_string(),
        })
    }

    /// Table name derived from the root and table segments.
    pub fn table_name(&self) -> Result<String, SubjectError> {
        join_table_name(&self.root, &self.table).ok_or_else(|| SubjectError::InvalidTableName {
            subject: self.to_string(),
            table: format!("{}.{}", self.root, self.table),
        })
    }

    /// Change kind encoded in the event segment.
    pub fn event_kind(&self) -> Result<EventKind, SubjectError> {
        EventKind::from_event(&self.event)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.root, self.table, self.event)
    }
}

/// Derive the table name for a `<root>.<table>.<event>` subject.
///
/// `frt.freight.created` becomes `frt_freight`. Fails unless the subject
/// has exactly three segments.
pub fn build_table_name(subject: &str) -> Result<String, SubjectError> {
    Subject::parse(subject)?.table_name()
}

/// Derive the table name for a declared subject root.
///
/// Declarations may name either the `<root>.<table>` pair or a full
/// three-segment subject; both resolve to the same table.
pub fn table_name_for_root(subject_root: &str) -> Result<String, SubjectError> {
    let normalized = subject_root.trim().to_lowercase();
    let segments: Vec<&str> = normalized.split('.').collect();
    match segments.len() {
        2 => join_table_name(segments[0], segments[1]).ok_or_else(|| {
            SubjectError::InvalidTableName {
                subject: subject_root.to_string(),
                table: normalized.clone(),
            }
        }),
        SUBJECT_SEGMENTS => build_table_name(&normalized),
        n => Err(SubjectError::InvalidFormat {
            subject: subject_root.to_string(),
            segments: n,
        }),
    }
}

fn join_table_name(root: &str, table: &str) -> Option<String> {
    if root.is_empty() || table.is_empty() {
        return None;
    }
    let mut name = format!("{root}.{table}");
    for sep in ['.', ','] {
        name = name.replace(sep, "_");
    }
    crate::literal::is_valid_identifier(&name).then_some(name)
}

/// Kind of change a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Insert,
    Update,
    Delete,
}

impl EventKind {
    /// Map an event segment such as `created` or `deleted` to a change kind.
    pub fn from_event(event: &str) -> Result<Self, SubjectError> {
        match event.trim().to_lowercase().as_str() {
            "created" | "create" | "inserted" | "insert" => Ok(EventKind::Insert),
            "updated" | "update" | "modified" | "changed" => Ok(EventKind::Update),
            "deleted" | "delete" | "removed" | "remove" => Ok(EventKind::Delete),
            other => Err(SubjectError::UnknownEvent(other.to_string())),
        }
    }
}

impl FromStr for EventKind {
    type Err = SubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_event(s)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Insert => "insert",
            EventKind::Update => "update",
            EventKind::Delete => "delete",
        };
        f.write_str(name)
    }
}
