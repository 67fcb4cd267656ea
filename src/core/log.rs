//! Operation records, message log and operator state
//!
//! Both logs are keyed by invocation id and only ever appended to. They
//! live for as long as the operator that owns them and are never pruned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Invocation identifier; `0` is the construction-time bucket
pub type InvocationId = u64;

/// Kind of per-file action recorded in the invocation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Existence check
    Verify,
    /// Single-file copy
    Copy,
    /// Single-file delete
    Delete,
}

impl Action {
    /// Lowercase action name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Copy => "copy",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Outcome of one action on one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// File name as passed by the caller
    pub filename: String,
    /// Action performed
    pub action: Action,
    /// Whether the action succeeded
    pub success: bool,
}

/// Per-file records grouped by invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationLog {
    entries: BTreeMap<InvocationId, Vec<OperationRecord>>,
}

impl InvocationLog {
    /// Append a record under `id`
    pub(crate) fn record(&mut self, id: InvocationId, record: OperationRecord) {
        self.entries.entry(id).or_default().push(record);
    }

    /// Records for one invocation
    pub fn get(&self, id: InvocationId) -> Option<&[OperationRecord]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Iterate invocations in id order
    pub fn iter(&self) -> impl Iterator<Item = (InvocationId, &[OperationRecord])> {
        self.entries.iter().map(|(id, records)| (*id, records.as_slice()))
    }

    /// Ids that carry at least one record
    pub fn invocation_ids(&self) -> Vec<InvocationId> {
        self.entries.keys().copied().collect()
    }

    /// Total number of per-file records
    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Human-readable status messages grouped by invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageLog {
    entries: BTreeMap<InvocationId, Vec<String>>,
}

impl MessageLog {
    /// Append a message under `id`
    pub(crate) fn push(&mut self, id: InvocationId, message: impl Into<String>) {
        self.entries.entry(id).or_default().push(message.into());
    }

    /// Messages for one invocation
    pub fn get(&self, id: InvocationId) -> Option<&[String]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Iterate invocations in id order
    pub fn iter(&self) -> impl Iterator<Item = (InvocationId, &[String])> {
        self.entries.iter().map(|(id, msgs)| (*id, msgs.as_slice()))
    }

    /// Most recently appended message
    pub fn last(&self) -> Option<&str> {
        self.entries
            .values()
            .next_back()
            .and_then(|msgs| msgs.last())
            .map(String::as_str)
    }

    /// All messages flattened in append order
    pub fn all(&self) -> Vec<&str> {
        self.entries
            .values()
            .flat_map(|msgs| msgs.iter().map(String::as_str))
            .collect()
    }
}

/// Parameters and result of the most recent call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorState {
    /// Last file list handed to copy/delete
    pub files: Vec<String>,
    /// Last source directory
    pub source: Option<PathBuf>,
    /// Last destination directory
    pub destination: Option<PathBuf>,
    /// Last overwrite flag
    pub overwrite: bool,
    /// Current invocation id
    pub invocation_id: InvocationId,
    /// Status of the last copy/delete/move
    pub last_status: bool,
}

impl Default for OperatorState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            source: None,
            destination: None,
            overwrite: false,
            invocation_id: 0,
            last_status: true,
        }
    }
}

/// The `files` part of a status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "entries")]
pub enum StatusFiles {
    /// Per-file history once anything has touched the filesystem
    Processed(InvocationLog),
    /// The raw file list from the last call otherwise
    Requested(Vec<String>),
}

/// Read-only view of an operator's status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Status of the last copy/delete/move
    pub status: bool,
    /// Every message appended so far
    pub message: MessageLog,
    /// Invocation log or last requested files
    pub files: StatusFiles,
}

impl StatusSnapshot {
    /// Multi-line text rendering
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Status: {}\n",
            if self.status { "success" } else { "failure" }
        ));

        out.push_str("\nMessages:\n");
        for (id, messages) in self.message.iter() {
            for message in messages {
                out.push_str(&format!("  [{id}] {message}\n"));
            }
        }

        match &self.files {
            StatusFiles::Processed(log) => {
                out.push_str("\nFiles:\n");
                for (id, records) in log.iter() {
                    for record in records {
                        out.push_str(&format!(
                            "  [{id}] {:<6} {:<4} {}\n",
                            record.action,
                            if record.success { "ok" } else { "FAIL" },
                            record.filename
                        ));
                    }
                }
            }
            StatusFiles::Requested(files) if !files.is_empty() => {
                out.push_str("\nRequested files:\n");
                for file in files {
                    out.push_str(&format!("  {file}\n"));
                }
            }
            StatusFiles::Requested(_) => {}
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, action: Action, success: bool) -> OperationRecord {
        OperationRecord {
            filename: name.to_string(),
            action,
            success,
        }
    }

    #[test]
    fn test_invocation_log_groups_by_id() {
        let mut log = InvocationLog::default();
        log.record(1, record("a", Action::Verify, true));
        log.record(1, record("b", Action::Verify, false));
        log.record(2, record("a", Action::Copy, true));

        assert_eq!(log.invocation_ids(), vec![1, 2]);
        assert_eq!(log.record_count(), 3);
        assert_eq!(log.get(1).unwrap()[1].filename, "b");
        assert!(log.get(3).is_none());
    }

    #[test]
    fn test_message_log_order() {
        let mut messages = MessageLog::default();
        messages.push(0, "first");
        messages.push(0, "second");
        messages.push(1, "third");

        assert_eq!(messages.all(), vec!["first", "second", "third"]);
        assert_eq!(messages.last(), Some("third"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut log = InvocationLog::default();
        log.record(1, record("a.txt", Action::Delete, false));
        let mut message = MessageLog::default();
        message.push(0, "ready");

        let snapshot = StatusSnapshot {
            status: false,
            message,
            files: StatusFiles::Processed(log),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], false);
        assert_eq!(json["message"]["0"][0], "ready");
        assert_eq!(json["files"]["kind"], "processed");
        assert_eq!(json["files"]["entries"]["1"][0]["action"], "delete");
        assert_eq!(json["files"]["entries"]["1"][0]["success"], false);
    }

    #[test]
    fn test_summary_lists_failures() {
        let mut log = InvocationLog::default();
        log.record(3, record("missing.txt", Action::Delete, false));
        let snapshot = StatusSnapshot {
            status: false,
            message: MessageLog::default(),
            files: StatusFiles::Processed(log),
        };

        let text = snapshot.summary();
        assert!(text.starts_with("Status: failure"));
        assert!(text.contains("[3] delete FAIL missing.txt"));
    }
}
