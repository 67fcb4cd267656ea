//! Batch file operator
//!
//! Runs verify, copy, delete and move over a list of file names between
//! two directories. Every file is processed in list order and recorded in
//! the invocation log, even once the overall outcome is already known.
//!
//! An operator is single-threaded state: it is `Send` when its filesystem
//! is, but concurrent calls need external mutual exclusion.

use crate::core::log::{
    Action, InvocationId, InvocationLog, MessageLog, OperationRecord, OperatorState,
    StatusFiles, StatusSnapshot,
};
use crate::fs::{entry_path, FileSystem, LocalFileSystem};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Result of a verify call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum VerifyOutcome {
    /// Every file was checked
    Checked {
        /// Whether the found count satisfies the requested mode
        passed: bool,
        /// Files that exist
        found: usize,
        /// Files checked
        total: usize,
    },
    /// Nothing was checked: the file list or directory was empty
    ParamsMissing,
}

impl VerifyOutcome {
    /// `Some(passed)` when the check ran, `None` when undetermined
    pub fn passed(&self) -> Option<bool> {
        match self {
            Self::Checked { passed, .. } => Some(*passed),
            Self::ParamsMissing => None,
        }
    }

    /// True only for a check that ran and passed
    pub fn is_pass(&self) -> bool {
        self.passed() == Some(true)
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// Verify/copy/delete/move operator with an append-only audit trail
#[derive(Debug)]
pub struct FileBatchOperator<F: FileSystem = LocalFileSystem> {
    fs: F,
    state: OperatorState,
    processed: InvocationLog,
    messages: MessageLog,
}

impl FileBatchOperator<LocalFileSystem> {
    /// Operator over the local disk with default copy options
    pub fn new() -> Self {
        Self::with_fs(LocalFileSystem::default())
    }
}

impl Default for FileBatchOperator<LocalFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> FileBatchOperator<F> {
    /// Operator over a custom filesystem
    pub fn with_fs(fs: F) -> Self {
        let mut messages = MessageLog::default();
        messages.push(0, "FileBatchOperator instantiated.");
        debug!("batch operator created");

        Self {
            fs,
            state: OperatorState::default(),
            processed: InvocationLog::default(),
            messages,
        }
    }

    /// Underlying filesystem
    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Id of the most recent invocation (0 before any)
    pub fn invocation_id(&self) -> InvocationId {
        self.state.invocation_id
    }

    /// Status of the last copy, delete or move
    pub fn last_status(&self) -> bool {
        self.state.last_status
    }

    /// Parameters of the most recent call
    pub fn state(&self) -> &OperatorState {
        &self.state
    }

    /// Per-file history
    pub fn invocation_log(&self) -> &InvocationLog {
        &self.processed
    }

    /// Status messages
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    fn note(&mut self, message: impl Into<String>) {
        self.messages.push(self.state.invocation_id, message);
    }

    fn begin_invocation(&mut self) -> InvocationId {
        self.state.invocation_id += 1;
        self.state.invocation_id
    }

    fn record(&mut self, id: InvocationId, filename: &str, action: Action, success: bool) {
        self.processed.record(
            id,
            OperationRecord {
                filename: filename.to_string(),
                action,
                success,
            },
        );
    }

    /// Check which of `files` exist in `source`.
    ///
    /// With `require_all` unset the check passes when at least one file is
    /// found; with it set every file must be present. Finding nothing never
    /// passes.
    pub fn verify<S: AsRef<str>>(
        &mut self,
        files: &[S],
        source: impl AsRef<Path>,
        require_all: bool,
    ) -> VerifyOutcome {
        let source = source.as_ref();

        if files.is_empty() || is_blank(source) {
            self.note("ERROR: Verify failed. Required parameters missing.");
            warn!("verify called without files or source directory");
            return VerifyOutcome::ParamsMissing;
        }

        self.note("Verify: required parameters present, starting.");
        let id = self.begin_invocation();
        let total = files.len();
        let mut found = 0;

        for name in files {
            let name = name.as_ref();
            let path = entry_path(source, name);
            let exists = match self.fs.try_exists(&path) {
                Ok(exists) => exists,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "existence check failed, treating as missing");
                    false
                }
            };
            debug!(invocation = id, file = name, exists, "verify");
            self.record(id, name, Action::Verify, exists);
            if exists {
                found += 1;
            }
        }

        let passed = if found == 0 {
            self.note("Verify: no files were found (see log).");
            false
        } else if found == total {
            self.note("Verify: all files were found (see log).");
            true
        } else {
            self.note(format!("Verify: {found} of {total} file(s) were found (see log)."));
            !require_all
        };

        debug!(invocation = id, found, total, require_all, passed, "verify finished");
        VerifyOutcome::Checked {
            passed,
            found,
            total,
        }
    }

    /// Copy `files` from `source` to `destination`.
    ///
    /// Without `overwrite` the copy is refused up front when any of the
    /// files already exists at the destination. The copy is also refused
    /// when any file is missing from the source. Individual copy failures
    /// do not stop the batch and nothing is rolled back.
    pub fn copy<S: AsRef<str>>(
        &mut self,
        files: &[S],
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        overwrite: bool,
    ) -> bool {
        let source = source.as_ref();
        let destination = destination.as_ref();

        self.state.last_status = false;
        self.note("Copy: starting.");

        if files.is_empty() || is_blank(source) || is_blank(destination) {
            self.note("ERROR: Copy failed. Required parameters missing.");
            warn!("copy called without files, source or destination");
            return false;
        }
        self.note("Copy: required parameters present.");

        self.state.files = files.iter().map(|f| f.as_ref().to_string()).collect();
        self.state.source = Some(source.to_path_buf());
        self.state.destination = Some(destination.to_path_buf());
        self.state.overwrite = overwrite;

        if !overwrite && self.verify(files, destination, false).is_pass() {
            self.note("ERROR: Copy failed. Unable to overwrite existing files.");
            warn!(destination = %destination.display(), "copy refused, destination already holds files");
            return false;
        }

        if !self.verify(files, source, true).is_pass() {
            self.note("ERROR: Copy failed. Files missing in source directory (see log).");
            warn!(source = %source.display(), "copy refused, source is missing files");
            return false;
        }

        let id = self.begin_invocation();
        let mut failed = 0usize;

        for name in files {
            let name = name.as_ref();
            let from = entry_path(source, name);
            let to = entry_path(destination, name);
            let copied = match self.fs.copy_file(&from, &to) {
                Ok(bytes) => {
                    debug!(invocation = id, file = name, bytes, "copied");
                    true
                }
                Err(e) => {
                    warn!(invocation = id, file = name, error = %e, "copy failed");
                    failed += 1;
                    false
                }
            };
            self.record(id, name, Action::Copy, copied);
        }

        if failed == 0 {
            self.state.last_status = true;
            self.note("SUCCESS: Copy succeeded (see log).");
            info!(invocation = id, files = files.len(), "copy succeeded");
        } else {
            self.note(format!(
                "ERROR: Copy failed. {failed} file(s) failed to copy (see log)."
            ));
            warn!(invocation = id, failed, "copy finished with failures");
        }

        self.state.last_status
    }

    /// Delete `files` from `source`.
    ///
    /// A file that cannot be removed, including one that does not exist,
    /// is recorded as a failure and the remaining files are still processed.
    pub fn delete<S: AsRef<str>>(&mut self, files: &[S], source: impl AsRef<Path>) -> bool {
        let source = source.as_ref();

        self.state.last_status = false;

        if files.is_empty() || is_blank(source) {
            self.note("ERROR: Delete failed. Required parameters missing.");
            warn!("delete called without files or source directory");
            return false;
        }
        self.note("Delete: required parameters present, starting.");

        self.state.files = files.iter().map(|f| f.as_ref().to_string()).collect();
        self.state.source = Some(source.to_path_buf());

        let id = self.begin_invocation();
        let mut failed = 0usize;

        for name in files {
            let name = name.as_ref();
            let path = entry_path(source, name);
            let deleted = match self.fs.remove_file(&path) {
                Ok(()) => true,
                Err(e) => {
                    debug!(invocation = id, file = name, error = %e, "delete failed");
                    failed += 1;
                    false
                }
            };
            self.record(id, name, Action::Delete, deleted);
        }

        if failed == 0 {
            self.state.last_status = true;
            self.note("SUCCESS: Delete succeeded (see log).");
            info!(invocation = id, files = files.len(), "delete succeeded");
        } else {
            self.note(format!(
                "ERROR: Delete failed. {failed} file(s) failed to delete (see log)."
            ));
            warn!(invocation = id, failed, "delete finished with failures");
        }

        self.state.last_status
    }

    /// Move `files` from `source` to `destination`.
    ///
    /// Copies, confirms every file landed, then deletes the originals. If
    /// the copy or the confirmation fails the source is left untouched;
    /// files already copied stay at the destination.
    pub fn move_files<S: AsRef<str>>(
        &mut self,
        files: &[S],
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        overwrite: bool,
    ) -> bool {
        let source = source.as_ref();
        let destination = destination.as_ref();

        if self.copy(files, source, destination, overwrite)
            && self.verify(files, destination, true).is_pass()
        {
            return self.delete(files, source);
        }

        self.state.last_status = false;
        self.note("ERROR: Move failed.");
        warn!(source = %source.display(), destination = %destination.display(), "move failed");
        false
    }

    /// Snapshot of status, messages and file history
    pub fn status(&self) -> StatusSnapshot {
        let files = if self.processed.is_empty() {
            StatusFiles::Requested(self.state.files.clone())
        } else {
            StatusFiles::Processed(self.processed.clone())
        };

        StatusSnapshot {
            status: self.state.last_status,
            message: self.messages.clone(),
            files,
        }
    }
}
