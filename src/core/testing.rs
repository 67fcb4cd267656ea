//! In-memory filesystem double for operator tests

use crate::error::{FileBatchError, Result};
use crate::fs::FileSystem;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Filesystem that lives in a set of paths and counts every call
#[derive(Debug, Default)]
pub(crate) struct MemoryFs {
    files: RefCell<BTreeSet<PathBuf>>,
    denied: BTreeSet<PathBuf>,
    failing_copies: BTreeSet<PathBuf>,
    phantom_copies: BTreeSet<PathBuf>,
    exists_calls: Cell<usize>,
    copy_calls: Cell<usize>,
    remove_calls: Cell<usize>,
}

impl MemoryFs {
    pub(crate) fn with_files(self, dir: &str, names: &[&str]) -> Self {
        for name in names {
            self.files.borrow_mut().insert(Path::new(dir).join(name));
        }
        self
    }

    /// Existence checks on `path` fail as if permission were denied
    pub(crate) fn with_denied(mut self, path: &str) -> Self {
        self.denied.insert(PathBuf::from(path));
        self
    }

    /// Copies onto `dest` fail
    pub(crate) fn with_failing_copy(mut self, dest: &str) -> Self {
        self.failing_copies.insert(PathBuf::from(dest));
        self
    }

    /// Copies onto `dest` report success without writing anything
    pub(crate) fn with_phantom_copy(mut self, dest: &str) -> Self {
        self.phantom_copies.insert(PathBuf::from(dest));
        self
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.files.borrow().contains(Path::new(path))
    }

    pub(crate) fn exists_calls(&self) -> usize {
        self.exists_calls.get()
    }

    pub(crate) fn copy_calls(&self) -> usize {
        self.copy_calls.get()
    }

    pub(crate) fn remove_calls(&self) -> usize {
        self.remove_calls.get()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.exists_calls() + self.copy_calls() + self.remove_calls()
    }
}

impl FileSystem for MemoryFs {
    fn try_exists(&self, path: &Path) -> Result<bool> {
        self.exists_calls.set(self.exists_calls.get() + 1);
        if self.denied.contains(path) {
            return Err(FileBatchError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ));
        }
        Ok(self.files.borrow().contains(path))
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64> {
        self.copy_calls.set(self.copy_calls.get() + 1);
        if !self.files.borrow().contains(source) {
            return Err(FileBatchError::NotFound(source.to_path_buf()));
        }
        if self.failing_copies.contains(dest) {
            return Err(FileBatchError::io(
                dest,
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }
        if !self.phantom_copies.contains(dest) {
            self.files.borrow_mut().insert(dest.to_path_buf());
        }
        Ok(0)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_calls.set(self.remove_calls.get() + 1);
        if self.files.borrow_mut().remove(path) {
            Ok(())
        } else {
            Err(FileBatchError::NotFound(path.to_path_buf()))
        }
    }
}
