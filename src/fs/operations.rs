//! Filesystem primitives used by the batch operator
//!
//! The operator only ever needs three things from a filesystem: an
//! existence check, a single-file copy and a single-file delete. They sit
//! behind the [`FileSystem`] trait so alternative backends (and test
//! doubles) can stand in for [`LocalFileSystem`].

use crate::error::{FileBatchError, IoResultExt, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Filesystem collaborator for batch operations
pub trait FileSystem {
    /// Check whether `path` exists.
    ///
    /// Returns `Ok(false)` for a missing path and `Err` when existence
    /// cannot be determined (for example a permission error on a parent).
    fn try_exists(&self, path: &Path) -> Result<bool>;

    /// Copy one file, returning the number of bytes written.
    fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64>;

    /// Remove one file.
    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// Join a directory and a file name.
///
/// Plain [`Path::join`]: no normalization, no `..` filtering.
pub fn entry_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

/// Largest buffer a copy will allocate (256MB)
pub const MAX_BUFFER_SIZE: usize = 256 * 1024 * 1024;

const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Options for single-file copies
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Buffer size for buffered operations, clamped to [`MAX_BUFFER_SIZE`]
    pub buffer_size: usize,
    /// Preserve file permissions
    pub preserve_permissions: bool,
    /// Preserve modification and access time
    pub preserve_mtime: bool,
    /// Sync to disk after copy
    pub sync: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: 1024 * 1024, // 1MB
            preserve_permissions: true,
            preserve_mtime: true,
            sync: false,
        }
    }
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    options: CopyOptions,
}

impl LocalFileSystem {
    /// Create a local filesystem with the given copy options
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }

    /// Copy options in effect
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    fn copy_buffered(&self, source: &Path, dest: &Path) -> Result<u64> {
        let src_file = File::open(source).with_path(source)?;
        let dst_file = File::create(dest).with_path(dest)?;

        let capacity = self.options.buffer_size.clamp(1, MAX_BUFFER_SIZE);
        let mut reader = BufReader::with_capacity(capacity, src_file);
        let mut writer = BufWriter::with_capacity(capacity, dst_file);

        let mut buffer = vec![0u8; COPY_CHUNK_SIZE.min(capacity)];
        let mut bytes_copied = 0u64;
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FileBatchError::io(source, e)),
            };
            writer.write_all(&buffer[..n]).with_path(dest)?;
            bytes_copied += n as u64;
        }

        writer.flush().with_path(dest)?;

        if self.options.sync {
            writer.get_ref().sync_all().with_path(dest)?;
        }

        Ok(bytes_copied)
    }

    fn copy_permissions(&self, source: &Path, dest: &Path) -> Result<()> {
        let metadata = std::fs::metadata(source).with_path(source)?;
        std::fs::set_permissions(dest, metadata.permissions()).with_path(dest)?;
        Ok(())
    }

    fn copy_mtime(&self, source: &Path, dest: &Path) -> Result<()> {
        let metadata = std::fs::metadata(source).with_path(source)?;

        if let Ok(mtime) = metadata.modified() {
            filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))
                .with_path(dest)?;
        }

        if let Ok(atime) = metadata.accessed() {
            filetime::set_file_atime(dest, filetime::FileTime::from_system_time(atime))
                .with_path(dest)?;
        }

        Ok(())
    }

    /// `File::create` truncates, so copying a file onto itself would
    /// destroy it before a single byte is read.
    fn ensure_distinct(&self, source: &Path, dest: &Path) -> Result<()> {
        if let (Ok(src), Ok(dst)) = (source.canonicalize(), dest.canonicalize()) {
            if src == dst {
                return Err(FileBatchError::SameSourceAndDestination(src));
            }
        }
        Ok(())
    }
}

impl FileSystem for LocalFileSystem {
    fn try_exists(&self, path: &Path) -> Result<bool> {
        path.try_exists().with_path(path)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64> {
        let metadata = std::fs::metadata(source).with_path(source)?;
        if !metadata.is_file() {
            return Err(FileBatchError::io(
                source,
                std::io::Error::new(ErrorKind::InvalidInput, "source is not a regular file"),
            ));
        }
        self.ensure_distinct(source, dest)?;

        let bytes_copied = self.copy_buffered(source, dest)?;

        if self.options.preserve_permissions {
            self.copy_permissions(source, dest)?;
        }
        if self.options.preserve_mtime {
            self.copy_mtime(source, dest)?;
        }

        Ok(bytes_copied)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(&vec![0xABu8; size]).unwrap();
        path
    }

    #[test]
    fn test_copy_small_file() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src = create_test_file(src_dir.path(), "test.txt", 1024);
        let dst = dst_dir.path().join("test.txt");

        let fs = LocalFileSystem::default();
        let bytes = fs.copy_file(&src, &dst).unwrap();

        assert_eq!(bytes, 1024);
        assert_eq!(std::fs::read(&dst).unwrap(), vec![0xABu8; 1024]);
    }

    #[test]
    fn test_copy_empty_file() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src = src_dir.path().join("empty.txt");
        File::create(&src).unwrap();
        let dst = dst_dir.path().join("empty.txt");

        let bytes = LocalFileSystem::default().copy_file(&src, &dst).unwrap();

        assert_eq!(bytes, 0);
        assert!(dst.exists());
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src = create_test_file(src_dir.path(), "old.txt", 10);
        let past = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&src, past).unwrap();

        let dst = dst_dir.path().join("old.txt");
        LocalFileSystem::default().copy_file(&src, &dst).unwrap();

        let copied = filetime::FileTime::from_last_modification_time(
            &std::fs::metadata(&dst).unwrap(),
        );
        assert_eq!(copied, past);
    }

    #[test]
    fn test_copy_does_not_create_parent_dirs() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src = create_test_file(src_dir.path(), "test.txt", 100);
        let dst = dst_dir.path().join("missing/test.txt");

        let err = LocalFileSystem::default().copy_file(&src, &dst).unwrap_err();
        assert!(err.is_not_found());
        assert!(!dst.exists());
    }

    #[test]
    fn test_copy_onto_itself_is_refused() {
        let dir = TempDir::new().unwrap();
        let src = create_test_file(dir.path(), "self.txt", 64);

        let err = LocalFileSystem::default().copy_file(&src, &src).unwrap_err();
        assert!(matches!(err, FileBatchError::SameSourceAndDestination(_)));
        assert_eq!(std::fs::metadata(&src).unwrap().len(), 64);
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = LocalFileSystem::default()
            .copy_file(&dir.path().join("nope"), &dir.path().join("out"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_copy_directory_source_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();

        let err = LocalFileSystem::default()
            .copy_file(&sub, &dir.path().join("out"))
            .unwrap_err();

        assert!(!err.is_not_found());
        match err {
            FileBatchError::Io { path, source } => {
                assert_eq!(path, sub);
                assert_eq!(source.kind(), ErrorKind::InvalidInput);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_write_error_names_destination() {
        let src_dir = TempDir::new().unwrap();
        let src = create_test_file(src_dir.path(), "data.bin", 4096);
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }

        let err = LocalFileSystem::default().copy_file(&src, full).unwrap_err();
        assert_eq!(err.path().map(PathBuf::as_path), Some(full));
    }

    #[test]
    fn test_oversized_buffer_is_clamped() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let src = create_test_file(src_dir.path(), "big_buf.txt", 300);
        let dst = dst_dir.path().join("big_buf.txt");

        let fs = LocalFileSystem::new(CopyOptions {
            buffer_size: usize::MAX,
            ..Default::default()
        });
        assert_eq!(fs.copy_file(&src, &dst).unwrap(), 300);
        assert_eq!(std::fs::read(&dst).unwrap(), vec![0xABu8; 300]);
    }

    #[test]
    fn test_remove_and_exists() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "gone.txt", 1);
        let fs = LocalFileSystem::default();

        assert!(fs.try_exists(&path).unwrap());
        fs.remove_file(&path).unwrap();
        assert!(!fs.try_exists(&path).unwrap());
        assert!(fs.remove_file(&path).unwrap_err().is_not_found());
    }

    #[test]
    fn test_entry_path_joins_without_normalizing() {
        let joined = entry_path(Path::new("/data/in"), "../x.txt");
        assert_eq!(joined, PathBuf::from("/data/in/../x.txt"));
    }
}
