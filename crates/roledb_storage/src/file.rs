//! Backend over a single OS file.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Positioned reads and writes over one file, with the file length cached
/// so bounds checks need no syscall.
///
/// `flush` hands buffered data to the OS; `sync` waits for `sync_all`.
/// Growth and shrinkage both go through `set_len`.
///
/// # Locking
///
/// [`FileBackend::open_exclusive`] takes an advisory exclusive lock on the
/// file itself. The lock is released when the backend is dropped.
///
/// # Example
///
/// ```no_run
/// use roledb_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("roles.dat")).unwrap();
/// let offset = backend.append(b"admin\nbuilder").unwrap();
/// backend.write_at(offset, b"A").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
    locked: bool,
}

impl FileBackend {
    /// Opens `path`, creating an empty file if needed. Existing contents are
    /// kept.
    ///
    /// # Errors
    ///
    /// Fails on any I/O error from the open.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::open_with_options(path, true, false)
    }

    /// Like [`open`](Self::open), but creates missing parent directories first.
    ///
    /// # Errors
    ///
    /// Fails if a directory or the file cannot be created.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Opens or creates a file backend and takes an exclusive lock on it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another handle already holds the
    /// lock, or an I/O error if the file cannot be opened.
    pub fn open_exclusive(path: &Path) -> StorageResult<Self> {
        Self::open_with_options(path, true, true)
    }

    /// Opens a file backend with explicit creation and locking behavior.
    ///
    /// With `create` unset, a missing file is reported as an
    /// `io::ErrorKind::NotFound` error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, or
    /// [`StorageError::Locked`] if `lock` is set and the lock is taken.
    pub fn open_with_options(path: &Path, create: bool, lock: bool) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(path)?;

        if lock && file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
            locked: lock,
        })
    }

    /// Path this backend was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether this backend holds the exclusive file lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.read_into(offset, &mut buffer)?;
        Ok(buffer)
    }

    fn read_into(&self, offset: u64, buf: &mut [u8]) -> StorageResult<()> {
        let size = *self.size.read();
        let len = buf.len();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;

        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> StorageResult<()> {
        let mut file = self.file.write();
        let mut size = self.size.write();

        if offset > *size {
            return Err(StorageError::WritePastEnd {
                offset,
                size: *size,
            });
        }

        if data.is_empty() {
            return Ok(());
        }

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        *size = (*size).max(offset + data.len() as u64);

        Ok(())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if data.is_empty() {
            return Ok(*self.size.read());
        }

        let mut file = self.file.write();
        let mut size = self.size.write();

        let offset = *size;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        *size += data.len() as u64;

        Ok(offset)
    }

    fn extend(&mut self, additional: u64) -> StorageResult<()> {
        if additional == 0 {
            return Ok(());
        }

        let file = self.file.write();
        let mut size = self.size.write();

        file.set_len(*size + additional)?;
        *size += additional;

        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }

    fn sync(&mut self) -> StorageResult<()> {
        let file = self.file.write();
        file.sync_all()?;
        Ok(())
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        let file = self.file.write();
        let mut size = self.size.write();

        if new_size > *size {
            return Err(StorageError::InvalidTruncate {
                new_size,
                size: *size,
            });
        }

        file.set_len(new_size)?;
        *size = new_size;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
        assert!(!backend.is_locked());
    }

    #[test]
    fn file_open_missing_without_create_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.dat");

        let result = FileBackend::open_with_options(&path, false, false);
        match result {
            Err(StorageError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn file_append_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let mut backend = FileBackend::open(&path).unwrap();

        assert_eq!(backend.append(b"admin").unwrap(), 0);
        assert_eq!(backend.append(b"\nvip").unwrap(), 5);
        assert_eq!(backend.size().unwrap(), 9);

        assert_eq!(backend.read_at(0, 9).unwrap(), b"admin\nvip");
        assert_eq!(backend.read_at(6, 3).unwrap(), b"vip");
    }

    #[test]
    fn file_write_at_overwrites_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"guest;member").unwrap();
        backend.write_at(0, b"GUEST").unwrap();

        assert_eq!(backend.size().unwrap(), 12);
        assert_eq!(backend.read_at(0, 12).unwrap(), b"GUEST;member");
    }

    #[test]
    fn file_write_at_end_grows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"abc").unwrap();
        backend.write_at(2, b"CDE").unwrap();

        assert_eq!(backend.size().unwrap(), 5);
        assert_eq!(backend.read_at(0, 5).unwrap(), b"abCDE");
    }

    #[test]
    fn file_write_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"abc").unwrap();

        let result = backend.write_at(4, b"x");
        assert!(matches!(result, Err(StorageError::WritePastEnd { .. })));
    }

    #[test]
    fn file_extend_zero_fills() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"ab").unwrap();
        backend.extend(3).unwrap();

        assert_eq!(backend.size().unwrap(), 5);
        assert_eq!(backend.read_at(0, 5).unwrap(), b"ab\0\0\0");
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 5);
    }

    #[test]
    fn file_read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"owner").unwrap();

        assert!(matches!(
            backend.read_at(3, 3),
            Err(StorageError::ReadPastEnd { offset: 3, len: 3, size: 5 })
        ));
        let result = backend.read_at(10, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.append(b"survives restart").unwrap();
            backend.sync().unwrap();
        }

        {
            let backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.size().unwrap(), 16);
            assert_eq!(backend.read_at(0, 16).unwrap(), b"survives restart");
        }
    }

    #[test]
    fn file_truncate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.append(b"moderator").unwrap();
        backend.truncate(5).unwrap();
        assert_eq!(backend.read_at(0, 5).unwrap(), b"moder");

        assert_eq!(backend.size().unwrap(), 5);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 5);

        let result = backend.truncate(6);
        assert!(matches!(result, Err(StorageError::InvalidTruncate { .. })));
    }

    #[test]
    fn file_exclusive_lock_rejects_second_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.dat");

        let first = FileBackend::open_exclusive(&path).unwrap();
        assert!(first.is_locked());

        let second = FileBackend::open_exclusive(&path);
        assert!(matches!(second, Err(StorageError::Locked)));

        drop(first);
        assert!(FileBackend::open_exclusive(&path).is_ok());
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("plugins").join("roles.dat");

        let backend = FileBackend::open_with_create_dirs(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
        assert_eq!(backend.path(), path);
    }
}
