//! Row and blob storage
//!
//! The resolver reads its tables through [`BlobStore::fetch_rows`] and the
//! CLI publishes artifacts through [`BlobStore::store_blob`]. Retries and
//! locking are internal to the implementations; callers only ever see the
//! final outcome of an operation.

use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the advisory lock file kept in a store root
pub const LOCK_FILE: &str = ".authorlist.lock";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("store root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("path escapes the store root: {0}")]
    OutsideRoot(String),

    #[error("could not lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} failed after {attempts} attempts: {last}")]
    Exhausted {
        operation: String,
        attempts: u32,
        last: Box<StoreError>,
    },
}

impl StoreError {
    /// Whether retrying the same operation could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Io { source, .. } => matches!(
                source.kind(),
                ErrorKind::Interrupted
                    | ErrorKind::WouldBlock
                    | ErrorKind::TimedOut
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::UnexpectedEof
            ),
            StoreError::Lock { .. } => true,
            _ => false,
        }
    }
}

/// Capability interface of the storage collaborator
pub trait BlobStore {
    /// All rows of a tabular source, as raw strings
    fn fetch_rows(&self, source: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Store bytes under a relative path, returning a content identifier
    fn store_blob(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError>;
}

/// Content identifier of a blob (hex SHA-256)
pub fn content_id(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// A store backed by a local directory
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
    overwrite: bool,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotADirectory(root));
        }
        Ok(Self {
            root,
            overwrite: true,
        })
    }

    /// Keep existing blobs instead of replacing them
    pub fn keep_existing(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Resolve a relative path inside the root
    fn resolve(&self, rel: &str) -> Result<PathBuf, StoreError> {
        let rel_path = Path::new(rel);
        let mut resolved = self.root.clone();
        for component in rel_path.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(StoreError::OutsideRoot(rel.to_string())),
            }
        }
        if resolved == self.root {
            return Err(StoreError::OutsideRoot(rel.to_string()));
        }
        Ok(resolved)
    }

    fn lock(&self) -> Result<LockGuard, StoreError> {
        LockGuard::acquire(&self.root.join(LOCK_FILE))
    }
}

impl BlobStore for FilesystemStore {
    fn fetch_rows(&self, source: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let path = self.resolve(source)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| csv_error(&path, e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(&path, e))?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }
        Ok(rows)
    }

    fn store_blob(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let target = self.resolve(path)?;
        let _guard = self.lock()?;

        if target.exists() && !self.overwrite {
            let existing = fs::read(&target).map_err(|e| io_error(&target, e))?;
            return Ok(content_id(&existing));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        fs::write(&target, bytes).map_err(|e| io_error(&target, e))?;
        Ok(content_id(bytes))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// The csv crate wraps I/O failures; surface those as Io so they can be retried.
fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    if source.is_io_error() {
        if let csv::ErrorKind::Io(err) = source.into_kind() {
            return io_error(path, err);
        }
        return StoreError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other("csv I/O error"),
        };
    }
    StoreError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Exclusive advisory lock, released on drop
pub struct LockGuard {
    file: File,
}

impl LockGuard {
    pub fn acquire(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::Lock {
                path: path.to_path_buf(),
                source: e,
            })?;
        file.lock_exclusive().map_err(|e| StoreError::Lock {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self { file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_tries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(100),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based): base * 2^retry, capped
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn run<T>(
        &self,
        operation: &str,
        mut op: impl FnMut() -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let max_tries = self.max_tries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_tries => {
                    std::thread::sleep(self.delay(attempt - 1));
                }
                Err(e) if attempt > 1 => {
                    return Err(StoreError::Exhausted {
                        operation: operation.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wraps a store and retries transient failures
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: BlobStore> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: BlobStore> BlobStore for Retrying<S> {
    fn fetch_rows(&self, source: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.policy
            .run(&format!("fetch '{}'", source), || self.inner.fetch_rows(source))
    }

    fn store_blob(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        self.policy
            .run(&format!("store '{}'", path), || self.inner.store_blob(path, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    /// Fails a fixed number of times before delegating
    struct Flaky {
        inner: FilesystemStore,
        failures_left: Cell<u32>,
        calls: Cell<u32>,
        kind: ErrorKind,
    }

    impl Flaky {
        fn fail(&self) -> Result<(), StoreError> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(StoreError::Io {
                    path: PathBuf::from("flaky"),
                    source: std::io::Error::new(self.kind, "flaky"),
                });
            }
            Ok(())
        }
    }

    impl BlobStore for Flaky {
        fn fetch_rows(&self, source: &str) -> Result<Vec<Vec<String>>, StoreError> {
            self.fail()?;
            self.inner.fetch_rows(source)
        }

        fn store_blob(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
            self.fail()?;
            self.inner.store_blob(path, bytes)
        }
    }

    fn no_wait(max_tries: u32) -> RetryPolicy {
        RetryPolicy {
            max_tries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_fetch_rows_reads_csv() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("places.csv"), "1,MIT,USA,\"77 Mass Ave, Cambridge\"\n2,LAPP\n").unwrap();
        let store = FilesystemStore::new(dir.path()).unwrap();

        let rows = store.fetch_rows("places.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][3], "77 Mass Ave, Cambridge");
        assert_eq!(rows[1], vec!["2", "LAPP"]);
    }

    #[test]
    fn test_fetch_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).unwrap();
        let err = store.fetch_rows("missing.csv").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_store_blob_creates_dirs_and_returns_hash() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).unwrap();

        let id = store.store_blob("papers/lmc/authors.tex", b"hello").unwrap();
        assert_eq!(
            id,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        let written = fs::read_to_string(dir.path().join("papers/lmc/authors.tex")).unwrap();
        assert_eq!(written, "hello");
        assert!(dir.path().join(LOCK_FILE).exists());
    }

    #[test]
    fn test_keep_existing_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).unwrap().keep_existing();
        store.store_blob("a.txt", b"first").unwrap();
        let id = store.store_blob("a.txt", b"second").unwrap();
        assert_eq!(id, content_id(b"first"));
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "first");
    }

    #[test]
    fn test_paths_outside_root_rejected() {
        let dir = tempdir().unwrap();
        let store = FilesystemStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.store_blob("../escape.txt", b"x"),
            Err(StoreError::OutsideRoot(_))
        ));
        assert!(matches!(
            store.store_blob("/etc/passwd", b"x"),
            Err(StoreError::OutsideRoot(_))
        ));
        assert!(matches!(
            store.store_blob("", b"x"),
            Err(StoreError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            FilesystemStore::new(&file),
            Err(StoreError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_retry_recovers_from_transient_failures() {
        let dir = tempdir().unwrap();
        let flaky = Flaky {
            inner: FilesystemStore::new(dir.path()).unwrap(),
            failures_left: Cell::new(2),
            calls: Cell::new(0),
            kind: ErrorKind::TimedOut,
        };
        let store = Retrying::new(flaky, no_wait(5));

        store.store_blob("out.json", b"{}").unwrap();
        assert_eq!(store.inner().calls.get(), 3);
    }

    #[test]
    fn test_retry_gives_up_after_max_tries() {
        let dir = tempdir().unwrap();
        let flaky = Flaky {
            inner: FilesystemStore::new(dir.path()).unwrap(),
            failures_left: Cell::new(10),
            calls: Cell::new(0),
            kind: ErrorKind::Interrupted,
        };
        let store = Retrying::new(flaky, no_wait(3));

        let err = store.fetch_rows("x.csv").unwrap_err();
        assert!(matches!(err, StoreError::Exhausted { attempts: 3, .. }));
        assert_eq!(store.inner().calls.get(), 3);
    }

    #[test]
    fn test_permanent_failure_not_retried() {
        let dir = tempdir().unwrap();
        let flaky = Flaky {
            inner: FilesystemStore::new(dir.path()).unwrap(),
            failures_left: Cell::new(1),
            calls: Cell::new(0),
            kind: ErrorKind::PermissionDenied,
        };
        let store = Retrying::new(flaky, no_wait(5));

        assert!(matches!(
            store.fetch_rows("x.csv"),
            Err(StoreError::Io { .. })
        ));
        assert_eq!(store.inner().calls.get(), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_tries: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(100),
        };
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(3), Duration::from_secs(8));
        assert_eq!(policy.delay(7), Duration::from_secs(100));
        assert_eq!(policy.delay(40), Duration::from_secs(100));
    }
}
