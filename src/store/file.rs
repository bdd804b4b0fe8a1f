//! JSON-file catalog store.

use std::fs::{self, File};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::catalog::Course;

/// Errors raised while reading or rewriting the catalog file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The catalog file exists but could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The catalog file does not contain a JSON array of courses.
    #[error("catalog {} is corrupt: {source}", path.display())]
    Corrupt { path: PathBuf, source: serde_json::Error },

    /// The collection could not be serialized.
    #[error("failed to encode catalog: {0}")]
    Encode(serde_json::Error),

    /// Writing or replacing the catalog file failed.
    #[error("failed to write catalog {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The operation did not finish within the configured bound.
    #[error("catalog I/O timed out after {0:?}")]
    Timeout(Duration),

    /// The blocking I/O task panicked or was cancelled.
    #[error("catalog I/O task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StorageError {
    /// False only for failures to read an existing catalog.
    ///
    /// A `save` that times out or loses its worker is a failed write, even
    /// when the stall happened in the read half of the rewrite.
    pub fn is_write(&self) -> bool {
        !matches!(self, StorageError::Read { .. } | StorageError::Corrupt { .. })
    }
}

/// Owns the on-disk catalog.
///
/// Nothing is cached between calls: every `load` re-reads the file. A `save`
/// runs its whole read-append-rewrite on one blocking worker that owns the
/// write lock, so a caller that times out does not let the next save start
/// until the abandoned rewrite has finished. Each rewrite goes to a fresh
/// temporary file that is synced and then renamed over the catalog.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    staging_dir: Option<PathBuf>,
    io_timeout: Duration,
    write_lock: Arc<Mutex<()>>,
}

impl CatalogStore {
    /// Create a store backed by `path`. No I/O happens until first use.
    pub fn new(path: impl Into<PathBuf>, io_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            staging_dir: None,
            io_timeout,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Stage rewrites in `dir` instead of next to the catalog.
    ///
    /// `dir` must be on the same filesystem as the catalog.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Location of the catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full collection. A missing file is an empty catalog.
    pub async fn load(&self) -> Result<Vec<Course>, StorageError> {
        let path = self.path.clone();
        self.bounded(async move {
            tokio::task::spawn_blocking(move || read_catalog(&path))
                .await
                .unwrap_or_else(|e| Err(StorageError::Task(e)))
        })
        .await
    }

    /// Append `course` and rewrite the collection. Returns the new length.
    pub async fn save(&self, course: Course) -> Result<usize, StorageError> {
        let lock = Arc::clone(&self.write_lock);
        let path = self.path.clone();
        let staging_dir = self.staging_dir();

        self.bounded(async move {
            let guard = lock.lock_owned().await;
            tokio::task::spawn_blocking(move || -> Result<usize, StorageError> {
                let _guard = guard;
                let mut courses = read_catalog(&path)?;
                courses.push(course);
                write_catalog(&path, &staging_dir, &courses)?;
                Ok(courses.len())
            })
            .await
            .unwrap_or_else(|e| Err(StorageError::Task(e)))
        })
        .await
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        tokio::time::timeout(self.io_timeout, fut)
            .await
            .map_err(|_| StorageError::Timeout(self.io_timeout))?
    }

    fn staging_dir(&self) -> PathBuf {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| parent_dir(&self.path).to_path_buf())
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn read_catalog(path: &Path) -> Result<Vec<Course>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_catalog(path: &Path, staging_dir: &Path, courses: &[Course]) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(courses).map_err(StorageError::Encode)?;
    let parent = parent_dir(path);
    let write_error = |at: &Path| {
        let at = at.to_path_buf();
        move |source| StorageError::Write { path: at, source }
    };

    fs::create_dir_all(parent).map_err(write_error(parent))?;

    let mut staged = NamedTempFile::new_in(staging_dir).map_err(write_error(staging_dir))?;
    staged.write_all(&bytes).map_err(write_error(staged.path()))?;
    staged.as_file().sync_all().map_err(write_error(staged.path()))?;
    staged
        .persist(path)
        .map_err(|e| write_error(path)(e.error))?;

    // Make the rename itself durable.
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }

    tracing::debug!(path = %path.display(), courses = courses.len(), "Catalog rewritten");
    Ok(())
}

#[cfg(test)]
pub(crate) mod fifo {
    //! Named pipes that block any reader until something writes to them.

    use std::fs::OpenOptions;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::process::Command;
    use std::thread::JoinHandle;

    pub fn create(path: &Path) {
        let status = Command::new("mkfifo").arg(path).status().unwrap();
        assert!(status.success(), "mkfifo {} failed", path.display());
    }

    /// Open the pipe for writing and send `bytes`, releasing a blocked reader.
    pub fn feed(path: &Path, bytes: &'static [u8]) -> JoinHandle<()> {
        let path: PathBuf = path.to_path_buf();
        std::thread::spawn(move || {
            let mut pipe = OpenOptions::new().write(true).open(&path).unwrap();
            pipe.write_all(bytes).unwrap();
        })
    }
}
