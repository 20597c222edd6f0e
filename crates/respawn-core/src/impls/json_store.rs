//! JsonFileTimerStore - JSON ファイルによる TimerStore 実装
//!
//! 書き込みは `<path>.tmp` に書いて fsync してから rename し、
//! 最後にディレクトリも fsync します。
//! 電源断でも元のファイルか新しいファイルのどちらかが完全な形で残ります。

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{StoreError, TimerSnapshot};
use crate::ports::TimerStore;

#[derive(Debug, Clone)]
pub struct JsonFileTimerStore {
    path: PathBuf,
}

impl JsonFileTimerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Commit the rename itself. Directories cannot be opened as files on Windows.
    #[cfg(unix)]
    fn sync_parent_dir(&self) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| self.io_error(parent, e))
    }

    #[cfg(not(unix))]
    fn sync_parent_dir(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl TimerStore for JsonFileTimerStore {
    fn load(&self) -> Result<TimerSnapshot, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet, starting empty");
                return Ok(TimerSnapshot::default());
            }
            Err(e) => return Err(self.io_error(&self.path, e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::CorruptSnapshot {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.tmp_path();
        let mut file = File::create(&tmp).map_err(|e| self.io_error(&tmp, e))?;
        file.write_all(&json).map_err(|e| self.io_error(&tmp, e))?;
        file.sync_all().map_err(|e| self.io_error(&tmp, e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(&self.path, e))?;
        self.sync_parent_dir()?;

        debug!(path = %self.path.display(), timers = snapshot.len(), "snapshot saved");
        Ok(())
    }
}
