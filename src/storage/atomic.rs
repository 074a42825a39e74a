//! Atomic file writes
//!
//! Content is written to a uniquely named sibling temp file
//! (`<name>.<random>.tmp`) and renamed onto the target once complete, so a
//! reader sees either the old file or the new one and never a torn write.
//! The temp file lives in the target's directory to keep the rename on one
//! filesystem. Dropping an uncommitted [`AtomicFile`] removes its temp file.

use log::{debug, error};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

use crate::error::StoreError;

/// Suffix carried by every in-flight temp file
pub const TEMP_SUFFIX: &str = ".tmp";

const TEMP_RAND_BYTES: usize = 8;

/// Mode of newly created files, so content stays readable by the serving user
#[cfg(unix)]
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// A pending replacement of `target`
#[derive(Debug)]
pub struct AtomicFile {
    target: PathBuf,
    temp: NamedTempFile,
}

impl AtomicFile {
    /// Create the temp sibling of `target`, creating the parent directory if missing
    pub fn create(target: &Path) -> Result<Self, StoreError> {
        let parent = target.parent().ok_or_else(|| {
            StoreError::InvalidPath(format!("No parent directory for {}", target.display()))
        })?;
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                StoreError::InvalidPath(format!("No file name in {}", target.display()))
            })?;

        fs::create_dir_all(parent)?;

        let temp = Builder::new()
            .prefix(&format!("{file_name}."))
            .suffix(TEMP_SUFFIX)
            .rand_bytes(TEMP_RAND_BYTES)
            .tempfile_in(parent)?;

        // The temp file starts out 0600; the rename must not narrow access
        if let Some(permissions) = target_permissions(target) {
            temp.as_file().set_permissions(permissions)?;
        }

        debug!(
            "Opened temp file {} for {}",
            temp.path().display(),
            target.display()
        );

        Ok(Self {
            target: target.to_path_buf(),
            temp,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Independent read handle on the temp file
    pub fn reopen(&self) -> io::Result<File> {
        self.temp.reopen()
    }

    /// Flush, sync and rename the temp file onto the target
    pub fn commit(self) -> Result<(), StoreError> {
        let AtomicFile { target, mut temp } = self;

        temp.flush()?;
        temp.as_file().sync_all()?;

        if let Err(e) = temp.persist(&target) {
            error!(
                "Failed to rename {} onto {}: {}",
                e.file.path().display(),
                target.display(),
                e.error
            );
            // Dropping the returned handle removes the temp file
            drop(e.file);
            return Err(StoreError::Io(e.error));
        }

        if let Some(parent) = target.parent() {
            sync_dir(parent);
        }

        debug!("Committed {}", target.display());
        Ok(())
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

/// Atomically replace `path` with `bytes`
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = AtomicFile::create(path)?;
    file.write_all(bytes)?;
    file.commit()
}

/// Permissions the replacement should carry: the existing file's, or the default mode
fn target_permissions(target: &Path) -> Option<fs::Permissions> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_file() => Some(meta.permissions()),
        _ => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(DEFAULT_FILE_MODE))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Best-effort directory fsync so the rename itself is durable
fn sync_dir(dir: &Path) {
    if cfg!(unix) {
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }
    }
}
