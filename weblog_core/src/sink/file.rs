//! Size-rotated JSON Lines file sink.
//!
//! Records are appended as one JSON object per line. Before a write that
//! would push the file past `max_bytes`, the file is rotated tailable-style:
//! `error_log.log` becomes `error_log.log.1`, `.1` becomes `.2`, and so on,
//! keeping at most `max_rotations` backups. Appends and rotation hold an
//! exclusive file lock, and a writer whose handle was rotated away by
//! another process reopens the live path before appending, so several
//! server processes can share one log directory.

use super::{Sink, SinkKind};
use crate::{LogRecord, Severity};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// JSONL sink with size-based rotation
pub struct RotatingFileSink {
    path: PathBuf,
    min_level: Severity,
    max_bytes: u64,
    max_rotations: usize,
    file: Mutex<Option<File>>,
}

impl RotatingFileSink {
    /// Open `dir/file_name`, creating `dir` if needed.
    ///
    /// Fails when the directory cannot be created or the file cannot be
    /// opened for appending.
    pub fn open(
        dir: impl AsRef<Path>,
        file_name: &str,
        min_level: Severity,
        max_bytes: u64,
        max_rotations: usize,
    ) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = dir.join(file_name);
        let file = open_append(&path)?;

        Ok(Self {
            path,
            min_level,
            max_bytes: max_bytes.max(1),
            max_rotations,
            file: Mutex::new(Some(file)),
        })
    }

    /// Path of the live file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `n`th backup (1 is the newest)
    pub fn backup_path(&self, n: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    /// Existing backups, newest first
    pub fn rotated_files(&self) -> Vec<PathBuf> {
        (1..=self.max_rotations)
            .map(|n| self.backup_path(n))
            .filter(|p| p.exists())
            .collect()
    }

    fn rotate(&self) -> io::Result<()> {
        if self.max_rotations == 0 {
            return remove_if_exists(&self.path);
        }

        remove_if_exists(&self.backup_path(self.max_rotations))?;
        for n in (1..self.max_rotations).rev() {
            let from = self.backup_path(n);
            if from.exists() {
                fs::rename(&from, self.backup_path(n + 1))?;
            }
        }
        if self.path.exists() {
            fs::rename(&self.path, self.backup_path(1))?;
        }

        tracing::debug!("Rotated {:?}", self.path);
        Ok(())
    }

    /// Append one line under the file lock, rotating first if it would not fit
    fn append_line(&self, slot: &mut Option<File>, line: &[u8]) -> io::Result<()> {
        let mut file = match slot.take() {
            Some(file) => file,
            None => open_append(&self.path)?,
        };
        self.lock_live(&mut file)?;

        // Length is read under the lock; another process may have appended
        let len = file.metadata()?.len();
        if len > 0 && len + line.len() as u64 > self.max_bytes {
            let rotated = self.rotate();
            file.unlock()?;
            rotated?;
            file = open_append(&self.path)?;
            self.lock_live(&mut file)?;
        }

        let written = (&file).write_all(line);
        let unlocked = file.unlock();
        *slot = Some(file);
        written?;
        unlocked
    }

    /// Lock `file`, reopening the path while the held handle points at a
    /// file another writer has already rotated away
    fn lock_live(&self, file: &mut File) -> io::Result<()> {
        loop {
            file.lock_exclusive()?;
            if is_live(file, &self.path)? {
                return Ok(());
            }
            file.unlock()?;
            *file = open_append(&self.path)?;
        }
    }
}

#[cfg(unix)]
fn is_live(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn is_live(_file: &File, path: &Path) -> io::Result<bool> {
    Ok(path.exists())
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl Sink for RotatingFileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    fn write(&self, record: &LogRecord) -> io::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        self.append_line(&mut slot, &line)
    }

    fn flush(&self) -> io::Result<()> {
        let slot = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(file) => file.sync_data(),
            None => Ok(()),
        }
    }
}
