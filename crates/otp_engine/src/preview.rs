use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use otp_core::{build_preview_document, preview_filename};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("preview directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("preview key must be a digit string, got {0:?}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the preview directory exists; create if missing.
pub fn ensure_preview_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
        Ok(())
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))
    }
}

/// Materializes preview documents as `{dir}/otp-{code}.html`.
///
/// Writes go through a temp file in the same directory and a rename, so a
/// reader sees either the previous document or the new one.
#[derive(Debug, Clone)]
pub struct PreviewWriter {
    dir: PathBuf,
}

impl PreviewWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, code: &str) -> PathBuf {
        self.dir.join(preview_filename(code))
    }

    pub fn materialize(&self, code: &str, text: &str) -> Result<PathBuf, PersistError> {
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PersistError::InvalidKey(code.to_string()));
        }
        ensure_preview_dir(&self.dir)?;

        let target = self.path_for(code);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(build_preview_document(code, text).as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
