//! Destinations for serialised output.

use std::collections::BTreeMap;
use std::io::ErrorKind;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::StrataResult;
use crate::error::StrataError;

/// Receives encoded documents keyed by output path.
pub trait OutputSink {
    /// Store `bytes` at `target`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Write`] when the content cannot be stored.
    fn write(&mut self, target: &Utf8Path, bytes: &[u8]) -> StrataResult<()>;
}

/// Writes files on disk, creating parent directories as needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn write(&mut self, target: &Utf8Path, bytes: &[u8]) -> StrataResult<()> {
        let file_name = target.file_name().ok_or_else(|| {
            StrataError::write(
                target,
                std::io::Error::new(ErrorKind::InvalidInput, "output path has no file name"),
            )
        })?;
        let parent = target
            .parent()
            .filter(|p| !p.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = ensure_dir(parent).map_err(|err| StrataError::write(target, err))?;
        dir.write(file_name, bytes)
            .map_err(|err| StrataError::write(target, err))
    }
}

fn ensure_dir(path: &Utf8Path) -> std::io::Result<Dir> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Dir::create_ambient_dir_all(path, ambient_authority())?;
            Dir::open_ambient_dir(path, ambient_authority())
        }
        other => other,
    }
}

/// Keeps written documents in memory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemorySink {
    files: BTreeMap<Utf8PathBuf, Vec<u8>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content written at `target`.
    #[must_use]
    pub fn get(&self, target: &Utf8Path) -> Option<&[u8]> {
        self.files.get(target).map(Vec::as_slice)
    }

    /// Written paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files.keys().map(Utf8PathBuf::as_path)
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, target: &Utf8Path, bytes: &[u8]) -> StrataResult<()> {
        self.files.insert(target.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
