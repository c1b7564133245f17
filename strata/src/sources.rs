//! Source discovery and parallel parsing.
//!
//! Inputs name files or directories; `-` stands for standard input.
//! Directories contribute every file with a supported extension, either from
//! their top level or, when recursive, from the whole tree. Discovered files
//! are parsed on the rayon pool and handed to the merge step sorted by path,
//! so the merged result does not depend on parse completion order.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::StrataResult;
use crate::codec::{self, Format};
use crate::error::StrataError;
use crate::merge::MergeComposer;
use crate::tree::TreeValue;

/// Input name that selects standard input.
pub const STDIN: &str = "-";

/// Files and standard input selected for one run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceSet {
    files: Vec<Utf8PathBuf>,
    stdin: bool,
}

impl SourceSet {
    /// Expand `inputs` into a sorted, de-duplicated list of files.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Read`] when an input does not exist or a
    /// directory cannot be walked, and [`StrataError::UnsupportedFormat`]
    /// when an explicitly named file has an unknown extension.
    pub fn discover(inputs: &[Utf8PathBuf], recursive: bool) -> StrataResult<Self> {
        let mut set = Self::default();
        for input in inputs {
            if input.as_str() == STDIN {
                set.stdin = true;
                continue;
            }
            let metadata = input
                .metadata()
                .map_err(|err| StrataError::read(input, err))?;
            if metadata.is_dir() {
                set.files.extend(scan_dir(input, recursive)?);
            } else if Format::from_path(input).is_some() {
                set.files.push(input.clone());
            } else {
                return Err(StrataError::unsupported_format(
                    input.extension().unwrap_or_default(),
                    format!("source file '{input}'"),
                ));
            }
        }
        set.files.sort();
        set.files.dedup();
        debug!(files = set.files.len(), stdin = set.stdin, "discovered sources");
        Ok(set)
    }

    /// Discovered files in path order.
    #[must_use]
    pub fn files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    /// Whether `-` was among the inputs.
    #[must_use]
    pub const fn reads_stdin(&self) -> bool {
        self.stdin
    }

    /// Whether nothing was selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.files.is_empty() && !self.stdin
    }

    /// Parse every file and push the successes onto `composer`.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    /// Returns the number of skipped files.
    pub fn load_into(&self, composer: &mut MergeComposer) -> usize {
        let mut skipped = 0;
        for (path, parsed) in parse_all(&self.files) {
            match parsed {
                Ok(value) => composer.push_file(path, value),
                Err(err) => {
                    warn!(path = %path, error = %err, "skipping source that failed to load");
                    skipped += 1;
                }
            }
        }
        skipped
    }
}

fn scan_dir(dir: &Utf8Path, recursive: bool) -> StrataResult<Vec<Utf8PathBuf>> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 });
    let mut found = Vec::new();
    for item in walker {
        let entry = item.map_err(|err| StrataError::read(dir, err.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) if Format::from_path(&path).is_some() => found.push(path),
            Ok(_) => {}
            Err(path) => warn!(path = %path.display(), "skipping non UTF-8 path"),
        }
    }
    Ok(found)
}

/// Parse `files` in parallel and return the results sorted by path.
#[must_use]
pub fn parse_all(files: &[Utf8PathBuf]) -> Vec<(Utf8PathBuf, StrataResult<TreeValue>)> {
    let mut parsed: Vec<_> = files
        .par_iter()
        .map(|path| (path.clone(), codec::load_file(path)))
        .collect();
    parsed.sort_by(|(a, _), (b, _)| a.cmp(b));
    parsed
}

/// Read and decode a document from `reader`, typically standard input.
///
/// # Errors
///
/// Returns [`StrataError::UnsupportedFormat`] when `format` is `None`, since
/// a stream has no extension to infer from, plus any read or parse error.
pub fn read_stream(mut reader: impl Read, format: Option<Format>) -> StrataResult<TreeValue> {
    let chosen = format.ok_or_else(|| {
        StrataError::unsupported_format("", "standard input requires an explicit input format")
    })?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| StrataError::read(Utf8Path::new("<stdin>"), err))?;
    codec::parse(&bytes, chosen, "stdin")
}
