//! Layer metadata and transport values for merges.

use camino::{Utf8Path, Utf8PathBuf};

use crate::tree::TreeValue;

/// Provenance of a merge layer, in increasing precedence.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum MergeProvenance {
    /// Values loaded from a discovered configuration file.
    File,
    /// Values read from standard input.
    Stdin,
    /// Values collected from prefixed environment variables.
    Environment,
}

/// Representation of a configuration layer.
#[derive(Clone, Debug)]
pub struct MergeLayer {
    provenance: MergeProvenance,
    value: TreeValue,
    path: Option<Utf8PathBuf>,
}

impl MergeLayer {
    /// Construct a layer originating from a configuration file.
    #[must_use]
    pub const fn file(value: TreeValue, path: Utf8PathBuf) -> Self {
        Self {
            provenance: MergeProvenance::File,
            value,
            path: Some(path),
        }
    }

    /// Construct a layer originating from standard input.
    #[must_use]
    pub const fn stdin(value: TreeValue) -> Self {
        Self {
            provenance: MergeProvenance::Stdin,
            value,
            path: None,
        }
    }

    /// Construct a layer originating from environment variables.
    #[must_use]
    pub const fn environment(value: TreeValue) -> Self {
        Self {
            provenance: MergeProvenance::Environment,
            value,
            path: None,
        }
    }

    /// Returns the provenance of the layer.
    #[must_use]
    pub const fn provenance(&self) -> MergeProvenance {
        self.provenance
    }

    /// Returns the associated path if this layer was sourced from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Returns the owned tree.
    #[must_use]
    pub fn into_value(self) -> TreeValue {
        self.value
    }
}
