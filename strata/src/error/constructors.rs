//! Constructors and aggregation helpers for `StrataError`.

use std::sync::Arc;

use camino::Utf8Path;

use super::{AggregatedErrors, SchemaStage, StrataError};
use crate::codec::Format;

impl StrataError {
    /// Tries to build a [`StrataError`] from an iterator of errors.
    ///
    /// The iterator is consumed eagerly. It returns:
    /// * `None` when no errors are supplied;
    /// * the inner error when a single [`Arc`] is uniquely owned;
    /// * [`Self::Aggregate`] containing that single [`Arc`] when the error is already shared; and
    /// * [`Self::Aggregate`] combining every error for two or more inputs.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut arcs: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        if arcs.len() > 1 {
            return Some(Self::Aggregate(Box::new(AggregatedErrors::new(arcs))));
        }
        let last = arcs.pop()?;
        Some(match Arc::try_unwrap(last) {
            Ok(err) => err,
            Err(shared) => Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared]))),
        })
    }

    /// Build a [`StrataError`] from at least one error.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty. Use [`StrataError::try_aggregate`] when
    /// the list may be empty.
    #[must_use]
    #[track_caller]
    pub fn aggregate<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        Self::try_aggregate(errors).unwrap_or_else(|| panic!("aggregate requires at least one error"))
    }

    /// Wrap an I/O failure encountered while reading `path`.
    #[must_use]
    pub fn read(path: &Utf8Path, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Wrap an I/O failure encountered while writing `path`.
    #[must_use]
    pub fn write(path: &Utf8Path, source: std::io::Error) -> Arc<Self> {
        Arc::new(Self::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Report a malformed document.
    #[must_use]
    pub fn parse(source_id: &str, format: Format, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Parse {
            source_id: source_id.to_owned(),
            format,
            message: message.into(),
        })
    }

    /// Report an unknown or disallowed format.
    #[must_use]
    pub fn unsupported_format(hint: impl Into<String>, context: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::UnsupportedFormat {
            hint: hint.into(),
            context: context.into(),
        })
    }

    /// Report a structurally invalid schema.
    #[must_use]
    pub fn schema_load(path: impl Into<String>, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::SchemaLoad {
            path: path.into(),
            message: message.into(),
        })
    }

    /// Report a mismatch against a reference tree.
    #[must_use]
    pub fn schema_mismatch(
        stage: SchemaStage,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self::SchemaMismatch {
            stage,
            key: key.into(),
            message: message.into(),
        })
    }

    /// Report a failed validation rule.
    #[must_use]
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Validation {
            key: key.into(),
            message: message.into(),
        })
    }

    /// Report an encoder failure.
    #[must_use]
    pub fn serialize(format: Format, message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Serialize {
            format,
            message: message.into(),
        })
    }

    /// Report a malformed batch directive.
    #[must_use]
    pub fn batch(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::Batch {
            message: message.into(),
        })
    }
}
