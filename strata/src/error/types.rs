//! Primary error enum for configuration processing flows.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use super::aggregate::AggregatedErrors;
use crate::codec::Format;

/// Which reference tree produced a structural mismatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SchemaStage {
    /// The reference tree checked before any mutation.
    Input,
    /// The reference tree used to project the processed result.
    Output,
}

impl fmt::Display for SchemaStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// Errors that can occur while loading or processing configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StrataError {
    /// Reading a source, schema, vars, or item file failed.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing an output artefact failed.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// Destination that could not be written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A document was malformed for the format it was parsed as.
    #[error("failed to parse {source_id} as {format}: {message}")]
    Parse {
        /// File path or stream name of the document.
        source_id: String,
        /// Format the document was parsed as.
        format: Format,
        /// Decoder message.
        message: String,
    },

    /// The requested format is unknown or not allowed in this position.
    #[error("unsupported format '{hint}' for {context}")]
    UnsupportedFormat {
        /// Format name or extension that was rejected.
        hint: String,
        /// Where the format was requested.
        context: String,
    },

    /// The schema document is structurally invalid.
    #[error("invalid schema '{path}': {message}")]
    SchemaLoad {
        /// Schema file path.
        path: String,
        /// Description of the structural problem.
        message: String,
    },

    /// A declared variable has no value from any source and no default.
    #[error("variable '{name}' could not be resolved and has no default value")]
    VariableResolution {
        /// Variable name.
        name: String,
    },

    /// The configuration does not match an input or output reference tree.
    #[error("{stage} schema mismatch at '{key}': {message}")]
    SchemaMismatch {
        /// Reference tree that rejected the configuration.
        stage: SchemaStage,
        /// Dotted path of the offending key.
        key: String,
        /// Human-readable explanation.
        message: String,
    },

    /// A validation rule failed.
    #[error("validation failed for '{key}': {message}")]
    Validation {
        /// Dotted path that failed validation.
        key: String,
        /// Human-readable explanation of the validation failure.
        message: String,
    },

    /// A generator could not produce its value.
    #[error("generator '{kind}' for '{target}' failed: {message}")]
    Generator {
        /// Generator type name.
        kind: &'static str,
        /// Target path of the generator.
        target: String,
        /// Description of the failure.
        message: String,
    },

    /// A transform could not be applied.
    #[error("transform '{kind}' at '{path}' failed: {message}")]
    Transform {
        /// Transform type name.
        kind: &'static str,
        /// Path the transform operated on.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// A tree could not be encoded in the requested format.
    #[error("failed to serialize as {format}: {message}")]
    Serialize {
        /// Target format.
        format: Format,
        /// Encoder message.
        message: String,
    },

    /// The batch directive is malformed.
    #[error("invalid batch directive: {message}")]
    Batch {
        /// Description of the problem.
        message: String,
    },

    /// A single batch iteration failed.
    #[error("iteration {index} failed: {source}")]
    Iteration {
        /// Zero-based iteration index.
        index: usize,
        /// Error that aborted the iteration.
        #[source]
        source: Arc<Self>,
    },

    /// Multiple errors were collected.
    #[error("multiple errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}
