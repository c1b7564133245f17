//! Core crate for the `strata` configuration merger.
//!
//! Configuration documents in JSON, YAML, TOML, INI, or `.env` form are
//! decoded into a common [`tree::TreeValue`], deep-merged under explicit
//! precedence, and run through a schema-driven pipeline of variable
//! substitution, generators, transforms, validation, and output projection.
//! A vars file may also drive the pipeline once per item in batch mode.
//!
//! ```
//! use serde_json::json;
//! use strata::diagnostics::Diagnostics;
//! use strata::merge::{MergeComposer, MergeOptions};
//! use strata::pipeline::Processor;
//! use strata::schema::{LoadedSchema, Schema};
//! use strata::vars::{ProcessEnv, VariableContext};
//!
//! let mut composer = MergeComposer::new();
//! composer.push_file("base.yaml".into(), json!({"service": {"port": 80}}));
//! composer.push_file("prod.yaml".into(), json!({"service": {"port": 443}}));
//! let merged = composer.compose(&MergeOptions::new());
//!
//! let schema = Schema::from_tree(
//!     json!({"validate": [{"path": "service.port", "rules": {"type": "integer", "max": 65535}}]}),
//!     "inline",
//! )?;
//! let loaded = LoadedSchema::from_parts(schema, None, None);
//! let out = Processor::new(&loaded, Diagnostics::silent())
//!     .run(merged, &VariableContext::new(&ProcessEnv))?;
//! assert_eq!(out, json!({"service": {"port": 443}}));
//! # Ok::<_, std::sync::Arc<strata::StrataError>>(())
//! ```

use std::sync::Arc;

pub mod batch;
pub mod codec;
pub mod diagnostics;
pub mod env;
mod error;
pub mod merge;
pub mod pipeline;
pub mod schema;
pub mod sources;
pub mod tree;
pub mod vars;

pub use error::{AggregatedErrors, SchemaStage, StrataError};

/// Result type used throughout the crate.
pub type StrataResult<T> = Result<T, Arc<StrataError>>;
