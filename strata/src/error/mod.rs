//! Error types produced while loading, merging, and processing configuration.

mod aggregate;
mod constructors;
mod conversions;
mod types;

pub use aggregate::AggregatedErrors;
pub use types::{SchemaStage, StrataError};
