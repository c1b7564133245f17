//! Conversions into `StrataError`.

use super::{AggregatedErrors, StrataError};

impl From<AggregatedErrors> for StrataError {
    fn from(errors: AggregatedErrors) -> Self {
        Self::Aggregate(Box::new(errors))
    }
}
