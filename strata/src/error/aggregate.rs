//! Aggregation container for multiple `StrataError` values.

use std::{error::Error, fmt, sync::Arc};

use super::StrataError;

/// Collection of [`StrataError`]s gathered from independent units of work,
/// such as batch iterations.
///
/// # Examples
///
/// ```
/// use strata::StrataError;
/// let e = StrataError::aggregate(vec![
///     StrataError::Validation { key: "port".into(), message: "must be positive".into() },
///     StrataError::VariableResolution { name: "REGION".into() },
/// ]);
/// if let StrataError::Aggregate(agg) = e {
///     assert_eq!(agg.len(), 2);
/// }
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors(Vec<Arc<StrataError>>);

impl AggregatedErrors {
    /// Create a new aggregation from a vector of errors.
    #[must_use]
    pub const fn new(errors: Vec<Arc<StrataError>>) -> Self {
        Self(errors)
    }

    /// Iterate over the contained errors.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> impl Iterator<Item = &StrataError> {
        self.0.iter().map(Arc::as_ref)
    }

    /// Number of errors in the aggregation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the aggregation holds no errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {e}", i + 1)?;
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}

impl IntoIterator for AggregatedErrors {
    type Item = Arc<StrataError>;
    type IntoIter = std::vec::IntoIter<Arc<StrataError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
