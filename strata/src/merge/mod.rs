//! Precedence-aware deep merge of configuration trees.
//!
//! Layers are folded in priority order: later layers override earlier ones at
//! leaf granularity, maps merge recursively, and sequences or scalars replace
//! wholesale. Keys listed as immutable keep the first value that reaches the
//! destination. Merging never fails; shape conflicts such as a scalar landing
//! on a map simply replace.

mod composer;
mod layer;

pub use composer::MergeComposer;
pub use layer::{MergeLayer, MergeProvenance};

use std::collections::BTreeSet;

use tracing::debug;
use uncased::UncasedStr;

use crate::tree::{TreeMap, TreeValue, join};

/// Dotted paths whose existing values later layers may not overwrite.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImmutablePaths(BTreeSet<String>);

impl ImmutablePaths {
    /// Build a set from dotted paths.
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    /// Whether `path` is immutable.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

/// Behavioural switches for [`merge_into`].
#[derive(Clone, Debug, Default)]
pub struct MergeOptions {
    case_sensitive: bool,
    immutable: ImmutablePaths,
}

impl MergeOptions {
    /// Case-insensitive merging with no immutable paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match keys exactly instead of ignoring ASCII case.
    #[must_use]
    pub const fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Protect `immutable` paths from being overwritten once set.
    #[must_use]
    pub fn immutable(mut self, immutable: ImmutablePaths) -> Self {
        self.immutable = immutable;
        self
    }
}

/// Overlay `src` onto `dst`, updating `dst` in place.
///
/// Behaviour:
/// - The matching destination key is found exactly when case-sensitive,
///   otherwise by ASCII case-insensitive comparison. The first match in
///   sorted key order wins, and the destination's casing is kept.
/// - A key whose full path is immutable is skipped, along with everything
///   beneath it, when the destination already holds a value there.
/// - Maps merge recursively; any other pairing replaces the destination.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use strata::merge::{ImmutablePaths, MergeOptions, merge_into};
///
/// let mut acc = json!({"Name": "api", "db": {"host": "a"}});
/// let options = MergeOptions::new().immutable(ImmutablePaths::new(["db.host"]));
/// let layer = json!({"name": "gateway", "db": {"host": "b", "port": 5432}});
/// if let (Some(dst), serde_json::Value::Object(src)) = (acc.as_object_mut(), layer) {
///     merge_into(dst, src, &options);
/// }
/// assert_eq!(acc, json!({"Name": "gateway", "db": {"host": "a", "port": 5432}}));
/// ```
pub fn merge_into(dst: &mut TreeMap, src: TreeMap, options: &MergeOptions) {
    merge_at(dst, src, "", options);
}

fn merge_at(dst: &mut TreeMap, src: TreeMap, parent: &str, options: &MergeOptions) {
    for (key, incoming) in src {
        let target_key = matching_key(dst, &key, options.case_sensitive).unwrap_or(key);
        let path = join(parent, &target_key);
        if dst.contains_key(&target_key) && options.immutable.contains(&path) {
            debug!(path = %path, "skipping immutable key");
            continue;
        }
        match dst.get_mut(&target_key) {
            Some(TreeValue::Object(existing)) if incoming.is_object() => {
                if let TreeValue::Object(incoming_map) = incoming {
                    merge_at(existing, incoming_map, &path, options);
                }
            }
            _ => {
                dst.insert(target_key, incoming);
            }
        }
    }
}

fn matching_key(dst: &TreeMap, key: &str, case_sensitive: bool) -> Option<String> {
    if case_sensitive {
        return dst.contains_key(key).then(|| key.to_owned());
    }
    let wanted = UncasedStr::new(key);
    dst.keys().find(|existing| UncasedStr::new(existing) == wanted).cloned()
}

/// Fold `layers` into a fresh map in the order given.
///
/// Layers whose root is not a map are ignored.
#[must_use]
pub fn merge_all<I>(layers: I, options: &MergeOptions) -> TreeValue
where
    I: IntoIterator<Item = TreeValue>,
{
    let mut acc = TreeMap::new();
    for layer in layers {
        if let TreeValue::Object(map) = layer {
            merge_into(&mut acc, map, options);
        }
    }
    TreeValue::Object(acc)
}
