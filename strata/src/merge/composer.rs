//! Ordering and folding of provenance-tagged layers.

use tracing::warn;

use super::{MergeLayer, MergeOptions, MergeProvenance, merge_into};
use crate::tree::{TreeMap, TreeValue};

/// Builder that accumulates [`MergeLayer`] instances and folds them in
/// precedence order.
///
/// Layers are ordered by provenance (files, then standard input, then the
/// environment) and file layers by path, regardless of the order in which
/// they were pushed. Parallel parsing can therefore push results as they
/// complete without affecting the merged outcome.
///
/// ```rust
/// use serde_json::json;
/// use strata::merge::{MergeComposer, MergeOptions};
///
/// let mut composer = MergeComposer::new();
/// composer.push_environment(json!({"port": 9000}));
/// composer.push_file("b.yaml".into(), json!({"port": 8080, "name": "b"}));
/// composer.push_file("a.yaml".into(), json!({"name": "a"}));
///
/// let merged = composer.compose(&MergeOptions::new());
/// assert_eq!(merged, json!({"name": "b", "port": 9000}));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MergeComposer {
    layers: Vec<MergeLayer>,
}

impl MergeComposer {
    /// Create an empty composer.
    #[must_use]
    pub const fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Create a composer with preallocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            layers: Vec::with_capacity(capacity),
        }
    }

    /// Push a configuration file layer.
    pub fn push_file(&mut self, path: camino::Utf8PathBuf, value: TreeValue) {
        self.push_layer(MergeLayer::file(value, path));
    }

    /// Push a standard-input layer.
    pub fn push_stdin(&mut self, value: TreeValue) {
        self.push_layer(MergeLayer::stdin(value));
    }

    /// Push an environment layer.
    pub fn push_environment(&mut self, value: TreeValue) {
        self.push_layer(MergeLayer::environment(value));
    }

    /// Push an arbitrary layer.
    pub fn push_layer(&mut self, layer: MergeLayer) {
        self.layers.push(layer);
    }

    /// Consume the composer and return the layers in merge order.
    #[must_use]
    pub fn layers(mut self) -> Vec<MergeLayer> {
        self.layers
            .sort_by(|a, b| (a.provenance(), a.path()).cmp(&(b.provenance(), b.path())));
        self.layers
    }

    /// Fold every layer into a single tree.
    ///
    /// Layers whose root is not a map are skipped with a warning.
    #[must_use]
    pub fn compose(self, options: &MergeOptions) -> TreeValue {
        let mut acc = TreeMap::new();
        for layer in self.layers() {
            let provenance = layer.provenance();
            let source = layer
                .path()
                .map_or_else(|| provenance_name(provenance).to_owned(), ToString::to_string);
            match layer.into_value() {
                TreeValue::Object(map) => merge_into(&mut acc, map, options),
                _ => warn!(source = %source, "ignoring layer whose root is not a map"),
            }
        }
        TreeValue::Object(acc)
    }
}

const fn provenance_name(provenance: MergeProvenance) -> &'static str {
    match provenance {
        MergeProvenance::File => "file",
        MergeProvenance::Stdin => "stdin",
        MergeProvenance::Environment => "environment",
    }
}

impl IntoIterator for MergeComposer {
    type Item = MergeLayer;
    type IntoIter = std::vec::IntoIter<MergeLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers().into_iter()
    }
}
