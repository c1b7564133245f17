//! Generic configuration tree and dotted-path addressing.
//!
//! Every document, whatever its source format, is decoded into a
//! [`TreeValue`]. Maps are keyed by strings and serialise in sorted key order,
//! so output is deterministic regardless of how a document was assembled.
//! Paths are dot-separated key sequences; they address map nodes only and
//! never index into sequences.

mod kind;

pub use kind::{ValueKind, kinds_compatible};

/// A configuration document or any node within one.
pub type TreeValue = serde_json::Value;

/// Map node of a [`TreeValue`].
pub type TreeMap = serde_json::Map<String, TreeValue>;

/// Split a dotted path into its key segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
}

/// Look up the node at `path`.
///
/// Returns `None` when any segment is missing or an intermediate node is not
/// a map.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::tree;
///
/// let doc = json!({"database": {"port": 5432}});
/// assert_eq!(tree::get(&doc, "database.port"), Some(&json!(5432)));
/// assert!(tree::get(&doc, "database.host").is_none());
/// ```
#[must_use]
pub fn get<'a>(root: &'a TreeValue, path: &str) -> Option<&'a TreeValue> {
    segments(path).try_fold(root, |node, key| node.as_object()?.get(key))
}

/// Write `value` at `path`, creating intermediate maps as needed.
///
/// Intermediate nodes that are not maps are replaced by empty maps, as is a
/// non-map root.
pub fn set(root: &mut TreeValue, path: &str, value: TreeValue) {
    let mut node = root;
    let mut keys = segments(path).peekable();
    while let Some(key) = keys.next() {
        let Some(map) = ensure_map(node) else {
            return;
        };
        if keys.peek().is_none() {
            map.insert(key.to_owned(), value);
            return;
        }
        node = map
            .entry(key.to_owned())
            .or_insert_with(|| TreeValue::Object(TreeMap::new()));
    }
}

/// Remove and return the node at `path`.
pub fn remove(root: &mut TreeValue, path: &str) -> Option<TreeValue> {
    let (parent, leaf) = match path.rsplit_once('.') {
        Some((parent_path, leaf)) => (get_mut(root, parent_path)?, leaf),
        None => (root, path),
    };
    parent.as_object_mut()?.remove(leaf)
}

/// Mutable lookup of the node at `path`.
pub fn get_mut<'a>(root: &'a mut TreeValue, path: &str) -> Option<&'a mut TreeValue> {
    segments(path).try_fold(root, |node, key| node.as_object_mut()?.get_mut(key))
}

/// Render a node as the string used for substitution and concatenation.
///
/// Strings are returned verbatim, numbers and booleans in their natural
/// textual form, `null` as `null`, and composite values as compact JSON.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::tree::stringify;
///
/// assert_eq!(stringify(&json!("db")), "db");
/// assert_eq!(stringify(&json!(8080)), "8080");
/// assert_eq!(stringify(&json!(true)), "true");
/// ```
#[must_use]
pub fn stringify(value: &TreeValue) -> String {
    match value {
        TreeValue::String(s) => s.clone(),
        TreeValue::Number(n) => n.to_string(),
        TreeValue::Bool(b) => b.to_string(),
        TreeValue::Null => "null".to_owned(),
        TreeValue::Array(_) | TreeValue::Object(_) => value.to_string(),
    }
}

/// Join a parent path and a key.
#[must_use]
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}

fn ensure_map(node: &mut TreeValue) -> Option<&mut TreeMap> {
    if !node.is_object() {
        *node = TreeValue::Object(TreeMap::new());
    }
    node.as_object_mut()
}
