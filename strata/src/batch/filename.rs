//! Output filename resolution for batch iterations.

use camino::Utf8PathBuf;
use tracing::warn;

use crate::schema::VariableDefinition;
use crate::vars::{VariableContext, expand};

/// Variable sources consulted when resolving a filename pattern.
pub(super) struct FilenameScope<'a> {
    pub(super) index: usize,
    pub(super) basename: &'a str,
    pub(super) context: &'a VariableContext<'a>,
    pub(super) schema: &'a [VariableDefinition],
}

/// Resolve `pattern` for one iteration.
///
/// `${ITEM_INDEX}` and `${ITEM_FILE_BASENAME}` are replaced first. Every
/// other `${NAME}` is looked up in the iteration variables, then the
/// environment tier, then the literal or default of a schema declaration.
/// Unresolved names become empty and the result is cleaned lexically.
pub(super) fn resolve(pattern: &str, scope: &FilenameScope<'_>) -> Utf8PathBuf {
    let fixed = pattern
        .replace("${ITEM_INDEX}", &scope.index.to_string())
        .replace("${ITEM_FILE_BASENAME}", scope.basename);
    let expanded = expand(&fixed, |name| {
        let found = scope
            .context
            .file_var(name)
            .or_else(|| scope.context.env_var(name))
            .map(str::to_owned)
            .or_else(|| schema_value(scope.schema, name));
        if found.is_none() {
            warn!(variable = name, "filename variable not found, using empty string");
        }
        Some(found.unwrap_or_default())
    });
    Utf8PathBuf::from(clean(&expanded))
}

fn schema_value(definitions: &[VariableDefinition], name: &str) -> Option<String> {
    definitions
        .iter()
        .find(|definition| definition.name == name)
        .and_then(|definition| {
            definition
                .value
                .as_deref()
                .filter(|v| !v.is_empty())
                .or_else(|| definition.default_value())
        })
        .map(str::to_owned)
}

/// Lexically normalise a slash-separated path.
///
/// Repeated separators collapse, `.` segments vanish, and `..` removes the
/// preceding segment where one exists. An empty result becomes `.`.
#[must_use]
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_owned(),
        (false, false) => joined,
    }
}
