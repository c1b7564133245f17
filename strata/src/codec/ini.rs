//! INI decoding and encoding.
//!
//! Keys that appear before the first `[section]` header live at the top level.
//! Each section becomes a map of string values; dotted section names such as
//! `[server.tls]` nest. Encoding writes top-level scalars first, then one
//! section per nested map that holds scalars.

use crate::tree::{self, TreeMap, TreeValue, join, stringify};

pub(super) fn parse(text: &str) -> TreeValue {
    let mut root = TreeValue::Object(TreeMap::new());
    let mut section = String::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            name.trim().clone_into(&mut section);
            if !tree::get(&root, &section).is_some_and(TreeValue::is_object) {
                tree::set(&mut root, &section, TreeValue::Object(TreeMap::new()));
            }
            continue;
        }
        let (key, value) = split_entry(line);
        tree::set(
            &mut root,
            &join(&section, key),
            TreeValue::String(unquote(value).to_owned()),
        );
    }
    root
}

fn split_entry(line: &str) -> (&str, &str) {
    match line.split_once(['=', ':']) {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (line, ""),
    }
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value)
}

pub(super) fn serialize(value: &TreeValue) -> Result<String, String> {
    let TreeValue::Object(root) = value else {
        return Err("INI documents must have a map at the root".to_owned());
    };
    let mut out = String::new();
    write_entries(&mut out, "", root)?;
    write_sections(&mut out, "", root)?;
    Ok(out)
}

fn write_entries(out: &mut String, prefix: &str, map: &TreeMap) -> Result<(), String> {
    for (key, item) in map {
        if item.is_object() {
            continue;
        }
        let text = stringify(item);
        if text.contains(['\n', '\r']) {
            return Err(format!(
                "value at '{}' spans several lines, which INI cannot represent",
                join(prefix, key)
            ));
        }
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&quote(&text));
        out.push('\n');
    }
    Ok(())
}

/// Wrap `value` in double quotes when reading it back would otherwise trim
/// or unquote it.
fn quote(value: &str) -> String {
    if value.trim() == value && unquote(value) == value {
        value.to_owned()
    } else {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        quoted.push_str(value);
        quoted.push('"');
        quoted
    }
}

fn write_sections(out: &mut String, prefix: &str, map: &TreeMap) -> Result<(), String> {
    for (key, item) in map {
        let TreeValue::Object(child) = item else {
            continue;
        };
        let name = join(prefix, key);
        if child.is_empty() || child.values().any(|v| !v.is_object()) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push('[');
            out.push_str(&name);
            out.push_str("]\n");
            write_entries(out, &name, child)?;
        }
        write_sections(out, &name, child)?;
    }
    Ok(())
}
