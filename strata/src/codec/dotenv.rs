//! Flat `KEY=value` documents.
//!
//! Each non-blank, non-comment line holds one entry. Dotted keys nest, so
//! `db.port=5432` decodes to `{"db": {"port": "5432"}}`. Values are strings;
//! double-quoted values understand `\n`, `\t`, `\"` and `\\` escapes while
//! single-quoted values are taken literally.

use crate::tree::{self, TreeMap, TreeValue, join, stringify};

pub(super) fn parse(text: &str) -> TreeValue {
    let mut root = TreeValue::Object(TreeMap::new());
    for raw in text.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let entry = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        let name = key.trim();
        if name.is_empty() {
            continue;
        }
        tree::set(&mut root, name, TreeValue::String(unquote(value.trim())));
    }
    root
}

fn unquote(value: &str) -> String {
    if let Some(inner) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        return inner.to_owned();
    }
    let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        return value.to_owned();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub(super) fn serialize(value: &TreeValue) -> Result<String, String> {
    let TreeValue::Object(root) = value else {
        return Err("ENV documents must have a map at the root".to_owned());
    };
    let mut out = String::new();
    flatten(&mut out, "", root);
    Ok(out)
}

fn flatten(out: &mut String, prefix: &str, map: &TreeMap) {
    for (key, item) in map {
        let path = join(prefix, key);
        match item {
            TreeValue::Object(child) => flatten(out, &path, child),
            other => {
                out.push_str(&path);
                out.push('=');
                out.push_str(&quote(&stringify(other)));
                out.push('\n');
            }
        }
    }
}

fn quote(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '#' | '='));
    if !needs_quotes {
        return value.to_owned();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
