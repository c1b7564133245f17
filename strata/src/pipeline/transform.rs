//! Structural and value transforms applied after generation.

use std::sync::Arc;

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use tracing::debug;

use crate::StrataResult;
use crate::error::StrataError;
use crate::schema::TransformDefinition;
use crate::tree::{self, TreeMap, TreeValue, ValueKind};

/// Apply one already-expanded transform to `config`.
pub(super) fn apply(definition: &TransformDefinition, config: &mut TreeValue) -> StrataResult<()> {
    execute(definition, config).map_err(|message| {
        Arc::new(StrataError::Transform {
            kind: definition.kind(),
            path: definition.path().to_owned(),
            message,
        })
    })?;
    debug!(kind = definition.kind(), path = definition.path(), "applied transform");
    Ok(())
}

fn execute(definition: &TransformDefinition, config: &mut TreeValue) -> Result<(), String> {
    match definition {
        TransformDefinition::RenameKey { from, to } => {
            let value = take(config, from)?;
            tree::set(config, to, value);
            Ok(())
        }
        TransformDefinition::ChangeCase { path, case } => {
            let converted = convert_case(string_at(config, path)?, case)?;
            tree::set(config, path, TreeValue::String(converted));
            Ok(())
        }
        TransformDefinition::AddKeyPrefix { path, prefix } => {
            rekey(config, path, |key| format!("{prefix}{key}"))
        }
        TransformDefinition::AddKeySuffix { path, suffix } => {
            rekey(config, path, |key| format!("{key}{suffix}"))
        }
        TransformDefinition::DeleteKey { path } => take(config, path).map(drop),
        TransformDefinition::ReplaceKey { path, target } => {
            let value = take(config, target)?;
            tree::set(config, path, value);
            Ok(())
        }
        TransformDefinition::SetValue { path, value } => {
            tree::set(config, path, value.clone());
            Ok(())
        }
        TransformDefinition::Trim { path, pattern } => {
            let current = string_at(config, path)?;
            let trimmed = match pattern.as_deref() {
                Some(chars) if !chars.is_empty() => {
                    current.trim_matches(|c: char| chars.contains(c)).to_owned()
                }
                _ => current.trim().to_owned(),
            };
            tree::set(config, path, TreeValue::String(trimmed));
            Ok(())
        }
    }
}

fn take(config: &mut TreeValue, path: &str) -> Result<TreeValue, String> {
    tree::remove(config, path).ok_or_else(|| format!("path '{path}' not found"))
}

fn string_at<'a>(config: &'a TreeValue, path: &str) -> Result<&'a str, String> {
    match tree::get(config, path) {
        None => Err(format!("path '{path}' not found")),
        Some(TreeValue::String(s)) => Ok(s),
        Some(other) => Err(format!(
            "value at '{path}' is not a string (found {})",
            ValueKind::of(other)
        )),
    }
}

fn convert_case(input: &str, case: &str) -> Result<String, String> {
    Ok(match case.to_ascii_lowercase().as_str() {
        "upper" => input.to_uppercase(),
        "lower" => input.to_lowercase(),
        "snake" => input.to_snake_case(),
        "camel" => input.to_lower_camel_case(),
        "kebab" => input.to_kebab_case(),
        "pascal" => input.to_upper_camel_case(),
        _ => {
            return Err(format!(
                "unsupported case '{case}'; use upper, lower, snake, camel, kebab, or pascal"
            ));
        }
    })
}

fn rekey(
    config: &mut TreeValue,
    path: &str,
    rename: impl Fn(&str) -> String,
) -> Result<(), String> {
    let map = match tree::get_mut(config, path) {
        None => return Err(format!("path '{path}' not found")),
        Some(TreeValue::Object(map)) => map,
        Some(other) => {
            return Err(format!(
                "value at '{path}' is not a map (found {})",
                ValueKind::of(other)
            ));
        }
    };
    *map = std::mem::take(map)
        .into_iter()
        .map(|(key, value)| (rename(&key), value))
        .collect::<TreeMap>();
    Ok(())
}
