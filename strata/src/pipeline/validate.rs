//! Rule-based validation of the processed configuration.

use regex::Regex;

use crate::StrataResult;
use crate::error::StrataError;
use crate::schema::{Rules, ValidationGroup};
use crate::tree::{self, TreeValue, ValueKind};

/// Apply one validation group to `config`.
///
/// An absent path fails only when the group is `required`; otherwise the
/// group is skipped. Rules run in the order `type`, `min`/`max`,
/// `minLength`, `enum`, `regex` and the first failure is returned.
pub(super) fn check(group: &ValidationGroup, config: &TreeValue) -> StrataResult<()> {
    let Some(value) = tree::get(config, &group.path) else {
        if group.rules.required {
            return Err(StrataError::validation(
                &group.path,
                "path is required but not found",
            ));
        }
        return Ok(());
    };
    check_rules(&group.rules, value).map_err(|message| StrataError::validation(&group.path, message))
}

fn check_rules(rules: &Rules, value: &TreeValue) -> Result<(), String> {
    if let Some(kind) = rules.kind
        && !kind.accepts(value)
    {
        return Err(format!(
            "expected type {}, found {}",
            kind.as_str(),
            ValueKind::of(value)
        ));
    }
    check_bounds(rules, value)?;
    if rules.min_length.is_none() && rules.allowed.is_empty() && rules.regex.is_none() {
        return Ok(());
    }
    let TreeValue::String(text) = value else {
        return Err(format!(
            "string rules require a string, found {}",
            ValueKind::of(value)
        ));
    };
    if let Some(min_length) = rules.min_length {
        let length = text.chars().count();
        if length < min_length {
            return Err(format!(
                "length {length} is less than minimum length {min_length}"
            ));
        }
    }
    if !rules.allowed.is_empty() && !rules.allowed.iter().any(|allowed| allowed == text) {
        return Err(format!(
            "value '{text}' is not in the allowed list [{}]",
            rules.allowed.join(", ")
        ));
    }
    if let Some(pattern) = rules.regex.as_deref() {
        let re = Regex::new(pattern)
            .map_err(|err| format!("invalid regex pattern '{pattern}': {err}"))?;
        if !re.is_match(text) {
            return Err(format!(
                "value '{text}' does not match regex pattern '{pattern}'"
            ));
        }
    }
    Ok(())
}

fn check_bounds(rules: &Rules, value: &TreeValue) -> Result<(), String> {
    if rules.min.is_none() && rules.max.is_none() {
        return Ok(());
    }
    let Some(number) = value.as_f64() else {
        return Err(format!(
            "min/max rules require a number, found {}",
            ValueKind::of(value)
        ));
    };
    if let Some(min) = rules.min.filter(|min| number < *min) {
        return Err(format!("value {value} is less than minimum {min}"));
    }
    if let Some(max) = rules.max.filter(|max| number > *max) {
        return Err(format!("value {value} is greater than maximum {max}"));
    }
    Ok(())
}
