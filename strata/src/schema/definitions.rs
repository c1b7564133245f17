//! Typed definitions for schema-declared variables, generators, transforms,
//! and validation rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::tree::{TreeValue, ValueKind, stringify};
use crate::vars::ResolvedVariables;

/// A schema-declared variable.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    /// Name referenced as `${NAME}`.
    pub name: String,
    /// Literal value.
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: Option<String>,
    /// Operating-system environment variable to read.
    #[serde(default)]
    pub from_env: Option<String>,
    /// Dotted path into the merged configuration.
    #[serde(default)]
    pub from_path: Option<String>,
    /// Fallback when the primary source yields nothing.
    #[serde(default, deserialize_with = "scalar_string")]
    pub default_value: Option<String>,
}

/// Where a [`VariableDefinition`] takes its value from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VariableSource<'a> {
    /// Read an operating-system environment variable.
    Env(&'a str),
    /// Read a dotted path from the merged configuration.
    Path(&'a str),
    /// Use a literal value.
    Literal(&'a str),
}

impl VariableDefinition {
    /// The primary source, preferring `fromEnv`, then `fromPath`, then a
    /// non-empty literal.
    #[must_use]
    pub fn source(&self) -> Option<VariableSource<'_>> {
        if let Some(name) = self.from_env.as_deref() {
            return Some(VariableSource::Env(name));
        }
        if let Some(path) = self.from_path.as_deref() {
            return Some(VariableSource::Path(path));
        }
        self.value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(VariableSource::Literal)
    }

    /// The default value, ignoring empty strings.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|v| !v.is_empty())
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<TreeValue>::deserialize(deserializer)? {
        None | Some(TreeValue::Null) => Ok(None),
        Some(value @ (TreeValue::String(_) | TreeValue::Number(_) | TreeValue::Bool(_))) => {
            Ok(Some(stringify(&value)))
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar, found {}",
            ValueKind::of(&other)
        ))),
    }
}

/// Built-in generator types.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum GeneratorKind {
    /// Join source values through a `{placeholder}` template.
    Concat,
    /// Current time in a chosen format.
    Timestamp,
    /// Random UUIDs, numbers, strings, or bytes.
    Random,
    /// Identifier patterns, including per-target sequences.
    Id,
}

impl GeneratorKind {
    /// Name used in schema documents and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::Timestamp => "timestamp",
            Self::Random => "random",
            Self::Id => "id",
        }
    }
}

/// One entry of the schema's `generators` list.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorDefinition {
    /// Generator type.
    #[serde(rename = "type")]
    pub kind: GeneratorKind,
    /// Path that receives the generated value.
    #[serde(default)]
    pub target_path: String,
    /// Type-specific format string.
    #[serde(default)]
    pub format: Option<String>,
    /// Placeholder name to source path, used by `concat`.
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

impl GeneratorDefinition {
    /// Check structural requirements that do not depend on configuration
    /// data.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.target_path.is_empty() {
            return Err("targetPath must not be empty".to_owned());
        }
        match self.kind {
            GeneratorKind::Concat => {
                if self.format.as_deref().is_none_or(str::is_empty) {
                    return Err("concat requires a format".to_owned());
                }
            }
            GeneratorKind::Timestamp | GeneratorKind::Random | GeneratorKind::Id => {
                if !self.sources.is_empty() {
                    return Err(format!("{} does not take sources", self.kind.as_str()));
                }
                if self.kind == GeneratorKind::Random
                    && self.format.as_deref().is_none_or(str::is_empty)
                {
                    return Err("random requires a format".to_owned());
                }
            }
        }
        Ok(())
    }
}

/// One entry of the schema's `transform` list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TransformDefinition {
    /// Move the value at `from` to `to`.
    RenameKey {
        /// Source path.
        from: String,
        /// Destination path.
        to: String,
    },
    /// Convert the string at `path` to another case style.
    ChangeCase {
        /// Path of the string.
        path: String,
        /// One of `upper`, `lower`, `snake`, `camel`, `kebab`, `pascal`.
        case: String,
    },
    /// Prefix every first-level key of the map at `path`.
    AddKeyPrefix {
        /// Path of the map.
        path: String,
        /// Text prepended to each key.
        prefix: String,
    },
    /// Suffix every first-level key of the map at `path`.
    AddKeySuffix {
        /// Path of the map.
        path: String,
        /// Text appended to each key.
        suffix: String,
    },
    /// Remove the node at `path`.
    DeleteKey {
        /// Path to remove.
        path: String,
    },
    /// Copy the value at `target` onto `path`, then remove `target`.
    ReplaceKey {
        /// Path that receives the value.
        path: String,
        /// Path whose value is moved.
        target: String,
    },
    /// Write `value` at `path`.
    SetValue {
        /// Destination path.
        path: String,
        /// Literal value; strings undergo substitution.
        value: TreeValue,
    },
    /// Trim whitespace, or the characters of `pattern`, from both ends of the
    /// string at `path`.
    Trim {
        /// Path of the string.
        path: String,
        /// Characters to trim instead of whitespace.
        #[serde(default)]
        pattern: Option<String>,
    },
}

impl TransformDefinition {
    /// Name used in schema documents and diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RenameKey { .. } => "renameKey",
            Self::ChangeCase { .. } => "changeCase",
            Self::AddKeyPrefix { .. } => "addKeyPrefix",
            Self::AddKeySuffix { .. } => "addKeySuffix",
            Self::DeleteKey { .. } => "deleteKey",
            Self::ReplaceKey { .. } => "replaceKey",
            Self::SetValue { .. } => "setValue",
            Self::Trim { .. } => "trim",
        }
    }

    /// The path the transform primarily operates on.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::RenameKey { from, .. } => from,
            Self::ChangeCase { path, .. }
            | Self::AddKeyPrefix { path, .. }
            | Self::AddKeySuffix { path, .. }
            | Self::DeleteKey { path }
            | Self::ReplaceKey { path, .. }
            | Self::SetValue { path, .. }
            | Self::Trim { path, .. } => path,
        }
    }

    /// Check structural requirements.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        if self.path().is_empty() {
            return Err(format!("{} requires a path", self.kind()));
        }
        match self {
            Self::RenameKey { to, .. } if to.is_empty() => {
                Err("renameKey requires 'to'".to_owned())
            }
            Self::ReplaceKey { path, target } if target.is_empty() || path == target => {
                Err("replaceKey requires a target distinct from path".to_owned())
            }
            _ => Ok(()),
        }
    }

    /// Copy of this definition with every string field substituted.
    #[must_use]
    pub fn expand(&self, vars: &ResolvedVariables) -> Self {
        let sub = |s: &str| vars.substitute(s);
        match self {
            Self::RenameKey { from, to } => Self::RenameKey {
                from: sub(from),
                to: sub(to),
            },
            Self::ChangeCase { path, case } => Self::ChangeCase {
                path: sub(path),
                case: sub(case),
            },
            Self::AddKeyPrefix { path, prefix } => Self::AddKeyPrefix {
                path: sub(path),
                prefix: sub(prefix),
            },
            Self::AddKeySuffix { path, suffix } => Self::AddKeySuffix {
                path: sub(path),
                suffix: sub(suffix),
            },
            Self::DeleteKey { path } => Self::DeleteKey { path: sub(path) },
            Self::ReplaceKey { path, target } => Self::ReplaceKey {
                path: sub(path),
                target: sub(target),
            },
            Self::SetValue { path, value } => Self::SetValue {
                path: sub(path),
                value: match value {
                    TreeValue::String(s) => TreeValue::String(sub(s)),
                    other => other.clone(),
                },
            },
            Self::Trim { path, pattern } => Self::Trim {
                path: sub(path),
                pattern: pattern.as_deref().map(sub),
            },
        }
    }
}

/// Kinds accepted by the `type` validation rule.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(try_from = "String")]
pub enum ExpectedKind {
    /// A string.
    String,
    /// Any number.
    Number,
    /// An integer, or a float with no fractional part.
    Integer,
    /// Any number; integers widen to floats.
    Float,
    /// A boolean.
    Boolean,
    /// A map.
    Map,
    /// A sequence.
    Sequence,
    /// `null`.
    Null,
}

impl ExpectedKind {
    /// Whether `value` satisfies this kind.
    #[must_use]
    pub fn accepts(self, value: &TreeValue) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number | Self::Float => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            Self::Boolean => value.is_boolean(),
            Self::Map => value.is_object(),
            Self::Sequence => value.is_array(),
            Self::Null => value.is_null(),
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Map => "map",
            Self::Sequence => "sequence",
            Self::Null => "null",
        }
    }
}

impl TryFrom<String> for ExpectedKind {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" | "int" => Self::Integer,
            "float" | "float64" | "double" => Self::Float,
            "boolean" | "bool" => Self::Boolean,
            "map" | "object" => Self::Map,
            "slice" | "array" | "sequence" | "list" => Self::Sequence,
            "null" => Self::Null,
            _ => return Err(format!("unsupported type '{name}'")),
        })
    }
}

/// Rules applied to the value at one path.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    /// Fail when the path is absent.
    #[serde(default)]
    pub required: bool,
    /// Expected kind.
    #[serde(default, rename = "type")]
    pub kind: Option<ExpectedKind>,
    /// Inclusive lower bound for numbers.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers.
    #[serde(default)]
    pub max: Option<f64>,
    /// Minimum string length in characters.
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Allowed string values.
    #[serde(default, rename = "enum")]
    pub allowed: Vec<String>,
    /// Regular expression the string must match.
    #[serde(default)]
    pub regex: Option<String>,
}

/// One entry of the schema's `validate` list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ValidationGroup {
    /// Dotted path to validate.
    pub path: String,
    /// Rules applied to the value at `path`.
    #[serde(default)]
    pub rules: Rules,
}
