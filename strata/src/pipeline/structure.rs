//! Input-schema checking and output-schema projection against reference
//! trees.

use crate::StrataResult;
use crate::error::{SchemaStage, StrataError};
use crate::schema::ReferenceTree;
use crate::tree::{TreeMap, TreeValue, ValueKind, join, kinds_compatible};

/// Check that `config` has every key of the input reference, with compatible
/// kinds.
///
/// A `null` reference value accepts any data. In strict mode keys absent from
/// the reference are rejected as well.
pub(super) fn check_input(config: &TreeValue, reference: &ReferenceTree) -> StrataResult<()> {
    let (Some(data), Some(shape)) = (config.as_object(), reference.tree.as_object()) else {
        return Err(StrataError::schema_mismatch(
            SchemaStage::Input,
            "",
            "input schema and configuration roots must both be maps",
        ));
    };
    compare(data, shape, "", reference.strict)
}

fn compare(data: &TreeMap, shape: &TreeMap, parent: &str, strict: bool) -> StrataResult<()> {
    for (key, expected) in shape {
        let path = join(parent, key);
        let Some(actual) = data.get(key) else {
            return Err(StrataError::schema_mismatch(
                SchemaStage::Input,
                path,
                "missing required key",
            ));
        };
        match (expected, actual) {
            (TreeValue::Null, _) => {}
            (TreeValue::Object(nested_shape), TreeValue::Object(nested)) => {
                compare(nested, nested_shape, &path, strict)?;
            }
            _ if kinds_compatible(expected, actual) => {}
            _ => {
                return Err(StrataError::schema_mismatch(
                    SchemaStage::Input,
                    path,
                    format!(
                        "type mismatch, expected {}, got {}",
                        ValueKind::of(expected),
                        ValueKind::of(actual)
                    ),
                ));
            }
        }
    }
    if strict && let Some(extra) = data.keys().find(|key| !shape.contains_key(*key)) {
        return Err(StrataError::schema_mismatch(
            SchemaStage::Input,
            join(parent, extra),
            "unexpected key found in strict mode",
        ));
    }
    Ok(())
}

/// Rebuild `config` keeping only the keys of the output reference.
///
/// Non-strict projection silently drops data keys the reference lacks and
/// reference keys the data lacks. Strict projection reports either as an
/// error, as well as a reference map facing non-map data.
pub(super) fn project(config: &TreeValue, reference: &ReferenceTree) -> StrataResult<TreeValue> {
    let (Some(data), Some(shape)) = (config.as_object(), reference.tree.as_object()) else {
        return Err(StrataError::schema_mismatch(
            SchemaStage::Output,
            "",
            "output schema and processed configuration roots must both be maps",
        ));
    };
    project_map(data, shape, "", reference.strict).map(TreeValue::Object)
}

fn project_map(
    data: &TreeMap,
    shape: &TreeMap,
    parent: &str,
    strict: bool,
) -> StrataResult<TreeMap> {
    let mut projected = TreeMap::new();
    for (key, expected) in shape {
        let path = join(parent, key);
        match (expected, data.get(key)) {
            (TreeValue::Object(nested_shape), Some(TreeValue::Object(nested))) => {
                let inner = project_map(nested, nested_shape, &path, strict)?;
                projected.insert(key.clone(), TreeValue::Object(inner));
            }
            (TreeValue::Object(_), Some(actual)) => {
                if strict {
                    return Err(StrataError::schema_mismatch(
                        SchemaStage::Output,
                        path,
                        format!("output schema expects a map, found {}", ValueKind::of(actual)),
                    ));
                }
            }
            (_, Some(actual)) => {
                projected.insert(key.clone(), actual.clone());
            }
            (_, None) => {
                if strict {
                    return Err(StrataError::schema_mismatch(
                        SchemaStage::Output,
                        path,
                        "defined in output schema but missing from processed configuration",
                    ));
                }
            }
        }
    }
    if strict && let Some(extra) = data.keys().find(|key| !shape.contains_key(*key)) {
        return Err(StrataError::schema_mismatch(
            SchemaStage::Output,
            join(parent, extra),
            "found in processed configuration but not defined in output schema",
        ));
    }
    Ok(projected)
}
