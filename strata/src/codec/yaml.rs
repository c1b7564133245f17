//! YAML decoding via `serde_yaml`.

use serde_yaml::Value as YamlValue;

use crate::tree::{TreeMap, TreeValue};

pub(super) fn parse(text: &str) -> Result<TreeValue, String> {
    let doc: YamlValue = serde_yaml::from_str(text).map_err(|err| err.to_string())?;
    convert(doc)
}

fn convert(value: YamlValue) -> Result<TreeValue, String> {
    Ok(match value {
        YamlValue::Null => TreeValue::Null,
        YamlValue::Bool(b) => TreeValue::Bool(b),
        YamlValue::Number(n) => convert_number(&n),
        YamlValue::String(s) => TreeValue::String(s),
        YamlValue::Sequence(items) => TreeValue::Array(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = TreeMap::new();
            for (key, item) in mapping {
                map.insert(key_to_string(key)?, convert(item)?);
            }
            TreeValue::Object(map)
        }
        YamlValue::Tagged(tagged) => convert(tagged.value)?,
    })
}

fn convert_number(n: &serde_yaml::Number) -> TreeValue {
    if let Some(i) = n.as_i64() {
        return TreeValue::from(i);
    }
    if let Some(u) = n.as_u64() {
        return TreeValue::from(u);
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| TreeValue::String(n.to_string()), TreeValue::Number)
}

fn key_to_string(key: YamlValue) -> Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_owned()),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err("map keys must be scalars".to_owned())
        }
    }
}
