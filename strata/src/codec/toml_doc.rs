//! TOML decoding and encoding.
//!
//! TOML has no null, so encoding reports the path of the first `null` it
//! meets instead of silently dropping it. Datetimes decode to strings.

use toml::Value as TomlValue;

use crate::tree::{TreeMap, TreeValue, join};

pub(super) fn parse(text: &str) -> Result<TreeValue, String> {
    let table: toml::Table = toml::from_str(text).map_err(|err| err.to_string())?;
    Ok(from_toml(TomlValue::Table(table)))
}

pub(super) fn serialize(value: &TreeValue) -> Result<String, String> {
    let TomlValue::Table(table) = to_toml(value, "")? else {
        return Err("TOML documents must have a table at the root".to_owned());
    };
    toml::to_string(&table).map_err(|err| err.to_string())
}

fn from_toml(value: TomlValue) -> TreeValue {
    match value {
        TomlValue::String(s) => TreeValue::String(s),
        TomlValue::Integer(i) => TreeValue::from(i),
        TomlValue::Float(f) => serde_json::Number::from_f64(f)
            .map_or_else(|| TreeValue::String(f.to_string()), TreeValue::Number),
        TomlValue::Boolean(b) => TreeValue::Bool(b),
        TomlValue::Datetime(dt) => TreeValue::String(dt.to_string()),
        TomlValue::Array(items) => TreeValue::Array(items.into_iter().map(from_toml).collect()),
        TomlValue::Table(table) => TreeValue::Object(
            table
                .into_iter()
                .map(|(key, item)| (key, from_toml(item)))
                .collect::<TreeMap>(),
        ),
    }
}

fn to_toml(value: &TreeValue, path: &str) -> Result<TomlValue, String> {
    Ok(match value {
        TreeValue::Null => {
            return Err(format!("null at '{path}' cannot be represented in TOML"));
        }
        TreeValue::Bool(b) => TomlValue::Boolean(*b),
        TreeValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                TomlValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                TomlValue::Float(f)
            } else {
                return Err(format!("number {n} at '{path}' is out of TOML range"));
            }
        }
        TreeValue::String(s) => TomlValue::String(s.clone()),
        TreeValue::Array(items) => TomlValue::Array(
            items
                .iter()
                .map(|item| to_toml(item, path))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        TreeValue::Object(map) => {
            let mut table = toml::Table::new();
            for (key, item) in map {
                table.insert(key.clone(), to_toml(item, &join(path, key))?);
            }
            TomlValue::Table(table)
        }
    })
}
