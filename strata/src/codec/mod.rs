//! Decoding and encoding of configuration documents.
//!
//! Every supported format decodes into a [`TreeValue`] map and encodes from
//! one. Parsed documents must have a map at their root; an empty document
//! decodes to an empty map.

mod dotenv;
mod format;
mod ini;
mod toml_doc;
mod yaml;

pub use format::Format;

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::StrataResult;
use crate::error::StrataError;
use crate::tree::{TreeMap, TreeValue};

/// Decode `bytes` as `format`.
///
/// `source_id` names the document in error messages, typically a file path or
/// `stdin`.
///
/// # Errors
///
/// Returns [`StrataError::Parse`] when the bytes are not valid UTF-8, are
/// malformed for `format`, or do not decode to a map.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::codec::{self, Format};
///
/// let tree = codec::parse(b"db.port=5432\n", Format::Env, "inline")?;
/// assert_eq!(tree, json!({"db": {"port": "5432"}}));
/// # Ok::<_, std::sync::Arc<strata::StrataError>>(())
/// ```
pub fn parse(bytes: &[u8], format: Format, source_id: &str) -> StrataResult<TreeValue> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| StrataError::parse(source_id, format, err.to_string()))?;
    let decoded = match format {
        Format::Json => {
            serde_json::from_str::<TreeValue>(text).map_err(|err| err.to_string())
        }
        Format::Yaml => yaml::parse(text),
        Format::Toml => toml_doc::parse(text),
        Format::Ini => Ok(ini::parse(text)),
        Format::Env => Ok(dotenv::parse(text)),
    }
    .map_err(|message| StrataError::parse(source_id, format, message))?;
    match decoded {
        TreeValue::Null => Ok(TreeValue::Object(TreeMap::new())),
        TreeValue::Object(_) => Ok(decoded),
        other => Err(StrataError::parse(
            source_id,
            format,
            format!(
                "document root must be a map, found {}",
                crate::tree::ValueKind::of(&other)
            ),
        )),
    }
}

/// Encode `value` as `format`.
///
/// # Errors
///
/// Returns [`StrataError::Serialize`] when `value` cannot be represented in
/// `format`, such as a `null` leaf in TOML.
pub fn serialize(value: &TreeValue, format: Format) -> StrataResult<Vec<u8>> {
    let encoded = match format {
        Format::Json => serde_json::to_string_pretty(value)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|err| err.to_string()),
        Format::Yaml => serde_yaml::to_string(value).map_err(|err| err.to_string()),
        Format::Toml => toml_doc::serialize(value),
        Format::Ini => ini::serialize(value),
        Format::Env => dotenv::serialize(value),
    };
    encoded
        .map(String::into_bytes)
        .map_err(|message| StrataError::serialize(format, message))
}

/// Read and decode the file at `path`, choosing the format from its extension.
///
/// # Errors
///
/// Returns [`StrataError::UnsupportedFormat`] for unknown extensions,
/// [`StrataError::Read`] when the file cannot be read, and
/// [`StrataError::Parse`] when decoding fails.
pub fn load_file(path: &Utf8Path) -> StrataResult<TreeValue> {
    let format = Format::from_path(path)
        .ok_or_else(|| {
        StrataError::unsupported_format(path.extension().unwrap_or(""), format!("file '{path}'"))
    })?;
    let bytes = read_bytes(path).map_err(|err| StrataError::read(path, err))?;
    parse(&bytes, format, path.as_str())
}

/// Read `path` through a capability handle on its parent directory.
fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("cannot determine file name"))?;
    Dir::open_ambient_dir(parent, ambient_authority())?.read(name)
}

#[cfg(test)]
mod tests;
