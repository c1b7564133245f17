//! Generators: values computed at processing time and written to a target
//! path.

mod id;
mod random;
mod timestamp;

use std::sync::Arc;

use rand::Rng;

use crate::StrataResult;
use crate::error::StrataError;
use crate::schema::{GeneratorDefinition, GeneratorKind};
use crate::tree::{self, TreeValue, stringify};
use crate::vars::ResolvedVariables;

pub use id::SEQUENCE_COUNTER_ROOT;

/// Run one generator and write its value at the definition's target path.
pub(super) fn apply(
    definition: &GeneratorDefinition,
    config: &mut TreeValue,
    vars: &ResolvedVariables,
) -> StrataResult<()> {
    apply_with(definition, config, vars, &mut rand::thread_rng())
}

pub(super) fn apply_with<R: Rng>(
    definition: &GeneratorDefinition,
    config: &mut TreeValue,
    vars: &ResolvedVariables,
    rng: &mut R,
) -> StrataResult<()> {
    let format = definition.format.as_deref().unwrap_or_default();
    let target = definition.target_path.as_str();
    let generated = match definition.kind {
        GeneratorKind::Concat => concat(format, definition, config),
        GeneratorKind::Timestamp => timestamp::generate(format),
        GeneratorKind::Random => random::generate(format, rng),
        GeneratorKind::Id => id::generate(format, target, config, rng),
    }
    .map_err(|message| {
        Arc::new(StrataError::Generator {
            kind: definition.kind.as_str(),
            target: target.to_owned(),
            message,
        })
    })?;
    let value = match generated {
        TreeValue::String(s) => TreeValue::String(vars.substitute(&s)),
        other => other,
    };
    tree::set(config, target, value);
    Ok(())
}

fn concat(
    format: &str,
    definition: &GeneratorDefinition,
    config: &TreeValue,
) -> Result<TreeValue, String> {
    let mut out = format.to_owned();
    for (placeholder, path) in &definition.sources {
        let value = tree::get(config, path).ok_or_else(|| {
            format!("source path '{path}' for placeholder '{placeholder}' not found")
        })?;
        out = out.replace(&format!("{{{placeholder}}}"), &stringify(value));
    }
    Ok(TreeValue::String(out))
}

/// Draw `len` characters from `charset`.
fn draw<R: Rng>(rng: &mut R, charset: &[u8], len: usize) -> String {
    (0..len)
        .filter_map(|_| charset.get(rng.gen_range(0..charset.len())))
        .map(|b| char::from(*b))
        .collect()
}

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

fn parse_len(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid length '{raw}'"))
}
