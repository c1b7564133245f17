//! Identifier generator.

use rand::Rng;

use super::{ALPHA, ALPHANUMERIC, DIGITS, draw, parse_len};
use crate::tree::{self, TreeValue};

/// Root path under which `sequential` ids keep their counters.
pub const SEQUENCE_COUNTER_ROOT: &str = "_internal.sequentialCounters";

/// Produce an identifier described by `format` (default `simple:8`).
///
/// `sequential` stores its counter in `config`, keyed by `target`.
pub(super) fn generate<R: Rng>(
    format: &str,
    target: &str,
    config: &mut TreeValue,
    rng: &mut R,
) -> Result<TreeValue, String> {
    let pattern = if format.is_empty() { "simple:8" } else { format };
    let (kind, args) = pattern.split_once(':').unwrap_or((pattern, ""));
    let id = match kind {
        "simple" => draw(rng, ALPHANUMERIC, positive_len(args)?),
        "numeric" => draw(rng, DIGITS, positive_len(args)?),
        "alpha" => draw(rng, ALPHA, positive_len(args)?),
        "prefix" => {
            let (prefix, len) = args
                .rsplit_once(':')
                .ok_or_else(|| format!("'{pattern}' must have the form prefix:text:length"))?;
            format!("{prefix}{}", draw(rng, ALPHANUMERIC, positive_len(len)?))
        }
        "sequential" => return Ok(TreeValue::from(next_sequence(target, config))),
        "timestamp" => format!(
            "{}_{}",
            chrono::Utc::now().timestamp(),
            draw(rng, ALPHANUMERIC, 4)
        ),
        _ => return Err(format!("unsupported id format '{pattern}'")),
    };
    Ok(TreeValue::String(id))
}

fn positive_len(raw: &str) -> Result<usize, String> {
    match parse_len(raw)? {
        0 => Err("id length must be positive".to_owned()),
        len => Ok(len),
    }
}

fn next_sequence(target: &str, config: &mut TreeValue) -> i64 {
    let counter_path = format!("{SEQUENCE_COUNTER_ROOT}.{}", target.replace('.', "_"));
    let next = tree::get(config, &counter_path)
        .and_then(TreeValue::as_i64)
        .unwrap_or(0)
        .saturating_add(1);
    tree::set(config, &counter_path, TreeValue::from(next));
    next
}
