//! Random value generator.

use rand::Rng;

use super::{ALPHANUMERIC, draw, parse_len};
use crate::tree::TreeValue;

/// Produce a random value described by `format`.
///
/// Supported formats: `uuid`, `int:min:max`, `float:min:max`, `string:len`
/// and `bytes:len`. Bounds are inclusive.
pub(super) fn generate<R: Rng>(format: &str, rng: &mut R) -> Result<TreeValue, String> {
    let (kind, args) = format.split_once(':').unwrap_or((format, ""));
    match kind {
        "uuid" => Ok(TreeValue::String(uuid::Uuid::new_v4().to_string())),
        "int" => {
            let (min, max) = bounds::<i64>(args, format)?;
            Ok(TreeValue::from(rng.gen_range(min..=max)))
        }
        "float" => {
            let (min, max) = bounds::<f64>(args, format)?;
            if !finite_span(min, max) {
                return Err(format!("bounds in '{format}' must be finite with a finite width"));
            }
            serde_json::Number::from_f64(round6(rng.gen_range(min..=max)))
                .map(TreeValue::Number)
                .ok_or_else(|| format!("'{format}' produced a non-finite number"))
        }
        "string" => Ok(TreeValue::String(draw(rng, ALPHANUMERIC, parse_len(args)?))),
        "bytes" => {
            let mut bytes = vec![0_u8; parse_len(args)?];
            rng.fill(bytes.as_mut_slice());
            Ok(TreeValue::String(hex::encode(bytes)))
        }
        _ => Err(format!("unsupported random format '{format}'")),
    }
}

#[expect(clippy::float_arithmetic, reason = "rounding to six decimal places")]
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[expect(clippy::float_arithmetic, reason = "sampling needs a finite range width")]
fn finite_span(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && (max - min).is_finite()
}

fn bounds<T>(args: &str, format: &str) -> Result<(T, T), String>
where
    T: std::str::FromStr + PartialOrd + Copy,
{
    let parse = |raw: &str| {
        raw.trim()
            .parse::<T>()
            .map_err(|_| format!("invalid bound '{raw}' in '{format}'"))
    };
    let (raw_min, raw_max) = args
        .split_once(':')
        .ok_or_else(|| format!("'{format}' must have the form kind:min:max"))?;
    let (min, max) = (parse(raw_min)?, parse(raw_max)?);
    if min > max {
        return Err(format!("minimum exceeds maximum in '{format}'"));
    }
    Ok((min, max))
}
