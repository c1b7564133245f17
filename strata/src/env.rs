//! Reserved-prefix environment ingestion.
//!
//! `STRATA_KEY_<dotted.path>=value` overrides a configuration value and is
//! merged as the highest-priority layer. `STRATA_VAR_<NAME>=value` supplies a
//! variable in the environment tier. Both are read through
//! [`figment::providers::Env`] with key case preserved.

use std::collections::BTreeMap;

use figment::providers::Env;

use crate::tree::{self, TreeMap, TreeValue};

/// Prefix for configuration overrides.
pub const KEY_PREFIX: &str = "STRATA_KEY_";

/// Prefix for environment-tier variables.
pub const VAR_PREFIX: &str = "STRATA_VAR_";

/// Overrides collected from reserved environment variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvOverrides {
    config: TreeValue,
    vars: BTreeMap<String, String>,
}

impl EnvOverrides {
    /// Collect overrides from the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        let key_env = Env::prefixed(KEY_PREFIX).lowercase(false);
        let var_env = Env::prefixed(VAR_PREFIX).lowercase(false);
        let keys = key_env
            .iter()
            .map(|(key, value)| (key.as_str().to_owned(), value));
        let vars = var_env
            .iter()
            .map(|(key, value)| (key.as_str().to_owned(), value));
        Self::build(keys, vars)
    }

    /// Collect overrides from full `NAME=value` pairs.
    ///
    /// Names without a reserved prefix are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::env::EnvOverrides;
    ///
    /// let env = EnvOverrides::from_pairs([
    ///     ("STRATA_KEY_db.port", "5432"),
    ///     ("STRATA_VAR_REGION", "eu"),
    ///     ("HOME", "/root"),
    /// ]);
    /// assert_eq!(env.config(), &json!({"db": {"port": 5432}}));
    /// assert_eq!(env.vars().get("REGION").map(String::as_str), Some("eu"));
    /// ```
    #[must_use]
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut keys = Vec::new();
        let mut vars = Vec::new();
        for (name, value) in pairs {
            if let Some(path) = name.strip_prefix(KEY_PREFIX) {
                keys.push((path.to_owned(), value.to_owned()));
            } else if let Some(var) = name.strip_prefix(VAR_PREFIX) {
                vars.push((var.to_owned(), value.to_owned()));
            }
        }
        Self::build(keys, vars)
    }

    /// Configuration layer built from `STRATA_KEY_` variables.
    #[must_use]
    pub const fn config(&self) -> &TreeValue {
        &self.config
    }

    /// Whether any configuration override was found.
    #[must_use]
    pub fn has_config(&self) -> bool {
        self.config.as_object().is_some_and(|map| !map.is_empty())
    }

    /// Environment-tier variables from `STRATA_VAR_` variables.
    #[must_use]
    pub const fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Split into the configuration layer and the variable tier.
    #[must_use]
    pub fn into_parts(self) -> (TreeValue, BTreeMap<String, String>) {
        (self.config, self.vars)
    }

    fn build(
        keys: impl IntoIterator<Item = (String, String)>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut config = TreeValue::Object(TreeMap::new());
        for (path, raw) in keys {
            if !path.is_empty() {
                tree::set(&mut config, &path, infer(&raw));
            }
        }
        Self {
            config,
            vars: vars.into_iter().filter(|(name, _)| !name.is_empty()).collect(),
        }
    }
}

/// Interpret an override value as a bool, an integer, a finite float, or a
/// string, in that order.
#[must_use]
pub fn infer(raw: &str) -> TreeValue {
    if raw.eq_ignore_ascii_case("true") {
        return TreeValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return TreeValue::Bool(false);
    }
    if let Ok(int) = raw.parse::<i64>() {
        return TreeValue::from(int);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| TreeValue::String(raw.to_owned()), TreeValue::Number)
}
