//! Tiered variable resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::ResolvedVariables;
use crate::StrataResult;
use crate::error::StrataError;
use crate::schema::{VariableDefinition, VariableSource};
use crate::tree::{self, TreeValue, stringify};

/// Read access to operating-system environment variables.
///
/// Schema variables declared with `fromEnv` are looked up through this trait
/// so tests can supply a fixed environment.
pub trait EnvLookup {
    /// Return the value of `name`, if set.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// [`EnvLookup`] backed by the current process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Build the resolved variable table.
///
/// Tiers are applied highest precedence first: `env_vars`, then `file_vars`,
/// then each schema definition in declaration order. A name that is already
/// resolved is skipped in every later tier. A schema definition takes its
/// value from its primary source (`fromEnv`, `fromPath`, or a literal), then
/// from `defaultValue`.
///
/// # Errors
///
/// Returns [`StrataError::VariableResolution`] for the first schema variable
/// that has neither a value nor a default.
pub fn resolve(
    env_vars: &BTreeMap<String, String>,
    file_vars: &BTreeMap<String, String>,
    definitions: &[VariableDefinition],
    config: &TreeValue,
    env: &dyn EnvLookup,
) -> StrataResult<ResolvedVariables> {
    let mut resolved: ResolvedVariables = env_vars
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (name, value) in file_vars {
        if !resolved.insert_if_absent(name, value.clone()) {
            debug!(name = %name, tier = "vars-file", "variable already resolved, skipping");
        }
    }
    for definition in definitions {
        if resolved.get(&definition.name).is_some() {
            debug!(name = %definition.name, tier = "schema", "variable already resolved, skipping");
            continue;
        }
        let value = resolve_definition(definition, config, env).ok_or_else(|| {
            Arc::new(StrataError::VariableResolution {
                name: definition.name.clone(),
            })
        })?;
        resolved.insert_if_absent(&definition.name, value);
    }
    Ok(resolved)
}

fn resolve_definition(
    definition: &VariableDefinition,
    config: &TreeValue,
    env: &dyn EnvLookup,
) -> Option<String> {
    let primary = match definition.source() {
        Some(VariableSource::Env(name)) => env.lookup(name),
        Some(VariableSource::Path(path)) => tree::get(config, path)
            .filter(|value| !value.is_null())
            .map(stringify),
        Some(VariableSource::Literal(value)) => Some(value.to_owned()),
        None => None,
    };
    primary.or_else(|| definition.default_value().map(str::to_owned))
}

/// Variable sources for one pipeline invocation.
///
/// Holds the environment tier, the file tier, and the lookup used for
/// `fromEnv` definitions. Batch runs clone the context and extend the file
/// tier for each iteration.
#[derive(Clone)]
pub struct VariableContext<'a> {
    env_vars: BTreeMap<String, String>,
    file_vars: BTreeMap<String, String>,
    env: &'a dyn EnvLookup,
}

impl<'a> VariableContext<'a> {
    /// Create a context with empty tiers.
    #[must_use]
    pub fn new(env: &'a dyn EnvLookup) -> Self {
        Self {
            env_vars: BTreeMap::new(),
            file_vars: BTreeMap::new(),
            env,
        }
    }

    /// Replace the environment tier.
    #[must_use]
    pub fn with_env_vars(mut self, env_vars: BTreeMap<String, String>) -> Self {
        self.env_vars = env_vars;
        self
    }

    /// Replace the file tier with stringified `vars`.
    #[must_use]
    pub fn with_file_vars<'v, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'v String, &'v TreeValue)>,
    {
        self.file_vars = vars
            .into_iter()
            .map(|(k, v)| (k.clone(), stringify(v)))
            .collect();
        self
    }

    /// Set one file-tier variable, replacing any previous value.
    pub fn set_file_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.file_vars.insert(name.into(), value.into());
    }

    /// Look up a file-tier variable.
    #[must_use]
    pub fn file_var(&self, name: &str) -> Option<&str> {
        self.file_vars.get(name).map(String::as_str)
    }

    /// Look up an environment-tier variable.
    #[must_use]
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env_vars.get(name).map(String::as_str)
    }

    /// Resolve `definitions` against `config` using this context's tiers.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn resolve(
        &self,
        definitions: &[VariableDefinition],
        config: &TreeValue,
    ) -> StrataResult<ResolvedVariables> {
        resolve(&self.env_vars, &self.file_vars, definitions, config, self.env)
    }
}
