//! Variable resolution and `${NAME}` substitution.
//!
//! Variables come from three tiers, highest precedence first: prefixed
//! environment variables, the vars file (plus any batch iteration overlay),
//! and schema declarations. A name resolved by a higher tier shadows the
//! same name in every lower tier.

mod expand;
mod resolver;

pub use expand::{expand, is_variable_name};
pub use resolver::{EnvLookup, ProcessEnv, VariableContext, resolve};

use std::collections::BTreeMap;

use crate::tree::TreeValue;

/// Flat name to value table consumed by every pipeline stage.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvedVariables(BTreeMap<String, String>);

impl ResolvedVariables {
    /// Look up a resolved value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Number of resolved variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `${NAME}` in `input` with its resolved value.
    ///
    /// Unknown names are left in place so that later validation can report
    /// them.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::vars::ResolvedVariables;
    ///
    /// let vars: ResolvedVariables = [("HOST".to_owned(), "db".to_owned())].into_iter().collect();
    /// assert_eq!(vars.substitute("${HOST}:${PORT}"), "db:${PORT}");
    /// ```
    #[must_use]
    pub fn substitute(&self, input: &str) -> String {
        expand(input, |name| self.get(name).map(str::to_owned))
    }

    /// Substitute every string leaf beneath `value`.
    ///
    /// Map keys are left untouched.
    pub fn substitute_tree(&self, value: &mut TreeValue) {
        match value {
            TreeValue::String(s) => {
                let replaced = self.substitute(s);
                *s = replaced;
            }
            TreeValue::Array(items) => items.iter_mut().for_each(|item| self.substitute_tree(item)),
            TreeValue::Object(map) => map.values_mut().for_each(|item| self.substitute_tree(item)),
            TreeValue::Null | TreeValue::Bool(_) | TreeValue::Number(_) => {}
        }
    }

    pub(crate) fn insert_if_absent(&mut self, name: &str, value: String) -> bool {
        if self.0.contains_key(name) {
            return false;
        }
        self.0.insert(name.to_owned(), value);
        true
    }
}

impl FromIterator<(String, String)> for ResolvedVariables {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
