//! The ordered processing pipeline.
//!
//! A [`Processor`] applies one [`LoadedSchema`] to a merged configuration in a
//! fixed order: input-schema check, variable resolution, generators,
//! transforms, substitution, validation, and output projection. The first
//! failure aborts the run and nothing is returned for that invocation.

mod generate;
mod structure;
mod transform;
mod validate;

pub use generate::SEQUENCE_COUNTER_ROOT;

use tracing::debug;

use crate::StrataResult;
use crate::diagnostics::Diagnostics;
use crate::error::SchemaStage;
use crate::schema::LoadedSchema;
use crate::tree::TreeValue;
use crate::vars::VariableContext;

/// Runs a schema over configuration trees.
#[derive(Clone, Debug)]
pub struct Processor<'s> {
    schema: &'s LoadedSchema,
    diagnostics: Diagnostics,
}

impl<'s> Processor<'s> {
    /// Create a processor for `schema`, logging through `diagnostics`.
    #[must_use]
    pub const fn new(schema: &'s LoadedSchema, diagnostics: Diagnostics) -> Self {
        Self {
            schema,
            diagnostics,
        }
    }

    /// The schema this processor applies.
    #[must_use]
    pub const fn schema(&self) -> &'s LoadedSchema {
        self.schema
    }

    /// The diagnostics handle used for this processor's runs.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Process `config` and return the resulting tree.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage: a schema mismatch,
    /// an unresolvable variable, a generator or transform failure, or a
    /// validation failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::diagnostics::Diagnostics;
    /// use strata::pipeline::Processor;
    /// use strata::schema::{LoadedSchema, Schema};
    /// use strata::vars::{ProcessEnv, VariableContext};
    ///
    /// let schema = Schema::from_tree(
    ///     json!({
    ///         "vars": [{"name": "ENV", "defaultValue": "dev"}],
    ///         "transform": [{"type": "setValue", "path": "stage", "value": "${ENV}"}]
    ///     }),
    ///     "inline",
    /// )?;
    /// let loaded = LoadedSchema::from_parts(schema, None, None);
    /// let processor = Processor::new(&loaded, Diagnostics::silent());
    /// let out = processor.run(json!({}), &VariableContext::new(&ProcessEnv))?;
    /// assert_eq!(out, json!({"stage": "dev"}));
    /// # Ok::<_, std::sync::Arc<strata::StrataError>>(())
    /// ```
    pub fn run(&self, config: TreeValue, context: &VariableContext<'_>) -> StrataResult<TreeValue> {
        self.diagnostics.in_scope(|| self.run_stages(config, context))
    }

    fn run_stages(
        &self,
        mut config: TreeValue,
        context: &VariableContext<'_>,
    ) -> StrataResult<TreeValue> {
        let schema = self.schema.schema();
        if let Some(reference) = self.schema.input() {
            structure::check_input(&config, reference)?;
            debug!("input schema check passed");
        }

        let vars = context.resolve(&schema.vars, &config)?;
        debug!(count = vars.len(), "resolved variables");

        for definition in &schema.generators {
            generate::apply(definition, &mut config, &vars)?;
        }
        for definition in &schema.transforms {
            transform::apply(&definition.expand(&vars), &mut config)?;
        }
        vars.substitute_tree(&mut config);

        for group in &schema.validations {
            validate::check(group, &config)?;
        }

        match self.schema.output() {
            Some(reference) => {
                let projected = structure::project(&config, reference)?;
                debug!(stage = %SchemaStage::Output, "projected configuration");
                Ok(projected)
            }
            None => Ok(config),
        }
    }
}

#[cfg(test)]
mod tests;
