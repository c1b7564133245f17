//! Schema documents driving the processing pipeline.
//!
//! A schema is read from JSON, YAML, or TOML and describes immutable paths,
//! variables, generators, transforms, validation rules, and optional input and
//! output reference trees. Structural problems are reported when the schema is
//! loaded, before any configuration is touched.

mod definitions;

pub use definitions::{
    ExpectedKind, GeneratorDefinition, GeneratorKind, Rules, TransformDefinition,
    ValidationGroup, VariableDefinition, VariableSource,
};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::StrataResult;
use crate::codec::{self, Format};
use crate::error::StrataError;
use crate::merge::ImmutablePaths;
use crate::tree::TreeValue;

/// Reference to an input or output schema document.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SchemaRef {
    /// Path of the reference document.
    pub path: Utf8PathBuf,
    /// Whether keys absent from the reference are errors.
    #[serde(default)]
    pub strict: bool,
}

/// The declarative program for one pipeline invocation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Informational schema version.
    #[serde(default)]
    pub api_version: Option<String>,
    /// Reference tree the merged configuration must match.
    #[serde(default)]
    pub input_schema: Option<SchemaRef>,
    /// Reference tree the processed configuration is projected onto.
    #[serde(default)]
    pub output_schema: Option<SchemaRef>,
    /// Paths protected from being overwritten during merging.
    #[serde(default)]
    pub immutable: Vec<String>,
    /// Declared variables.
    #[serde(default)]
    pub vars: Vec<VariableDefinition>,
    /// Generators, applied in order.
    #[serde(default)]
    pub generators: Vec<GeneratorDefinition>,
    /// Transforms, applied in order.
    #[serde(default, rename = "transform")]
    pub transforms: Vec<TransformDefinition>,
    /// Validation groups, applied in order.
    #[serde(default, rename = "validate")]
    pub validations: Vec<ValidationGroup>,
}

impl Schema {
    /// Interpret a decoded document as a schema.
    ///
    /// `source` names the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::SchemaLoad`] when the document does not have the
    /// schema's shape or a definition is structurally invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::schema::Schema;
    ///
    /// let schema = Schema::from_tree(
    ///     json!({"vars": [{"name": "ENV", "defaultValue": "dev"}], "immutable": ["name"]}),
    ///     "inline",
    /// )?;
    /// assert_eq!(schema.vars.len(), 1);
    /// assert!(schema.immutable_paths().contains("name"));
    /// # Ok::<_, std::sync::Arc<strata::StrataError>>(())
    /// ```
    pub fn from_tree(tree: TreeValue, source: &str) -> StrataResult<Self> {
        let schema: Self = serde_json::from_value(tree)
            .map_err(|err| StrataError::schema_load(source, err.to_string()))?;
        schema.check(source)?;
        Ok(schema)
    }

    /// Read and interpret the schema file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::UnsupportedFormat`] unless the file is JSON,
    /// YAML, or TOML, plus any read, parse, or schema-load error.
    pub fn from_path(path: &Utf8Path) -> StrataResult<Self> {
        match Format::from_path(path) {
            Some(format) if format.is_structured() => {}
            other => {
                let hint = other.map_or_else(
                    || path.extension().unwrap_or_default().to_owned(),
                    |format| format.as_str().to_owned(),
                );
                return Err(StrataError::unsupported_format(
                    hint,
                    format!("schema '{path}'; use json, yaml, or toml"),
                ));
            }
        }
        Self::from_tree(codec::load_file(path)?, path.as_str())
    }

    /// The immutable paths as a merge set.
    #[must_use]
    pub fn immutable_paths(&self) -> ImmutablePaths {
        ImmutablePaths::new(self.immutable.iter().cloned())
    }

    fn check(&self, source: &str) -> StrataResult<()> {
        for (idx, generator) in self.generators.iter().enumerate() {
            generator.check().map_err(|message| {
                StrataError::schema_load(
                    source,
                    format!("generators[{idx}] ({}): {message}", generator.kind.as_str()),
                )
            })?;
        }
        for (idx, transform) in self.transforms.iter().enumerate() {
            transform.check().map_err(|message| {
                StrataError::schema_load(
                    source,
                    format!("transform[{idx}] ({}): {message}", transform.kind()),
                )
            })?;
        }
        for (idx, var) in self.vars.iter().enumerate() {
            if var.name.trim().is_empty() {
                return Err(StrataError::schema_load(
                    source,
                    format!("vars[{idx}]: variable name must not be empty"),
                ));
            }
        }
        Ok(())
    }
}

/// A loaded input or output reference document.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceTree {
    /// The reference document.
    pub tree: TreeValue,
    /// Whether keys absent from the reference are errors.
    pub strict: bool,
}

impl ReferenceTree {
    /// Wrap an in-memory reference document.
    #[must_use]
    pub const fn new(tree: TreeValue, strict: bool) -> Self {
        Self { tree, strict }
    }

    fn load(reference: &SchemaRef) -> StrataResult<Self> {
        Ok(Self::new(codec::load_file(&reference.path)?, reference.strict))
    }
}

/// A schema together with its loaded reference trees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedSchema {
    schema: Schema,
    input: Option<ReferenceTree>,
    output: Option<ReferenceTree>,
}

impl LoadedSchema {
    /// Load the schema at `path` and the reference documents it names.
    ///
    /// Reference paths are resolved relative to the working directory.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Schema::from_path`] or from reading the
    /// reference documents.
    pub fn from_path(path: &Utf8Path) -> StrataResult<Self> {
        Self::with_references(Schema::from_path(path)?)
    }

    /// Load the reference documents named by `schema`.
    ///
    /// # Errors
    ///
    /// Returns any error from reading the reference documents.
    pub fn with_references(schema: Schema) -> StrataResult<Self> {
        let input = schema.input_schema.as_ref().map(ReferenceTree::load).transpose()?;
        let output = schema
            .output_schema
            .as_ref()
            .map(ReferenceTree::load)
            .transpose()?;
        Ok(Self {
            schema,
            input,
            output,
        })
    }

    /// Assemble from parts that are already in memory.
    #[must_use]
    pub const fn from_parts(
        schema: Schema,
        input: Option<ReferenceTree>,
        output: Option<ReferenceTree>,
    ) -> Self {
        Self {
            schema,
            input,
            output,
        }
    }

    /// The schema document.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The input reference tree, if any.
    #[must_use]
    pub const fn input(&self) -> Option<&ReferenceTree> {
        self.input.as_ref()
    }

    /// The output reference tree, if any.
    #[must_use]
    pub const fn output(&self) -> Option<&ReferenceTree> {
        self.output.as_ref()
    }
}
