//! The `strata_forEach` directive and the vars file that carries it.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::StrataResult;
use crate::codec::{self, Format};
use crate::error::StrataError;
use crate::tree::{TreeMap, TreeValue, ValueKind};

/// Vars-file key holding the batch directive.
pub const FOR_EACH_KEY: &str = "strata_forEach";

/// Where and how each iteration's output is written.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    /// Output path template; `${NAME}` tokens are replaced per iteration.
    #[serde(default)]
    pub filename_pattern: String,
    /// Explicit output format, overriding the filename extension.
    #[serde(default)]
    pub format: Option<String>,
}

/// Instructions for replaying the pipeline once per item.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForEachDirective {
    /// Inline per-iteration variables.
    #[serde(default)]
    pub items: Vec<TreeMap>,
    /// Files holding per-iteration variables.
    #[serde(default)]
    pub item_files: Vec<Utf8PathBuf>,
    /// Output settings.
    #[serde(default)]
    pub output: OutputSpec,
}

impl ForEachDirective {
    /// Check the directive before any iteration runs.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Batch`] unless exactly one of `items` and
    /// `itemFiles` is non-empty and `filenamePattern` is set, or when the
    /// explicit output format is unknown.
    pub fn check(&self) -> StrataResult<()> {
        match (self.items.is_empty(), self.item_files.is_empty()) {
            (false, false) => {
                return Err(StrataError::batch(
                    "items and itemFiles cannot both be defined",
                ));
            }
            (true, true) => {
                return Err(StrataError::batch("either items or itemFiles must be defined"));
            }
            _ => {}
        }
        if self.output.filename_pattern.trim().is_empty() {
            return Err(StrataError::batch("output.filenamePattern is required"));
        }
        self.explicit_format().map(drop)
    }

    /// Number of iterations the directive describes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len().max(self.item_files.len())
    }

    /// Whether the directive describes no iterations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The explicit output format, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Batch`] when the configured name is unknown.
    pub fn explicit_format(&self) -> StrataResult<Option<Format>> {
        match self.output.format.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(hint) => Format::from_hint(hint)
                .map(Some)
                .ok_or_else(|| StrataError::batch(format!("unknown output.format '{hint}'"))),
        }
    }

    fn rebase(&mut self, base_dir: &Utf8Path) {
        for file in &mut self.item_files {
            if file.is_relative() {
                *file = base_dir.join(&*file);
            }
        }
    }
}

/// A parsed vars file: global variables plus an optional batch directive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VarsFile {
    globals: TreeMap,
    directive: Option<ForEachDirective>,
}

impl VarsFile {
    /// Read the vars file at `path`.
    ///
    /// Relative `itemFiles` entries are resolved against the file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns any read or parse error, or [`StrataError::Batch`] when the
    /// directive is malformed.
    pub fn from_path(path: &Utf8Path) -> StrataResult<Self> {
        let mut vars = Self::from_tree(codec::load_file(path)?)?;
        if let Some(directive) = vars.directive.as_mut() {
            let base = path.parent().unwrap_or_else(|| Utf8Path::new(""));
            directive.rebase(base);
        }
        Ok(vars)
    }

    /// Split a decoded vars document into globals and directive.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Batch`] when the directive is not a map or has
    /// the wrong shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata::batch::VarsFile;
    ///
    /// let vars = VarsFile::from_tree(json!({
    ///     "REGION": "eu",
    ///     "strata_forEach": {
    ///         "items": [{"SERVICE": "api"}],
    ///         "output": {"filenamePattern": "out/${SERVICE}.json"}
    ///     }
    /// }))?;
    /// assert_eq!(vars.globals().len(), 1);
    /// assert_eq!(vars.directive().map(|d| d.len()), Some(1));
    /// # Ok::<_, std::sync::Arc<strata::StrataError>>(())
    /// ```
    pub fn from_tree(tree: TreeValue) -> StrataResult<Self> {
        let mut globals = match tree {
            TreeValue::Object(map) => map,
            other => {
                return Err(StrataError::batch(format!(
                    "vars file must be a map, found {}",
                    ValueKind::of(&other)
                )));
            }
        };
        let directive = globals
            .remove(FOR_EACH_KEY)
            .map(|raw| {
                serde_json::from_value::<ForEachDirective>(raw)
                    .map_err(|err| StrataError::batch(format!("invalid {FOR_EACH_KEY}: {err}")))
            })
            .transpose()?;
        Ok(Self { globals, directive })
    }

    /// Variables shared by every iteration, or the file tier in single mode.
    #[must_use]
    pub const fn globals(&self) -> &TreeMap {
        &self.globals
    }

    /// The batch directive, when present.
    #[must_use]
    pub const fn directive(&self) -> Option<&ForEachDirective> {
        self.directive.as_ref()
    }
}
