//! Batch mode: replay the pipeline once per item and write one file each.
//!
//! A vars file may carry a `strata_forEach` directive listing inline items or
//! item files. Every iteration starts from its own copy of the merged base
//! tree, sees the item's variables at vars-file precedence, and writes its
//! result to a filename resolved from the directive's pattern. Iterations run
//! in order and a failing iteration does not stop the ones after it.

mod directive;
pub mod filename;
mod sink;

pub use directive::{FOR_EACH_KEY, ForEachDirective, OutputSpec, VarsFile};
pub use sink::{FsSink, MemorySink, OutputSink};

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use crate::StrataResult;
use crate::codec::{self, Format};
use crate::error::StrataError;
use crate::pipeline::Processor;
use crate::tree::{TreeMap, TreeValue, stringify};
use crate::vars::VariableContext;
use filename::FilenameScope;

/// Variable naming the zero-based iteration index.
pub const ITEM_INDEX: &str = "ITEM_INDEX";

/// Variable naming the item file's stem; empty for inline items.
pub const ITEM_FILE_BASENAME: &str = "ITEM_FILE_BASENAME";

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    written: Vec<Utf8PathBuf>,
    errors: Vec<Arc<StrataError>>,
}

impl BatchReport {
    /// Paths written, in iteration order.
    #[must_use]
    pub fn written(&self) -> &[Utf8PathBuf] {
        &self.written
    }

    /// Iteration failures, in iteration order.
    #[must_use]
    pub fn errors(&self) -> &[Arc<StrataError>] {
        &self.errors
    }

    /// Whether every iteration succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into the written paths, or an error combining every failure.
    ///
    /// # Errors
    ///
    /// Returns the single iteration error, or [`StrataError::Aggregate`] when
    /// several iterations failed.
    pub fn into_result(self) -> StrataResult<Vec<Utf8PathBuf>> {
        match StrataError::try_aggregate(self.errors) {
            None => Ok(self.written),
            Some(err) => Err(Arc::new(err)),
        }
    }
}

/// Drives per-iteration processing for one directive.
pub struct BatchRunner<'a> {
    processor: &'a Processor<'a>,
    context: &'a VariableContext<'a>,
}

impl<'a> BatchRunner<'a> {
    /// Create a runner.
    ///
    /// `context` supplies the environment tier and the vars-file globals;
    /// each iteration overlays its own variables on a copy.
    #[must_use]
    pub const fn new(processor: &'a Processor<'a>, context: &'a VariableContext<'a>) -> Self {
        Self { processor, context }
    }

    /// Run every iteration of `directive` over copies of `base`.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Batch`] when the directive is invalid; no
    /// iteration runs in that case. Iteration failures are collected in the
    /// report instead.
    pub fn run(
        &self,
        directive: &ForEachDirective,
        base: &TreeValue,
        sink: &mut dyn OutputSink,
    ) -> StrataResult<BatchReport> {
        directive.check()?;
        let explicit = directive.explicit_format()?;
        self.processor.diagnostics().in_scope(|| {
            info!(iterations = directive.len(), "starting batch run");
            let mut report = BatchReport::default();
            for index in 0..directive.len() {
                match self.iterate(index, directive, explicit, base, sink) {
                    Ok(path) => report.written.push(path),
                    Err(source) => {
                        warn!(index, error = %source, "iteration failed");
                        report
                            .errors
                            .push(Arc::new(StrataError::Iteration { index, source }));
                    }
                }
            }
            info!(
                written = report.written.len(),
                failed = report.errors.len(),
                "batch run finished"
            );
            Ok(report)
        })
    }

    fn iterate(
        &self,
        index: usize,
        directive: &ForEachDirective,
        explicit: Option<Format>,
        base: &TreeValue,
        sink: &mut dyn OutputSink,
    ) -> StrataResult<Utf8PathBuf> {
        let (item, basename) = load_item(directive, index)?;
        let mut context = self.context.clone();
        for (name, value) in &item {
            context.set_file_var(name.clone(), stringify(value));
        }
        context.set_file_var(ITEM_INDEX, index.to_string());
        context.set_file_var(ITEM_FILE_BASENAME, basename.clone());

        let processed = self.processor.run(base.clone(), &context)?;

        let target = filename::resolve(
            &directive.output.filename_pattern,
            &FilenameScope {
                index,
                basename: &basename,
                context: &context,
                schema: &self.processor.schema().schema().vars,
            },
        );
        let format = explicit
            .or_else(|| Format::from_path(&target))
            .unwrap_or_else(|| {
                warn!(index, path = %target, "output format is ambiguous, defaulting to yaml");
                Format::Yaml
            });
        let bytes = codec::serialize(&processed, format)?;
        sink.write(&target, &bytes)?;
        info!(index, path = %target, format = %format, "wrote iteration output");
        Ok(target)
    }
}

fn load_item(directive: &ForEachDirective, index: usize) -> StrataResult<(TreeMap, String)> {
    if let Some(item) = directive.items.get(index) {
        return Ok((item.clone(), String::new()));
    }
    let Some(path) = directive.item_files.get(index) else {
        return Err(StrataError::batch(format!("no item at index {index}")));
    };
    debug!(index, path = %path, "loading item file");
    let item = match codec::load_file(path)? {
        TreeValue::Object(map) => map,
        _ => TreeMap::new(),
    };
    Ok((item, stem(path)))
}

fn stem(path: &Utf8Path) -> String {
    path.file_stem().unwrap_or_default().to_owned()
}
