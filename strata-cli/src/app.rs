//! Wires sources, schema, and variables into a single or batch run.

use std::io;

use camino::Utf8PathBuf;
use color_eyre::eyre::{Result, bail};
use strata::batch::{BatchRunner, FsSink, VarsFile};
use strata::codec::Format;
use strata::diagnostics::Diagnostics;
use strata::env::EnvOverrides;
use strata::merge::{MergeComposer, MergeOptions};
use strata::pipeline::Processor;
use strata::schema::LoadedSchema;
use strata::sources::{self, SourceSet};
use strata::tree::TreeValue;
use strata::vars::{ProcessEnv, VariableContext};
use tracing::{debug, info};

use crate::cli::Args;
use crate::output::Destination;

/// Execute one invocation described by `args`.
pub fn run(args: &Args) -> Result<()> {
    let diagnostics = Diagnostics::new(args.is_verbose, args.is_quiet);
    diagnostics.in_scope(|| execute(args, &diagnostics))
}

fn execute(args: &Args, diagnostics: &Diagnostics) -> Result<()> {
    let schema = match &args.schema {
        Some(path) => LoadedSchema::from_path(path)?,
        None => LoadedSchema::default(),
    };
    let vars_file = args.vars_file.as_deref().map(VarsFile::from_path).transpose()?;
    let (env_layer, env_vars) = EnvOverrides::from_process().into_parts();
    let merged = merge_sources(args, &schema, env_layer)?;

    let context = VariableContext::new(&ProcessEnv)
        .with_env_vars(env_vars)
        .with_file_vars(vars_file.iter().flat_map(VarsFile::globals));
    let processor = Processor::new(&schema, diagnostics.clone());

    if let Some(directive) = vars_file.as_ref().and_then(VarsFile::directive) {
        if args.schema.is_none() {
            bail!("batch mode requires a schema; pass --schema");
        }
        let written = BatchRunner::new(&processor, &context)
            .run(directive, &merged, &mut FsSink)?
            .into_result()?;
        info!(files = written.len(), "batch complete");
        return Ok(());
    }

    let processed = processor.run(merged, &context)?;
    Destination::select(&args.outputs, &args.formats())?.emit(&processed)
}

fn merge_sources(args: &Args, schema: &LoadedSchema, env_layer: TreeValue) -> Result<TreeValue> {
    let inputs: Vec<Utf8PathBuf> = args.inputs();
    let sources = SourceSet::discover(&inputs, args.is_recursive)?;
    if sources.is_empty() {
        bail!("no input source specified; name files, directories, or `-` for stdin");
    }

    let mut composer = MergeComposer::with_capacity(sources.files().len() + 2);
    let skipped = sources.load_into(&mut composer);
    debug!(
        loaded = sources.files().len() - skipped,
        skipped, "parsed source files"
    );
    if sources.reads_stdin() {
        let format = args.input_format.map(Format::from);
        composer.push_stdin(sources::read_stream(io::stdin().lock(), format)?);
    }
    composer.push_environment(env_layer);

    let options = MergeOptions::new()
        .case_sensitive(args.is_case_sensitive)
        .immutable(schema.schema().immutable_paths());
    Ok(composer.compose(&options))
}
