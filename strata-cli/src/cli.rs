//! Command-line interface definitions for `strata`.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use strata::codec::Format;

/// Document formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// JSON.
    Json,
    /// YAML.
    #[value(alias = "yml")]
    Yaml,
    /// TOML.
    Toml,
    /// INI with `[section]` headers.
    Ini,
    /// Flat `KEY=value` lines.
    Env,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Self::Json,
            FormatArg::Yaml => Self::Yaml,
            FormatArg::Toml => Self::Toml,
            FormatArg::Ini => Self::Ini,
            FormatArg::Env => Self::Env,
        }
    }
}

/// Parsed CLI arguments for `strata`.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(about = "Merge layered configuration and run it through a schema pipeline")]
pub struct Args {
    /// Files or directories to merge; `-` reads standard input.
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<Utf8PathBuf>,
    /// Additional source (repeatable).
    #[arg(short = 's', long = "source", value_name = "path")]
    pub extra_sources: Vec<Utf8PathBuf>,
    /// Descend into subdirectories of directory sources.
    #[arg(short = 'r', long = "recursive")]
    pub is_recursive: bool,
    /// Match keys case-sensitively while merging.
    #[arg(short = 'c', long = "case-sensitive")]
    pub is_case_sensitive: bool,
    /// Format of standard input.
    #[arg(short = 'f', long, value_enum, value_name = "format")]
    pub input_format: Option<FormatArg>,
    /// Schema driving the processing pipeline.
    #[arg(short = 'S', long, value_name = "path")]
    pub schema: Option<Utf8PathBuf>,
    /// Variables file, optionally carrying a `strata_forEach` directive.
    #[arg(short = 'V', long, value_name = "path")]
    pub vars_file: Option<Utf8PathBuf>,
    /// Write the result to this file (repeatable); the format follows the
    /// extension.
    #[arg(short = 'o', long = "output", value_name = "path")]
    pub outputs: Vec<Utf8PathBuf>,
    /// Format written to standard output, or to each base-name output
    /// (repeatable).
    #[arg(
        short = 'F',
        long = "output-format",
        value_enum,
        default_values_t = [FormatArg::Yaml],
        value_name = "format"
    )]
    pub output_formats: Vec<FormatArg>,
    /// Log debug detail to stderr.
    #[arg(short = 'v', long = "verbose", conflicts_with = "is_quiet")]
    pub is_verbose: bool,
    /// Log errors only.
    #[arg(short = 'q', long = "quiet")]
    pub is_quiet: bool,
}

impl Args {
    /// Positional and `--source` inputs, in that order.
    #[must_use]
    pub fn inputs(&self) -> Vec<Utf8PathBuf> {
        self.sources
            .iter()
            .chain(&self.extra_sources)
            .cloned()
            .collect()
    }

    /// Requested output formats, in command-line order.
    #[must_use]
    pub fn formats(&self) -> Vec<Format> {
        self.output_formats.iter().copied().map(Format::from).collect()
    }
}
