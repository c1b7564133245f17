//! CLI entrypoint for `strata`.

mod app;
mod cli;
mod output;

use clap::Parser;

use crate::cli::Args;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::run(&Args::parse())
}
