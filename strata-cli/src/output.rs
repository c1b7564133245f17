//! Writers for single-mode results.

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{Result, WrapErr, eyre};
use strata::batch::{FsSink, OutputSink};
use strata::codec::{self, Format};
use strata::tree::TreeValue;
use tracing::info;

/// Line written between documents when several formats share stdout.
pub const STREAM_SEPARATOR: &str = "---\n";

/// Where a processed configuration goes.
#[derive(Debug)]
pub enum Destination {
    /// Standard output, one document per format.
    Stream(Vec<Format>),
    /// Files paired with the format each is written in.
    Files(Vec<(Utf8PathBuf, Format)>),
}

impl Destination {
    /// Choose files when any were named, otherwise the stream.
    ///
    /// A target with a known extension is written in that format. A target
    /// without an extension is a base name: one file per entry of `formats`
    /// is written next to it, named by the format.
    ///
    /// # Errors
    ///
    /// Fails when a target has an extension that names no known format.
    pub fn select(outputs: &[Utf8PathBuf], formats: &[Format]) -> Result<Self> {
        if outputs.is_empty() {
            return Ok(Self::Stream(formats.to_vec()));
        }
        let mut planned = Vec::with_capacity(outputs.len());
        for target in outputs {
            plan_target(target, formats, &mut planned)?;
        }
        Ok(Self::Files(planned))
    }

    /// Encode `value` and write it out.
    pub fn emit(&self, value: &TreeValue) -> Result<()> {
        match self {
            Self::Stream(formats) => {
                let mut stdout = io::stdout().lock();
                for (idx, format) in formats.iter().enumerate() {
                    let bytes = codec::serialize(value, *format)?;
                    if idx > 0 {
                        stdout
                            .write_all(STREAM_SEPARATOR.as_bytes())
                            .wrap_err("failed to write to standard output")?;
                    }
                    stdout
                        .write_all(&bytes)
                        .wrap_err("failed to write to standard output")?;
                }
                stdout.flush().wrap_err("failed to write to standard output")
            }
            Self::Files(targets) => {
                let mut sink = FsSink;
                for (target, format) in targets {
                    sink.write(target, &codec::serialize(value, *format)?)?;
                    info!(path = %target, format = %format, "wrote output");
                }
                Ok(())
            }
        }
    }
}

fn plan_target(
    target: &Utf8Path,
    formats: &[Format],
    planned: &mut Vec<(Utf8PathBuf, Format)>,
) -> Result<()> {
    if let Some(format) = Format::from_path(target) {
        planned.push((target.to_path_buf(), format));
        return Ok(());
    }
    if target.extension().is_some() {
        return Err(eyre!("cannot infer an output format from '{target}'"));
    }
    planned.extend(
        formats
            .iter()
            .map(|format| (target.with_extension(format.as_str()), *format)),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, anyhow, ensure};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn temp_root() -> Result<(tempfile::TempDir, Utf8PathBuf)> {
        let dir = tempfile::tempdir()?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow!("non UTF-8 temp dir {}", p.display()))?;
        Ok((dir, root))
    }

    #[rstest]
    fn stream_is_used_without_files() -> Result<()> {
        let destination =
            Destination::select(&[], &[Format::Json, Format::Yaml]).map_err(|e| anyhow!("{e}"))?;
        ensure!(matches!(
            destination,
            Destination::Stream(ref formats) if formats == &[Format::Json, Format::Yaml]
        ));
        Ok(())
    }

    #[rstest]
    fn files_follow_their_extensions() -> Result<()> {
        let (_dir, root) = temp_root()?;
        let targets = [root.join("out/app.toml"), root.join("app.env")];
        Destination::select(&targets, &[Format::Yaml])
            .and_then(|destination| destination.emit(&json!({"db": {"port": 5432}})))
            .map_err(|e| anyhow!("{e}"))?;
        let toml = std::fs::read_to_string(root.join("out/app.toml"))?;
        ensure!(toml.contains("port = 5432"), "{toml}");
        let env = std::fs::read_to_string(root.join("app.env"))?;
        ensure!(env.contains("db.port=5432"), "{env}");
        Ok(())
    }

    #[rstest]
    fn base_name_expands_to_one_file_per_format() -> Result<()> {
        let (_dir, root) = temp_root()?;
        let destination = Destination::select(&[root.join("out/app")], &[Format::Json, Format::Toml])
            .map_err(|e| anyhow!("{e}"))?;
        let Destination::Files(planned) = &destination else {
            return Err(anyhow!("expected file targets"));
        };
        ensure!(
            planned
                == &[
                    (root.join("out/app.json"), Format::Json),
                    (root.join("out/app.toml"), Format::Toml)
                ]
        );
        destination.emit(&json!({"a": 1})).map_err(|e| anyhow!("{e}"))?;
        ensure!(root.join("out/app.json").is_file() && root.join("out/app.toml").is_file());
        Ok(())
    }

    #[rstest]
    fn unknown_extension_is_rejected_before_writing() -> Result<()> {
        let (_dir, root) = temp_root()?;
        let targets = [root.join("a.json"), root.join("b.txt")];
        ensure!(Destination::select(&targets, &[Format::Yaml]).is_err());
        ensure!(!root.join("a.json").exists());
        Ok(())
    }
}
