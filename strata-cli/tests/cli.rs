//! End-to-end runs of the `strata` binary.

use std::fs;

use anyhow::{Result, ensure};
use assert_cmd::Command;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn path(&self, rel: &str) -> String {
        self.dir.path().join(rel).to_string_lossy().into_owned()
    }

    fn write(&self, rel: &str, contents: &str) -> Result<String> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path.to_string_lossy().into_owned())
    }

    fn read(&self, rel: &str) -> Result<String> {
        Ok(fs::read_to_string(self.dir.path().join(rel))?)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_strata"));
        cmd.current_dir(self.dir.path())
            .env("RUST_BACKTRACE", "0")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[fixture]
fn workspace() -> Result<Workspace> {
    Ok(Workspace {
        dir: tempfile::tempdir()?,
    })
}

fn stdout_json(output: &std::process::Output) -> Result<Value> {
    ensure!(
        output.status.success(),
        "strata failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[rstest]
fn directory_sources_merge_with_env_overrides(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("conf/10-base.yaml", "service:\n  name: api\n  port: 80\n")?;
    ws.write("conf/20-prod.toml", "[service]\nport = 443\n")?;
    let output = ws
        .command()
        .args(["conf", "-F", "json"])
        .env("STRATA_KEY_service.replicas", "3")
        .output()?;
    let value = stdout_json(&output)?;
    ensure!(
        value == json!({"service": {"name": "api", "port": 443, "replicas": 3}}),
        "{value}"
    );
    Ok(())
}

#[rstest]
fn stdin_needs_and_uses_an_input_format(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    let parsed = ws
        .command()
        .args(["-", "-f", "yaml", "-F", "json"])
        .write_stdin("region: eu\n")
        .output()?;
    ensure!(stdout_json(&parsed)? == json!({"region": "eu"}));

    let rejected = ws.command().arg("-").write_stdin("region: eu\n").output()?;
    ensure!(!rejected.status.success());
    Ok(())
}

#[rstest]
fn missing_sources_fail(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    let output = ws.command().output()?;
    ensure!(!output.status.success());
    ensure!(String::from_utf8_lossy(&output.stderr).contains("no input source specified"));
    Ok(())
}

#[rstest]
fn schema_failures_exit_non_zero(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("app.json", r#"{"port": 70000}"#)?;
    ws.write(
        "schema.yaml",
        "validate:\n  - path: port\n    rules:\n      max: 65535\n",
    )?;
    let output = ws.command().args(["app.json", "-S", "schema.yaml"]).output()?;
    ensure!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    ensure!(stderr.contains("value 70000 is greater than maximum 65535"), "{stderr}");
    Ok(())
}

#[rstest]
fn output_files_take_format_from_extension(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("app.yaml", "db:\n  host: localhost\n")?;
    ws.write("vars.yaml", "HOST: db.internal\n")?;
    ws.write(
        "schema.yaml",
        "transform:\n  - type: setValue\n    path: db.host\n    value: ${HOST}\n",
    )?;
    let output = ws
        .command()
        .args(["-s", "app.yaml", "-S", "schema.yaml", "-V", "vars.yaml"])
        .args(["-o", "out/app.json", "-o", "out/app.toml"])
        .output()?;
    ensure!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    ensure!(output.stdout.is_empty());
    let written: Value = serde_json::from_str(&ws.read("out/app.json")?)?;
    ensure!(written == json!({"db": {"host": "db.internal"}}), "{written}");
    ensure!(ws.read("out/app.toml")?.contains("host = \"db.internal\""));
    Ok(())
}

#[rstest]
fn batch_mode_writes_one_file_per_item(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("base.yaml", "service:\n  replicas: 1\n")?;
    ws.write(
        "schema.yaml",
        "vars:\n  - name: ENVIRONMENT\n    defaultValue: staging\ntransform:\n  - type: setValue\n    path: service.name\n    value: ${SERVICE}\n",
    )?;
    ws.write(
        "vars.yaml",
        "strata_forEach:\n  items:\n    - SERVICE: api\n    - SERVICE: worker\n  output:\n    filenamePattern: out/${ENVIRONMENT}/${SERVICE}.json\n",
    )?;
    let output = ws
        .command()
        .args(["base.yaml", "-S", "schema.yaml", "-V", "vars.yaml"])
        .output()?;
    ensure!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    for service in ["api", "worker"] {
        let written: Value =
            serde_json::from_str(&ws.read(&format!("out/staging/{service}.json"))?)?;
        ensure!(
            written == json!({"service": {"name": service, "replicas": 1}}),
            "{written}"
        );
    }
    ensure!(fs::metadata(ws.path("base.yaml")).is_ok());
    Ok(())
}

#[rstest]
fn batch_mode_requires_a_schema(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("base.yaml", "a: 1\n")?;
    ws.write(
        "vars.yaml",
        "strata_forEach:\n  items:\n    - N: 1\n  output:\n    filenamePattern: out.json\n",
    )?;
    let output = ws.command().args(["base.yaml", "-V", "vars.yaml"]).output()?;
    ensure!(!output.status.success());
    ensure!(
        String::from_utf8_lossy(&output.stderr).contains("batch mode requires a schema"),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    ensure!(fs::metadata(ws.path("out.json")).is_err());
    Ok(())
}

#[rstest]
fn failed_iteration_fails_the_run(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("base.yaml", "a: 1\n")?;
    ws.write(
        "schema.yaml",
        "transform:\n  - type: deleteKey\n    path: ${TARGET}\n",
    )?;
    ws.write(
        "vars.yaml",
        "strata_forEach:\n  items:\n    - TARGET: a\n    - TARGET: missing\n  output:\n    filenamePattern: out/${ITEM_INDEX}.json\n",
    )?;
    let output = ws
        .command()
        .args(["base.yaml", "-S", "schema.yaml", "-V", "vars.yaml"])
        .output()?;
    ensure!(!output.status.success());
    ensure!(ws.read("out/0.json").is_ok(), "successful iterations still write");
    ensure!(ws.read("out/1.json").is_err());
    let stderr = String::from_utf8_lossy(&output.stderr);
    ensure!(stderr.contains("iteration 1 failed"), "{stderr}");
    Ok(())
}

#[rstest]
fn case_insensitive_merge_keeps_first_casing(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("a.json", r#"{"Service": {"port": 1}}"#)?;
    ws.write("b.json", r#"{"service": {"port": 2}}"#)?;
    let merged = stdout_json(&ws.command().args(["a.json", "b.json", "-F", "json"]).output()?)?;
    ensure!(merged == json!({"Service": {"port": 2}}), "{merged}");
    let sensitive = stdout_json(
        &ws.command()
            .args(["a.json", "b.json", "-c", "-F", "json"])
            .output()?,
    )?;
    ensure!(
        sensitive == json!({"Service": {"port": 1}, "service": {"port": 2}}),
        "{sensitive}"
    );
    Ok(())
}

#[rstest]
fn unknown_output_extension_is_rejected(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("a.json", "{}")?;
    let output = ws.command().args(["a.json", "-o", "out.xml"]).output()?;
    ensure!(!output.status.success());
    ensure!(ws.read("out.xml").is_err());
    Ok(())
}

#[rstest]
fn vars_file_path_is_reported_when_missing(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("a.json", "{}")?;
    let output = ws.command().args(["a.json", "-V", "nope.yaml"]).output()?;
    ensure!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    ensure!(stderr.contains("nope.yaml"), "{stderr}");
    Ok(())
}

#[rstest]
fn repeated_stream_formats_are_separated(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("a.json", r#"{"name": "api"}"#)?;
    let output = ws
        .command()
        .args(["a.json", "-F", "json", "-F", "yaml"])
        .output()?;
    ensure!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout)?;
    let Some((json_doc, yaml_doc)) = stdout.split_once("---\n") else {
        return Err(anyhow::anyhow!("missing separator in {stdout}"));
    };
    let parsed: Value = serde_json::from_str(json_doc)?;
    ensure!(parsed == json!({"name": "api"}), "{parsed}");
    ensure!(yaml_doc.trim() == "name: api", "{yaml_doc}");
    Ok(())
}

#[rstest]
fn base_name_output_writes_each_format(workspace: Result<Workspace>) -> Result<()> {
    let ws = workspace?;
    ws.write("a.json", r#"{"name": "api"}"#)?;
    let output = ws
        .command()
        .args(["a.json", "-o", "out/app", "-F", "json", "-F", "env"])
        .output()?;
    ensure!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let written: Value = serde_json::from_str(&ws.read("out/app.json")?)?;
    ensure!(written == json!({"name": "api"}));
    ensure!(ws.read("out/app.env")?.trim() == "name=api");
    ensure!(ws.read("out/app").is_err());
    Ok(())
}
