//! Codec behaviour across formats.

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};
use serde_json::json;

use camino::Utf8Path;

use super::{Format, load_file, parse, serialize};
use crate::error::StrataError;
use crate::tree::TreeValue;

#[fixture]
fn typed_doc() -> TreeValue {
    json!({
        "name": "api",
        "replicas": 3,
        "ratio": 0.25,
        "enabled": true,
        "tags": ["a", "b"],
        "database": {"host": "db.local", "port": 5432}
    })
}

#[fixture]
fn string_doc() -> TreeValue {
    json!({
        "name": "api gateway",
        "motto": "say \"hi\" # loudly",
        "quoted": "\"q\"",
        "padded": "  spaced ",
        "database": {"host": "db.local", "port": "5432"},
        "server": {"tls": {"cert": "/etc/cert.pem"}}
    })
}

fn round_trip(doc: &TreeValue, format: Format) -> Result<TreeValue> {
    let bytes = serialize(doc, format).map_err(|e| anyhow!("{e}"))?;
    parse(&bytes, format, "round-trip").map_err(|e| anyhow!("{e}"))
}

#[rstest]
#[case(Format::Json)]
#[case(Format::Yaml)]
#[case(Format::Toml)]
fn structured_formats_round_trip(typed_doc: TreeValue, #[case] format: Format) -> Result<()> {
    let reparsed = round_trip(&typed_doc, format)?;
    ensure!(reparsed == typed_doc, "{format}: {reparsed} != {typed_doc}");
    Ok(())
}

#[rstest]
#[case(Format::Ini)]
#[case(Format::Env)]
fn flat_formats_round_trip_string_trees(
    string_doc: TreeValue,
    #[case] format: Format,
) -> Result<()> {
    let reparsed = round_trip(&string_doc, format)?;
    ensure!(reparsed == string_doc, "{format}: {reparsed} != {string_doc}");
    Ok(())
}

#[rstest]
fn env_parsing_skips_comments_and_unquotes() -> Result<()> {
    let text = "# header\n\nexport APP.NAME=\"hello\\nworld\"\nAPP.MODE='raw \\n'\nPLAIN = value \n";
    let tree = parse(text.as_bytes(), Format::Env, "inline").map_err(|e| anyhow!("{e}"))?;
    ensure!(
        tree == json!({
            "APP": {"NAME": "hello\nworld", "MODE": "raw \\n"},
            "PLAIN": "value"
        }),
        "unexpected tree {tree}"
    );
    Ok(())
}

#[rstest]
fn ini_default_section_keys_are_top_level() -> Result<()> {
    let text = "; comment\nname = api\n\n[database]\nhost: db.local\nport = \"5432\"\n";
    let tree = parse(text.as_bytes(), Format::Ini, "inline").map_err(|e| anyhow!("{e}"))?;
    ensure!(tree == json!({"name": "api", "database": {"host": "db.local", "port": "5432"}}));
    Ok(())
}

#[rstest]
#[case(Format::Yaml, "")]
#[case(Format::Yaml, "~\n")]
#[case(Format::Toml, "")]
#[case(Format::Env, "# nothing here\n")]
fn empty_documents_decode_to_empty_maps(#[case] format: Format, #[case] text: &str) {
    let tree = parse(text.as_bytes(), format, "inline");
    assert!(matches!(tree, Ok(ref t) if *t == json!({})), "{format}: {tree:?}");
}

#[rstest]
#[case(Format::Json, "[1, 2]")]
#[case(Format::Yaml, "- a\n- b\n")]
#[case(Format::Json, "{\"unterminated\": ")]
#[case(Format::Toml, "key = ")]
fn malformed_or_non_map_roots_are_parse_errors(#[case] format: Format, #[case] text: &str) {
    let Err(err) = parse(text.as_bytes(), format, "broken.doc") else {
        panic!("{format}: expected a parse error");
    };
    assert!(
        matches!(&*err, StrataError::Parse { source_id, .. } if source_id == "broken.doc"),
        "unexpected error {err}"
    );
}

#[rstest]
fn yaml_scalar_keys_are_stringified() -> Result<()> {
    let tree = parse(b"1: one\ntrue: yes\n", Format::Yaml, "inline").map_err(|e| anyhow!("{e}"))?;
    ensure!(tree == json!({"1": "one", "true": "yes"}), "unexpected tree {tree}");
    Ok(())
}

#[rstest]
fn ini_rejects_multi_line_values_with_path() {
    let Err(err) = serialize(&json!({"app": {"banner": "one\ntwo"}}), Format::Ini) else {
        panic!("expected a serialize error");
    };
    assert!(
        matches!(&*err, StrataError::Serialize { message, .. } if message.contains("app.banner")),
        "unexpected error {err}"
    );
}

#[rstest]
fn toml_rejects_null_with_path() {
    let Err(err) = serialize(&json!({"db": {"password": null}}), Format::Toml) else {
        panic!("expected a serialize error");
    };
    assert!(
        matches!(&*err, StrataError::Serialize { message, .. } if message.contains("db.password")),
        "unexpected error {err}"
    );
}

#[rstest]
fn files_load_relative_to_working_directory() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("app.yaml", "name: api\n")?;
        std::fs::create_dir(jail.directory().join("conf")).map_err(|e| e.to_string())?;
        jail.create_file("conf/db.toml", "port = 5432\n")?;
        let bare = load_file(Utf8Path::new("app.yaml")).map_err(|e| e.to_string())?;
        assert_eq!(bare, json!({"name": "api"}));
        let nested = load_file(Utf8Path::new("conf/db.toml")).map_err(|e| e.to_string())?;
        assert_eq!(nested, json!({"port": 5432}));
        Ok(())
    });
}

#[rstest]
fn missing_file_is_a_read_error() {
    let Err(err) = load_file(Utf8Path::new("/definitely/not/here.json")) else {
        panic!("expected a read error");
    };
    assert!(matches!(&*err, StrataError::Read { .. }), "unexpected error {err}");
}
