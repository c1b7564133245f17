//! End-to-end behaviour of the processing stages.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, anyhow, ensure};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::error::StrataError;
use crate::schema::{ReferenceTree, Schema};
use crate::tree;

fn loaded(schema: Value, input: Option<ReferenceTree>, output: Option<ReferenceTree>) -> Result<LoadedSchema> {
    let parsed = Schema::from_tree(schema, "test-schema").map_err(|e| anyhow!("{e}"))?;
    Ok(LoadedSchema::from_parts(parsed, input, output))
}

fn run_with(schema: &LoadedSchema, config: Value, env: &BTreeMap<String, String>) -> StrataResult<Value> {
    let context = VariableContext::new(env);
    Processor::new(schema, Diagnostics::silent()).run(config, &context)
}

fn run(schema: &LoadedSchema, config: Value) -> StrataResult<Value> {
    run_with(schema, config, &BTreeMap::new())
}

fn expect_err(result: StrataResult<Value>) -> Result<Arc<StrataError>> {
    match result {
        Ok(value) => Err(anyhow!("expected failure, got {value}")),
        Err(err) => Ok(err),
    }
}

#[rstest]
fn default_variable_feeds_set_value() -> Result<()> {
    let schema = loaded(
        json!({
            "vars": [{"name": "ENV", "defaultValue": "dev"}],
            "transform": [{"type": "setValue", "path": "stage", "value": "${ENV}"}]
        }),
        None,
        None,
    )?;
    let out = run(&schema, json!({})).map_err(|e| anyhow!("{e}"))?;
    ensure!(out == json!({"stage": "dev"}), "unexpected output {out}");
    Ok(())
}

#[rstest]
fn environment_tier_overrides_schema_default() -> Result<()> {
    let schema = loaded(
        json!({
            "vars": [{"name": "ENV", "defaultValue": "dev"}],
            "transform": [{"type": "setValue", "path": "stage", "value": "${ENV}"}]
        }),
        None,
        None,
    )?;
    let env: BTreeMap<String, String> = BTreeMap::new();
    let context = VariableContext::new(&env)
        .with_env_vars(BTreeMap::from([("ENV".to_owned(), "prod".to_owned())]));
    let out = Processor::new(&schema, Diagnostics::silent())
        .run(json!({}), &context)
        .map_err(|e| anyhow!("{e}"))?;
    ensure!(out == json!({"stage": "prod"}), "unexpected output {out}");
    Ok(())
}

#[rstest]
fn port_above_maximum_names_path() -> Result<()> {
    let schema = loaded(
        json!({"validate": [{"path": "port", "rules": {"type": "number", "min": 1, "max": 65535}}]}),
        None,
        None,
    )?;
    let err = expect_err(run(&schema, json!({"port": 70000})))?;
    ensure!(
        matches!(&*err, StrataError::Validation { key, message }
            if key == "port" && message == "value 70000 is greater than maximum 65535"),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
#[case(json!({"path": "a", "rules": {"required": true}}), json!({}), "path is required but not found")]
#[case(json!({"path": "a", "rules": {"type": "integer"}}), json!({"a": 1.5}), "expected type integer, found number")]
#[case(json!({"path": "a", "rules": {"min": 3}}), json!({"a": 2}), "value 2 is less than minimum 3")]
#[case(json!({"path": "a", "rules": {"minLength": 4}}), json!({"a": "héé"}), "length 3 is less than minimum length 4")]
#[case(json!({"path": "a", "rules": {"enum": ["x", "y"]}}), json!({"a": "z"}), "value 'z' is not in the allowed list [x, y]")]
#[case(json!({"path": "a", "rules": {"regex": "^v[0-9]+$"}}), json!({"a": "1"}), "value '1' does not match regex pattern '^v[0-9]+$'")]
fn validation_rule_failures(
    #[case] group: Value,
    #[case] config: Value,
    #[case] expected: &str,
) -> Result<()> {
    let schema = loaded(json!({"validate": [group]}), None, None)?;
    let err = expect_err(run(&schema, config))?;
    ensure!(
        matches!(&*err, StrataError::Validation { message, .. } if message == expected),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn invalid_regex_is_reported() -> Result<()> {
    let schema = loaded(
        json!({"validate": [{"path": "a", "rules": {"regex": "("}}]}),
        None,
        None,
    )?;
    let err = expect_err(run(&schema, json!({"a": "x"})))?;
    ensure!(err.to_string().contains("invalid regex pattern"), "unexpected error {err}");
    Ok(())
}

#[rstest]
fn absent_optional_group_skips_all_rules() -> Result<()> {
    let schema = loaded(
        json!({"validate": [{"path": "missing", "rules": {"type": "string", "minLength": 100}}]}),
        None,
        None,
    )?;
    let out = run(&schema, json!({"other": 1})).map_err(|e| anyhow!("{e}"))?;
    ensure!(out == json!({"other": 1}));
    Ok(())
}

#[rstest]
fn strict_output_rejects_extra_key() -> Result<()> {
    let schema = loaded(
        json!({}),
        None,
        Some(ReferenceTree::new(json!({"name": ""}), true)),
    )?;
    let err = expect_err(run(&schema, json!({"name": "x", "extra": 1})))?;
    ensure!(
        matches!(&*err, StrataError::SchemaMismatch { stage: SchemaStage::Output, key, .. }
            if key == "extra"),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn lenient_output_projects_onto_reference() -> Result<()> {
    let schema = loaded(
        json!({}),
        None,
        Some(ReferenceTree::new(
            json!({"name": "", "db": {"host": "", "port": 0}, "absent": {"x": 1}, "flat": {"y": 1}}),
            false,
        )),
    )?;
    let out = run(
        &schema,
        json!({"name": "x", "extra": 1, "db": {"host": "pg", "user": "u"}, "flat": 3}),
    )
    .map_err(|e| anyhow!("{e}"))?;
    ensure!(out == json!({"name": "x", "db": {"host": "pg"}}), "unexpected output {out}");
    Ok(())
}

#[rstest]
fn strict_output_requires_reference_keys() -> Result<()> {
    let schema = loaded(
        json!({}),
        None,
        Some(ReferenceTree::new(json!({"name": "", "port": 0}), true)),
    )?;
    let err = expect_err(run(&schema, json!({"name": "x"})))?;
    ensure!(
        matches!(&*err, StrataError::SchemaMismatch { key, message, .. }
            if key == "port" && message.contains("missing from processed configuration")),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
#[case(json!({"db": {"host": "pg"}}), "db.port", "missing required key")]
#[case(json!({"db": {"host": 1, "port": 5432}}), "db.host", "type mismatch")]
#[case(json!({"db": {"host": "pg", "port": 5432, "user": "u"}}), "db.user", "unexpected key found in strict mode")]
fn strict_input_schema_mismatches(
    #[case] config: Value,
    #[case] expected_key: &str,
    #[case] fragment: &str,
) -> Result<()> {
    let schema = loaded(
        json!({}),
        Some(ReferenceTree::new(json!({"db": {"host": "", "port": 0.5}}), true)),
        None,
    )?;
    let err = expect_err(run(&schema, config))?;
    ensure!(
        matches!(&*err, StrataError::SchemaMismatch { stage: SchemaStage::Input, key, message }
            if key == expected_key && message.contains(fragment)),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn input_schema_accepts_numbers_and_null_wildcards() -> Result<()> {
    let schema = loaded(
        json!({}),
        Some(ReferenceTree::new(json!({"port": 1.5, "anything": null}), false)),
        None,
    )?;
    let config = json!({"port": 8080, "anything": [1, 2], "extra": true});
    let out = run(&schema, config.clone()).map_err(|e| anyhow!("{e}"))?;
    ensure!(out == config);
    Ok(())
}

#[rstest]
fn concat_generator_reads_sources() -> Result<()> {
    let schema = loaded(
        json!({"generators": [{
            "type": "concat",
            "targetPath": "service.url",
            "format": "http://{host}:{port}",
            "sources": {"host": "service.host", "port": "service.port"}
        }]}),
        None,
        None,
    )?;
    let out = run(&schema, json!({"service": {"host": "api", "port": 80}})).map_err(|e| anyhow!("{e}"))?;
    ensure!(tree::get(&out, "service.url") == Some(&json!("http://api:80")), "{out}");
    Ok(())
}

#[rstest]
fn sequential_ids_continue_from_stored_counter() -> Result<()> {
    let schema = loaded(
        json!({"generators": [{"type": "id", "targetPath": "build", "format": "sequential"}]}),
        None,
        None,
    )?;
    let first = run(&schema, json!({})).map_err(|e| anyhow!("{e}"))?;
    ensure!(tree::get(&first, "build") == Some(&json!(1)), "{first}");
    let second = run(&schema, first).map_err(|e| anyhow!("{e}"))?;
    ensure!(tree::get(&second, "build") == Some(&json!(2)), "{second}");
    Ok(())
}

#[rstest]
fn transforms_apply_in_declaration_order() -> Result<()> {
    let schema = loaded(
        json!({
            "vars": [{"name": "PFX", "value": "app_"}],
            "transform": [
                {"type": "renameKey", "from": "old", "to": "settings.name"},
                {"type": "changeCase", "path": "settings.name", "case": "snake"},
                {"type": "addKeyPrefix", "path": "settings", "prefix": "${PFX}"},
                {"type": "trim", "path": "padded"},
                {"type": "trim", "path": "dashed", "pattern": "-"},
                {"type": "replaceKey", "path": "current", "target": "next"},
                {"type": "deleteKey", "path": "legacy"},
                {"type": "changeCase", "path": "title", "case": "PASCAL"}
            ]
        }),
        None,
        None,
    )?;
    let config = json!({
        "old": "My Service",
        "padded": "  x  ",
        "dashed": "--y--",
        "current": 1,
        "next": 2,
        "legacy": true,
        "title": "hello world"
    });
    let out = run(&schema, config).map_err(|e| anyhow!("{e}"))?;
    ensure!(
        out == json!({
            "settings": {"app_name": "my_service"},
            "padded": "x",
            "dashed": "y",
            "current": 2,
            "title": "HelloWorld"
        }),
        "unexpected output {out}"
    );
    Ok(())
}

#[rstest]
#[case(json!({"type": "deleteKey", "path": "nope"}), "deleteKey")]
#[case(json!({"type": "changeCase", "path": "n", "case": "title"}), "changeCase")]
#[case(json!({"type": "addKeySuffix", "path": "n", "suffix": "_x"}), "addKeySuffix")]
#[case(json!({"type": "trim", "path": "n"}), "trim")]
#[case(json!({"type": "replaceKey", "path": "a", "target": "nope"}), "replaceKey")]
fn failing_transforms_name_their_kind(#[case] transform: Value, #[case] kind: &str) -> Result<()> {
    let schema = loaded(json!({"transform": [transform]}), None, None)?;
    let err = expect_err(run(&schema, json!({"n": 1})))?;
    ensure!(
        matches!(&*err, StrataError::Transform { kind: actual, .. } if *actual == kind),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn unresolved_schema_variable_aborts() -> Result<()> {
    let schema = loaded(json!({"vars": [{"name": "TOKEN", "fromEnv": "TOKEN"}]}), None, None)?;
    let err = expect_err(run(&schema, json!({})))?;
    ensure!(
        matches!(&*err, StrataError::VariableResolution { name } if name == "TOKEN"),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn path_variables_read_merged_configuration() -> Result<()> {
    let schema = loaded(
        json!({
            "vars": [{"name": "REGION", "fromPath": "cloud.region"}],
            "transform": [{"type": "setValue", "path": "bucket", "value": "logs-${REGION}"}]
        }),
        None,
        None,
    )?;
    let env = BTreeMap::from([("UNUSED".to_owned(), "1".to_owned())]);
    let out = run_with(&schema, json!({"cloud": {"region": "eu-west-1"}, "note": "${REGION}/${MISSING}"}), &env)
        .map_err(|e| anyhow!("{e}"))?;
    ensure!(tree::get(&out, "bucket") == Some(&json!("logs-eu-west-1")));
    ensure!(tree::get(&out, "note") == Some(&json!("eu-west-1/${MISSING}")));
    Ok(())
}

#[rstest]
fn lowercase_variable_names_load_but_are_not_substituted() -> Result<()> {
    let schema = loaded(
        json!({
            "vars": [{"name": "region", "value": "eu"}, {"name": "ZONE", "value": "a"}],
            "transform": [{"type": "setValue", "path": "where", "value": "${region}-${ZONE}"}]
        }),
        None,
        None,
    )?;
    let out = run(&schema, json!({})).map_err(|e| anyhow!("{e}"))?;
    ensure!(out == json!({"where": "${region}-a"}), "{out}");
    Ok(())
}
