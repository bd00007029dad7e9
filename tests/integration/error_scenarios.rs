use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::{TestProject, run_config};
use crate::fixtures::SourceFixture;

#[test]
fn test_missing_config_fails() -> Result<()> {
    let project = TestProject::new()?;

    let output = project.run_inflator(&["does-not-exist.yaml"])?;
    output.assert_failure();
    assert_eq!(output.code, Some(1));
    assert!(output.stdout.is_empty());
    output.assert_stderr_contains("does-not-exist.yaml");
    Ok(())
}

#[test]
fn test_missing_argument_is_usage_error() {
    Command::cargo_bin("inflator")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_malformed_config_fails() -> Result<()> {
    let project = TestProject::new()?;
    let config = project.write_config("dependencies: [unclosed\n")?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_failure();
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_config_without_dependencies_fails() -> Result<()> {
    let project = TestProject::new()?;
    let config = project.write_config("kind: GotplInflator\nvalues:\n  a: 1\n")?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_failure();
    output.assert_stderr_contains("dependencies");
    Ok(())
}

#[test]
fn test_duplicate_dependency_names_fail() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::nginx())?;
    let config = project.write_config(&run_config(&[("nginx", &source, ""), ("nginx", &source, "")], ""))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_failure();
    output.assert_stderr_contains("nginx");
    Ok(())
}

#[test]
fn test_undefined_variable_aborts_without_output() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::broken())?;
    let config =
        project.write_config(&run_config(&[("broken", &source, "")], "  replicas:\n    max: 5\n"))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_failure();
    assert!(output.stdout.is_empty());
    output.assert_stderr_contains("replicas_count");
    output.assert_stderr_contains("deployment.yaml.tpl");
    Ok(())
}

#[test]
fn test_invalid_rendered_manifest_aborts() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::nginx())?;
    std::fs::write(source.join("broken.yaml.tpl"), "kind: [unclosed\n")?;
    let config = project.write_config(&run_config(
        &[("nginx", &source, "")],
        "  nginx:\n    cpu:\n      limit: 1\n    tag: x\n    port: 80\n",
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_failure();
    assert!(output.stdout.is_empty());
    output.assert_stderr_contains("broken.rendered.yaml");
    Ok(())
}

#[test]
fn test_missing_fetcher_for_remote_source() -> Result<()> {
    let project = TestProject::new()?;
    let config = project.write_config(
        "dependencies:\n  - name: remote\n    repo: git::https://example.com/charts.git?ref=v1\n",
    )?;

    let output = project.run_inflator_with_env(
        &[config.to_str().unwrap()],
        &[
            ("INFLATOR_CACHE_ROOT", &project.cache_path().display().to_string()),
            ("INFLATOR_FETCHER", "inflator-test-missing-fetcher"),
        ],
    )?;
    output.assert_failure();
    output.assert_stderr_contains("inflator-test-missing-fetcher");
    Ok(())
}

#[test]
fn test_invalid_pull_setting_fails() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::nginx())?;
    let config = project.write_config(&run_config(&[("nginx", &source, "")], ""))?;

    let output = project.run_inflator_with_env(
        &[config.to_str().unwrap()],
        &[("INFLATOR_PULL", "sometimes")],
    )?;
    output.assert_failure();
    output.assert_stderr_contains("sometimes");
    Ok(())
}
