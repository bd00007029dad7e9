use anyhow::Result;

use crate::common::{TestProject, documents, run_config};
use crate::fixtures::SourceFixture;

const APP_VALUES: &str = "  app:\n    name: demo\n";

fn kinds_of(stream: &str) -> Vec<String> {
    documents(stream)
        .into_iter()
        .map(|doc| {
            let value: serde_yaml::Value = serde_yaml::from_str(doc).unwrap();
            value["kind"].as_str().unwrap().to_string()
        })
        .collect()
}

#[test]
fn test_namespace_suppressed_by_default() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(&[("mixed", &source, "")], APP_VALUES))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    // The kind-less fragment is skipped as well
    assert_eq!(kinds_of(&output.stdout), vec!["Deployment", "Secret", "ConfigMap"]);
    Ok(())
}

#[test]
fn test_allow_and_deny_entries() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(
        &[("mixed", &source, "    kinds:\n      - deployment\n      - \"!secret\"\n")],
        APP_VALUES,
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    assert_eq!(kinds_of(&output.stdout), vec!["Deployment"]);
    assert!(output.stdout.contains("name: demo"));
    Ok(())
}

#[test]
fn test_deny_only_filter() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(
        &[("mixed", &source, "    kinds: [\"!Secret\"]\n")],
        APP_VALUES,
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    assert_eq!(kinds_of(&output.stdout), vec!["Deployment", "ConfigMap"]);
    Ok(())
}

#[test]
fn test_namespace_never_emitted_even_when_listed() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(
        &[("mixed", &source, "    kinds: [Namespace, ConfigMap]\n")],
        APP_VALUES,
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    assert_eq!(kinds_of(&output.stdout), vec!["ConfigMap"]);
    Ok(())
}

#[test]
fn test_exclude_kinds_override() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let mut config = run_config(&[("mixed", &source, "")], APP_VALUES);
    config.push_str("excludeKinds: [Secret]\n");
    let config = project.write_config(&config)?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    assert_eq!(kinds_of(&output.stdout), vec!["Deployment", "ConfigMap", "Namespace"]);
    Ok(())
}
