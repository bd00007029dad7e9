use anyhow::Result;
use inflator_cli::cache::fnv1a_32;
use std::fs;

use crate::common::{TestProject, documents, run_config};
use crate::fixtures::SourceFixture;

const APP_VALUES: &str = "  app:\n    name: demo\n";

#[test]
fn test_existing_slot_is_reused() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(&[("mixed", &source, "")], APP_VALUES))?;
    let config = config.to_str().unwrap();

    let first = project.run_inflator(&[config])?;
    first.assert_success();
    assert_eq!(project.cache_slots()?.len(), 1);

    // Upstream changes are not seen while the slot exists
    fs::write(source.join("a-deployment.yaml.tpl"), "kind: Deployment\nmetadata:\n  name: changed\n")?;

    let second = project.run_inflator(&[config])?;
    second.assert_success();
    assert_eq!(second.stdout, first.stdout);
    Ok(())
}

#[test]
fn test_pull_always_refetches() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(&[("mixed", &source, "")], APP_VALUES))?;
    let config = config.to_str().unwrap();

    project.run_inflator(&[config])?.assert_success();
    fs::write(source.join("a-deployment.yaml.tpl"), "kind: Deployment\nmetadata:\n  name: changed\n")?;

    let output = project.run_inflator(&["--pull", "always", config])?;
    output.assert_success();
    assert!(documents(&output.stdout)[0].contains("name: changed"));
    Ok(())
}

#[test]
fn test_per_dependency_pull_policy() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config =
        project.write_config(&run_config(&[("mixed", &source, "    pull: Always\n")], APP_VALUES))?;
    let config = config.to_str().unwrap();

    project.run_inflator(&[config])?.assert_success();
    fs::remove_file(source.join("b-secret.yaml.tpl"))?;

    // The refetch clears the slot, so the stale rendered Secret is gone too
    let output = project.run_inflator(&[config])?;
    output.assert_success();
    assert_eq!(documents(&output.stdout).len(), 2);
    Ok(())
}

#[test]
fn test_slot_names_follow_reference() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::nginx())?;
    let config = project.write_config(&format!(
        "dependencies:\n  - name: nginx\n    repo: \"file://{}?ref=release/1.2\"\nvalues:\n  nginx:\n    cpu:\n      limit: 1\n    tag: x\n    port: 80\n",
        source.display()
    ))?;

    project.run_inflator(&[config.to_str().unwrap()])?.assert_success();
    let expected = format!("nginx-release_1.2-{:08x}", fnv1a_32(b"release/1.2"));
    assert_eq!(project.cache_slots()?, vec![expected]);
    Ok(())
}

#[test]
fn test_cleanup_always_removes_persistent_cache() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(&[("mixed", &source, "")], APP_VALUES))?;

    let output = project.run_inflator(&["--cleanup", "always", config.to_str().unwrap()])?;
    output.assert_success();
    assert_eq!(documents(&output.stdout).len(), 3);
    assert!(!project.cache_path().exists());
    Ok(())
}

#[test]
fn test_cache_root_derived_from_plugin_config_root() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::mixed_kinds())?;
    let config = project.write_config(&run_config(&[("mixed", &source, "")], APP_VALUES))?;

    let site = project.project_path().join("site");
    let overlay = site.join("envs/dev/apps");
    fs::create_dir_all(&overlay)?;

    let output = project.run_inflator_with_env(
        &[config.to_str().unwrap()],
        &[("KUSTOMIZE_PLUGIN_CONFIG_ROOT", &overlay.display().to_string())],
    )?;
    output.assert_success();

    let repos = site.join("repos");
    assert!(repos.is_dir());
    assert_eq!(fs::read_dir(&repos)?.count(), 1);
    Ok(())
}
