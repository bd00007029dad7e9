use anyhow::Result;

use crate::common::{TestProject, documents, run_config};
use crate::fixtures::SourceFixture;

const NGINX_VALUES: &str = "  nginx:\n    cpu:\n      limit: 1000m\n    tag: \"1.25\"\n    port: 8080\n";

#[test]
fn test_nginx_renders_two_documents() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::nginx())?;
    let config = project.write_config(&run_config(&[("nginx", &source, "")], NGINX_VALUES))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    assert!(output.stdout.starts_with("\n---\n"));
    assert!(output.stdout.ends_with("\n---\n"));

    let docs = documents(&output.stdout);
    assert_eq!(docs.len(), 2, "stdout: {}", output.stdout);
    assert!(docs[0].contains("kind: Deployment"));
    assert!(docs[0].contains(r#"cpu: "1000m""#));
    assert!(docs[0].contains(r#"image: "nginx:1.25""#));
    assert!(docs[1].contains("kind: Service"));
    assert!(docs[1].contains("port: 8080"));

    let deployment: serde_yaml::Value = serde_yaml::from_str(docs[0])?;
    let cpu = &deployment["spec"]["template"]["spec"]["containers"][0]["resources"]["limits"]["cpu"];
    assert_eq!(cpu.as_str(), Some("1000m"));
    Ok(())
}

#[test]
fn test_relative_source_resolved_from_working_directory() -> Result<()> {
    let project = TestProject::new()?;
    project.create_source(&SourceFixture::nginx())?;
    let config = project.write_config(&format!(
        "dependencies:\n  - name: nginx\n    repo: ../sources/nginx\nvalues:\n{NGINX_VALUES}"
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();
    assert_eq!(documents(&output.stdout).len(), 2);
    Ok(())
}

#[test]
fn test_source_without_templates_emits_separator_only() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::no_templates())?;
    let config = project.write_config(&run_config(&[("plain", &source, "")], ""))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();
    assert_eq!(output.stdout, "\n---\n");
    Ok(())
}

#[test]
fn test_sub_path_limits_rendering() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::nested())?;
    let config = project.write_config(&run_config(
        &[("app", &source, "    path: charts/app\n")],
        "  env: staging\n",
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    let docs = documents(&output.stdout);
    assert_eq!(docs, vec!["kind: ConfigMap\ndata:\n  env: staging"]);
    Ok(())
}

#[test]
fn test_dependencies_emitted_in_declared_order() -> Result<()> {
    let project = TestProject::new()?;
    let nginx = project.create_source(&SourceFixture::nginx())?;
    let nested = project.create_source(&SourceFixture::nested())?;
    let values = format!("{NGINX_VALUES}  env: prod\n");
    let config = project.write_config(&run_config(
        &[("second", &nested, "    path: charts/app\n"), ("first", &nginx, "")],
        &values,
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    let docs = documents(&output.stdout);
    assert_eq!(docs.len(), 3);
    assert!(docs[0].contains("kind: ConfigMap"));
    assert!(docs[1].contains("kind: Deployment"));
    assert!(docs[2].contains("kind: Service"));
    Ok(())
}

#[test]
fn test_custom_template_pattern() -> Result<()> {
    let project = TestProject::new()?;
    let source = project.create_source(&SourceFixture::nginx())?;
    std::fs::write(source.join("extra.gotmpl"), "kind: ConfigMap\ndata:\n  port: \"{{ nginx_port }}\"\n")?;
    let config = project.write_config(&run_config(
        &[("nginx", &source, "    templatePattern: \"*.gotmpl\"\n")],
        NGINX_VALUES,
    ))?;

    let output = project.run_inflator(&[config.to_str().unwrap()])?;
    output.assert_success();

    let docs = documents(&output.stdout);
    assert_eq!(docs, vec!["kind: ConfigMap\ndata:\n  port: \"8080\""]);
    Ok(())
}
