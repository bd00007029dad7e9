/// Template source tree laid out into a test source directory
pub struct SourceFixture {
    pub name: String,
    pub files: Vec<(String, String)>,
}

impl SourceFixture {
    fn new(name: &str, files: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            files: files.iter().map(|(p, c)| ((*p).to_string(), (*c).to_string())).collect(),
        }
    }

    /// One Deployment and one Service, using `nginx_*` values
    pub fn nginx() -> Self {
        Self::new(
            "nginx",
            &[
                (
                    "deployment.yaml.tpl",
                    r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: nginx
spec:
  template:
    spec:
      containers:
        - name: nginx
          image: "nginx:{{ nginx_tag }}"
          resources:
            limits:
              cpu: "{{ nginx_cpu_limit }}"
"#,
                ),
                (
                    "service.yaml.tpl",
                    r#"apiVersion: v1
kind: Service
metadata:
  name: nginx
spec:
  ports:
    - port: {{ nginx_port }}
"#,
                ),
            ],
        )
    }

    /// Deployment, Secret, ConfigMap and Namespace templates plus a kind-less fragment
    pub fn mixed_kinds() -> Self {
        Self::new(
            "mixed",
            &[
                ("a-deployment.yaml.tpl", "kind: Deployment\nmetadata:\n  name: {{ app_name }}\n"),
                ("b-secret.yaml.tpl", "kind: Secret\nmetadata:\n  name: {{ app_name }}\n"),
                ("c-configmap.yaml.tpl", "kind: ConfigMap\nmetadata:\n  name: {{ app_name }}\n"),
                ("d-namespace.yaml.tpl", "kind: Namespace\nmetadata:\n  name: {{ app_name }}\n"),
                ("e-fragment.yaml.tpl", "labels:\n  app: {{ app_name }}\n"),
            ],
        )
    }

    /// Plain manifests without a single template
    pub fn no_templates() -> Self {
        Self::new(
            "plain",
            &[("deployment.yaml", "kind: Deployment\n"), ("README.md", "# plain manifests\n")],
        )
    }

    /// Templates nested in a sub-directory of the source
    pub fn nested() -> Self {
        Self::new(
            "nested",
            &[
                ("charts/app/templates/cm.yaml.tpl", "kind: ConfigMap\ndata:\n  env: {{ env }}\n"),
                ("charts/other/cm.yaml.tpl", "kind: ConfigMap\ndata:\n  other: \"true\"\n"),
            ],
        )
    }

    /// A template referencing a variable that is never provided
    pub fn broken() -> Self {
        Self::new(
            "broken",
            &[("deployment.yaml.tpl", "kind: Deployment\nspec:\n  replicas: {{ replicas_count }}\n")],
        )
    }
}
