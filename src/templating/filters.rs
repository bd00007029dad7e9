//! Helper filters available to every template.
//!
//! | Filter | Alias | Purpose |
//! |---|---|---|
//! | `to_yaml` | `toYaml` | YAML serialisation of any value, trailing newline trimmed |
//! | `handle_env_vars` | `handleEnvVars` | JSON object string → flat string map |
//! | `nindent(width=N)` | | newline followed by the value indented by `N` spaces |
//! | `indent(width=N)` | | the value indented by `N` spaces |
//!
//! # Examples
//!
//! ```yaml
//! spec:
//!   template:
//!     spec:
//!       containers:
//!         - name: app
//!           resources: {{ nginx_resources | to_yaml | nindent(width=12) }}
//!           env:
//!           {% for key, value in app_env | handle_env_vars %}
//!             - name: {{ key }}
//!               value: "{{ value }}"
//!           {% endfor %}
//! ```

use std::collections::{BTreeMap, HashMap};
use tera::{Tera, Value};

use crate::core::InflatorError;

/// Register every helper filter (and its alias) on `tera`.
pub fn register_all(tera: &mut Tera) {
    tera.register_filter("to_yaml", to_yaml);
    tera.register_filter("toYaml", to_yaml);
    tera.register_filter("handle_env_vars", handle_env_vars);
    tera.register_filter("handleEnvVars", handle_env_vars);
    tera.register_filter("nindent", nindent);
    tera.register_filter("indent", indent);
}

/// Serialise the value as YAML.
pub fn to_yaml(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| tera::Error::msg(format!("to_yaml: failed to serialise value: {e}")))?;
    Ok(Value::String(yaml.trim_end_matches('\n').to_string()))
}

/// Decode a JSON object string into a flat string map.
///
/// Non-string input yields an empty map. Malformed JSON, or an object with non-string values,
/// fails the render.
pub fn handle_env_vars(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let Some(raw) = value.as_str() else {
        return Ok(Value::Object(serde_json::Map::new()));
    };

    let envs: BTreeMap<String, String> = serde_json::from_str(raw).map_err(|e| {
        tera::Error::msg(
            InflatorError::HelperInputError {
                helper: "handle_env_vars".to_string(),
                reason: e.to_string(),
            }
            .to_string(),
        )
    })?;

    Ok(Value::Object(envs.into_iter().map(|(k, v)| (k, Value::String(v))).collect()))
}

/// Prefix every line with a newline-led indentation.
pub fn nindent(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let indented = indent_text(&value_to_text(value), width_arg("nindent", args)?);
    Ok(Value::String(format!("\n{indented}")))
}

/// Indent every line.
pub fn indent(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(indent_text(&value_to_text(value), width_arg("indent", args)?)))
}

fn width_arg(filter: &str, args: &HashMap<String, Value>) -> tera::Result<usize> {
    match args.get("width") {
        None => Ok(0),
        Some(width) => width
            .as_u64()
            .and_then(|w| usize::try_from(w).ok())
            .ok_or_else(|| tera::Error::msg(format!("{filter}: `width` must be a non-negative integer"))),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn indent_text(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.split('\n').map(|line| format!("{pad}{line}")).collect::<Vec<_>>().join("\n")
}
