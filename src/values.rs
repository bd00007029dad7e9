//! Flattening of the nested `values` tree into template variables.
//!
//! A nested mapping such as
//!
//! ```yaml
//! nginx:
//!   cpu:
//!     limit: "1000m"
//!   replicas: 2
//! ```
//!
//! becomes the flat mapping `{ nginx_cpu_limit: "1000m", nginx_replicas: 2 }`, so that
//! templates can address every leaf with a single identifier (`{{ nginx_cpu_limit }}`).
//!
//! Only mappings are expanded. Sequences, scalars and strings are leaves and are stored
//! unchanged under the joined key.
//!
//! # Key collisions
//!
//! Distinct paths may join to the same key (`a_b` at the root and `b` under `a`). Keys are
//! visited in lexical order at every level, so the lexically later path always wins and the
//! outcome does not depend on how the YAML mapping happens to be ordered.

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Separator used when joining nested keys.
pub const KEY_SEPARATOR: &str = "_";

/// Flattened, template-addressable values.
pub type FlatValues = BTreeMap<String, Value>;

/// Flatten a nested mapping into a single-level mapping keyed by `_`-joined paths.
///
/// The input is never modified.
///
/// # Examples
///
/// ```rust
/// use inflator_cli::values::flatten;
///
/// let values: serde_yaml::Mapping = serde_yaml::from_str("a:\n  b:\n    c: 1\n").unwrap();
/// let flat = flatten(&values);
/// assert_eq!(flat["a_b_c"], serde_yaml::Value::from(1));
/// ```
#[must_use]
pub fn flatten(values: &Mapping) -> FlatValues {
    let mut dest = FlatValues::new();
    flatten_into("", values, &mut dest);
    dest
}

fn flatten_into(prefix: &str, src: &Mapping, dest: &mut FlatValues) {
    let mut entries: Vec<(String, &Value)> =
        src.iter().map(|(key, value)| (key_to_string(key), value)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, value) in entries {
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}{KEY_SEPARATOR}{key}")
        };

        match value {
            Value::Mapping(child) => flatten_into(&path, child, dest),
            leaf => {
                if dest.insert(path.clone(), leaf.clone()).is_some() {
                    tracing::warn!("Flattened value key '{}' is produced by more than one path", path);
                }
            }
        }
    }
}

/// YAML allows non-string keys; they are joined using their scalar spelling.
fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
