//! Credential pass-through for the transfer collaborator.
//!
//! `repoCreds` is a comma-separated list of `key=value` entries. The only key understood
//! today is `sshkey=<path>`: the private key is read, trimmed, base64-encoded and handed to
//! the transfer program as an `sshkey` query parameter on the source URI. Other keys are
//! skipped so that newer configurations keep working with this version.

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::constants::SSH_KEY_CREDENTIAL;
use crate::core::InflatorError;

const REDACTED: &str = "<redacted>";

/// Build the URI handed to the transfer collaborator.
///
/// Credential parameters are joined with `?` when the URI has no query yet, `&` otherwise.
pub async fn transfer_uri(source_uri: &str, credential_ref: Option<&str>) -> Result<String> {
    let Some(credential_ref) = credential_ref.filter(|c| !c.trim().is_empty()) else {
        return Ok(source_uri.to_string());
    };

    let mut uri = source_uri.to_string();
    for entry in credential_ref.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((key, value)) = entry.split_once('=') else {
            tracing::debug!(target: "fetch", "Ignoring malformed credential entry without '='");
            continue;
        };

        match key.trim() {
            SSH_KEY_CREDENTIAL => {
                let path = value.trim();
                let key_material = tokio::fs::read_to_string(path).await.map_err(|e| {
                    InflatorError::CredentialError {
                        path: path.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                let encoded = STANDARD.encode(key_material.trim());
                let separator = if uri.contains('?') { '&' } else { '?' };
                uri.push(separator);
                uri.push_str(&format!("{SSH_KEY_CREDENTIAL}={encoded}"));
            }
            other => {
                tracing::debug!(target: "fetch", "Ignoring unsupported credential key '{}'", other);
            }
        }
    }

    Ok(uri)
}

/// Hide credential values in a URI before it is logged or reported.
#[must_use]
pub fn redact(uri: &str) -> String {
    let marker = format!("{SSH_KEY_CREDENTIAL}=");
    let mut result = String::with_capacity(uri.len());
    let mut rest = uri;

    while let Some(index) = rest.find(&marker) {
        let value_start = index + marker.len();
        result.push_str(&rest[..value_start]);
        result.push_str(REDACTED);
        rest = &rest[value_start..];
        let value_end = rest.find('&').unwrap_or(rest.len());
        rest = &rest[value_end..];
    }
    result.push_str(rest);
    result
}
