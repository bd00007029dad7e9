//! Template rendering for dependency manifests
//!
//! Each dependency's template files (base name matching its `templatePattern`, `*.t*pl` by
//! default) are rendered with [Tera](https://keats.github.io/tera/) against the flattened
//! run values and written to a sibling `*.rendered.yaml` file, which the aggregator picks up.
//!
//! # Template syntax
//!
//! Values are available as top-level variables named by their flattened path:
//!
//! ```yaml
//! # values:
//! #   nginx:
//! #     cpu:
//! #       limit: "1000m"
//! apiVersion: apps/v1
//! kind: Deployment
//! spec:
//!   template:
//!     spec:
//!       containers:
//!         - name: nginx
//!           resources:
//!             limits:
//!               cpu: "{{ nginx_cpu_limit }}"
//! ```
//!
//! Tera's conditionals, loops and built-in filters are available, plus the helpers in
//! [`filters`]. Referencing an undefined variable is an error.
//!
//! # Errors
//!
//! Failures are reported as [`TemplateError`] with the template path, dependency name and,
//! for parse errors, the failing line with its surroundings.

pub mod error;
pub mod filters;
pub mod renderer;

pub use error::{ErrorLocation, TemplateError};
pub use renderer::{RenderedArtifact, TemplateRenderer, rendered_destination};
