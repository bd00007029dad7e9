//! Inflator - remote manifest template generator
//!
//! A generator plugin for a declarative manifest orchestrator. Given a run configuration
//! listing remote template repositories and a tree of values, it fetches every repository
//! into a cache workspace, renders the templates it finds there, and writes the selected
//! rendered manifests to stdout as one YAML document stream.
//!
//! # Architecture Overview
//!
//! A run goes through four stages, each finishing for every dependency before the next one
//! starts:
//!
//! 1. **Flatten** - the nested `values` tree becomes flat `a_b_c` template variables
//! 2. **Fetch** - each dependency gets a cache slot in the workspace; missing slots are
//!    filled by a transfer program (`go-getter` by default), existing ones are reused
//!    unless the pull policy says otherwise
//! 3. **Render** - every `*.t*pl` file below the dependency is rendered next to its
//!    source as `<base>.rendered.yaml`
//! 4. **Aggregate** - every `*.rendered.y*ml` file is parsed, filtered by kind and
//!    appended to the output stream
//!
//! # Core Modules
//!
//! - [`config`] - run configuration document and process-wide run settings
//! - [`values`] - flattening of the values tree into template variables
//! - [`cache`] - workspace layout, cache slot naming and cleanup
//! - [`fetch`] - the transfer collaborator, credentials and parallel fetching
//! - [`pattern`] - glob-based file discovery
//! - [`templating`] - template rendering, filters and error reporting
//! - [`manifest`] - kind filtering and output stream aggregation
//! - [`pipeline`] - orchestration of a run
//! - [`cli`] - the `inflator` command line
//! - [`core`] - error types and user-facing error formatting
//!
//! # Run Configuration
//!
//! ```yaml
//! apiVersion: generators.example.com/v1
//! kind: GotplInflator
//! metadata:
//!   name: platform
//! dependencies:
//!   - name: nginx
//!     repo: git::https://github.com/example/charts//nginx?ref=v1.2.0
//!     kinds: [Deployment, Service]
//! values:
//!   nginx:
//!     cpu:
//!       limit: 1000m
//! ```
//!
//! With the values above, templates of every dependency can use `{{ nginx_cpu_limit }}`.
//!
//! # Output
//!
//! ```text
//!
//! ---
//! <manifest>
//! ---
//! <manifest>
//! ---
//! ```
//!
//! A failing stage aborts the run with a non-zero exit and no output.

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod fetch;
pub mod manifest;
pub mod pattern;
pub mod pipeline;
pub mod templating;
pub mod values;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
