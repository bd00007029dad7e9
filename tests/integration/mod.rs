//! Integration test suite for the inflator
//!
//! End-to-end tests that run the `inflator` binary against local template sources, plus
//! library-level tests of the pipeline with a stubbed transfer.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **end_to_end**: rendering and aggregation through the binary
//! - **kind_filter**: `kinds` and `excludeKinds` handling
//! - **cache_reuse**: cache slots, pull policy and cleanup
//! - **error_scenarios**: failures, exit codes and error messages
//! - **pipeline**: the library pipeline with a stubbed transfer

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;
#[path = "../fixtures/mod.rs"]
mod fixtures;

mod cache_reuse;
mod end_to_end;
mod error_scenarios;
mod kind_filter;
