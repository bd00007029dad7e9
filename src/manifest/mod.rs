//! Rendered manifest aggregation.
//!
//! After rendering, every dependency directory holds `*.rendered.yaml` files. The aggregator
//! walks them in dependency order (and lexical path order within a dependency), parses each,
//! and appends the accepted ones verbatim to an [`OutputStream`]:
//!
//! ```text
//!
//! ---
//! <manifest 1>
//! ---
//! <manifest 2>
//! ---
//! ```
//!
//! A manifest is included or dropped as a whole, based on its `kind`:
//!
//! 1. Kinds listed in the run-wide `excludeKinds` (default `Namespace`) are always dropped,
//!    so independently rendered dependencies never declare the same namespace twice.
//! 2. `!kind` entries in the dependency's `kinds` drop the kind.
//! 3. An empty `kinds` list, or one listing the kind, includes it.
//! 4. Anything else is dropped.
//!
//! Manifests without a `kind` are fragments and are skipped silently. A manifest that does
//! not parse aborts the run.

pub mod aggregator;
pub mod kind_filter;

pub use aggregator::{AggregateReport, OutputStream, aggregate_dependency, document_kind};
pub use kind_filter::{KindDecision, KindFilter};
