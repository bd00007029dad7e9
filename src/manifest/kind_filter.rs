//! Kind-based inclusion policy for rendered manifests.

use std::collections::HashSet;

/// Why a document was kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindDecision {
    /// Included: the filter is empty or lists the kind
    Included,
    /// Dropped by a `!kind` entry of the dependency
    Denied,
    /// Dropped because the non-empty filter does not list the kind
    NotListed,
    /// Dropped by the run-wide `excludeKinds`
    Excluded,
}

impl KindDecision {
    /// Whether the document goes into the output stream.
    #[must_use]
    pub const fn is_included(self) -> bool {
        matches!(self, Self::Included)
    }
}

/// Parsed `kinds` filter of one dependency plus the run-wide exclusions.
///
/// All comparisons are case-insensitive.
///
/// ```rust
/// use inflator_cli::manifest::{KindDecision, KindFilter};
///
/// let filter = KindFilter::new(
///     &["deployment".to_string(), "!secret".to_string()],
///     &["Namespace".to_string()],
/// );
/// assert_eq!(filter.decide("Deployment"), KindDecision::Included);
/// assert_eq!(filter.decide("Secret"), KindDecision::Denied);
/// assert_eq!(filter.decide("ConfigMap"), KindDecision::NotListed);
/// assert_eq!(filter.decide("Namespace"), KindDecision::Excluded);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KindFilter {
    allow: HashSet<String>,
    deny: HashSet<String>,
    excluded: HashSet<String>,
}

impl KindFilter {
    /// Build from a dependency's `kinds` entries and the run's `excludeKinds`.
    pub fn new(kinds: &[String], excluded: &[String]) -> Self {
        let mut allow = HashSet::new();
        let mut deny = HashSet::new();

        for entry in kinds {
            let entry = entry.trim();
            match entry.strip_prefix('!') {
                Some(kind) => deny.insert(kind.trim().to_lowercase()),
                None => allow.insert(entry.to_lowercase()),
            };
        }

        Self {
            allow,
            deny,
            excluded: excluded.iter().map(|k| k.trim().to_lowercase()).collect(),
        }
    }

    /// Decide whether a document of `kind` is included.
    #[must_use]
    pub fn decide(&self, kind: &str) -> KindDecision {
        let kind = kind.to_lowercase();

        if self.excluded.contains(&kind) {
            KindDecision::Excluded
        } else if self.deny.contains(&kind) {
            KindDecision::Denied
        } else if self.allow.is_empty() || self.allow.contains(&kind) {
            KindDecision::Included
        } else {
            KindDecision::NotListed
        }
    }
}
