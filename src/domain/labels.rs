//! Reverse-name lookup for label hashes.
//!
//! Label hashes are one-way; recovering the text label requires an
//! external oracle (a preimage database, a rainbow table service).
//! [`LabelSource`] is the seam: the tree maintainer asks it for the
//! text form and falls back to a bracketed hex placeholder on a miss.

use std::collections::HashMap;

use alloy_primitives::{B256, keccak256};

/// Oracle resolving a label hash back to its text form.
pub trait LabelSource: Send + Sync {
    /// Returns the text label whose keccak-256 hash is `labelhash`, when
    /// known.
    fn name_by_hash(&self, labelhash: &B256) -> Option<String>;
}

/// Null oracle: every lookup misses. Domains get placeholder labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLabels;

impl LabelSource for NoLabels {
    fn name_by_hash(&self, _labelhash: &B256) -> Option<String> {
        None
    }
}

/// Map-backed oracle over a fixed set of known labels.
#[derive(Debug, Clone, Default)]
pub struct StaticLabels {
    by_hash: HashMap<B256, String>,
}

impl StaticLabels {
    /// Creates an empty oracle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an oracle knowing every label in `labels`.
    #[must_use]
    pub fn with<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut source = Self::new();
        for label in labels {
            source.insert(label);
        }
        source
    }

    /// Registers one label under its keccak-256 hash.
    pub fn insert(&mut self, label: &str) {
        self.by_hash.insert(keccak256(label), label.to_string());
    }
}

impl LabelSource for StaticLabels {
    fn name_by_hash(&self, labelhash: &B256) -> Option<String> {
        self.by_hash.get(labelhash).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn no_labels_always_misses() {
        assert!(NoLabels.name_by_hash(&keccak256("eth")).is_none());
    }

    #[test]
    fn static_labels_resolve_registered_hashes() {
        let labels = StaticLabels::with(["eth", "tkn"]);
        assert_eq!(labels.name_by_hash(&keccak256("tkn")).as_deref(), Some("tkn"));
        assert_eq!(labels.name_by_hash(&keccak256("eth")).as_deref(), Some("eth"));
        assert!(labels.name_by_hash(&keccak256("unknown")).is_none());
    }
}
