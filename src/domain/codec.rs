//! Node-identifier derivation and byte/hex helpers.
//!
//! Subnode derivation is the keccak-256 hash of the 64-byte
//! concatenation of a parent node hash and a label hash. All helpers
//! are pure; hex decoding is the only fallible operation.

use alloy_primitives::{B256, hex, keccak256};

use crate::domain::node_id::NodeId;
use crate::error::IndexerError;

/// Derives the node id of `label` under `node`.
///
/// Deterministic: `keccak256(node || label)`.
#[must_use]
pub fn subnode_hash(node: B256, label: B256) -> NodeId {
    let mut preimage = Vec::with_capacity(64);
    preimage.extend_from_slice(node.as_slice());
    preimage.extend_from_slice(label.as_slice());
    NodeId::new(keccak256(&preimage))
}

/// Decodes `0x`-prefixed or bare hex into bytes.
///
/// # Errors
///
/// Returns [`IndexerError::MalformedInput`] on an odd number of hex
/// characters or a non-hex digit.
pub fn bytes_from_hex(s: &str) -> Result<Vec<u8>, IndexerError> {
    hex::decode(s).map_err(|e| IndexerError::MalformedInput(format!("hex {s:?}: {e}")))
}

/// Renders the bracketed placeholder used when a label hash cannot be
/// reversed to its text form: `"[" + hex(label) + "]"` without a `0x`
/// prefix.
#[must_use]
pub fn placeholder_label(label: &B256) -> String {
    format!("[{label:x}]")
}

/// Returns `true` when `label` is usable as a name segment.
///
/// Labels containing a NUL byte or the `.` separator would corrupt
/// composed dotted names and are rejected with a warning.
#[must_use]
pub fn valid_label(label: &str) -> bool {
    for c in label.chars() {
        if c == '\0' {
            tracing::warn!(label, "invalid label contained null byte; skipping");
            return false;
        }
        if c == '.' {
            tracing::warn!(label, "invalid label contained separator '.'; skipping");
            return false;
        }
    }
    true
}
