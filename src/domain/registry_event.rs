//! Inbound registry log events.
//!
//! Every state change in the naming registry arrives as a
//! [`RegistryLog`]: the event body, its block coordinates, and a tag
//! naming which registry emitted it. The same four event kinds flow from
//! both the current and the legacy registry during the migration window;
//! the [`crate::service::migration`] arbiter decides which apply.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use super::node_id::{EventId, NodeId};

/// Which registry emitted a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrySource {
    /// The current registry: always authoritative, stamps migration.
    Current,
    /// The legacy registry: authoritative only for unmigrated nodes.
    Legacy,
}

/// Block coordinates shared by every log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMeta {
    /// Block the event occurred in.
    pub block_number: u64,
    /// Index of the log within the block.
    pub log_index: u64,
    /// Hash of the emitting transaction.
    pub tx_hash: B256,
    /// Block timestamp in seconds.
    pub timestamp: u64,
}

impl LogMeta {
    /// The audit-record id for this log: `<blockNumber>-<logIndex>`.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        EventId::new(self.block_number, self.log_index)
    }
}

/// One registry log event body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A subnode of `node` identified by `label` was assigned an owner.
    NewOwner {
        /// Parent node hash.
        node: B256,
        /// Label hash of the subnode within the parent.
        label: B256,
        /// New owner of the subnode.
        owner: Address,
    },

    /// Ownership of `node` itself changed hands.
    Transfer {
        /// Node hash.
        node: B256,
        /// New owner.
        owner: Address,
    },

    /// A resolver contract was attached to (or detached from) `node`.
    NewResolver {
        /// Node hash.
        node: B256,
        /// Resolver contract address; the zero address detaches.
        resolver: Address,
    },

    /// The time-to-live of `node`'s record changed.
    NewTtl {
        /// Node hash.
        node: B256,
        /// New time-to-live in seconds.
        ttl: u64,
    },
}

impl RegistryEvent {
    /// The node this event primarily references. For `NewOwner` this is
    /// the parent node, not the derived subnode.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        match self {
            Self::NewOwner { node, .. }
            | Self::Transfer { node, .. }
            | Self::NewResolver { node, .. }
            | Self::NewTtl { node, .. } => NodeId::new(*node),
        }
    }

    /// Returns the event kind as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::NewOwner { .. } => "new_owner",
            Self::Transfer { .. } => "transfer",
            Self::NewResolver { .. } => "new_resolver",
            Self::NewTtl { .. } => "new_ttl",
        }
    }
}

/// A complete inbound log: source tag, block coordinates, event body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLog {
    /// Emitting registry.
    pub source: RegistrySource,
    /// Block coordinates.
    #[serde(flatten)]
    pub meta: LogMeta,
    /// Event body.
    pub event: RegistryEvent,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;

    #[test]
    fn decodes_a_jsonl_line() {
        let line = r#"{
            "source": "legacy",
            "block_number": 9380380,
            "log_index": 3,
            "tx_hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "timestamp": 1580000000,
            "event": {
                "kind": "new_owner",
                "node": "0x0000000000000000000000000000000000000000000000000000000000000000",
                "label": "0x4f5b812789fc606be1b3b16908db13fc7a9adf7ca72641f84d75b47069d3d7f0",
                "owner": "0x00000000000c2e074ec69a0dfb2997ba6c7d2e1e"
            }
        }"#;
        let log: Option<RegistryLog> = serde_json::from_str(line).ok();
        let Some(log) = log else {
            panic!("decode failed");
        };
        assert_eq!(log.source, RegistrySource::Legacy);
        assert_eq!(log.meta.event_id().to_string(), "9380380-3");
        assert_eq!(log.event.kind_str(), "new_owner");
        assert!(log.event.node().is_root());
    }

    #[test]
    fn event_node_is_the_parent_for_new_owner() {
        let event = RegistryEvent::NewOwner {
            node: keccak256("parent"),
            label: keccak256("child"),
            owner: Address::repeat_byte(0x01),
        };
        assert_eq!(event.node(), NodeId::new(keccak256("parent")));
    }

    #[test]
    fn kind_strings_are_stable() {
        let ttl = RegistryEvent::NewTtl {
            node: B256::ZERO,
            ttl: 300,
        };
        assert_eq!(ttl.kind_str(), "new_ttl");
        let transfer = RegistryEvent::Transfer {
            node: B256::ZERO,
            owner: Address::ZERO,
        };
        assert_eq!(transfer.kind_str(), "transfer");
    }
}
