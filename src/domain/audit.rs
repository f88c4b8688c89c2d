//! Append-only audit records for applied registry events.
//!
//! One record is appended per qualifying inbound log, keyed by
//! `<blockNumber>-<logIndex>`. Records are never mutated after creation;
//! they form the queryable history of the indexed namespace.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use super::node_id::{EventId, NodeId, ResolverId};
use super::registry_event::LogMeta;

/// The empty-address sentinel used when a record has no resolver id.
#[must_use]
pub fn empty_address_sentinel() -> String {
    format!("{:#x}", Address::ZERO)
}

/// Event-specific payload of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditPayload {
    /// A subnode was assigned its first owner and name.
    NewOwner {
        /// The parent node under which the subnode was created.
        parent_domain: NodeId,
        /// The assigned owner.
        owner: Address,
    },

    /// Ownership of a domain changed hands.
    Transfer {
        /// The new owner.
        owner: Address,
    },

    /// A resolver was attached or detached.
    NewResolver {
        /// The resolver id, or the empty-address sentinel when none was
        /// assigned (zero-address resolver, or the domain was absent).
        resolver: String,
    },

    /// A record time-to-live changed.
    NewTtl {
        /// The new time-to-live in seconds.
        ttl: u64,
    },
}

impl AuditPayload {
    /// Builds a `NewResolver` payload from an optional resolver id,
    /// falling back to the empty-address sentinel.
    #[must_use]
    pub fn new_resolver(resolver: Option<ResolverId>) -> Self {
        Self::NewResolver {
            resolver: resolver.map_or_else(empty_address_sentinel, |r| r.to_string()),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::NewOwner { .. } => "new_owner",
            Self::Transfer { .. } => "transfer",
            Self::NewResolver { .. } => "new_resolver",
            Self::NewTtl { .. } => "new_ttl",
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record id: `<blockNumber>-<logIndex>`.
    pub id: EventId,

    /// Block the originating log occurred in.
    pub block_number: u64,

    /// Hash of the emitting transaction.
    pub tx_hash: B256,

    /// The domain the record concerns.
    pub domain: NodeId,

    /// Event-specific payload.
    pub payload: AuditPayload,
}

impl AuditRecord {
    /// Builds a record for `domain` from the log's block coordinates.
    #[must_use]
    pub const fn new(meta: &LogMeta, domain: NodeId, payload: AuditPayload) -> Self {
        Self {
            id: meta.event_id(),
            block_number: meta.block_number,
            tx_hash: meta.tx_hash,
            domain,
            payload,
        }
    }
}
