//! Type-safe identifiers for tree nodes, resolvers, and audit records.
//!
//! [`NodeId`] is a newtype wrapper around a 32-byte node hash providing
//! type safety so that node identifiers cannot be confused with other
//! 32-byte values. Its canonical textual form is lowercase `0x`-prefixed
//! hex, which is also the key used in the entity store.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, b256};
use serde::{Deserialize, Serialize};

use crate::domain::codec;
use crate::error::IndexerError;

/// The zero node: root of the naming tree.
pub const ROOT_NODE: NodeId = NodeId(B256::ZERO);

/// The distinguished reserved node under the root (`namehash("eth")`).
/// Seeded together with [`ROOT_NODE`] so that chains of parent lookups
/// always terminate.
pub const RESERVED_NODE: NodeId = NodeId(b256!(
    "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
));

/// Unique identifier for one node in the naming tree.
///
/// Derived by hashing a parent node with a label hash (see
/// [`codec::subnode_hash`]). Immutable once assigned; used as the
/// primary key for [`crate::domain::Domain`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(B256);

impl NodeId {
    /// Wraps a raw 32-byte node hash.
    #[must_use]
    pub const fn new(hash: B256) -> Self {
        Self(hash)
    }

    /// Returns the inner 32-byte hash.
    #[must_use]
    pub const fn as_hash(&self) -> &B256 {
        &self.0
    }

    /// Returns `true` for the zero root node.
    #[must_use]
    pub fn is_root(&self) -> bool {
        *self == ROOT_NODE
    }

    /// Parses a node id from `0x`-prefixed or bare hex.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::MalformedInput`] on odd-length hex, invalid
    /// hex digits, or a byte width other than 32.
    pub fn from_hex(s: &str) -> Result<Self, IndexerError> {
        let bytes = codec::bytes_from_hex(s)?;
        let hash = B256::try_from(bytes.as_slice())
            .map_err(|_| IndexerError::MalformedInput(format!("node id must be 32 bytes: {s}")))?;
        Ok(Self(hash))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<B256> for NodeId {
    fn from(hash: B256) -> Self {
        Self(hash)
    }
}

impl From<NodeId> for B256 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Identifier of one (resolver address, node) pairing.
///
/// Rendered as `<resolver-address>-<node-id>`, the store key of
/// [`crate::domain::Resolver`] records. The address component
/// participates in the domain emptiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ResolverId {
    /// Resolver contract address.
    pub address: Address,
    /// Node the resolver is attached to.
    pub node: NodeId,
}

impl ResolverId {
    /// Composes a resolver id from its two parts.
    #[must_use]
    pub const fn new(address: Address, node: NodeId) -> Self {
        Self { address, node }
    }
}

impl fmt::Display for ResolverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}-{}", self.address, self.node)
    }
}

impl FromStr for ResolverId {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, node) = s
            .split_once('-')
            .ok_or_else(|| IndexerError::MalformedInput(format!("resolver id without '-': {s}")))?;
        let address = Address::from_str(address)
            .map_err(|e| IndexerError::MalformedInput(format!("resolver address: {e}")))?;
        let node = NodeId::from_hex(node)?;
        Ok(Self { address, node })
    }
}

impl From<ResolverId> for String {
    fn from(id: ResolverId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ResolverId {
    type Error = IndexerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Identifier of one append-only audit record: `<blockNumber>-<logIndex>`.
///
/// Globally unique and monotonic under correctly ordered delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EventId {
    /// Block the log event occurred in.
    pub block_number: u64,
    /// Index of the log within the block.
    pub log_index: u64,
}

impl EventId {
    /// Composes an event id from block coordinates.
    #[must_use]
    pub const fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.block_number, self.log_index)
    }
}

impl FromStr for EventId {
    type Err = IndexerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (block, index) = s
            .split_once('-')
            .ok_or_else(|| IndexerError::MalformedInput(format!("event id without '-': {s}")))?;
        let block_number = block
            .parse()
            .map_err(|_| IndexerError::MalformedInput(format!("event id block: {s}")))?;
        let log_index = index
            .parse()
            .map_err(|_| IndexerError::MalformedInput(format!("event id log index: {s}")))?;
        Ok(Self {
            block_number,
            log_index,
        })
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for EventId {
    type Error = IndexerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
