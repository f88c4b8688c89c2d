//! Persistent entities: domains, resolvers, and accounts.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use super::node_id::{NodeId, ResolverId};

/// One node in the naming tree.
///
/// Created lazily the first time any event references its node id. The
/// `id` is the primary key in the entity store and immutable after
/// creation. The zero address in `owner` is the "no owner" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Node identifier (32-byte hash, lowercase hex form).
    pub id: NodeId,

    /// Current owner; `Address::ZERO` means unowned.
    pub owner: Address,

    /// Back-reference to the parent domain's id, set once the node has
    /// been placed in the tree.
    #[serde(default)]
    pub parent: Option<NodeId>,

    /// Number of direct children currently tracked under this node.
    pub subdomain_count: u64,

    /// Reference to the attached [`Resolver`], if any.
    #[serde(default)]
    pub resolver: Option<ResolverId>,

    /// Target address cached from the resolver.
    #[serde(default)]
    pub resolved_address: Option<Address>,

    /// Record time-to-live, when one has been announced.
    #[serde(default)]
    pub ttl: Option<u64>,

    /// Reversed text form of this node's label within its parent.
    #[serde(default)]
    pub label_name: Option<String>,

    /// Hash of this node's label within its parent.
    #[serde(default)]
    pub labelhash: Option<B256>,

    /// Fully composed dotted name; absent until resolvable.
    #[serde(default)]
    pub name: Option<String>,

    /// `true` once the current registry owns this node's lifecycle;
    /// `false` while the legacy registry is still authoritative.
    pub is_migrated: bool,

    /// Block timestamp of first creation.
    pub created_at: u64,
}

impl Domain {
    /// Creates a fresh, unplaced domain for `id`.
    #[must_use]
    pub const fn new(id: NodeId, created_at: u64) -> Self {
        Self {
            id,
            owner: Address::ZERO,
            parent: None,
            subdomain_count: 0,
            resolver: None,
            resolved_address: None,
            ttl: None,
            label_name: None,
            labelhash: None,
            name: None,
            is_migrated: false,
            created_at,
        }
    }

    /// Creates one of the two sentinel root domains seeded at bootstrap:
    /// unowned, permanently migrated, so parent-lookup chains terminate.
    #[must_use]
    pub const fn sentinel(id: NodeId) -> Self {
        let mut domain = Self::new(id, 0);
        domain.is_migrated = true;
        domain
    }

    /// A domain is empty when it is unowned, tracks no children, and has
    /// no resolver (or the resolver id's address component is the zero
    /// address). Empty domains stop contributing to their parent's
    /// subdomain count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner == Address::ZERO
            && self.subdomain_count == 0
            && self.resolver.is_none_or(|r| r.address == Address::ZERO)
    }
}

/// One (resolver address, node) pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolver {
    /// Composed identifier `<resolver-address>-<node-id>`.
    pub id: ResolverId,

    /// The domain this resolver resolves.
    pub domain: NodeId,

    /// The resolver contract's address.
    pub address: Address,

    /// Cached resolved target address. Populated externally; this core
    /// only ever initializes it to `None`.
    #[serde(default)]
    pub addr: Option<Address>,
}

impl Resolver {
    /// Creates a brand-new resolver pairing with no cached target.
    #[must_use]
    pub const fn new(id: ResolverId, domain: NodeId) -> Self {
        Self {
            id,
            domain,
            address: id.address,
            addr: None,
        }
    }
}

/// An address seen as a domain owner. Created idempotently on first
/// sight; carries no further state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The owner address.
    pub id: Address,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::node_id::{RESERVED_NODE, ROOT_NODE};

    #[test]
    fn fresh_domain_is_empty() {
        let domain = Domain::new(RESERVED_NODE, 1_600_000_000);
        assert!(domain.is_empty());
        assert_eq!(domain.subdomain_count, 0);
        assert!(!domain.is_migrated);
    }

    #[test]
    fn owned_domain_is_not_empty() {
        let mut domain = Domain::new(RESERVED_NODE, 0);
        domain.owner = Address::repeat_byte(0x01);
        assert!(!domain.is_empty());
    }

    #[test]
    fn domain_with_children_is_not_empty() {
        let mut domain = Domain::new(RESERVED_NODE, 0);
        domain.subdomain_count = 1;
        assert!(!domain.is_empty());
    }

    #[test]
    fn resolver_with_zero_address_keeps_domain_empty() {
        let mut domain = Domain::new(RESERVED_NODE, 0);
        domain.resolver = Some(ResolverId::new(Address::ZERO, RESERVED_NODE));
        assert!(domain.is_empty());

        domain.resolver = Some(ResolverId::new(Address::repeat_byte(0x02), RESERVED_NODE));
        assert!(!domain.is_empty());
    }

    #[test]
    fn sentinel_is_migrated_and_empty() {
        let sentinel = Domain::sentinel(ROOT_NODE);
        assert!(sentinel.is_migrated);
        assert!(sentinel.is_empty());
        assert_eq!(sentinel.created_at, 0);
    }

    #[test]
    fn domain_serde_round_trip() {
        let mut domain = Domain::new(RESERVED_NODE, 42);
        domain.owner = Address::repeat_byte(0x03);
        domain.parent = Some(ROOT_NODE);
        domain.name = Some("eth".to_string());

        let json = serde_json::to_string(&domain).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let back: Option<Domain> = serde_json::from_str(&json).ok();
        let Some(back) = back else {
            panic!("deserialization failed");
        };
        assert_eq!(back, domain);
    }
}
