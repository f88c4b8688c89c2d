//! Migration arbitration between the current and legacy registries.
//!
//! Both registries emit the same four event kinds while a migration is
//! in flight. Current-registry events always apply. A legacy-registry
//! event applies only while the legacy registry is still authoritative
//! for the touched node; once a node is migrated, stale legacy events
//! become no-ops.

use crate::domain::{NodeId, RegistryEvent, RegistryLog, RegistrySource, codec};
use crate::error::IndexerError;
use crate::persistence::EntityStore;

/// Decides whether `log` should be applied, based on its source registry
/// and the touched domain's migration flag.
///
/// # Errors
///
/// Returns [`IndexerError::Store`] when the read path fails.
pub async fn should_apply<S: EntityStore>(
    store: &S,
    log: &RegistryLog,
) -> Result<bool, IndexerError> {
    match log.source {
        RegistrySource::Current => Ok(true),
        RegistrySource::Legacy => legacy_applies(store, &log.event).await,
    }
}

/// Legacy-registry eligibility, per event kind:
/// - `NewOwner`: the target subnode does not exist yet, or is unmigrated;
/// - `NewResolver`: the node is the root, or exists unmigrated;
/// - `NewTtl` / `Transfer`: the node exists unmigrated.
///
/// A missing domain drops the event for every kind except `NewOwner`.
async fn legacy_applies<S: EntityStore>(
    store: &S,
    event: &RegistryEvent,
) -> Result<bool, IndexerError> {
    match event {
        RegistryEvent::NewOwner { node, label, .. } => {
            let subnode = codec::subnode_hash(*node, *label);
            Ok(store
                .load_domain(&subnode)
                .await?
                .is_none_or(|d| !d.is_migrated))
        }
        RegistryEvent::NewResolver { node, .. } => {
            let id = NodeId::new(*node);
            match store.load_domain(&id).await? {
                None => Ok(false),
                Some(domain) => Ok(id.is_root() || !domain.is_migrated),
            }
        }
        RegistryEvent::Transfer { node, .. } | RegistryEvent::NewTtl { node, .. } => Ok(store
            .load_domain(&NodeId::new(*node))
            .await?
            .is_some_and(|d| !d.is_migrated)),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::node_id::ROOT_NODE;
    use crate::domain::registry_event::LogMeta;
    use crate::domain::{Domain, RegistrySource};
    use crate::persistence::MemoryStore;
    use alloy_primitives::{Address, B256, keccak256};

    fn log(source: RegistrySource, event: RegistryEvent) -> RegistryLog {
        RegistryLog {
            source,
            meta: LogMeta {
                block_number: 1,
                log_index: 0,
                tx_hash: B256::ZERO,
                timestamp: 0,
            },
            event,
        }
    }

    async fn seed_domain(store: &MemoryStore, id: NodeId, migrated: bool) {
        let mut domain = Domain::new(id, 0);
        domain.is_migrated = migrated;
        let saved = store.save_domain(&domain).await;
        assert!(saved.is_ok());
    }

    #[tokio::test]
    async fn current_events_always_apply() {
        let store = MemoryStore::new();
        let event = RegistryEvent::NewTtl {
            node: keccak256("anything"),
            ttl: 60,
        };
        let decision = should_apply(&store, &log(RegistrySource::Current, event)).await;
        assert!(matches!(decision, Ok(true)));
    }

    #[tokio::test]
    async fn legacy_new_owner_applies_until_subnode_is_migrated() {
        let store = MemoryStore::new();
        let node = keccak256("parent");
        let label = keccak256("child");
        let event = RegistryEvent::NewOwner {
            node,
            label,
            owner: Address::repeat_byte(0x01),
        };

        // No subnode yet: applies.
        let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
        assert!(matches!(decision, Ok(true)));

        // Unmigrated subnode: still applies.
        let subnode = codec::subnode_hash(node, label);
        seed_domain(&store, subnode, false).await;
        let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
        assert!(matches!(decision, Ok(true)));

        // Migrated subnode: dropped.
        seed_domain(&store, subnode, true).await;
        let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
        assert!(matches!(decision, Ok(false)));
    }

    #[tokio::test]
    async fn legacy_new_resolver_requires_root_or_unmigrated() {
        let store = MemoryStore::new();
        let node = keccak256("some-node");
        let event = RegistryEvent::NewResolver {
            node,
            resolver: Address::repeat_byte(0x02),
        };

        // Missing domain: dropped.
        let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
        assert!(matches!(decision, Ok(false)));

        // Migrated non-root: dropped.
        seed_domain(&store, NodeId::new(node), true).await;
        let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
        assert!(matches!(decision, Ok(false)));

        // The root applies even when migrated.
        seed_domain(&store, ROOT_NODE, true).await;
        let root_event = RegistryEvent::NewResolver {
            node: *ROOT_NODE.as_hash(),
            resolver: Address::repeat_byte(0x02),
        };
        let decision = should_apply(&store, &log(RegistrySource::Legacy, root_event)).await;
        assert!(matches!(decision, Ok(true)));
    }

    #[tokio::test]
    async fn legacy_transfer_and_ttl_require_existing_unmigrated_domain() {
        let store = MemoryStore::new();
        let node = keccak256("node");
        let transfer = RegistryEvent::Transfer {
            node,
            owner: Address::repeat_byte(0x03),
        };
        let ttl = RegistryEvent::NewTtl { node, ttl: 300 };

        for event in [transfer, ttl] {
            let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
            assert!(matches!(decision, Ok(false)), "missing domain must drop");
        }

        seed_domain(&store, NodeId::new(node), false).await;
        for event in [transfer, ttl] {
            let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
            assert!(matches!(decision, Ok(true)), "unmigrated domain must apply");
        }

        seed_domain(&store, NodeId::new(node), true).await;
        for event in [transfer, ttl] {
            let decision = should_apply(&store, &log(RegistrySource::Legacy, event)).await;
            assert!(matches!(decision, Ok(false)), "migrated domain must drop");
        }
    }
}
