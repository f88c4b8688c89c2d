//! Domain-tree maintenance: the core state machine over the entity store.
//!
//! [`RegistryService`] applies arbitrated registry events to the tree:
//! it derives subnodes, links parents and children, keeps subdomain
//! counts consistent through the upward cascade, composes dotted names,
//! and appends audit records for domains inside the indexed namespace.
//!
//! Ordering is a correctness requirement: callers must fully apply one
//! event (cascade included) before offering the next.

use alloy_primitives::{Address, B256};

use crate::domain::{
    Account, AuditPayload, AuditRecord, Domain, EventBus, LabelSource, NodeId, RegistryEvent,
    RegistryLog, RegistrySource, Resolver, ResolverId, codec,
};
use crate::domain::node_id::{RESERVED_NODE, ROOT_NODE};
use crate::domain::registry_event::LogMeta;
use crate::error::IndexerError;
use crate::persistence::EntityStore;

use super::migration;

/// Predicate restricting which composed names are persisted.
///
/// A name matches when it equals the suffix domain or ends with
/// `".{suffix}"`. Domains outside the namespace are still mutated in
/// memory for count-cascade correctness but never written themselves.
#[derive(Debug, Clone)]
pub struct NamespaceFilter {
    suffix: String,
    dotted_suffix: String,
}

impl NamespaceFilter {
    /// Creates a filter for the given suffix domain (e.g. `"tkn.eth"`).
    #[must_use]
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            dotted_suffix: format!(".{suffix}"),
        }
    }

    /// Returns `true` when `name` falls inside the indexed namespace.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        name == self.suffix || name.ends_with(&self.dotted_suffix)
    }

    /// The configured suffix domain.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

/// What [`RegistryService::apply`] did with an inbound log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The event passed arbitration and its handler ran.
    Applied,
    /// The migration arbiter dropped the event.
    Skipped,
}

/// The domain-tree maintainer.
///
/// Owns the entity store, the reverse-label oracle, the namespace
/// filter, and the audit broadcast bus. Every mutation method follows
/// the pattern: load → mutate in memory → cascade counts → filtered
/// persist → append audit record.
#[derive(Debug, Clone)]
pub struct RegistryService<S, L> {
    store: S,
    labels: L,
    filter: NamespaceFilter,
    event_bus: EventBus,
}

impl<S: EntityStore, L: LabelSource> RegistryService<S, L> {
    /// Creates a new service.
    #[must_use]
    pub fn new(store: S, labels: L, filter: NamespaceFilter, event_bus: EventBus) -> Self {
        Self {
            store,
            labels,
            filter,
            event_bus,
        }
    }

    /// Returns a reference to the inner store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the audit broadcast bus.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Seeds the two sentinel root domains so that chains of parent
    /// lookups always terminate. Must run before any event processing;
    /// idempotent across restarts.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    pub async fn bootstrap(&self) -> Result<(), IndexerError> {
        for id in [ROOT_NODE, RESERVED_NODE] {
            if self.store.load_domain(&id).await?.is_none() {
                self.store.save_domain(&Domain::sentinel(id)).await?;
            }
        }
        tracing::info!("sentinel root domains seeded");
        Ok(())
    }

    /// Arbitrates and applies one inbound log event.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure; the event is
    /// then considered not applied.
    pub async fn apply(&self, log: &RegistryLog) -> Result<ApplyOutcome, IndexerError> {
        if !migration::should_apply(&self.store, log).await? {
            tracing::debug!(
                kind = log.event.kind_str(),
                node = %log.event.node(),
                "legacy event dropped by migration arbiter"
            );
            return Ok(ApplyOutcome::Skipped);
        }

        let migrated = log.source == RegistrySource::Current;
        match log.event {
            RegistryEvent::NewOwner { node, label, owner } => {
                self.apply_new_owner(node, label, owner, &log.meta, migrated)
                    .await?;
            }
            RegistryEvent::Transfer { node, owner } => {
                self.apply_transfer(node, owner, &log.meta).await?;
            }
            RegistryEvent::NewResolver { node, resolver } => {
                self.apply_new_resolver(node, resolver, &log.meta).await?;
            }
            RegistryEvent::NewTtl { node, ttl } => {
                self.apply_new_ttl(node, ttl, &log.meta).await?;
            }
        }
        Ok(ApplyOutcome::Applied)
    }

    /// Handles a NewOwner event: places the subnode of `node` named by
    /// `label` under its parent and, first time only, composes its name.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    pub async fn apply_new_owner(
        &self,
        node: B256,
        label: B256,
        owner: Address,
        meta: &LogMeta,
        migrated: bool,
    ) -> Result<(), IndexerError> {
        self.ensure_account(owner).await?;

        let subnode = codec::subnode_hash(node, label);
        let parent_id = NodeId::new(node);

        let mut domain = match self.store.load_domain(&subnode).await? {
            Some(existing) => existing,
            None => Domain::new(subnode, meta.timestamp),
        };
        let parent = self.store.load_domain(&parent_id).await?;

        // Count propagation is unconditional: the parent is persisted
        // immediately, independent of the namespace filter.
        if domain.parent.is_none() {
            if let Some(parent) = &parent {
                let mut parent = parent.clone();
                parent.subdomain_count += 1;
                self.store.save_domain(&parent).await?;
            }
        }

        // Naming runs only once; repeated legacy/duplicate events for an
        // already-named domain fall through without re-deriving anything.
        if domain.name.is_none() {
            let looked_up = self
                .labels
                .name_by_hash(&label)
                .filter(|l| codec::valid_label(l));
            if let Some(label_name) = &looked_up {
                domain.label_name = Some(label_name.clone());
            }
            let label_text = looked_up.unwrap_or_else(|| codec::placeholder_label(&label));

            if parent_id.is_root() {
                domain.name = Some(label_text);
            } else if let Some(parent_name) = parent.as_ref().and_then(|p| p.name.as_deref()) {
                domain.name = Some(format!("{label_text}.{parent_name}"));
            }

            domain.owner = owner;
            domain.parent = Some(parent_id);
            domain.labelhash = Some(label);
            domain.is_migrated = migrated;
            self.cascading_save(&domain).await?;

            if self.name_indexed(&domain) {
                self.append_audit(AuditRecord::new(
                    meta,
                    subnode,
                    AuditPayload::NewOwner {
                        parent_domain: parent_id,
                        owner,
                    },
                ))
                .await?;
            }
            tracing::info!(node = %subnode, name = domain.name.as_deref(), "domain owner assigned");
        }
        Ok(())
    }

    /// Handles a Transfer event: reassigns ownership of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    pub async fn apply_transfer(
        &self,
        node: B256,
        owner: Address,
        meta: &LogMeta,
    ) -> Result<(), IndexerError> {
        self.ensure_account(owner).await?;

        let id = NodeId::new(node);
        let Some(mut domain) = self.store.load_domain(&id).await? else {
            return Ok(());
        };
        domain.owner = owner;
        self.cascading_save(&domain).await?;

        self.append_audit(AuditRecord::new(
            meta,
            id,
            AuditPayload::Transfer { owner },
        ))
        .await?;
        Ok(())
    }

    /// Handles a NewResolver event: attaches (or, for the zero address,
    /// detaches) a resolver on `node`.
    ///
    /// A record is appended even when the domain is absent, with the
    /// empty-address sentinel standing in for a missing resolver id.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    pub async fn apply_new_resolver(
        &self,
        node: B256,
        resolver_address: Address,
        meta: &LogMeta,
    ) -> Result<(), IndexerError> {
        let id = NodeId::new(node);
        let resolver_id = (resolver_address != Address::ZERO)
            .then(|| ResolverId::new(resolver_address, id));

        if let Some(mut domain) = self.store.load_domain(&id).await? {
            domain.resolver = resolver_id;
            match resolver_id {
                Some(rid) => match self.store.load_resolver(&rid).await? {
                    None => {
                        self.store.save_resolver(&Resolver::new(rid, id)).await?;
                        // A brand-new resolver cannot have cached a target yet.
                        domain.resolved_address = None;
                    }
                    Some(existing) => domain.resolved_address = existing.addr,
                },
                None => domain.resolved_address = None,
            }
            self.cascading_save(&domain).await?;
        }

        self.append_audit(AuditRecord::new(
            meta,
            id,
            AuditPayload::new_resolver(resolver_id),
        ))
        .await?;
        Ok(())
    }

    /// Handles a NewTTL event. The record is appended whether or not the
    /// domain exists, covering the edge case of owner and resolver being
    /// cleared in the same transaction that sets the TTL.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    pub async fn apply_new_ttl(
        &self,
        node: B256,
        ttl: u64,
        meta: &LogMeta,
    ) -> Result<(), IndexerError> {
        let id = NodeId::new(node);
        if let Some(mut domain) = self.store.load_domain(&id).await? {
            domain.ttl = Some(ttl);
            self.cascading_save(&domain).await?;
        }

        self.append_audit(AuditRecord::new(meta, id, AuditPayload::NewTtl { ttl }))
            .await?;
        Ok(())
    }

    /// Creates the account for `owner` when it has not been seen before.
    async fn ensure_account(&self, owner: Address) -> Result<(), IndexerError> {
        if self.store.load_account(&owner).await?.is_none() {
            self.store.save_account(&Account { id: owner }).await?;
        }
        Ok(())
    }

    fn name_indexed(&self, domain: &Domain) -> bool {
        domain
            .name
            .as_deref()
            .is_some_and(|name| self.filter.matches(name))
    }

    /// Persists `domain` through the two-step cascading-save procedure:
    /// first the unconditional upward count walk, then the domain's own
    /// save, gated by the namespace filter. The asymmetry is deliberate:
    /// ancestor bookkeeping stays correct for domains that are never
    /// themselves queryable.
    async fn cascading_save(&self, domain: &Domain) -> Result<(), IndexerError> {
        self.prune_empty_ancestors(domain).await?;
        if self.name_indexed(domain) {
            self.store.save_domain(domain).await?;
        }
        Ok(())
    }

    /// Walks upward from `domain` while the current link in the chain is
    /// empty, decrementing and persisting each parent. The walk stops at
    /// the first non-empty domain, at a domain with no parent, or when an
    /// ancestor cannot be loaded (a silent halt, logged distinctly).
    /// Bounded by tree depth; parent links are id lookups into the store,
    /// never direct back-pointers.
    async fn prune_empty_ancestors(&self, domain: &Domain) -> Result<(), IndexerError> {
        let mut current = domain.clone();
        loop {
            if !current.is_empty() {
                return Ok(());
            }
            let Some(parent_id) = current.parent else {
                return Ok(());
            };
            match self.store.load_domain(&parent_id).await? {
                None => {
                    tracing::warn!(
                        node = %current.id,
                        parent = %parent_id,
                        "ancestor missing during cascade; halting upward walk"
                    );
                    return Ok(());
                }
                Some(mut parent) => {
                    parent.subdomain_count = parent.subdomain_count.saturating_sub(1);
                    self.store.save_domain(&parent).await?;
                    current = parent;
                }
            }
        }
    }

    /// Appends a record to the store's audit log and publishes it on the
    /// broadcast bus.
    async fn append_audit(&self, record: AuditRecord) -> Result<(), IndexerError> {
        self.store.append_audit(&record).await?;
        tracing::debug!(
            id = %record.id,
            event_type = record.payload.event_type_str(),
            "audit record appended"
        );
        self.event_bus.publish(record);
        Ok(())
    }
}
