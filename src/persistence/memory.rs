//! In-memory entity store.
//!
//! `HashMap`s behind [`tokio::sync::RwLock`]s, shared through an inner
//! `Arc` so service and tests can hold clones of the same store. Backs
//! the test suite and dry runs; the durable backend is
//! [`super::PostgresStore`].

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::RwLock;

use crate::domain::{Account, AuditRecord, Domain, NodeId, Resolver, ResolverId};
use crate::error::IndexerError;

use super::EntityStore;

#[derive(Debug, Default)]
struct Inner {
    domains: RwLock<HashMap<NodeId, Domain>>,
    resolvers: RwLock<HashMap<ResolverId, Resolver>>,
    accounts: RwLock<HashMap<Address, Account>>,
    audit: RwLock<Vec<AuditRecord>>,
}

/// In-process entity store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the audit log in append order.
    pub async fn audit_log(&self) -> Vec<AuditRecord> {
        self.inner.audit.read().await.clone()
    }

    /// Returns the number of stored domains.
    pub async fn domain_count(&self) -> usize {
        self.inner.domains.read().await.len()
    }

    /// Returns the number of stored accounts.
    pub async fn account_count(&self) -> usize {
        self.inner.accounts.read().await.len()
    }
}

impl EntityStore for MemoryStore {
    async fn load_domain(&self, id: &NodeId) -> Result<Option<Domain>, IndexerError> {
        Ok(self.inner.domains.read().await.get(id).cloned())
    }

    async fn save_domain(&self, domain: &Domain) -> Result<(), IndexerError> {
        self.inner
            .domains
            .write()
            .await
            .insert(domain.id, domain.clone());
        Ok(())
    }

    async fn load_resolver(&self, id: &ResolverId) -> Result<Option<Resolver>, IndexerError> {
        Ok(self.inner.resolvers.read().await.get(id).cloned())
    }

    async fn save_resolver(&self, resolver: &Resolver) -> Result<(), IndexerError> {
        self.inner
            .resolvers
            .write()
            .await
            .insert(resolver.id, resolver.clone());
        Ok(())
    }

    async fn load_account(&self, id: &Address) -> Result<Option<Account>, IndexerError> {
        Ok(self.inner.accounts.read().await.get(id).copied())
    }

    async fn save_account(&self, account: &Account) -> Result<(), IndexerError> {
        self.inner
            .accounts
            .write()
            .await
            .insert(account.id, *account);
        Ok(())
    }

    async fn append_audit(&self, record: &AuditRecord) -> Result<(), IndexerError> {
        self.inner.audit.write().await.push(record.clone());
        Ok(())
    }
}
