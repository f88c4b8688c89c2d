//! Persistence layer: the entity-store boundary and its backends.
//!
//! [`EntityStore`] is the sole persistence seam of the core: typed
//! load/save per entity keyed by string identifier, plus an append-only
//! audit log. No transactions, no secondary indexes, no range queries.
//! `save` is an upsert; `load` of an unknown id returns `None`.

use alloy_primitives::Address;

use crate::domain::{Account, AuditRecord, Domain, NodeId, Resolver, ResolverId};
use crate::error::IndexerError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Typed key-value contract over the backing store.
///
/// Callers deliver events strictly in order and await each access before
/// issuing the next, so implementations never see concurrent writes to
/// the same key from one pipeline.
#[allow(async_fn_in_trait)]
pub trait EntityStore: Send + Sync {
    /// Loads a domain by node id.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    async fn load_domain(&self, id: &NodeId) -> Result<Option<Domain>, IndexerError>;

    /// Saves (upserts) a domain.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    async fn save_domain(&self, domain: &Domain) -> Result<(), IndexerError>;

    /// Loads a resolver by composed id.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    async fn load_resolver(&self, id: &ResolverId) -> Result<Option<Resolver>, IndexerError>;

    /// Saves (upserts) a resolver.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    async fn save_resolver(&self, resolver: &Resolver) -> Result<(), IndexerError>;

    /// Loads an account by address.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    async fn load_account(&self, id: &Address) -> Result<Option<Account>, IndexerError>;

    /// Saves an account.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    async fn save_account(&self, account: &Account) -> Result<(), IndexerError>;

    /// Appends an audit record. Records are immutable once appended.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on backend failure.
    async fn append_audit(&self, record: &AuditRecord) -> Result<(), IndexerError>;
}
