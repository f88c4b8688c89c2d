//! PostgreSQL implementation of the entity store.
//!
//! Entities are stored as JSONB documents keyed by their string id;
//! saves are `ON CONFLICT` upserts so the store contract stays a plain
//! key-value one. Audit records land in an append-only table stamped
//! with the ingest time.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use alloy_primitives::Address;

use crate::config::IndexerConfig;
use crate::domain::{Account, AuditRecord, Domain, NodeId, Resolver, ResolverId};
use crate::error::IndexerError;

use super::EntityStore;

/// PostgreSQL-backed entity store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store with an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool sized per the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] when the database is unreachable.
    pub async fn connect(config: &IndexerConfig) -> Result<Self, IndexerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| IndexerError::Store(e.to_string()))?;

        tracing::info!("database connection established");
        Ok(Self::new(pool))
    }

    /// Creates the backing tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::Store`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), IndexerError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS domains (id TEXT PRIMARY KEY, data JSONB NOT NULL)",
            "CREATE TABLE IF NOT EXISTS resolvers (id TEXT PRIMARY KEY, data JSONB NOT NULL)",
            "CREATE TABLE IF NOT EXISTS accounts (id TEXT PRIMARY KEY)",
            "CREATE TABLE IF NOT EXISTS audit_log (\
                 id TEXT PRIMARY KEY, \
                 event_type TEXT NOT NULL, \
                 domain TEXT NOT NULL, \
                 block_number BIGINT NOT NULL, \
                 tx_hash TEXT NOT NULL, \
                 payload JSONB NOT NULL, \
                 ingested_at TIMESTAMPTZ NOT NULL)",
        ];
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| IndexerError::Store(e.to_string()))?;
        }
        Ok(())
    }

    async fn load_json(
        &self,
        table: &'static str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, IndexerError> {
        let query = format!("SELECT data FROM {table} WHERE id = $1");
        sqlx::query_scalar::<_, serde_json::Value>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IndexerError::Store(e.to_string()))
    }

    async fn save_json(
        &self,
        table: &'static str,
        id: &str,
        data: &serde_json::Value,
    ) -> Result<(), IndexerError> {
        let query = format!(
            "INSERT INTO {table} (id, data) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data"
        );
        sqlx::query(&query)
            .bind(id)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(|e| IndexerError::Store(e.to_string()))?;
        Ok(())
    }
}

impl EntityStore for PostgresStore {
    async fn load_domain(&self, id: &NodeId) -> Result<Option<Domain>, IndexerError> {
        let row = self.load_json("domains", &id.to_string()).await?;
        row.map(serde_json::from_value).transpose().map_err(Into::into)
    }

    async fn save_domain(&self, domain: &Domain) -> Result<(), IndexerError> {
        let data = serde_json::to_value(domain)?;
        self.save_json("domains", &domain.id.to_string(), &data).await
    }

    async fn load_resolver(&self, id: &ResolverId) -> Result<Option<Resolver>, IndexerError> {
        let row = self.load_json("resolvers", &id.to_string()).await?;
        row.map(serde_json::from_value).transpose().map_err(Into::into)
    }

    async fn save_resolver(&self, resolver: &Resolver) -> Result<(), IndexerError> {
        let data = serde_json::to_value(resolver)?;
        self.save_json("resolvers", &resolver.id.to_string(), &data)
            .await
    }

    async fn load_account(&self, id: &Address) -> Result<Option<Account>, IndexerError> {
        let row = sqlx::query_scalar::<_, String>("SELECT id FROM accounts WHERE id = $1")
            .bind(format!("{id:#x}"))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IndexerError::Store(e.to_string()))?;
        Ok(row.map(|_| Account { id: *id }))
    }

    async fn save_account(&self, account: &Account) -> Result<(), IndexerError> {
        sqlx::query("INSERT INTO accounts (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(format!("{:#x}", account.id))
            .execute(&self.pool)
            .await
            .map_err(|e| IndexerError::Store(e.to_string()))?;
        Ok(())
    }

    async fn append_audit(&self, record: &AuditRecord) -> Result<(), IndexerError> {
        let block_number = i64::try_from(record.block_number)
            .map_err(|_| IndexerError::Store("block number exceeds BIGINT".to_string()))?;
        let payload = serde_json::to_value(&record.payload)?;
        sqlx::query(
            "INSERT INTO audit_log (id, event_type, domain, block_number, tx_hash, payload, ingested_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id.to_string())
        .bind(record.payload.event_type_str())
        .bind(record.domain.to_string())
        .bind(block_number)
        .bind(format!("{:#x}", record.tx_hash))
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| IndexerError::Store(e.to_string()))?;
        Ok(())
    }
}
