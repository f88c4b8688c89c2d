//! # nametree-indexer
//!
//! Event-stream indexer for a hierarchical naming registry. Consumes an
//! ordered stream of blockchain log events (ownership, resolver, and
//! TTL changes) from two parallel registries, a legacy one and the
//! current one, and maintains a derived, queryable tree of `Domain`
//! and `Resolver` records.
//!
//! ## Architecture
//!
//! ```text
//! JSONL event stream (current + legacy registries)
//!     │
//!     ├── Ingest loop (ingest/)
//!     │
//!     ├── Migration arbiter (service/)
//!     ├── RegistryService: tree maintenance (service/)
//!     ├── EventBus: audit broadcast (domain/)
//!     │
//!     └── EntityStore: memory or PostgreSQL (persistence/)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod persistence;
pub mod service;
