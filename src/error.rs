//! Indexer error types.
//!
//! [`IndexerError`] is the central error type for the indexer. Handlers
//! fail fast: a store error aborts the event being processed, while
//! malformed input is reported so the caller can drop the single event
//! without touching shared state.

/// Central error enum for event processing and persistence.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    /// Input bytes or hex could not be decoded (odd-length hex, wrong
    /// byte width). Fatal to the single event; nothing was mutated.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Persistence layer failure. The event is considered not applied;
    /// the caller decides whether to retry or halt the pipeline.
    #[error("store error: {0}")]
    Store(String),

    /// JSON (de)serialization failure for an entity or event payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O failure while reading the inbound event stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexerError {
    /// Returns `true` when the error only invalidates the current event
    /// and the pipeline may safely continue with the next one.
    #[must_use]
    pub const fn is_event_local(&self) -> bool {
        matches!(self, Self::MalformedInput(_) | Self::Serialization(_))
    }
}
