//! Broadcast channel for appended audit records.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every audit
//! record appended to the store is also published on the bus so
//! in-process observers (exporters, metrics, tests) can follow the
//! indexed history live.

use tokio::sync::broadcast;

use super::AuditRecord;

/// Broadcast bus for [`AuditRecord`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest records
/// are dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuditRecord>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a record to all subscribers.
    ///
    /// Returns the number of receivers that received the record.
    /// With no active receivers the record is silently dropped.
    pub fn publish(&self, record: AuditRecord) -> usize {
        self.sender.send(record).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future records.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuditRecord> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
