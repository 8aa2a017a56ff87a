// Copyright 2025 Cowboy AI, LLC.

//! Event store trait and related types

use crate::cqrs::{CausationId, CommandEnvelope, CorrelationId, EventId};
use crate::workflow::WorkflowEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with the event store
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Failed to serialize or deserialize event data
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Optimistic concurrency check failed
    #[error("Concurrency conflict: expected version {expected}, but current version is {current}")]
    ConcurrencyConflict {
        /// The version that was expected
        expected: u64,
        /// The actual current version
        current: u64,
    },

    /// Requested stream was not found
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// General storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// A stored event with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Unique event ID
    pub event_id: EventId,

    /// Aggregate ID this event belongs to
    pub aggregate_id: String,

    /// Aggregate type (e.g. "Workflow")
    pub aggregate_type: String,

    /// Event sequence number within the aggregate, starting at 1
    pub sequence: u64,

    /// Position in the store-wide log, starting at 1
    pub global_position: u64,

    /// The actual domain event
    pub event: WorkflowEvent,

    /// Event metadata
    pub metadata: EventMetadata,

    /// When the event was stored
    pub stored_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &str {
        self.event.event_type()
    }

    /// Get the correlation ID from metadata
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.metadata.correlation_id.as_ref()
    }

    /// Get the causation ID from metadata
    pub fn causation_id(&self) -> Option<&CausationId> {
        self.metadata.causation_id.as_ref()
    }
}

/// Event metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Correlation ID for tracking related events
    pub correlation_id: Option<CorrelationId>,

    /// Causation ID - the message that caused this event
    pub causation_id: Option<CausationId>,

    /// User or system that triggered the event
    pub triggered_by: Option<String>,
}

impl EventMetadata {
    /// Metadata for events raised while handling `envelope`
    pub fn from_envelope<C>(envelope: &CommandEnvelope<C>) -> Self {
        Self {
            correlation_id: Some(envelope.identity.correlation_id),
            causation_id: Some(CausationId(envelope.identity.message_id)),
            triggered_by: Some(envelope.issued_by.clone()),
        }
    }
}

/// Event store trait for persisting and retrieving events
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append events to the stream of one aggregate
    ///
    /// When `expected_version` is given, the append succeeds only if the
    /// stream currently holds exactly that many events. The check and the
    /// append are atomic.
    async fn append_events(
        &self,
        aggregate_id: &str,
        aggregate_type: &str,
        events: Vec<WorkflowEvent>,
        expected_version: Option<u64>,
        metadata: EventMetadata,
    ) -> Result<u64, EventStoreError>;

    /// Get the events of one aggregate, optionally only those after `from_version`
    async fn get_events(
        &self,
        aggregate_id: &str,
        from_version: Option<u64>,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Get the current version of an aggregate
    async fn get_aggregate_version(
        &self,
        aggregate_id: &str,
    ) -> Result<Option<u64>, EventStoreError>;

    /// Stream every event in the store, in global order, after `from_position`
    async fn stream_all_events(
        &self,
        from_position: Option<u64>,
    ) -> Result<BoxStream<'static, Result<StoredEvent, EventStoreError>>, EventStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowCommand;

    #[test]
    fn test_event_metadata_default() {
        let metadata = EventMetadata::default();
        assert!(metadata.correlation_id.is_none());
        assert!(metadata.causation_id.is_none());
        assert!(metadata.triggered_by.is_none());
    }

    #[test]
    fn test_metadata_from_envelope_is_caused_by_command() {
        let envelope = CommandEnvelope::new(WorkflowCommand::create("publishing", Vec::new()), "editor");
        let metadata = EventMetadata::from_envelope(&envelope);

        assert_eq!(metadata.correlation_id, Some(*envelope.correlation_id()));
        assert_eq!(
            metadata.causation_id,
            Some(CausationId(*envelope.id.as_uuid()))
        );
        assert_eq!(metadata.triggered_by.as_deref(), Some("editor"));
    }

    #[test]
    fn test_event_store_error_display() {
        let error = EventStoreError::ConcurrencyConflict {
            expected: 5,
            current: 7,
        };
        let error_str = error.to_string();
        assert!(error_str.contains("expected version 5"));
        assert!(error_str.contains("current version is 7"));
    }
}
