// Copyright 2025 Cowboy AI, LLC.

//! In-memory event store

use crate::cqrs::EventId;
use crate::infrastructure::event_store::{EventMetadata, EventStore, EventStoreError, StoredEvent};
use crate::workflow::WorkflowEvent;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct StoreState {
    /// Per-aggregate streams, each ordered by sequence
    streams: HashMap<String, Vec<StoredEvent>>,
    /// Store-wide log, ordered by global position
    log: Vec<StoredEvent>,
}

/// Event store that keeps all streams in memory
///
/// Cloning the store shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryEventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events across all streams
    pub async fn len(&self) -> usize {
        self.state.read().await.log.len()
    }

    /// Whether the store holds no events
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.log.is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append_events(
        &self,
        aggregate_id: &str,
        aggregate_type: &str,
        events: Vec<WorkflowEvent>,
        expected_version: Option<u64>,
        metadata: EventMetadata,
    ) -> Result<u64, EventStoreError> {
        let mut state = self.state.write().await;

        let current = state
            .streams
            .get(aggregate_id)
            .map(|stream| stream.len() as u64)
            .unwrap_or(0);

        if let Some(expected) = expected_version {
            if expected != current {
                warn!(
                    "Rejected append to {} {}: expected version {}, current {}",
                    aggregate_type, aggregate_id, expected, current
                );
                return Err(EventStoreError::ConcurrencyConflict { expected, current });
            }
        }

        if events.is_empty() {
            return Ok(current);
        }

        let stored_at = Utc::now();
        let mut global_position = state.log.len() as u64;
        let mut sequence = current;
        let mut stored = Vec::with_capacity(events.len());

        for event in events {
            sequence += 1;
            global_position += 1;
            stored.push(StoredEvent {
                event_id: EventId::new(),
                aggregate_id: aggregate_id.to_string(),
                aggregate_type: aggregate_type.to_string(),
                sequence,
                global_position,
                event,
                metadata: metadata.clone(),
                stored_at,
            });
        }

        debug!(
            "Appended {} events to {} {} (version {} -> {})",
            stored.len(),
            aggregate_type,
            aggregate_id,
            current,
            sequence
        );

        state.log.extend(stored.iter().cloned());
        state
            .streams
            .entry(aggregate_id.to_string())
            .or_default()
            .extend(stored);

        Ok(sequence)
    }

    async fn get_events(
        &self,
        aggregate_id: &str,
        from_version: Option<u64>,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let state = self.state.read().await;
        let after = from_version.unwrap_or(0);

        Ok(state
            .streams
            .get(aggregate_id)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|event| event.sequence > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_aggregate_version(
        &self,
        aggregate_id: &str,
    ) -> Result<Option<u64>, EventStoreError> {
        let state = self.state.read().await;
        Ok(state
            .streams
            .get(aggregate_id)
            .map(|stream| stream.len() as u64))
    }

    async fn stream_all_events(
        &self,
        from_position: Option<u64>,
    ) -> Result<BoxStream<'static, Result<StoredEvent, EventStoreError>>, EventStoreError> {
        let state = self.state.read().await;
        let after = from_position.unwrap_or(0);

        let events: Vec<StoredEvent> = state
            .log
            .iter()
            .filter(|event| event.global_position > after)
            .cloned()
            .collect();

        Ok(stream::iter(events.into_iter().map(Ok)).boxed())
    }
}
