// Copyright 2025 Cowboy AI, LLC.

//! Event replay service for rebuilding projections

use crate::infrastructure::{EventStore, EventStoreError, StoredEvent};
use crate::projections::{EventSequence, Projection};
use futures::stream::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during event replay
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Error from the underlying event store
    #[error("Event store error: {0}")]
    EventStoreError(#[from] EventStoreError),

    /// Aggregate not found in event store
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(String),

    /// The projection rejected an event
    #[error("Projection error at position {position}: {message}")]
    ProjectionError {
        /// Global position of the rejected event
        position: u64,
        /// Message returned by the projection
        message: String,
    },
}

/// Statistics collected during event replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayStats {
    /// Events handed to the projection
    pub events_processed: u64,
    /// Events read from the store but filtered out
    pub events_skipped: u64,
    /// Global position of the last event read, if any
    pub last_position: Option<u64>,
    /// Total duration of replay in milliseconds
    pub duration_ms: u64,
    /// Average events processed per second
    pub events_per_second: f64,
}

/// Options for controlling replay behavior
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Only replay events after this global position
    pub from_position: Option<u64>,

    /// Maximum events to hand to the projection (None = all)
    pub max_events: Option<u64>,

    /// Only replay these event types (None = all)
    pub event_types: Option<Vec<String>>,
}

impl ReplayOptions {
    fn is_full_rebuild(&self) -> bool {
        self.from_position.is_none() && self.event_types.is_none()
    }

    fn accepts(&self, event: &StoredEvent) -> bool {
        self.event_types
            .as_ref()
            .map_or(true, |types| types.iter().any(|t| t == event.event_type()))
    }
}

/// Service for replaying events from the event store
pub struct EventReplayService {
    event_store: Arc<dyn EventStore>,
}

impl EventReplayService {
    /// Create a new event replay service with the given event store
    pub fn new(event_store: Arc<dyn EventStore>) -> Self {
        Self { event_store }
    }

    /// Rebuild a projection from the global event stream
    ///
    /// A full rebuild (no `from_position`, no `event_types`) clears the
    /// projection first. A resumed or filtered replay applies its events on
    /// top of the existing state, so the projection must already hold the
    /// history those events depend on. After the last event the checkpoint is
    /// saved as the global position of the last event read.
    pub async fn rebuild_projection<P>(
        &self,
        projection: &mut P,
        options: ReplayOptions,
    ) -> Result<ReplayStats, ReplayError>
    where
        P: Projection + ?Sized,
    {
        let start_time = Instant::now();
        let mut stats = ReplayStats::default();

        if options.is_full_rebuild() {
            projection
                .clear()
                .await
                .map_err(|message| ReplayError::ProjectionError {
                    position: 0,
                    message,
                })?;
        }

        let mut stream = self
            .event_store
            .stream_all_events(options.from_position)
            .await?;

        while let Some(result) = stream.next().await {
            if options
                .max_events
                .is_some_and(|max| stats.events_processed >= max)
            {
                break;
            }

            let event = result?;
            stats.last_position = Some(event.global_position);

            if !options.accepts(&event) {
                stats.events_skipped += 1;
                continue;
            }

            projection
                .handle_event(&event)
                .await
                .map_err(|message| ReplayError::ProjectionError {
                    position: event.global_position,
                    message,
                })?;
            stats.events_processed += 1;
        }

        if let Some(position) = stats.last_position {
            projection
                .save_checkpoint(EventSequence::new(position))
                .await
                .map_err(|message| ReplayError::ProjectionError { position, message })?;
        }

        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        stats.events_per_second = if stats.duration_ms > 0 {
            (stats.events_processed as f64 * 1000.0) / stats.duration_ms as f64
        } else {
            0.0
        };

        info!(
            "Replay completed: {} events processed, {} skipped in {}ms",
            stats.events_processed, stats.events_skipped, stats.duration_ms
        );

        Ok(stats)
    }

    /// Apply the events appended since the projection's checkpoint
    ///
    /// A projection without a checkpoint is rebuilt from the start.
    pub async fn catch_up_projection<P>(
        &self,
        projection: &mut P,
    ) -> Result<ReplayStats, ReplayError>
    where
        P: Projection + ?Sized,
    {
        let from_position = projection.get_checkpoint().await.map(|seq| seq.value());
        debug!("Catching up projection from position {:?}", from_position);

        self.rebuild_projection(
            projection,
            ReplayOptions {
                from_position,
                ..Default::default()
            },
        )
        .await
    }

    /// Read the full history of one aggregate
    pub async fn replay_aggregate(
        &self,
        aggregate_id: &str,
    ) -> Result<Vec<StoredEvent>, ReplayError> {
        let events = self.event_store.get_events(aggregate_id, None).await?;

        if events.is_empty() {
            return Err(ReplayError::AggregateNotFound(aggregate_id.to_string()));
        }

        debug!("Read {} events for aggregate {}", events.len(), aggregate_id);
        Ok(events)
    }
}
