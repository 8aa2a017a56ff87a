// Copyright 2025 Cowboy AI, LLC.

//! Read model projections for workflows
//!
//! Projections are optimized read models that are updated by handling stored events.
//! They provide efficient queries without needing to replay all events.

mod workflow_status;

pub use workflow_status::{StatusRow, WorkflowStatusProjection, WorkflowView};

use crate::infrastructure::StoredEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for all projections
#[async_trait]
pub trait Projection: Send + Sync {
    /// Handle a stored event to update the projection
    async fn handle_event(&mut self, event: &StoredEvent) -> Result<(), String>;

    /// Get the current checkpoint (last processed global position)
    async fn get_checkpoint(&self) -> Option<EventSequence>;

    /// Save the checkpoint after processing events
    async fn save_checkpoint(&mut self, sequence: EventSequence) -> Result<(), String>;

    /// Clear the projection (for rebuilding)
    async fn clear(&mut self) -> Result<(), String>;
}

/// Event sequence number for checkpointing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventSequence(pub u64);

impl EventSequence {
    /// Create a new event sequence with the given value
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Get the current sequence value
    pub fn value(&self) -> u64 {
        self.0
    }
}
