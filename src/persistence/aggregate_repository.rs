// Copyright 2025 Cowboy AI, LLC.

//! Event-sourced repository for workflow aggregates

use crate::{
    entity::{AggregateRoot, EventSourced},
    errors::DomainError,
    identifiers::WorkflowId,
    infrastructure::{EventMetadata, EventStore, EventStoreError},
    workflow::Workflow,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Metadata for persisted aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateMetadata {
    /// Aggregate ID
    pub aggregate_id: String,
    /// Aggregate type name
    pub aggregate_type: String,
    /// Current version number
    pub version: u64,
    /// Last modification timestamp
    pub last_modified: DateTime<Utc>,
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Aggregate not found
    #[error("Aggregate not found: {0}")]
    NotFound(String),

    /// Version conflict
    #[error("Version conflict: expected {expected}, actual {actual}")]
    VersionConflict {
        /// The expected version
        expected: u64,
        /// The actual version found
        actual: u64,
    },

    /// Event store error
    #[error("Event store error: {0}")]
    EventStoreError(String),

    /// The stored history could not be replayed into an aggregate
    #[error("Corrupted event stream: {0}")]
    CorruptedStream(String),
}

impl From<EventStoreError> for RepositoryError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::ConcurrencyConflict { expected, current } => {
                RepositoryError::VersionConflict {
                    expected,
                    actual: current,
                }
            }
            EventStoreError::StreamNotFound(id) => RepositoryError::NotFound(id),
            other => RepositoryError::EventStoreError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => DomainError::AggregateNotFound(id),
            RepositoryError::VersionConflict { expected, actual } => {
                DomainError::ConcurrencyConflict { expected, actual }
            }
            RepositoryError::EventStoreError(msg) => DomainError::InternalError(msg),
            RepositoryError::CorruptedStream(msg) => DomainError::InvariantViolation(msg),
        }
    }
}

/// Persistence for workflow aggregates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Load a workflow by replaying its stream
    async fn load(&self, id: &WorkflowId) -> Result<Workflow, RepositoryError>;

    /// Check if a workflow exists
    async fn exists(&self, id: &WorkflowId) -> Result<bool, RepositoryError>;

    /// Persist the workflow's pending events and commit them
    async fn save(&self, workflow: &mut Workflow) -> Result<AggregateMetadata, RepositoryError>;

    /// Like [`WorkflowRepository::save`], recording `metadata` on every stored event
    async fn save_with_metadata(
        &self,
        workflow: &mut Workflow,
        metadata: EventMetadata,
    ) -> Result<AggregateMetadata, RepositoryError>;
}

/// Repository that stores workflows as event streams
pub struct EventSourcedRepository {
    event_store: Arc<dyn EventStore>,
    aggregate_type: String,
}

impl EventSourcedRepository {
    /// Create a new event-sourced repository
    pub fn new(event_store: Arc<dyn EventStore>, aggregate_type: impl Into<String>) -> Self {
        Self {
            event_store,
            aggregate_type: aggregate_type.into(),
        }
    }

    /// Aggregate type recorded on stored events
    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    fn metadata_for(&self, workflow: &Workflow) -> AggregateMetadata {
        AggregateMetadata {
            aggregate_id: workflow.id().to_string(),
            aggregate_type: self.aggregate_type.clone(),
            version: workflow.version(),
            last_modified: Utc::now(),
        }
    }
}

#[async_trait]
impl WorkflowRepository for EventSourcedRepository {
    async fn load(&self, id: &WorkflowId) -> Result<Workflow, RepositoryError> {
        let aggregate_id = id.to_string();
        let events = self.event_store.get_events(&aggregate_id, None).await?;

        if events.is_empty() {
            return Err(RepositoryError::NotFound(aggregate_id));
        }

        let workflow = Workflow::from_events(events.iter().map(|stored| &stored.event))
            .map_err(|e| RepositoryError::CorruptedStream(format!("{aggregate_id}: {e}")))?;

        debug!(
            "Loaded workflow {} at version {}",
            workflow.code(),
            workflow.version()
        );
        Ok(workflow)
    }

    async fn exists(&self, id: &WorkflowId) -> Result<bool, RepositoryError> {
        let version = self
            .event_store
            .get_aggregate_version(&id.to_string())
            .await?;
        Ok(version.is_some())
    }

    async fn save(&self, workflow: &mut Workflow) -> Result<AggregateMetadata, RepositoryError> {
        self.save_with_metadata(workflow, EventMetadata::default())
            .await
    }

    async fn save_with_metadata(
        &self,
        workflow: &mut Workflow,
        metadata: EventMetadata,
    ) -> Result<AggregateMetadata, RepositoryError> {
        if workflow.pending_events().is_empty() {
            return Ok(self.metadata_for(workflow));
        }

        let aggregate_id = workflow.id().to_string();
        let expected = workflow.version();
        let events = workflow.pending_events().to_vec();

        let version = self
            .event_store
            .append_events(
                &aggregate_id,
                &self.aggregate_type,
                events,
                Some(expected),
                metadata,
            )
            .await?;

        let committed = workflow.commit_pending_events();
        info!(
            "Saved workflow {}: {} events, version {} -> {}",
            workflow.code(),
            committed,
            expected,
            version
        );

        Ok(self.metadata_for(workflow))
    }
}
