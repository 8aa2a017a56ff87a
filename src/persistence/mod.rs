// Copyright 2025 Cowboy AI, LLC.

//! # Persistence Layer
//!
//! Workflows are persisted as event streams: saving appends the pending
//! events with an optimistic version check, loading replays the stream.

pub mod aggregate_repository;

pub use aggregate_repository::{
    AggregateMetadata, EventSourcedRepository, RepositoryError, WorkflowRepository,
};

#[cfg(test)]
pub use aggregate_repository::MockWorkflowRepository;
