// Copyright 2025 Cowboy AI, LLC.

//! # CIM Domain Workflow
//!
//! Event-sourced status workflows for the Composable Information Machine.
//!
//! A workflow is a named set of statuses, the transitions permitted between
//! them and an optional default status. It is modelled as a DDD aggregate:
//! - **Aggregate**: [`Workflow`] validates every change against its current
//!   state, then raises exactly one [`WorkflowEvent`]
//! - **Events**: the closed [`WorkflowEvent`] enum is the only way state changes;
//!   replaying the stream rebuilds the aggregate
//! - **Commands**: [`WorkflowCommand`]s are handled by the
//!   [`WorkflowCommandHandler`], which loads, mutates and saves with
//!   optimistic concurrency
//! - **Read side**: [`WorkflowStatusProjection`] answers status queries and is
//!   rebuilt by the [`EventReplayService`]
//!
//! ## Design Principles
//!
//! 1. **Deterministic identity**: a workflow id is derived from its code
//! 2. **Validate, then raise**: failed commands leave no trace
//! 3. **Replay is the source of truth**: no mutable rows

#![warn(missing_docs)]

mod command_handlers;
mod config;
mod cqrs;
mod entity;
mod errors;
mod identifiers;
pub mod infrastructure;
pub mod persistence;
pub mod projections;
pub mod workflow;

// Re-export core types
pub use command_handlers::WorkflowCommandHandler;
pub use config::{OrphanedTransitionPolicy, WorkflowConfig};
pub use cqrs::{
    CausationId, Command, CommandAcknowledgment, CommandEnvelope, CommandHandler, CommandId,
    CorrelationId, EventId, MessageFactory, MessageIdentity,
};
pub use entity::{AggregateRoot, EventSourced};
pub use errors::{DomainError, DomainResult};
pub use identifiers::WorkflowId;
pub use infrastructure::{
    EventMetadata, EventReplayService, EventStore, EventStoreError, InMemoryEventStore,
    ReplayError, ReplayOptions, ReplayStats, StoredEvent,
};
pub use persistence::{
    AggregateMetadata, EventSourcedRepository, RepositoryError, WorkflowRepository,
};
pub use projections::{
    EventSequence, Projection, StatusRow, WorkflowStatusProjection, WorkflowView,
};
pub use workflow::{StatusCode, Transition, Workflow, WorkflowCommand, WorkflowEvent};
