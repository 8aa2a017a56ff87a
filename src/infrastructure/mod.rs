// Copyright 2025 Cowboy AI, LLC.

//! Infrastructure layer for workflows
//!
//! This module contains the event store abstraction, its in-memory
//! implementation and the replay service that rebuilds projections from the
//! global event stream.

pub mod event_replay;
pub mod event_store;
pub mod in_memory_event_store;

pub use event_replay::{EventReplayService, ReplayError, ReplayOptions, ReplayStats};
pub use event_store::{EventMetadata, EventStore, EventStoreError, StoredEvent};
pub use in_memory_event_store::InMemoryEventStore;
