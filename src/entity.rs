// Copyright 2025 Cowboy AI, LLC.

//! Aggregate root traits

/// Marker trait for aggregate roots
///
/// Aggregate roots are the entry points for modifying aggregates.
/// All changes to entities within an aggregate must go through the root.
pub trait AggregateRoot: Sized {
    /// The type of ID for this aggregate
    type Id: Copy + Eq + Send + Sync;

    /// Get the aggregate's ID
    fn id(&self) -> Self::Id;

    /// Get the aggregate's version for optimistic concurrency
    ///
    /// The version counts events that have been persisted; events raised
    /// since the last save are not included.
    fn version(&self) -> u64;
}

/// An aggregate whose state is the left fold of its events
///
/// Mutating methods validate against current state and then raise an event,
/// which is applied immediately and buffered until the repository persists it.
pub trait EventSourced: AggregateRoot {
    /// The closed set of events this aggregate raises
    type Event: Clone + Send + Sync;

    /// Apply one event to the in-memory state. Never fails.
    ///
    /// This is the fold step used by replay and by the mutating methods after
    /// validation. It performs no validation of its own, does not buffer the
    /// event and does not bump the version, so state changed here is never
    /// persisted. Callers outside replay change an aggregate through its
    /// mutating methods instead.
    fn apply(&mut self, event: &Self::Event);

    /// Events raised since the last successful save
    fn pending_events(&self) -> &[Self::Event];

    /// Mark all pending events as persisted, returning how many there were
    fn commit_pending_events(&mut self) -> usize;
}
