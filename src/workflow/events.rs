// Copyright 2025 Cowboy AI, LLC.

//! Workflow events
//!
//! Events are immutable facts raised by the [`Workflow`](crate::Workflow)
//! aggregate after a command has been validated. They carry no validation
//! logic of their own; replaying them in order rebuilds the aggregate.

use crate::{
    identifiers::WorkflowId,
    workflow::{StatusCode, Transition},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Events that can occur in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// A workflow was created with its initial statuses
    Created {
        /// Id derived from the code
        id: WorkflowId,
        /// Workflow code
        code: String,
        /// Initial statuses, in order
        statuses: Vec<StatusCode>,
    },

    /// A status was added
    StatusAdded {
        /// The added status
        code: StatusCode,
    },

    /// A status was removed
    StatusRemoved {
        /// The removed status
        code: StatusCode,
    },

    /// A transition was added
    TransitionAdded {
        /// The added transition
        transition: Transition,
    },

    /// The transition for a (source, destination) pair was replaced
    TransitionChanged {
        /// Source of the replaced transition
        source: StatusCode,
        /// Destination of the replaced transition
        destination: StatusCode,
        /// Transition before the change
        from: Transition,
        /// Transition after the change
        to: Transition,
    },

    /// The transition for a (source, destination) pair was removed
    TransitionRemoved {
        /// Source of the removed transition
        source: StatusCode,
        /// Destination of the removed transition
        destination: StatusCode,
    },

    /// The default status was set
    DefaultStatusSet {
        /// The new default status
        code: StatusCode,
    },
}

impl WorkflowEvent {
    /// Stable event type name, used by stores and projections
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::Created { .. } => "WorkflowCreated",
            WorkflowEvent::StatusAdded { .. } => "WorkflowStatusAdded",
            WorkflowEvent::StatusRemoved { .. } => "WorkflowStatusRemoved",
            WorkflowEvent::TransitionAdded { .. } => "WorkflowTransitionAdded",
            WorkflowEvent::TransitionChanged { .. } => "WorkflowTransitionChanged",
            WorkflowEvent::TransitionRemoved { .. } => "WorkflowTransitionRemoved",
            WorkflowEvent::DefaultStatusSet { .. } => "WorkflowDefaultStatusSet",
        }
    }

    /// Schema version of the event payload
    pub fn schema_version(&self) -> &'static str {
        "v1"
    }

    /// Whether this event opens a workflow stream
    pub fn is_creation(&self) -> bool {
        matches!(self, WorkflowEvent::Created { .. })
    }
}
