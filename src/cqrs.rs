// Copyright 2025 Cowboy AI, LLC.

//! # CQRS (Command Query Responsibility Segregation) Pattern
//!
//! Commands represent write operations against the workflow aggregate. Each
//! command travels in an envelope carrying its own id and the correlation and
//! causation ids that end up on every event it raises.

use crate::entity::AggregateRoot;
use crate::errors::DomainResult;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use uuid::Uuid;

/// Correlation ID for tracking related commands and events
///
/// A root command correlates with itself; every message it causes inherits
/// the same correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationId(pub Uuid);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "correlation:{}", self.0)
    }
}

/// Causation ID for tracking event causality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CausationId(pub Uuid);

impl fmt::Display for CausationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "causation:{}", self.0)
    }
}

/// Command ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CommandId(Uuid);

impl CommandId {
    /// Create a new random command ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event ID - UUID v7 for time-ordered event identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new EventId with UUID v7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identity for tracking message metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MessageIdentity {
    /// Correlation shared by every message of one interaction
    pub correlation_id: CorrelationId,
    /// The message that caused this one
    pub causation_id: CausationId,
    /// This message's own id
    pub message_id: Uuid,
}

/// Factory for creating message identities
pub struct MessageFactory;

impl MessageFactory {
    /// Root identity: correlation == causation == message id
    pub fn create_root_command(id: Uuid) -> MessageIdentity {
        MessageIdentity {
            correlation_id: CorrelationId(id),
            causation_id: CausationId(id),
            message_id: id,
        }
    }

    /// Identity of a message caused by `parent`; correlation is inherited
    pub fn caused_by(id: Uuid, parent: &MessageIdentity) -> MessageIdentity {
        MessageIdentity {
            correlation_id: parent.correlation_id,
            causation_id: CausationId(parent.message_id),
            message_id: id,
        }
    }
}

/// A command that requests a state change
///
/// Commands are write operations named with imperative verbs
/// (CreateWorkflow, AddTransition).
pub trait Command: Debug + Send + Sync {
    /// The aggregate type this command targets
    type Aggregate: AggregateRoot;

    /// Get the aggregate ID this command targets
    fn aggregate_id(&self) -> <Self::Aggregate as AggregateRoot>::Id;
}

/// A command with metadata for tracking and auditing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope<C> {
    /// Unique identifier for this command instance
    pub id: CommandId,
    /// The actual command
    pub command: C,
    /// Who issued this command
    pub issued_by: String,
    /// Message identity (correlation and causation)
    pub identity: MessageIdentity,
}

impl<C: Command> CommandEnvelope<C> {
    /// Create a root command envelope
    pub fn new(command: C, issued_by: impl Into<String>) -> Self {
        let id = CommandId::new();
        let identity = MessageFactory::create_root_command(*id.as_uuid());
        Self {
            id,
            command,
            issued_by: issued_by.into(),
            identity,
        }
    }

    /// Create a command caused by another message (continues correlation)
    pub fn caused_by(
        command: C,
        issued_by: impl Into<String>,
        parent_identity: &MessageIdentity,
    ) -> Self {
        let id = CommandId::new();
        let identity = MessageFactory::caused_by(*id.as_uuid(), parent_identity);
        Self {
            id,
            command,
            issued_by: issued_by.into(),
            identity,
        }
    }

    /// Get the correlation ID
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.identity.correlation_id
    }

    /// Get the causation ID
    pub fn causation_id(&self) -> &CausationId {
        &self.identity.causation_id
    }
}

/// Acknowledgment returned when a command has been applied and persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandAcknowledgment {
    /// The command ID that was acknowledged
    pub command_id: CommandId,
    /// Correlation ID copied from the envelope
    pub correlation_id: CorrelationId,
    /// Aggregate the command was applied to
    pub aggregate_id: Uuid,
    /// Aggregate version after the save
    pub version: u64,
    /// Number of events the command raised (zero for no-op commands)
    pub events_raised: usize,
}

/// Handler for processing commands
///
/// Errors are surfaced unchanged; nothing is swallowed.
#[async_trait]
pub trait CommandHandler<C: Command + 'static> {
    /// Handle the command and return an acknowledgment
    async fn handle(&self, envelope: CommandEnvelope<C>) -> DomainResult<CommandAcknowledgment>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_identity_is_self_caused() {
        let id = Uuid::new_v4();
        let identity = MessageFactory::create_root_command(id);

        assert_eq!(identity.correlation_id, CorrelationId(id));
        assert_eq!(identity.causation_id, CausationId(id));
        assert_eq!(identity.message_id, id);
    }

    #[test]
    fn test_caused_identity_inherits_correlation() {
        let root = Uuid::new_v4();
        let first = MessageFactory::create_root_command(root);
        let parent = MessageFactory::caused_by(Uuid::new_v4(), &first);
        let child = MessageFactory::caused_by(Uuid::new_v4(), &parent);

        assert_eq!(child.correlation_id, CorrelationId(root));
        assert_eq!(child.causation_id, CausationId(parent.message_id));
    }

    #[test]
    fn test_correlation_display() {
        let id = Uuid::nil();
        assert_eq!(
            CorrelationId(id).to_string(),
            format!("correlation:{id}")
        );
        assert_eq!(CausationId(id).to_string(), format!("causation:{id}"));
    }
}
