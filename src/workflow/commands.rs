// Copyright 2025 Cowboy AI, LLC.

//! Workflow commands
//!
//! Commands represent intentions to change workflow state.
//! They are processed by the [`WorkflowCommandHandler`](crate::WorkflowCommandHandler)
//! which loads the aggregate, invokes one of its methods and saves the result.

use crate::{
    cqrs::Command,
    identifiers::WorkflowId,
    workflow::{StatusCode, Transition, Workflow},
};
use serde::{Deserialize, Serialize};

/// Commands that can be sent to a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowCommand {
    /// Create a workflow; its id is derived from the code
    CreateWorkflow {
        /// Workflow code
        code: String,
        /// Initial statuses, first one becomes the default
        statuses: Vec<StatusCode>,
    },

    /// Bring the workflow's status set in line with `statuses`
    ///
    /// Missing statuses are added in the given order, statuses not listed
    /// are removed.
    UpdateWorkflow {
        /// The workflow to update
        workflow_id: WorkflowId,
        /// Desired status set
        statuses: Vec<StatusCode>,
    },

    /// Add a status
    AddWorkflowStatus {
        /// The workflow to change
        workflow_id: WorkflowId,
        /// Status to add
        code: StatusCode,
    },

    /// Remove a status
    RemoveWorkflowStatus {
        /// The workflow to change
        workflow_id: WorkflowId,
        /// Status to remove
        code: StatusCode,
    },

    /// Set the default status
    SetDefaultStatus {
        /// The workflow to change
        workflow_id: WorkflowId,
        /// New default status
        code: StatusCode,
    },

    /// Add a transition
    AddTransition {
        /// The workflow to change
        workflow_id: WorkflowId,
        /// Transition to add
        transition: Transition,
    },

    /// Replace the transition for a (source, destination) pair
    ChangeTransition {
        /// The workflow to change
        workflow_id: WorkflowId,
        /// Source of the transition to replace
        source: StatusCode,
        /// Destination of the transition to replace
        destination: StatusCode,
        /// Replacement transition
        transition: Transition,
    },

    /// Remove the transition for a (source, destination) pair
    RemoveTransition {
        /// The workflow to change
        workflow_id: WorkflowId,
        /// Source of the transition to remove
        source: StatusCode,
        /// Destination of the transition to remove
        destination: StatusCode,
    },
}

impl WorkflowCommand {
    /// Build a creation command
    pub fn create(code: impl Into<String>, statuses: Vec<StatusCode>) -> Self {
        WorkflowCommand::CreateWorkflow {
            code: code.into(),
            statuses,
        }
    }

    /// The workflow this command targets
    pub fn workflow_id(&self) -> WorkflowId {
        match self {
            WorkflowCommand::CreateWorkflow { code, .. } => WorkflowId::from_code(code),
            WorkflowCommand::UpdateWorkflow { workflow_id, .. }
            | WorkflowCommand::AddWorkflowStatus { workflow_id, .. }
            | WorkflowCommand::RemoveWorkflowStatus { workflow_id, .. }
            | WorkflowCommand::SetDefaultStatus { workflow_id, .. }
            | WorkflowCommand::AddTransition { workflow_id, .. }
            | WorkflowCommand::ChangeTransition { workflow_id, .. }
            | WorkflowCommand::RemoveTransition { workflow_id, .. } => *workflow_id,
        }
    }

    /// Command name, used in logs and acknowledgments
    pub fn command_type(&self) -> &'static str {
        match self {
            WorkflowCommand::CreateWorkflow { .. } => "CreateWorkflow",
            WorkflowCommand::UpdateWorkflow { .. } => "UpdateWorkflow",
            WorkflowCommand::AddWorkflowStatus { .. } => "AddWorkflowStatus",
            WorkflowCommand::RemoveWorkflowStatus { .. } => "RemoveWorkflowStatus",
            WorkflowCommand::SetDefaultStatus { .. } => "SetDefaultStatus",
            WorkflowCommand::AddTransition { .. } => "AddTransition",
            WorkflowCommand::ChangeTransition { .. } => "ChangeTransition",
            WorkflowCommand::RemoveTransition { .. } => "RemoveTransition",
        }
    }
}

impl Command for WorkflowCommand {
    type Aggregate = Workflow;

    fn aggregate_id(&self) -> WorkflowId {
        self.workflow_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_command_targets_id_derived_from_code() {
        let command = WorkflowCommand::create("publishing", Vec::new());

        assert_eq!(command.workflow_id(), WorkflowId::from_code("publishing"));
        assert_eq!(command.command_type(), "CreateWorkflow");
    }

    #[test]
    fn test_command_deserializes_from_tagged_json() {
        let id = WorkflowId::from_code("publishing");
        let json = serde_json::json!({
            "type": "AddWorkflowStatus",
            "workflow_id": id,
            "code": "archived",
        });

        let command: WorkflowCommand = serde_json::from_value(json).unwrap();

        assert_eq!(command.workflow_id(), id);
        assert_eq!(
            command,
            WorkflowCommand::AddWorkflowStatus {
                workflow_id: id,
                code: StatusCode::new("archived").unwrap(),
            }
        );
    }
}
