// Copyright 2025 Cowboy AI, LLC.

//! Command handlers for workflow aggregates
//!
//! Command handlers load the aggregate, invoke one of its methods and save the
//! resulting events. They return only acknowledgments, not data - use the
//! projections for data retrieval.

use crate::{
    config::{OrphanedTransitionPolicy, WorkflowConfig},
    cqrs::{CommandAcknowledgment, CommandEnvelope, CommandHandler},
    entity::EventSourced,
    errors::{DomainError, DomainResult},
    identifiers::WorkflowId,
    infrastructure::EventMetadata,
    persistence::{RepositoryError, WorkflowRepository},
    workflow::{StatusCode, Workflow, WorkflowCommand},
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Handles [`WorkflowCommand`]s against a [`WorkflowRepository`]
pub struct WorkflowCommandHandler<R> {
    repository: R,
    config: WorkflowConfig,
}

impl<R: WorkflowRepository> WorkflowCommandHandler<R> {
    /// Create a handler with the given repository and configuration
    pub fn new(repository: R, config: WorkflowConfig) -> Self {
        Self { repository, config }
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The handler configuration
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    async fn create(
        &self,
        code: &str,
        statuses: &[StatusCode],
        metadata: EventMetadata,
    ) -> DomainResult<(u64, usize)> {
        let id = WorkflowId::from_code(code);
        if self.repository.exists(&id).await? {
            return Err(DomainError::AlreadyExists(format!("Workflow \"{code}\"")));
        }

        let mut workflow = Workflow::create(code, statuses.to_vec())?;
        let events_raised = workflow.pending_events().len();

        match self.repository.save_with_metadata(&mut workflow, metadata).await {
            Ok(saved) => Ok((saved.version, events_raised)),
            // Lost a race with another creation of the same code.
            Err(RepositoryError::VersionConflict { .. }) => {
                Err(DomainError::AlreadyExists(format!("Workflow \"{code}\"")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn execute(
        &self,
        id: WorkflowId,
        command: &WorkflowCommand,
        metadata: EventMetadata,
    ) -> DomainResult<(u64, usize)> {
        let mut attempt = 0;
        loop {
            let mut workflow = self.repository.load(&id).await?;
            self.apply_command(&mut workflow, command)?;

            let events_raised = workflow.pending_events().len();
            if events_raised == 0 {
                debug!(
                    "{} raised no events on workflow {}",
                    command.command_type(),
                    workflow.code()
                );
            }

            match self
                .repository
                .save_with_metadata(&mut workflow, metadata.clone())
                .await
            {
                Ok(saved) => return Ok((saved.version, events_raised)),
                Err(RepositoryError::VersionConflict { expected, actual })
                    if attempt < self.config.max_command_retries =>
                {
                    attempt += 1;
                    warn!(
                        "Concurrency conflict on workflow {} (expected {}, actual {}), retry {}/{}",
                        workflow.code(),
                        expected,
                        actual,
                        attempt,
                        self.config.max_command_retries
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn apply_command(&self, workflow: &mut Workflow, command: &WorkflowCommand) -> DomainResult<()> {
        match command {
            WorkflowCommand::CreateWorkflow { .. } => Err(DomainError::AlreadyExists(format!(
                "Workflow \"{}\"",
                workflow.code()
            ))),
            WorkflowCommand::UpdateWorkflow { statuses, .. } => {
                for status in statuses {
                    if !workflow.has_status(status) {
                        workflow.add_status(status.clone())?;
                    }
                }
                let obsolete: Vec<StatusCode> = workflow
                    .statuses()
                    .into_iter()
                    .filter(|existing| !statuses.contains(existing))
                    .cloned()
                    .collect();
                for status in &obsolete {
                    self.remove_status(workflow, status)?;
                }
                Ok(())
            }
            WorkflowCommand::AddWorkflowStatus { code, .. } => workflow.add_status(code.clone()),
            WorkflowCommand::RemoveWorkflowStatus { code, .. } => {
                self.remove_status(workflow, code)
            }
            WorkflowCommand::SetDefaultStatus { code, .. } => workflow.set_default_status(code),
            WorkflowCommand::AddTransition { transition, .. } => {
                workflow.add_transition(transition.clone())
            }
            WorkflowCommand::ChangeTransition {
                source,
                destination,
                transition,
                ..
            } => workflow.change_transition(source, destination, transition.clone()),
            WorkflowCommand::RemoveTransition {
                source,
                destination,
                ..
            } => {
                workflow.remove_transition(source, destination);
                Ok(())
            }
        }
    }

    fn remove_status(&self, workflow: &mut Workflow, code: &StatusCode) -> DomainResult<()> {
        if self.config.orphaned_transitions == OrphanedTransitionPolicy::Prune
            && workflow.has_status(code)
        {
            let touching: Vec<(StatusCode, StatusCode)> = workflow
                .transitions()
                .iter()
                .filter(|t| t.touches(code))
                .map(|t| (t.source().clone(), t.destination().clone()))
                .collect();
            for (source, destination) in &touching {
                workflow.remove_transition(source, destination);
            }
        }
        workflow.remove_status(code)
    }
}

#[async_trait]
impl<R: WorkflowRepository> CommandHandler<WorkflowCommand> for WorkflowCommandHandler<R> {
    async fn handle(
        &self,
        envelope: CommandEnvelope<WorkflowCommand>,
    ) -> DomainResult<CommandAcknowledgment> {
        let metadata = EventMetadata::from_envelope(&envelope);
        let command = &envelope.command;
        let id = command.workflow_id();

        info!(
            "Handling {} ({}) for workflow {}",
            command.command_type(),
            envelope.id,
            id
        );

        let (version, events_raised) = match command {
            WorkflowCommand::CreateWorkflow { code, statuses } => {
                self.create(code, statuses, metadata).await?
            }
            other => self.execute(id, other, metadata).await?,
        };

        Ok(CommandAcknowledgment {
            command_id: envelope.id,
            correlation_id: *envelope.correlation_id(),
            aggregate_id: *id.as_uuid(),
            version,
            events_raised,
        })
    }
}
