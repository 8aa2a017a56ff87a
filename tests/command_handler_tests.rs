// Copyright 2025 Cowboy AI, LLC.

//! Command handling against the in-memory event store

use cim_domain_workflow::{
    AggregateRoot, CausationId, CommandEnvelope, CommandHandler, CorrelationId, DomainError,
    EventSourced, EventSourcedRepository, EventStore, InMemoryEventStore,
    OrphanedTransitionPolicy, StatusCode, Transition, WorkflowCommand, WorkflowCommandHandler,
    WorkflowConfig, WorkflowId, WorkflowRepository,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn code(value: &str) -> StatusCode {
    StatusCode::new(value).unwrap()
}

fn handler_with(
    store: Arc<InMemoryEventStore>,
    config: WorkflowConfig,
) -> WorkflowCommandHandler<EventSourcedRepository> {
    let repository = EventSourcedRepository::new(store, config.aggregate_type.clone());
    WorkflowCommandHandler::new(repository, config)
}

fn envelope(command: WorkflowCommand) -> CommandEnvelope<WorkflowCommand> {
    CommandEnvelope::new(command, "editor")
}

async fn create_publishing(handler: &WorkflowCommandHandler<EventSourcedRepository>) -> WorkflowId {
    let ack = handler
        .handle(envelope(WorkflowCommand::create(
            "publishing",
            vec![code("draft"), code("review"), code("published")],
        )))
        .await
        .unwrap();
    WorkflowId::from_uuid(ack.aggregate_id)
}

#[tokio::test]
async fn commands_are_persisted_with_correlation() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryEventStore::new());
    let handler = handler_with(store.clone(), WorkflowConfig::default());
    let id = create_publishing(&handler).await;

    let command = envelope(WorkflowCommand::AddTransition {
        workflow_id: id,
        transition: Transition::new(code("draft"), code("review")),
    });
    let correlation = *command.correlation_id();
    let command_id = command.id;
    let ack = handler.handle(command).await?;

    assert_eq!(ack.version, 2);
    assert_eq!(ack.events_raised, 1);
    assert_eq!(ack.correlation_id, correlation);

    let stored = store.get_events(&id.to_string(), None).await?;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].event_type(), "WorkflowTransitionAdded");
    assert_eq!(stored[1].correlation_id(), Some(&correlation));
    assert_eq!(stored[1].metadata.triggered_by.as_deref(), Some("editor"));
    assert_eq!(correlation, CorrelationId(*command_id.as_uuid()));

    let workflow = handler.repository().load(&id).await?;
    assert!(workflow.has_transition(&code("draft"), &code("review")));
    assert_eq!(workflow.version(), 2);
    Ok(())
}

#[tokio::test]
async fn follow_up_commands_continue_the_correlation() {
    let store = Arc::new(InMemoryEventStore::new());
    let handler = handler_with(store.clone(), WorkflowConfig::default());

    let create = envelope(WorkflowCommand::create("publishing", vec![code("draft")]));
    let parent = create.identity.clone();
    let id = WorkflowId::from_code("publishing");
    handler.handle(create).await.unwrap();

    let follow_up = CommandEnvelope::caused_by(
        WorkflowCommand::AddWorkflowStatus {
            workflow_id: id,
            code: code("review"),
        },
        "automation",
        &parent,
    );
    let follow_up_id = follow_up.identity.message_id;
    let ack = handler.handle(follow_up).await.unwrap();

    assert_eq!(ack.correlation_id, parent.correlation_id);

    let stored = store.get_events(&id.to_string(), None).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].correlation_id(), stored[1].correlation_id());
    assert_eq!(stored[1].causation_id(), Some(&CausationId(parent.message_id)));
    assert_ne!(stored[1].causation_id(), Some(&CausationId(follow_up_id)));
    assert_eq!(stored[1].metadata.triggered_by.as_deref(), Some("automation"));
}

#[tokio::test]
async fn creating_twice_fails() {
    let store = Arc::new(InMemoryEventStore::new());
    let handler = handler_with(store.clone(), WorkflowConfig::default());
    create_publishing(&handler).await;

    let err = handler
        .handle(envelope(WorkflowCommand::create("publishing", Vec::new())))
        .await
        .unwrap_err();

    assert!(err.is_already_exists());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn commands_on_unknown_workflow_fail() {
    let handler = handler_with(Arc::new(InMemoryEventStore::new()), WorkflowConfig::default());

    let err = handler
        .handle(envelope(WorkflowCommand::AddWorkflowStatus {
            workflow_id: WorkflowId::from_code("missing"),
            code: code("draft"),
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::AggregateNotFound(_)));
}

#[tokio::test]
async fn noop_command_is_acknowledged_without_events() {
    let store = Arc::new(InMemoryEventStore::new());
    let handler = handler_with(store.clone(), WorkflowConfig::default());
    let id = create_publishing(&handler).await;

    let ack = handler
        .handle(envelope(WorkflowCommand::SetDefaultStatus {
            workflow_id: id,
            code: code("draft"),
        }))
        .await
        .unwrap();

    assert_eq!(ack.events_raised, 0);
    assert_eq!(ack.version, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn stale_save_is_rejected_and_handler_retries() {
    let store = Arc::new(InMemoryEventStore::new());
    let handler = handler_with(store.clone(), WorkflowConfig::default());
    let id = create_publishing(&handler).await;

    // A writer that loaded before the handler's change now holds a stale version.
    let repository = EventSourcedRepository::new(store.clone(), "Workflow");
    let mut stale = repository.load(&id).await.unwrap();

    handler
        .handle(envelope(WorkflowCommand::AddWorkflowStatus {
            workflow_id: id,
            code: code("archived"),
        }))
        .await
        .unwrap();

    stale.add_status(code("deleted")).unwrap();
    let err = repository.save(&mut stale).await.unwrap_err();
    assert!(DomainError::from(err).is_concurrency_error());
    assert_eq!(stale.pending_events().len(), 1);

    // The handler always reloads, so concurrent commands on the same workflow all land.
    let handler = Arc::new(handler);
    let tasks: Vec<_> = ["one", "two", "three", "four"]
        .into_iter()
        .map(|name| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .handle(envelope(WorkflowCommand::AddWorkflowStatus {
                        workflow_id: id,
                        code: code(name),
                    }))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let workflow = repository.load(&id).await.unwrap();
    assert_eq!(workflow.version(), 6);
    assert_eq!(workflow.statuses().len(), 8);
}

#[tokio::test]
async fn prune_policy_removes_orphaned_transitions() {
    let store = Arc::new(InMemoryEventStore::new());
    let config = WorkflowConfig {
        orphaned_transitions: OrphanedTransitionPolicy::Prune,
        ..WorkflowConfig::default()
    };
    let handler = handler_with(store.clone(), config);
    let id = create_publishing(&handler).await;

    for (source, destination) in [("draft", "review"), ("review", "published")] {
        handler
            .handle(envelope(WorkflowCommand::AddTransition {
                workflow_id: id,
                transition: Transition::new(code(source), code(destination)),
            }))
            .await
            .unwrap();
    }

    handler
        .handle(envelope(WorkflowCommand::RemoveWorkflowStatus {
            workflow_id: id,
            code: code("draft"),
        }))
        .await
        .unwrap();

    let workflow = handler.repository().load(&id).await.unwrap();
    assert_eq!(
        workflow.transitions(),
        &[Transition::new(code("review"), code("published"))]
    );
    assert_eq!(workflow.default_status(), Some(&code("review")));
}
