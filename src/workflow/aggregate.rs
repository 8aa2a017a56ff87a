// Copyright 2025 Cowboy AI, LLC.

//! Workflow aggregate
//!
//! A workflow is a named graph of statuses and the transitions permitted
//! between them, plus at most one default status. Every mutating method
//! validates against the current in-memory state first; only then is exactly
//! one event raised, applied and buffered. A failed command leaves the
//! aggregate untouched.

use crate::{
    entity::{AggregateRoot, EventSourced},
    errors::{DomainError, DomainResult},
    identifiers::WorkflowId,
    workflow::{StatusCode, Transition, WorkflowEvent},
};
use indexmap::IndexSet;
use tracing::debug;

/// Event-sourced workflow aggregate root
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    id: WorkflowId,
    code: String,
    // Insertion order drives default reassignment on removal.
    statuses: IndexSet<StatusCode>,
    transitions: Vec<Transition>,
    default_status: Option<StatusCode>,
    version: u64,
    pending_events: Vec<WorkflowEvent>,
}

impl Workflow {
    /// Code of the system-wide default workflow
    pub const DEFAULT: &'static str = "default";

    fn empty() -> Self {
        Self {
            id: WorkflowId::nil(),
            code: String::new(),
            statuses: IndexSet::new(),
            transitions: Vec::new(),
            default_status: None,
            version: 0,
            pending_events: Vec::new(),
        }
    }

    /// Create a new workflow, raising a `Created` event
    ///
    /// The first status becomes the default. Fails with `ValidationError` if
    /// the code is blank or the statuses contain duplicates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cim_domain_workflow::{AggregateRoot, EventSourced, StatusCode, Workflow, WorkflowId};
    ///
    /// let statuses = ["draft", "review", "published"]
    ///     .into_iter()
    ///     .map(StatusCode::new)
    ///     .collect::<Result<Vec<_>, _>>()
    ///     .unwrap();
    ///
    /// let workflow = Workflow::create("publishing", statuses).unwrap();
    /// assert_eq!(workflow.id(), WorkflowId::from_code("publishing"));
    /// assert_eq!(workflow.default_status().map(|s| s.as_str()), Some("draft"));
    /// assert_eq!(workflow.pending_events().len(), 1);
    /// ```
    pub fn create(code: impl Into<String>, statuses: Vec<StatusCode>) -> DomainResult<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Workflow code cannot be empty".to_string(),
            ));
        }

        let mut seen = IndexSet::with_capacity(statuses.len());
        for status in &statuses {
            if !seen.insert(status) {
                return Err(DomainError::ValidationError(format!(
                    "Duplicate status \"{status}\" in workflow \"{code}\""
                )));
            }
        }

        let mut workflow = Self::empty();
        workflow.raise(WorkflowEvent::Created {
            id: WorkflowId::from_code(&code),
            code,
            statuses,
        });
        Ok(workflow)
    }

    /// Rebuild a workflow by replaying its full event history from empty state
    ///
    /// The first event must be `Created` and no later event may be. All
    /// replayed events count as committed.
    pub fn from_events<'a, I>(history: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = &'a WorkflowEvent>,
    {
        let mut events = history.into_iter();
        let mut workflow = Self::empty();

        match events.next() {
            Some(first) if first.is_creation() => {
                workflow.apply(first);
                workflow.version += 1;
            }
            Some(first) => {
                return Err(DomainError::InvariantViolation(format!(
                    "Workflow stream must start with a creation event, found {}",
                    first.event_type()
                )))
            }
            None => {
                return Err(DomainError::InvariantViolation(
                    "Workflow stream is empty".to_string(),
                ))
            }
        }

        for event in events {
            if event.is_creation() {
                return Err(DomainError::InvariantViolation(format!(
                    "Workflow \"{}\" was created twice",
                    workflow.code
                )));
            }
            workflow.apply(event);
            workflow.version += 1;
        }

        Ok(workflow)
    }

    /// Workflow code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Statuses in insertion order
    pub fn statuses(&self) -> Vec<&StatusCode> {
        self.statuses.iter().collect()
    }

    /// Transitions in insertion order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Whether `code` is one of the workflow's statuses
    pub fn has_status(&self, code: &StatusCode) -> bool {
        self.statuses.contains(code)
    }

    /// Whether a transition `source -> destination` exists
    pub fn has_transition(&self, source: &StatusCode, destination: &StatusCode) -> bool {
        self.find_transition(source, destination).is_some()
    }

    /// Whether a default status is set
    pub fn has_default_status(&self) -> bool {
        self.default_status.is_some()
    }

    /// The default status, if any
    pub fn default_status(&self) -> Option<&StatusCode> {
        self.default_status.as_ref()
    }

    /// The default status, failing with `NotFound` if none is set
    pub fn get_default_status(&self) -> DomainResult<&StatusCode> {
        self.default_status.as_ref().ok_or_else(|| {
            DomainError::NotFound(format!(
                "Default status of workflow \"{}\"",
                self.code
            ))
        })
    }

    /// The transition `source -> destination`, failing with `NotFound` if absent
    pub fn get_transition(
        &self,
        source: &StatusCode,
        destination: &StatusCode,
    ) -> DomainResult<&Transition> {
        self.find_transition(source, destination)
            .map(|index| &self.transitions[index])
            .ok_or_else(|| transition_not_found(source, destination))
    }

    /// All transitions leaving `code`, in insertion order
    pub fn transitions_from_status(&self, code: &StatusCode) -> Vec<&Transition> {
        self.transitions
            .iter()
            .filter(|transition| transition.source() == code)
            .collect()
    }

    /// Add a status; it becomes the default if none is set
    pub fn add_status(&mut self, code: StatusCode) -> DomainResult<()> {
        if self.has_status(&code) {
            return Err(DomainError::AlreadyExists(format!("Status \"{code}\"")));
        }

        self.raise(WorkflowEvent::StatusAdded { code });
        Ok(())
    }

    /// Remove a status
    ///
    /// If it was the default, the first remaining status in insertion order
    /// becomes the default, or the default is cleared. Transitions touching
    /// the status are left in place.
    pub fn remove_status(&mut self, code: &StatusCode) -> DomainResult<()> {
        self.ensure_status(code)?;

        self.raise(WorkflowEvent::StatusRemoved { code: code.clone() });
        Ok(())
    }

    /// Set the default status; raises nothing if it already is the default
    pub fn set_default_status(&mut self, code: &StatusCode) -> DomainResult<()> {
        self.ensure_status(code)?;

        if self.default_status.as_ref() == Some(code) {
            return Ok(());
        }

        self.raise(WorkflowEvent::DefaultStatusSet { code: code.clone() });
        Ok(())
    }

    /// Add a transition between two existing statuses
    pub fn add_transition(&mut self, transition: Transition) -> DomainResult<()> {
        let (source, destination) = (transition.source(), transition.destination());

        if self.has_transition(source, destination) {
            return Err(DomainError::AlreadyExists(format!(
                "Transition from \"{source}\" to \"{destination}\""
            )));
        }
        self.ensure_endpoints(source, destination)?;

        self.raise(WorkflowEvent::TransitionAdded { transition });
        Ok(())
    }

    /// Replace the transition `source -> destination` with `transition`
    ///
    /// The old and new transitions are both recorded on the event. The new
    /// transition's endpoints must exist, and if it moves to another pair
    /// that pair must be free.
    pub fn change_transition(
        &mut self,
        source: &StatusCode,
        destination: &StatusCode,
        transition: Transition,
    ) -> DomainResult<()> {
        let index = self
            .find_transition(source, destination)
            .ok_or_else(|| transition_not_found(source, destination))?;
        self.ensure_endpoints(source, destination)?;
        self.ensure_endpoints(transition.source(), transition.destination())?;

        let moves_pair = !transition.connects(source, destination);
        if moves_pair && self.has_transition(transition.source(), transition.destination()) {
            return Err(DomainError::AlreadyExists(format!(
                "Transition from \"{}\" to \"{}\"",
                transition.source(),
                transition.destination()
            )));
        }

        let from = self.transitions[index].clone();
        self.raise(WorkflowEvent::TransitionChanged {
            source: source.clone(),
            destination: destination.clone(),
            from,
            to: transition,
        });
        Ok(())
    }

    /// Remove the transition `source -> destination`
    ///
    /// No existence check is made; removing an absent transition still
    /// raises an event, which applies as a no-op.
    pub fn remove_transition(&mut self, source: &StatusCode, destination: &StatusCode) {
        self.raise(WorkflowEvent::TransitionRemoved {
            source: source.clone(),
            destination: destination.clone(),
        });
    }

    fn raise(&mut self, event: WorkflowEvent) {
        self.apply(&event);
        debug!("Workflow {} raised {}", self.code, event.event_type());
        self.pending_events.push(event);
    }

    fn find_transition(&self, source: &StatusCode, destination: &StatusCode) -> Option<usize> {
        self.transitions
            .iter()
            .position(|transition| transition.connects(source, destination))
    }

    fn ensure_status(&self, code: &StatusCode) -> DomainResult<()> {
        if self.has_status(code) {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!("Status \"{code}\"")))
        }
    }

    fn ensure_endpoints(&self, source: &StatusCode, destination: &StatusCode) -> DomainResult<()> {
        if !self.has_status(source) {
            return Err(DomainError::NotFound(format!(
                "Transition source status \"{source}\""
            )));
        }
        if !self.has_status(destination) {
            return Err(DomainError::NotFound(format!(
                "Transition destination status \"{destination}\""
            )));
        }
        Ok(())
    }
}

fn transition_not_found(source: &StatusCode, destination: &StatusCode) -> DomainError {
    DomainError::NotFound(format!(
        "Transition from \"{source}\" to \"{destination}\""
    ))
}

impl AggregateRoot for Workflow {
    type Id = WorkflowId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl EventSourced for Workflow {
    type Event = WorkflowEvent;

    fn apply(&mut self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::Created { id, code, statuses } => {
                self.id = *id;
                self.code = code.clone();
                self.statuses = IndexSet::with_capacity(statuses.len());
                self.transitions = Vec::new();
                for status in statuses {
                    if self.default_status.is_none() {
                        self.default_status = Some(status.clone());
                    }
                    self.statuses.insert(status.clone());
                }
            }
            WorkflowEvent::StatusAdded { code } => {
                self.statuses.insert(code.clone());
                if self.default_status.is_none() {
                    self.default_status = Some(code.clone());
                }
            }
            WorkflowEvent::StatusRemoved { code } => {
                self.statuses.shift_remove(code);
                if self.default_status.as_ref() == Some(code) {
                    self.default_status = self.statuses.first().cloned();
                }
            }
            WorkflowEvent::TransitionAdded { transition } => {
                self.transitions.push(transition.clone());
            }
            WorkflowEvent::TransitionChanged {
                source,
                destination,
                to,
                ..
            } => {
                if let Some(index) = self.find_transition(source, destination) {
                    self.transitions[index] = to.clone();
                }
            }
            WorkflowEvent::TransitionRemoved {
                source,
                destination,
            } => {
                self.transitions
                    .retain(|transition| !transition.connects(source, destination));
            }
            WorkflowEvent::DefaultStatusSet { code } => {
                self.default_status = Some(code.clone());
            }
        }
    }

    fn pending_events(&self) -> &[WorkflowEvent] {
        &self.pending_events
    }

    fn commit_pending_events(&mut self) -> usize {
        let committed = self.pending_events.len();
        self.version += committed as u64;
        self.pending_events.clear();
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(value: &str) -> StatusCode {
        StatusCode::new(value).unwrap()
    }

    fn codes(values: &[&str]) -> Vec<StatusCode> {
        values.iter().map(|value| code(value)).collect()
    }

    fn publishing() -> Workflow {
        let mut workflow =
            Workflow::create("publishing", codes(&["draft", "review", "published"])).unwrap();
        workflow.commit_pending_events();
        workflow
    }

    #[test]
    fn test_apply_folds_without_recording() {
        let mut workflow = publishing();

        workflow.apply(&WorkflowEvent::StatusAdded {
            code: code("archived"),
        });

        assert!(workflow.has_status(&code("archived")));
        assert!(workflow.pending_events().is_empty());
        assert_eq!(workflow.version(), 1);

        // The mutating method validates against the folded state.
        let err = workflow.add_status(code("archived")).unwrap_err();
        assert!(err.is_already_exists());
        assert!(workflow.pending_events().is_empty());
    }

    #[test]
    fn test_create_sets_first_status_as_default() {
        let workflow = Workflow::create("publishing", codes(&["draft", "review"])).unwrap();

        assert_eq!(workflow.code(), "publishing");
        assert_eq!(workflow.id(), WorkflowId::from_code("publishing"));
        assert_eq!(workflow.default_status(), Some(&code("draft")));
        assert_eq!(workflow.version(), 0);
        assert_eq!(workflow.pending_events().len(), 1);
    }

    #[test]
    fn test_create_without_statuses_has_no_default() {
        let workflow = Workflow::create("empty", Vec::new()).unwrap();

        assert!(!workflow.has_default_status());
        assert!(workflow.get_default_status().unwrap_err().is_not_found());
        assert!(workflow.statuses().is_empty());
    }

    #[test]
    fn test_create_rejects_duplicates_and_blank_code() {
        let err = Workflow::create("publishing", codes(&["draft", "draft"])).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let err = Workflow::create("  ", codes(&["draft"])).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn test_add_status_rejects_existing_code_without_event() {
        let mut workflow = publishing();

        let err = workflow.add_status(code("draft")).unwrap_err();

        assert!(err.is_already_exists());
        assert!(workflow.pending_events().is_empty());
    }

    #[test]
    fn test_add_status_becomes_default_when_none_set() {
        let mut workflow = Workflow::create("empty", Vec::new()).unwrap();

        workflow.add_status(code("new")).unwrap();
        workflow.add_status(code("open")).unwrap();

        assert_eq!(workflow.default_status(), Some(&code("new")));
    }

    #[test]
    fn test_removing_default_reassigns_to_first_remaining() {
        let mut workflow = Workflow::create("ab", codes(&["a", "b"])).unwrap();

        workflow.remove_status(&code("a")).unwrap();
        assert_eq!(workflow.default_status(), Some(&code("b")));

        workflow.remove_status(&code("b")).unwrap();
        assert_eq!(workflow.default_status(), None);
    }

    #[test]
    fn test_removing_non_default_keeps_default() {
        let mut workflow = publishing();
        workflow.set_default_status(&code("review")).unwrap();

        workflow.remove_status(&code("draft")).unwrap();

        assert_eq!(workflow.default_status(), Some(&code("review")));
        assert_eq!(workflow.statuses(), vec![&code("review"), &code("published")]);
    }

    #[test]
    fn test_remove_missing_status_fails() {
        let mut workflow = publishing();
        let err = workflow.remove_status(&code("archived")).unwrap_err();

        assert!(err.is_not_found());
        assert!(workflow.pending_events().is_empty());
    }

    #[test]
    fn test_set_default_status_is_noop_when_unchanged() {
        let mut workflow = publishing();

        workflow.set_default_status(&code("draft")).unwrap();
        assert!(workflow.pending_events().is_empty());

        workflow.set_default_status(&code("review")).unwrap();
        assert_eq!(workflow.pending_events().len(), 1);
        assert_eq!(workflow.default_status(), Some(&code("review")));

        let err = workflow.set_default_status(&code("archived")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_transition_checks_duplicates_then_endpoints() {
        let mut workflow = publishing();
        let draft_review = Transition::new(code("draft"), code("review"));

        workflow.add_transition(draft_review.clone()).unwrap();
        let err = workflow.add_transition(draft_review).unwrap_err();
        assert!(err.is_already_exists());

        let err = workflow
            .add_transition(Transition::new(code("draft"), code("archived")))
            .unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(workflow.transitions().len(), 1);
        assert_eq!(workflow.pending_events().len(), 1);
    }

    #[test]
    fn test_change_transition_records_old_and_new() {
        let mut workflow = publishing();
        workflow
            .add_transition(Transition::new(code("draft"), code("review")))
            .unwrap();
        workflow.commit_pending_events();

        let relabelled = Transition::new(code("draft"), code("review")).with_label("Submit");
        workflow
            .change_transition(&code("draft"), &code("review"), relabelled.clone())
            .unwrap();

        assert_eq!(
            workflow.pending_events(),
            &[WorkflowEvent::TransitionChanged {
                source: code("draft"),
                destination: code("review"),
                from: Transition::new(code("draft"), code("review")),
                to: relabelled.clone(),
            }]
        );
        assert_eq!(
            workflow.get_transition(&code("draft"), &code("review")).unwrap(),
            &relabelled
        );
    }

    #[test]
    fn test_change_transition_failures() {
        let mut workflow = publishing();
        workflow
            .add_transition(Transition::new(code("draft"), code("review")))
            .unwrap();
        workflow
            .add_transition(Transition::new(code("review"), code("published")))
            .unwrap();
        workflow.commit_pending_events();

        let err = workflow
            .change_transition(
                &code("draft"),
                &code("published"),
                Transition::new(code("draft"), code("published")),
            )
            .unwrap_err();
        assert!(err.is_not_found());

        let err = workflow
            .change_transition(
                &code("draft"),
                &code("review"),
                Transition::new(code("draft"), code("archived")),
            )
            .unwrap_err();
        assert!(err.is_not_found());

        let err = workflow
            .change_transition(
                &code("draft"),
                &code("review"),
                Transition::new(code("review"), code("published")),
            )
            .unwrap_err();
        assert!(err.is_already_exists());

        assert!(workflow.pending_events().is_empty());
    }

    #[test]
    fn test_remove_transition_always_raises() {
        let mut workflow = publishing();
        workflow
            .add_transition(Transition::new(code("draft"), code("review")))
            .unwrap();

        workflow.remove_transition(&code("draft"), &code("review"));
        workflow.remove_transition(&code("draft"), &code("review"));

        assert!(workflow.transitions().is_empty());
        assert_eq!(workflow.pending_events().len(), 3);
    }

    #[test]
    fn test_transitions_from_status_preserves_order() {
        let mut workflow = publishing();
        for (source, destination) in [
            ("draft", "review"),
            ("review", "published"),
            ("draft", "published"),
        ] {
            workflow
                .add_transition(Transition::new(code(source), code(destination)))
                .unwrap();
        }

        let from_draft: Vec<String> = workflow
            .transitions_from_status(&code("draft"))
            .into_iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(from_draft, vec!["draft -> review", "draft -> published"]);
        assert!(workflow
            .transitions_from_status(&code("published"))
            .is_empty());
    }

    #[test]
    fn test_from_events_replays_history() {
        let mut live = publishing();
        live.add_transition(Transition::new(code("draft"), code("review")))
            .unwrap();
        live.remove_status(&code("draft")).unwrap();

        let mut history = vec![WorkflowEvent::Created {
            id: live.id(),
            code: "publishing".to_string(),
            statuses: codes(&["draft", "review", "published"]),
        }];
        history.extend(live.pending_events().iter().cloned());
        live.commit_pending_events();

        let replayed = Workflow::from_events(&history).unwrap();

        assert_eq!(replayed, live);
        assert_eq!(replayed.version(), 3);
        assert_eq!(replayed.statuses(), live.statuses());
    }

    #[test]
    fn test_from_events_rejects_malformed_streams() {
        let err = Workflow::from_events(&[]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let orphan = [WorkflowEvent::StatusAdded { code: code("draft") }];
        let err = Workflow::from_events(&orphan).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        let created = WorkflowEvent::Created {
            id: WorkflowId::from_code("twice"),
            code: "twice".to_string(),
            statuses: Vec::new(),
        };
        let err = Workflow::from_events(&[created.clone(), created]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
