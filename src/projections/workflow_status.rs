// Copyright 2025 Cowboy AI, LLC.

//! Workflow status projection
//!
//! Keeps one view per workflow with its ordered status rows, the default
//! flag on each row and the transitions between them.

use super::{EventSequence, Projection};
use crate::{
    identifiers::WorkflowId,
    infrastructure::StoredEvent,
    workflow::{StatusCode, Transition, Workflow, WorkflowEvent},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// One status of a workflow as seen by readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    /// Status code
    pub code: StatusCode,
    /// Whether this is the workflow's default status
    pub is_default: bool,
}

/// Read-side view of a single workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowView {
    /// Workflow id
    pub id: WorkflowId,
    /// Workflow code
    pub code: String,
    /// Statuses in insertion order
    pub statuses: Vec<StatusRow>,
    /// Transitions in insertion order
    pub transitions: Vec<Transition>,
    /// Sequence of the last event applied to this view
    pub version: u64,
}

impl WorkflowView {
    fn new(id: WorkflowId, code: String) -> Self {
        Self {
            id,
            code,
            statuses: Vec::new(),
            transitions: Vec::new(),
            version: 0,
        }
    }

    /// The default status, if any
    pub fn default_status(&self) -> Option<&StatusCode> {
        self.statuses
            .iter()
            .find(|row| row.is_default)
            .map(|row| &row.code)
    }

    /// Whether the workflow declares `code`
    pub fn has_status(&self, code: &StatusCode) -> bool {
        self.statuses.iter().any(|row| &row.code == code)
    }

    fn add_status(&mut self, code: StatusCode) {
        if self.has_status(&code) {
            return;
        }
        let is_default = self.default_status().is_none();
        self.statuses.push(StatusRow { code, is_default });
    }

    fn remove_status(&mut self, code: &StatusCode) {
        let Some(index) = self.statuses.iter().position(|row| &row.code == code) else {
            return;
        };
        let removed = self.statuses.remove(index);
        if removed.is_default {
            if let Some(first) = self.statuses.first_mut() {
                first.is_default = true;
            }
        }
    }

    fn set_default(&mut self, code: &StatusCode) {
        for row in &mut self.statuses {
            row.is_default = &row.code == code;
        }
    }

    fn apply(&mut self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::Created { statuses, .. } => {
                self.statuses.clear();
                self.transitions.clear();
                for status in statuses {
                    self.add_status(status.clone());
                }
            }
            WorkflowEvent::StatusAdded { code } => self.add_status(code.clone()),
            WorkflowEvent::StatusRemoved { code } => self.remove_status(code),
            WorkflowEvent::TransitionAdded { transition } => {
                self.transitions.push(transition.clone());
            }
            WorkflowEvent::TransitionChanged {
                source,
                destination,
                to,
                ..
            } => {
                if let Some(existing) = self
                    .transitions
                    .iter_mut()
                    .find(|t| t.connects(source, destination))
                {
                    *existing = to.clone();
                }
            }
            WorkflowEvent::TransitionRemoved {
                source,
                destination,
            } => {
                self.transitions.retain(|t| !t.connects(source, destination));
            }
            WorkflowEvent::DefaultStatusSet { code } => self.set_default(code),
        }
    }
}

/// Projection that maintains the status layout of every workflow
#[derive(Debug, Clone, Default)]
pub struct WorkflowStatusProjection {
    workflows: HashMap<WorkflowId, WorkflowView>,
    // Stored events carry the aggregate id as a string.
    streams: HashMap<String, WorkflowId>,
    codes: HashMap<String, WorkflowId>,
    checkpoint: Option<EventSequence>,
}

impl WorkflowStatusProjection {
    /// Create a new, empty projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a workflow view by id
    pub fn get_workflow(&self, id: &WorkflowId) -> Option<&WorkflowView> {
        self.workflows.get(id)
    }

    /// Get a workflow view by code
    pub fn find_by_code(&self, code: &str) -> Option<&WorkflowView> {
        self.codes.get(code).and_then(|id| self.workflows.get(id))
    }

    /// All workflows, sorted by code
    pub fn list_workflows(&self) -> Vec<&WorkflowView> {
        let mut views: Vec<&WorkflowView> = self.workflows.values().collect();
        views.sort_by(|a, b| a.code.cmp(&b.code));
        views
    }

    /// Status rows of one workflow in insertion order
    pub fn statuses(&self, id: &WorkflowId) -> Option<&[StatusRow]> {
        self.workflows.get(id).map(|view| view.statuses.as_slice())
    }

    /// How many workflows declare each status
    pub fn count_workflows_by_status(&self) -> BTreeMap<StatusCode, usize> {
        let mut counts = BTreeMap::new();
        for view in self.workflows.values() {
            for row in &view.statuses {
                *counts.entry(row.code.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Statuses of a workflow in the order a record would move through them
    ///
    /// Walks the transition graph breadth-first from the default status,
    /// following transitions in insertion order. Statuses the walk never
    /// reaches follow, sorted by code. Transitions pointing at removed
    /// statuses are ignored.
    pub fn sorted_transition_statuses(&self, id: &WorkflowId) -> Vec<&StatusCode> {
        let Some(view) = self.workflows.get(id) else {
            return Vec::new();
        };

        let mut ordered: Vec<&StatusCode> = Vec::with_capacity(view.statuses.len());
        let mut visited: HashSet<&StatusCode> = HashSet::new();
        let mut queue: VecDeque<&StatusCode> = VecDeque::new();

        if let Some(start) = view.default_status() {
            visited.insert(start);
            queue.push_back(start);
        }

        while let Some(current) = queue.pop_front() {
            ordered.push(current);
            for transition in view.transitions.iter().filter(|t| t.source() == current) {
                let next = transition.destination();
                if view.has_status(next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        let mut unreachable: Vec<&StatusCode> = view
            .statuses
            .iter()
            .map(|row| &row.code)
            .filter(|code| !visited.contains(code))
            .collect();
        unreachable.sort();
        ordered.extend(unreachable);
        ordered
    }

    /// Default status of the workflow whose code is [`Workflow::DEFAULT`]
    pub fn default_workflow_default_status(&self) -> Option<&StatusCode> {
        self.find_by_code(Workflow::DEFAULT)
            .and_then(WorkflowView::default_status)
    }
}

#[async_trait]
impl Projection for WorkflowStatusProjection {
    async fn handle_event(&mut self, stored: &StoredEvent) -> Result<(), String> {
        if let WorkflowEvent::Created { id, code, .. } = &stored.event {
            self.streams.insert(stored.aggregate_id.clone(), *id);
            self.codes.insert(code.clone(), *id);
            self.workflows
                .entry(*id)
                .or_insert_with(|| WorkflowView::new(*id, code.clone()));
        }

        let id = self.streams.get(&stored.aggregate_id).copied().ok_or_else(|| {
            format!(
                "{} for unknown workflow stream {}",
                stored.event_type(),
                stored.aggregate_id
            )
        })?;

        if let Some(view) = self.workflows.get_mut(&id) {
            view.apply(&stored.event);
            view.version = stored.sequence;
        }

        Ok(())
    }

    async fn get_checkpoint(&self) -> Option<EventSequence> {
        self.checkpoint
    }

    async fn save_checkpoint(&mut self, sequence: EventSequence) -> Result<(), String> {
        self.checkpoint = Some(sequence);
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), String> {
        self.workflows.clear();
        self.streams.clear();
        self.codes.clear();
        self.checkpoint = None;
        Ok(())
    }
}
