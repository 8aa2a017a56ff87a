// Copyright 2025 Cowboy AI, LLC.

//! Workflow transition value object
//!
//! A transition is a permitted directed edge between two statuses. Its
//! identity for lookups is the ordered (source, destination) pair; the label
//! is display metadata only.

use crate::workflow::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A permitted move from one status to another
///
/// # Examples
///
/// ```rust
/// use cim_domain_workflow::{StatusCode, Transition};
///
/// let draft = StatusCode::new("draft").unwrap();
/// let review = StatusCode::new("review").unwrap();
///
/// let transition = Transition::new(draft.clone(), review.clone()).with_label("Submit");
/// assert!(transition.connects(&draft, &review));
/// assert!(!transition.connects(&review, &draft));
/// assert_eq!(transition.label(), Some("Submit"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Transition {
    source: StatusCode,
    destination: StatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Transition {
    /// Create a transition without metadata
    pub fn new(source: StatusCode, destination: StatusCode) -> Self {
        Self {
            source,
            destination,
            label: None,
        }
    }

    /// Return a copy of this transition carrying a display label
    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self
        }
    }

    /// Status the transition starts from
    pub fn source(&self) -> &StatusCode {
        &self.source
    }

    /// Status the transition leads to
    pub fn destination(&self) -> &StatusCode {
        &self.destination
    }

    /// Optional display label
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether this transition is the edge `source -> destination`
    pub fn connects(&self, source: &StatusCode, destination: &StatusCode) -> bool {
        &self.source == source && &self.destination == destination
    }

    /// Whether either endpoint is `code`
    pub fn touches(&self, code: &StatusCode) -> bool {
        &self.source == code || &self.destination == code
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
