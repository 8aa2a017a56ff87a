// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for workflows

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Namespace used to derive workflow ids from workflow codes
const WORKFLOW_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_9b3d_5c7a_8e0f_1d2b_3c4a_5e6f);

/// Workflow ID - global identity of a workflow aggregate
///
/// A workflow id is never random: it is a UUID v5 of the workflow code, so
/// the same code always yields the same id. Replaying a creation event or
/// issuing the same creation command twice therefore targets the same stream.
///
/// # Examples
///
/// ```rust
/// use cim_domain_workflow::WorkflowId;
///
/// let a = WorkflowId::from_code("publishing");
/// let b = WorkflowId::from_code("publishing");
/// assert_eq!(a, b);
/// assert_ne!(a, WorkflowId::from_code("review"));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// Derive the workflow id for a workflow code
    pub fn from_code(code: &str) -> Self {
        Self(Uuid::new_v5(&WORKFLOW_NAMESPACE, code.as_bytes()))
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Nil id, held by an aggregate before its creation event is applied
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WorkflowId> for Uuid {
    fn from(id: WorkflowId) -> Self {
        id.0
    }
}

impl From<&WorkflowId> for Uuid {
    fn from(id: &WorkflowId) -> Self {
        id.0
    }
}
