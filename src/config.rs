// Copyright 2025 Cowboy AI, LLC.

//! Configuration for workflow persistence and command handling

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// What the command handler does with transitions that touch a removed status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanedTransitionPolicy {
    /// Leave dangling transitions in place
    #[default]
    Preserve,
    /// Remove every transition touching the status before removing it
    Prune,
}

/// Configuration for the workflow repository and command handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Aggregate type recorded on stored events
    pub aggregate_type: String,

    /// How many times a command is reloaded and retried after a concurrency conflict
    pub max_command_retries: u32,

    /// Handling of transitions left dangling by a status removal
    pub orphaned_transitions: OrphanedTransitionPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            aggregate_type: "Workflow".to_string(),
            max_command_retries: 3,
            orphaned_transitions: OrphanedTransitionPolicy::Preserve,
        }
    }
}

impl WorkflowConfig {
    /// Parse configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the handler cannot work with
    pub fn validate(&self) -> DomainResult<()> {
        if self.aggregate_type.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "aggregate_type cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
