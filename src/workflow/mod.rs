// Copyright 2025 Cowboy AI, LLC.

//! Status workflow aggregate
//!
//! This module provides the workflow model:
//! - Statuses are plain value objects identified by their code
//! - Transitions are directed edges between statuses, unique per ordered pair
//! - The workflow aggregate enforces its invariants when commands are validated
//!   and rebuilds itself by replaying its events

pub mod aggregate;
pub mod commands;
pub mod events;
pub mod status;
pub mod transition;

pub use aggregate::*;
pub use commands::*;
pub use events::*;
pub use status::*;
pub use transition::*;
