//! Scenario runner
//!
//! Reads declarative YAML scenarios and runs them against the PetFriends
//! API through [`PetFriendsClient`](crate::api::PetFriendsClient),
//! asserting on the structured `(status, body)` envelopes it returns.

mod builtin;
mod config;
mod runner;

pub use builtin::{builtin_scenarios, select, BUILTIN_SOURCES};
pub use config::*;
pub use runner::{check_response, Outcome, Runner, ScenarioResult, SuiteSummary};
