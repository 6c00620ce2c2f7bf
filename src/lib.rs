//! PetFriends API test suite
//!
//! This library provides an HTTP client for the PetFriends pet-management
//! service and a runner for declarative test scenarios against it.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use api::{ApiResponse, Body, Pet, PetFields, PetFilter, PetFriendsClient, SessionKey};
pub use common::{Error, Result};
