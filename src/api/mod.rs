//! PetFriends API client
//!
//! A thin wrapper over the service's fixed endpoint set. Calls return
//! `(status, body)` envelopes and never interpret business failures.

pub mod client;
pub mod types;

pub use client::PetFriendsClient;
pub use types::{ApiResponse, Body, Pet, PetFields, PetFilter, SessionKey};
