//! v1 API Data Transfer Objects.
//!
//! Wire types for the v1 REST API, kept apart from the domain models in
//! `src/models/` and converted at the handler boundary.

pub mod characters;
pub mod common;
pub mod daily;
pub mod quests;

pub use characters::*;
pub use daily::*;
pub use quests::*;
