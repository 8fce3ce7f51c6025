//! Shared types and models for the Smart Agriculture services
//!
//! This crate contains the wire types shared between the service backend and
//! any display layer or command-line caller talking to it.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
