//! Wire models for the Smart Agriculture backend
//!
//! Re-exports the models and common types from the shared crate

pub use shared::models::*;
pub use shared::types::*;
