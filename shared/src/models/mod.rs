//! Domain models for the Smart Agriculture services

mod crop;
mod irrigation;
mod weather;

pub use crop::*;
pub use irrigation::*;
pub use weather::*;
