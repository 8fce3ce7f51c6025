//! HTTP handlers for the three service groups

pub mod crop;
pub mod dashboard;
pub mod health;
pub mod irrigation;
pub mod weather;

pub use crop::*;
pub use dashboard::*;
pub use health::*;
pub use irrigation::*;
pub use weather::*;
