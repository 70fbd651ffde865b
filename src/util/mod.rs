//! Utility types and helpers shared across the engine.

pub mod ids;
pub mod serde_helpers;

pub use ids::{ActorId, EventGroup, OperationId};
pub use serde_helpers::duration_serde;
