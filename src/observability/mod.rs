//! Runtime observability, replacing the teacher's generic `monitoring`
//! module (renamed to avoid colliding with this domain's own `Monitor`
//! safety/liveness concept, see [`crate::monitor`]).
//!
//! - [`types`] — [`ObserverEvent`], the closed vocabulary of observable steps.
//! - [`traits`] — the [`Observer`] trait.
//! - [`in_memory`] — [`InMemoryObserver`], a bounded in-process history.
//! - [`noop`] — [`NoopObserver`], a zero-cost sink.
//! - [`error`] — [`ObserverError`].

pub mod error;
pub mod in_memory;
pub mod noop;
pub mod traits;
pub mod types;

pub use error::ObserverError;
pub use in_memory::InMemoryObserver;
pub use noop::NoopObserver;
pub use traits::Observer;
pub use types::{actor_created, EventSeverity, ObserverEvent};
