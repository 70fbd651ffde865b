//! Per-actor event queue (`spec.md` §4.1).
//!
//! - [`traits`] — the [`EventQueue`] interface and its status enums.
//! - [`queue`] — [`Inbox`], the concrete FIFO-plus-raised-slot implementation.
//! - [`metrics`] — running counters per inbox.

pub mod metrics;
pub mod queue;
pub mod traits;

pub use metrics::InboxMetrics;
pub use queue::Inbox;
pub use traits::{DequeueStatus, EnqueueStatus, EventQueue, ReceiveDescriptor};
