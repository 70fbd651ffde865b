//! Event values and their queued, routable form.
//!
//! - [`types`] — the closed [`Event`] tagged-variant and [`EventTypeId`].
//! - [`queued`] — [`QueuedEvent`], the `(event, group, metadata)` tuple
//!   actually stored in an [`crate::inbox::Inbox`].

pub mod queued;
pub mod types;

pub use queued::{DeliveryRequirement, EventMetadata, QueuedEvent};
pub use types::{Event, EventTypeId, TimerId, TimerInfo, UserEvent};
