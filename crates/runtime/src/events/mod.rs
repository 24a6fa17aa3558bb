//! Event distribution for hosts and observers.
//!
//! Engine events are drained from [`combat_core::CombatState`] after every
//! step and published on a topic-based broadcast [`EventBus`], together with
//! the runner's own [`HostEvent`]s.
mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::HostEvent;
