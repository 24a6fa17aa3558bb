//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use combat_core::CombatEvent;

use super::types::HostEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Rolls, damage, deaths, movement
    Combat,
    /// Turn and round bookkeeping, phase changes
    Turn,
    /// Host loop notices (player prompts, controller failures, outcome)
    Host,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Combat, Topic::Turn, Topic::Host];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Combat(CombatEvent),
    Host(HostEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Combat(
                CombatEvent::EncounterStarted { .. }
                | CombatEvent::RoundStarted { .. }
                | CombatEvent::TurnStarted { .. }
                | CombatEvent::TurnSkipped { .. }
                | CombatEvent::PhaseChanged { .. }
                | CombatEvent::EffectGateForced { .. }
                | CombatEvent::TurnEnded { .. }
                | CombatEvent::EncounterEnded { .. },
            ) => Topic::Turn,
            Event::Combat(_) => Topic::Combat,
            Event::Host(_) => Topic::Host,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(RwLock::new(channels)),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();

        // Use try_read to avoid blocking in async context
        // If we can't get the lock, just skip (events are best-effort)
        match self.channels.try_read() {
            Ok(channels) => {
                if let Some(tx) = channels.get(&topic)
                    && tx.send(event).is_err()
                {
                    // No subscribers for this topic - this is normal, not an error
                    tracing::trace!("No subscribers for topic {:?}", topic);
                }
            }
            Err(_) => {
                tracing::debug!("Failed to acquire event bus lock for topic {:?}", topic);
            }
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns `None` if the bus is being reconfigured concurrently.
    pub fn subscribe(&self, topic: Topic) -> Option<broadcast::Receiver<Event>> {
        let channels = self.channels.try_read().ok()?;
        channels.get(&topic).map(broadcast::Sender::subscribe)
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        let Ok(channels) = self.channels.try_read() else {
            tracing::debug!("Failed to acquire event bus lock for subscription");
            return HashMap::new();
        };
        topics
            .iter()
            .filter_map(|&topic| channels.get(&topic).map(|tx| (topic, tx.subscribe())))
            .collect()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
