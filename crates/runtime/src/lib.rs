//! Async host for the deterministic combat engine.
//!
//! This crate wires the player controller abstraction, in-memory oracles,
//! scenario loading and event distribution around [`combat_core`]. Consumers
//! build an [`EncounterRunner`] (usually from a [`Scenario`]), subscribe to
//! the [`EventBus`] and await [`EncounterRunner::run`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the runner and its configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] and [`scenario`] provide data adapters
pub mod api;
pub mod events;
pub mod oracle;
pub mod runtime;
pub mod scenario;

pub use api::{AutoPlayer, ControllerKind, PlayerController, Result, RuntimeError, ScriptedPlayer};
pub use events::{Event, EventBus, HostEvent, Topic};
pub use oracle::{CueDurations, GridMap, LightSource, OracleManager, TimedEffects, WeaponCatalog};
pub use runtime::{EncounterRunner, RuntimeConfig};
pub use scenario::{
    CombatantSpec, CoverSpec, DoorSpec, DropSpec, LightSpec, MapSpec, Scenario, SlotSpec,
    WeaponSpec,
};
