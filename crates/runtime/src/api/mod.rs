//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the runner can stay focused on orchestration.

pub mod errors;
pub mod providers;

pub use errors::{ControllerKind, Result, RuntimeError};
pub use providers::{AutoPlayer, PlayerController, ScriptedPlayer};
