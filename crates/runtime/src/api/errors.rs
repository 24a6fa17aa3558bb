//! Unified error types surfaced by the runtime API.
//!
//! Wraps engine, scenario and controller failures so clients can bubble them
//! up with consistent context.
use std::fmt;
use std::path::PathBuf;

use combat_core::{CombatError, EntityId, ErrorSeverity, GameError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error("{kind} controller failed: {message}")]
    Controller {
        kind: ControllerKind,
        message: String,
    },

    #[error("failed to read scenario {path}")]
    ScenarioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario")]
    ScenarioParse(#[from] ron::error::SpannedError),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("scenario places two combatants with id {0}")]
    DuplicateCombatant(EntityId),
}

impl RuntimeError {
    pub fn controller(kind: ControllerKind, message: impl Into<String>) -> Self {
        Self::Controller {
            kind,
            message: message.into(),
        }
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Combat(error) => error.severity(),
            RuntimeError::Controller { .. } => ErrorSeverity::Recoverable,
            RuntimeError::ScenarioIo { .. }
            | RuntimeError::ScenarioParse(_)
            | RuntimeError::InvalidScenario(_)
            | RuntimeError::DuplicateCombatant(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Combat(error) => error.error_code(),
            RuntimeError::Controller { .. } => "RUNTIME_CONTROLLER",
            RuntimeError::ScenarioIo { .. } => "RUNTIME_SCENARIO_IO",
            RuntimeError::ScenarioParse(_) => "RUNTIME_SCENARIO_PARSE",
            RuntimeError::InvalidScenario(_) => "RUNTIME_SCENARIO_INVALID",
            RuntimeError::DuplicateCombatant(_) => "RUNTIME_DUPLICATE_COMBATANT",
        }
    }
}

/// Which side of the host loop a controller answers for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerKind {
    Command,
    Defense,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ControllerKind::Command => "command",
            ControllerKind::Defense => "defense",
        };
        write!(f, "{}", label)
    }
}
