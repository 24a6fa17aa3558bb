//! Oracle access errors.
//!
//! Errors related to oracle availability and data access.

use crate::env::WeaponId;
use crate::error::{ErrorSeverity, GameError};

/// Errors that occur when accessing Oracle data.
///
/// Oracle errors indicate that required world data is unavailable. Most are
/// fatal since combat cannot be resolved without weapons, tiles or dice.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// TileOracle is not available in the environment.
    #[error("TileOracle not available")]
    TilesNotAvailable,

    /// WeaponOracle is not available in the environment.
    #[error("WeaponOracle not available")]
    WeaponsNotAvailable,

    /// SightOracle is not available in the environment.
    #[error("SightOracle not available")]
    SightNotAvailable,

    /// PathingOracle is not available in the environment.
    #[error("PathingOracle not available")]
    PathingNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,

    /// Weapon definition was not found by id.
    #[error("weapon definition {0:?} not found")]
    WeaponNotFound(WeaponId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            TilesNotAvailable | WeaponsNotAvailable | SightNotAvailable | PathingNotAvailable
            | RngNotAvailable => ErrorSeverity::Fatal,
            WeaponNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            TilesNotAvailable => "ORACLE_TILES_NOT_AVAILABLE",
            WeaponsNotAvailable => "ORACLE_WEAPONS_NOT_AVAILABLE",
            SightNotAvailable => "ORACLE_SIGHT_NOT_AVAILABLE",
            PathingNotAvailable => "ORACLE_PATHING_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            WeaponNotFound(_) => "ORACLE_WEAPON_NOT_FOUND",
        }
    }
}
