//! Traits describing read-only world data and external collaborators.
//!
//! Oracles expose tile/cover data, the weapon catalog, line of sight,
//! pathing, dice and the presentation sink. The [`Env`] aggregate bundles them
//! so the engine can reach everything it needs without hard coupling to
//! concrete implementations.
mod dice;
mod error;
mod items;
mod presentation;
mod rng;
mod spatial;
mod tiles;

use crate::state::Position;

pub use dice::{DiceExpr, DiceParseError};
pub use error::OracleError;
pub use items::{FireModes, WeaponData, WeaponId, WeaponOracle, WeaponTags};
pub use presentation::{
    EffectCue, PresentationError, PresentationSink, effect_in_progress, send_cue,
};
pub use rng::{Dice, PcgRng, RngOracle, RollCursor, compute_seed};
pub use spatial::{DropOption, PathStep, PathingOracle, SightOracle};
pub use tiles::{AmbientLight, TileInfo, TileLayer, TileOracle};

/// Aggregates the oracles required by the engine and the AI.
pub struct Env<'a, T, W, S, P, F, R>
where
    T: TileOracle + ?Sized,
    W: WeaponOracle + ?Sized,
    S: SightOracle + ?Sized,
    P: PathingOracle + ?Sized,
    F: PresentationSink + ?Sized,
    R: RngOracle + ?Sized,
{
    tiles: Option<&'a T>,
    weapons: Option<&'a W>,
    sight: Option<&'a S>,
    pathing: Option<&'a P>,
    effects: Option<&'a F>,
    rng: Option<&'a R>,
}

// Manual impls: derives would demand `Clone` on the (unsized) oracle types.
impl<T, W, S, P, F, R> Clone for Env<'_, T, W, S, P, F, R>
where
    T: TileOracle + ?Sized,
    W: WeaponOracle + ?Sized,
    S: SightOracle + ?Sized,
    P: PathingOracle + ?Sized,
    F: PresentationSink + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, W, S, P, F, R> Copy for Env<'_, T, W, S, P, F, R>
where
    T: TileOracle + ?Sized,
    W: WeaponOracle + ?Sized,
    S: SightOracle + ?Sized,
    P: PathingOracle + ?Sized,
    F: PresentationSink + ?Sized,
    R: RngOracle + ?Sized,
{
}

pub type CombatEnv<'a> = Env<
    'a,
    dyn TileOracle + 'a,
    dyn WeaponOracle + 'a,
    dyn SightOracle + 'a,
    dyn PathingOracle + 'a,
    dyn PresentationSink + 'a,
    dyn RngOracle + 'a,
>;

impl<'a, T, W, S, P, F, R> Env<'a, T, W, S, P, F, R>
where
    T: TileOracle + ?Sized,
    W: WeaponOracle + ?Sized,
    S: SightOracle + ?Sized,
    P: PathingOracle + ?Sized,
    F: PresentationSink + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        tiles: Option<&'a T>,
        weapons: Option<&'a W>,
        sight: Option<&'a S>,
        pathing: Option<&'a P>,
        effects: Option<&'a F>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            tiles,
            weapons,
            sight,
            pathing,
            effects,
            rng,
        }
    }

    pub fn empty() -> Self {
        Self::new(None, None, None, None, None, None)
    }

    /// # Errors
    ///
    /// Returns `OracleError::TilesNotAvailable` if no tile oracle was provided.
    pub fn tiles(&self) -> Result<&'a T, OracleError> {
        self.tiles.ok_or(OracleError::TilesNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::WeaponsNotAvailable` if no weapon oracle was provided.
    pub fn weapons(&self) -> Result<&'a W, OracleError> {
        self.weapons.ok_or(OracleError::WeaponsNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::SightNotAvailable` if no sight oracle was provided.
    pub fn sight(&self) -> Result<&'a S, OracleError> {
        self.sight.ok_or(OracleError::SightNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::PathingNotAvailable` if no pathing oracle was provided.
    pub fn pathing(&self) -> Result<&'a P, OracleError> {
        self.pathing.ok_or(OracleError::PathingNotAvailable)
    }

    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// The presentation sink is optional; callers must fail open without it.
    pub fn effects(&self) -> Option<&'a F> {
        self.effects
    }
}

impl<'a, T, W, S, P, F, R> Env<'a, T, W, S, P, F, R>
where
    T: TileOracle + 'a,
    W: WeaponOracle + 'a,
    S: SightOracle + 'a,
    P: PathingOracle + 'a,
    F: PresentationSink + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based [`CombatEnv`].
    pub fn into_combat_env(self) -> CombatEnv<'a> {
        let tiles: Option<&'a dyn TileOracle> = self.tiles.map(|t| t as _);
        let weapons: Option<&'a dyn WeaponOracle> = self.weapons.map(|w| w as _);
        let sight: Option<&'a dyn SightOracle> = self.sight.map(|s| s as _);
        let pathing: Option<&'a dyn PathingOracle> = self.pathing.map(|p| p as _);
        let effects: Option<&'a dyn PresentationSink> = self.effects.map(|f| f as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|r| r as _);
        Env::new(tiles, weapons, sight, pathing, effects, rng)
    }
}

impl<'a> CombatEnv<'a> {
    /// Looks up a weapon definition.
    ///
    /// # Errors
    ///
    /// Fails if the catalog is missing or does not know `id`.
    pub fn weapon(&self, id: WeaponId) -> Result<WeaponData, OracleError> {
        self.weapons()?
            .weapon(id)
            .ok_or(OracleError::WeaponNotFound(id))
    }

    /// Line of sight; a missing oracle means nothing can be seen.
    pub fn can_see(&self, from: Position, to: Position) -> bool {
        match self.sight {
            Some(sight) => sight.has_line_of_sight(from, to),
            None => false,
        }
    }

    pub fn cue(&self, cue: EffectCue) {
        send_cue(self.effects, cue);
    }

    pub fn effect_in_progress(&self) -> bool {
        effect_in_progress(self.effects)
    }
}

