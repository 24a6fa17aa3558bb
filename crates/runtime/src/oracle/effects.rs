//! Presentation sink that keeps each cue "playing" for a fixed duration.
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use combat_core::{EffectCue, PresentationError, PresentationSink};

/// How long each kind of cue keeps the effect gate closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CueDurations {
    pub melee: Duration,
    pub projectile: Duration,
    pub explosion: Duration,
}

impl CueDurations {
    pub const NONE: Self = Self {
        melee: Duration::ZERO,
        projectile: Duration::ZERO,
        explosion: Duration::ZERO,
    };

    fn of(&self, cue: &EffectCue) -> Duration {
        match cue {
            EffectCue::MeleeSwing { .. } => self.melee,
            EffectCue::Projectile { .. } => self.projectile,
            EffectCue::Explosion { .. } => self.explosion,
        }
    }
}

impl Default for CueDurations {
    fn default() -> Self {
        Self {
            melee: Duration::from_millis(150),
            projectile: Duration::from_millis(200),
            explosion: Duration::from_millis(400),
        }
    }
}

/// Overlapping cues extend the busy window; they never shorten it.
#[derive(Debug, Default)]
pub struct TimedEffects {
    busy_until: Mutex<Option<Instant>>,
    durations: CueDurations,
    played: AtomicU64,
}

impl TimedEffects {
    pub fn new(durations: CueDurations) -> Self {
        Self {
            durations,
            ..Self::default()
        }
    }

    /// Records cues without ever holding combat up.
    pub fn instant() -> Self {
        Self::new(CueDurations::NONE)
    }

    pub fn played(&self) -> u64 {
        self.played.load(Ordering::Relaxed)
    }
}

impl PresentationSink for TimedEffects {
    fn play(&self, cue: EffectCue) -> Result<(), PresentationError> {
        let mut busy_until = self
            .busy_until
            .lock()
            .map_err(|_| PresentationError("effect clock poisoned".into()))?;
        let until = Instant::now() + self.durations.of(&cue);
        *busy_until = Some(busy_until.map_or(until, |current| current.max(until)));
        self.played.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(?cue, "effect started");
        Ok(())
    }

    fn is_effect_playing(&self) -> Result<bool, PresentationError> {
        let busy_until = self
            .busy_until
            .lock()
            .map_err(|_| PresentationError("effect clock poisoned".into()))?;
        Ok(busy_until.is_some_and(|until| Instant::now() < until))
    }
}
