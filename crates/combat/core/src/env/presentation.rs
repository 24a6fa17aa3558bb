//! Presentation sink boundary.
//!
//! The sink is optional and untrusted: a missing sink or a failing call is
//! treated as "no effect playing", so rendering can never stall combat.

use crate::state::{EntityId, Position};

/// Typed animation cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectCue {
    MeleeSwing {
        actor: EntityId,
        at: Position,
    },
    Projectile {
        from: Position,
        to: Position,
    },
    Explosion {
        at: Position,
        radius: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("presentation sink failed: {0}")]
pub struct PresentationError(pub String);

pub trait PresentationSink: Send + Sync {
    fn play(&self, cue: EffectCue) -> Result<(), PresentationError>;

    fn is_effect_playing(&self) -> Result<bool, PresentationError>;
}

/// Sends a cue, swallowing any sink failure.
pub fn send_cue(sink: Option<&dyn PresentationSink>, cue: EffectCue) {
    let Some(sink) = sink else {
        return;
    };
    if let Err(error) = sink.play(cue) {
        tracing::warn!(%error, ?cue, "presentation cue dropped");
    }
}

/// Fail-open query: absence or error both read as "nothing playing".
pub fn effect_in_progress(sink: Option<&dyn PresentationSink>) -> bool {
    match sink.map(|sink| sink.is_effect_playing()) {
        Some(Ok(playing)) => playing,
        Some(Err(error)) => {
            tracing::warn!(%error, "presentation query failed; treating effect as finished");
            false
        }
        None => false,
    }
}
