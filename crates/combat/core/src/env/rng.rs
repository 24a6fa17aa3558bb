//! RNG oracle for deterministic dice.
//!
//! All randomness in combat flows through [`RngOracle`]. Rolls are keyed by a
//! seed derived from the encounter seed and a monotonically increasing
//! cursor, so an encounter replays identically when fed the same declarations.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        (self.next_u32(seed) % sides.max(1)) + 1
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Stateless: every call is a pure function of its seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the encounter seed with the roll counter into a per-roll seed.
pub fn compute_seed(encounter_seed: u64, counter: u64) -> u64 {
    let mut hash = encounter_seed;
    hash ^= counter.wrapping_mul(0x9e3779b97f4a7c15);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Position in the deterministic dice stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollCursor {
    pub seed: u64,
    pub counter: u64,
}

impl RollCursor {
    pub const fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    fn next_seed(&mut self) -> u64 {
        let seed = compute_seed(self.seed, self.counter);
        self.counter += 1;
        seed
    }
}

/// Dice roller bound to an oracle and a cursor for one engine step.
pub struct Dice<'a> {
    rng: &'a dyn RngOracle,
    cursor: &'a mut RollCursor,
}

impl<'a> Dice<'a> {
    pub fn new(rng: &'a dyn RngOracle, cursor: &'a mut RollCursor) -> Self {
        Self { rng, cursor }
    }

    /// Rolls one die with `sides` faces (1..=sides). Zero sides yields 0.
    pub fn roll(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        let seed = self.cursor.next_seed();
        self.rng.roll_die(seed, sides).clamp(1, sides)
    }

    pub fn d20(&mut self) -> u32 {
        self.roll(20)
    }

    /// Sum of `count` dice with `sides` faces.
    pub fn sum(&mut self, count: u32, sides: u32) -> u32 {
        (0..count).fold(0u32, |total, _| total.saturating_add(self.roll(sides)))
    }

    pub fn rolls_made(&self) -> u64 {
        self.cursor.counter
    }
}
