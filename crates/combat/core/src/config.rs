use std::time::Duration;

/// Combat rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Owner turns a body part stays in crisis before it resolves.
    pub crisis_turns: u8,
    /// Hard cap on NPC decision iterations per turn.
    pub ai_loop_cap: u32,
    /// Effect-gate polls before the turn is forced forward.
    pub effect_wait_retries: u32,
    /// Delay between effect-gate polls.
    pub effect_wait_interval: Duration,
    /// Maximum Euclidean distance (tiles) for melee, unarmed and grapple.
    pub melee_reach: f32,
    /// Multiplier turning aggro threat into a target score.
    pub threat_weight: i32,
    /// Radius (tiles) in which a hostile counts as threatening an ally.
    pub companion_guard_radius: u32,
    /// Base target-score bonus for hostiles threatening an ally.
    pub companion_guard_bonus: i32,
    /// Projectiles fired by a burst.
    pub burst_count: u32,
    /// Projectiles fired on automatic.
    pub auto_count: u32,
    /// Rounds a last-seen position stays worth investigating.
    pub memory_ttl_rounds: u32,
    /// Companions further than this from the player close in first.
    pub follow_distance: u32,
    /// Scavenging scan radius (tiles) for the exploration AI.
    pub scavenge_radius: u32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Capacity of the AI recent-tiles ring buffer.
    pub const MAX_RECENT_TILES: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CRISIS_TURNS: u8 = 3;
    pub const DEFAULT_AI_LOOP_CAP: u32 = 10;
    pub const DEFAULT_EFFECT_WAIT_RETRIES: u32 = 100;
    pub const DEFAULT_EFFECT_WAIT_INTERVAL_MS: u64 = 50;
    pub const DEFAULT_MELEE_REACH: f32 = 1.8;
    pub const DEFAULT_THREAT_WEIGHT: i32 = 10;
    pub const DEFAULT_COMPANION_GUARD_RADIUS: u32 = 3;
    pub const DEFAULT_COMPANION_GUARD_BONUS: i32 = 40;
    pub const DEFAULT_BURST_COUNT: u32 = 3;
    pub const DEFAULT_AUTO_COUNT: u32 = 6;
    pub const DEFAULT_MEMORY_TTL_ROUNDS: u32 = 3;
    pub const DEFAULT_FOLLOW_DISTANCE: u32 = 2;
    pub const DEFAULT_SCAVENGE_RADIUS: u32 = 6;
    pub const DEFAULT_ACTION_POINTS: u32 = 2;
    pub const DEFAULT_MOVEMENT_POINTS: u32 = 6;

    pub fn new() -> Self {
        Self {
            crisis_turns: Self::DEFAULT_CRISIS_TURNS,
            ai_loop_cap: Self::DEFAULT_AI_LOOP_CAP,
            effect_wait_retries: Self::DEFAULT_EFFECT_WAIT_RETRIES,
            effect_wait_interval: Duration::from_millis(Self::DEFAULT_EFFECT_WAIT_INTERVAL_MS),
            melee_reach: Self::DEFAULT_MELEE_REACH,
            threat_weight: Self::DEFAULT_THREAT_WEIGHT,
            companion_guard_radius: Self::DEFAULT_COMPANION_GUARD_RADIUS,
            companion_guard_bonus: Self::DEFAULT_COMPANION_GUARD_BONUS,
            burst_count: Self::DEFAULT_BURST_COUNT,
            auto_count: Self::DEFAULT_AUTO_COUNT,
            memory_ttl_rounds: Self::DEFAULT_MEMORY_TTL_ROUNDS,
            follow_distance: Self::DEFAULT_FOLLOW_DISTANCE,
            scavenge_radius: Self::DEFAULT_SCAVENGE_RADIUS,
        }
    }

    pub fn with_effect_wait(mut self, retries: u32, interval: Duration) -> Self {
        self.effect_wait_retries = retries;
        self.effect_wait_interval = interval;
        self
    }

    pub fn with_ai_loop_cap(mut self, cap: u32) -> Self {
        self.ai_loop_cap = cap.max(1);
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
