//! Presentation timings for battle sequences

use std::time::Duration;

use crate::hp::DEFAULT_STEPS;

/// Delays and durations used when playing out an action.
///
/// Defaults mirror the pacing of the game's battle screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    // === HP ===
    pub hp_steps: u32,
    pub hp_cadence: Duration,

    // === Cues ===
    pub attacker_cue: Duration,
    pub defender_cue: Duration,
    pub switch_cue: Duration,

    // === Messages ===
    pub result_delay: Duration,
    pub switch_result_delay: Duration,
    pub banner: Duration,
    pub counter_delay: Duration,
    pub switch_counter_delay: Duration,

    // === Roster advance ===
    pub reveal_delay: Duration,
    pub reveal_entrance: Duration,

    // === End of battle ===
    pub end_delay: Duration,
    pub refresh_delay: Duration,
    pub defeat_delay: Duration,
    pub battle_grace: Duration,
    pub capture_grace: Duration,
    pub flee_grace: Duration,
    pub surrender_grace: Duration,

    // === PvP ===
    pub resync_delay: Duration,
}

impl Timings {
    /// All delays zero, for driving sequences without waiting
    pub fn instant() -> Self {
        Self {
            hp_steps: 1,
            hp_cadence: Duration::ZERO,
            attacker_cue: Duration::ZERO,
            defender_cue: Duration::ZERO,
            switch_cue: Duration::ZERO,
            result_delay: Duration::ZERO,
            switch_result_delay: Duration::ZERO,
            banner: Duration::ZERO,
            counter_delay: Duration::ZERO,
            switch_counter_delay: Duration::ZERO,
            reveal_delay: Duration::ZERO,
            reveal_entrance: Duration::ZERO,
            end_delay: Duration::ZERO,
            refresh_delay: Duration::ZERO,
            defeat_delay: Duration::ZERO,
            battle_grace: Duration::ZERO,
            capture_grace: Duration::ZERO,
            flee_grace: Duration::ZERO,
            surrender_grace: Duration::ZERO,
            resync_delay: Duration::ZERO,
        }
    }

    /// Total time of one HP tween
    pub fn hp_duration(&self) -> Duration {
        self.hp_cadence * self.hp_steps
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            hp_steps: DEFAULT_STEPS,
            hp_cadence: Duration::from_millis(30),
            attacker_cue: Duration::from_millis(300),
            defender_cue: Duration::from_millis(500),
            switch_cue: Duration::from_millis(300),
            result_delay: Duration::from_millis(800),
            switch_result_delay: Duration::from_millis(500),
            banner: Duration::from_millis(2000),
            counter_delay: Duration::from_millis(1800),
            switch_counter_delay: Duration::from_millis(1500),
            reveal_delay: Duration::from_millis(1000),
            reveal_entrance: Duration::from_millis(500),
            end_delay: Duration::from_millis(2500),
            refresh_delay: Duration::from_millis(500),
            defeat_delay: Duration::from_millis(1000),
            battle_grace: Duration::from_millis(4000),
            capture_grace: Duration::from_millis(3000),
            flee_grace: Duration::from_millis(2000),
            surrender_grace: Duration::from_millis(3000),
            resync_delay: Duration::from_millis(1500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hp_duration() {
        assert_eq!(Timings::default().hp_duration(), Duration::from_millis(600));
        assert_eq!(Timings::instant().hp_duration(), Duration::ZERO);
    }
}
