//! Animation sequencing
//!
//! A player action plays out as an ordered list of [`Step`]s. Planning is
//! pure: the [`Planner`] turns the session, the action and the server reply
//! into a [`Sequence`], and an executor elsewhere runs the steps with real
//! delays. Keeping the two apart lets sequences be checked without a clock.

mod planner;
mod resolver;

use std::time::Duration;

pub use planner::Planner;
pub use resolver::{Advance, advance_opponent, capture, forced_player_switch};

use crate::tracking::{CaptureNotice, Outcome};
use crate::types::{Combatant, CombatantPhase, Side};

/// Where the player is sent once a battle is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Destination {
    Map,
    Dashboard,
}

/// Animate one side's displayed HP to `to`, from whatever is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpChange {
    pub side: Side,
    pub to: u32,
}

impl HpChange {
    pub fn new(side: Side, to: u32) -> Self {
        Self { side, to }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Append a line to the battle log
    Log(String),

    Wait(Duration),

    /// Hold a combatant in a phase, then return it to idle
    Cue {
        side: Side,
        phase: CombatantPhase,
        duration: Duration,
    },

    /// Run all HP changes concurrently and wait for every one
    Interpolate(Vec<HpChange>),

    /// Show a banner for `duration` without blocking the sequence
    Banner { text: String, duration: Duration },

    /// Bring in a new opponent with its HP bar starting from full
    Reveal {
        combatant: Combatant,
        remaining: Option<usize>,
    },

    /// Replace the player's active combatant
    SwapPlayer(Combatant),

    /// Take moves, PP and level from an authoritative snapshot
    SyncDetails { side: Side, combatant: Combatant },

    YourTurn(bool),

    EndBattle(Outcome),

    Capture(CaptureNotice),

    /// Reload the player's team; announce each line if it succeeds
    RefreshRoster { announcements: Vec<String> },

    RefreshBag,

    /// Fetch the PvP state now
    Resync,

    /// Leave the battle screen after a delay
    Navigate { to: Destination, after: Duration },

    /// Re-open the action gate
    Release,
}

/// Ordered steps for one action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.steps.push(Step::Log(line.into()));
    }

    pub fn wait(&mut self, duration: Duration) {
        self.steps.push(Step::Wait(duration));
    }

    pub fn cue(&mut self, side: Side, phase: CombatantPhase, duration: Duration) {
        self.steps.push(Step::Cue {
            side,
            phase,
            duration,
        });
    }

    /// Add an interpolation step; nothing is added for no changes
    pub fn interpolate(&mut self, changes: Vec<HpChange>) {
        if !changes.is_empty() {
            self.steps.push(Step::Interpolate(changes));
        }
    }

    /// Whether the sequence ends the battle
    pub fn is_terminal(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s, Step::EndBattle(_) | Step::Capture(_)))
    }

    /// Close the sequence, releasing the gate unless the battle ended
    pub fn finish(mut self) -> Self {
        if !self.is_terminal() {
            self.steps.push(Step::Release);
        }
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Log lines in order
    pub fn logs(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| match s {
            Step::Log(line) => Some(line.as_str()),
            _ => None,
        })
    }

    /// Index of the first step matching `pred`
    pub fn position(&self, pred: impl Fn(&Step) -> bool) -> Option<usize> {
        self.steps.iter().position(pred)
    }
}

impl IntoIterator for Sequence {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
