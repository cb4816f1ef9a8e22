//! Domain types shared by session tracking and sequencing

mod combatant;
mod roster;

pub use combatant::{Combatant, CombatantPhase, MoveSlot, Side};
pub use roster::{OpponentRoster, PlayerRoster, RosterMatch, TrainerProfile};
