//! Action gating
//!
//! At most one player action is in flight per session. The [`ActionGate`]
//! is a test-and-set flag; [`check`] decides whether a given action may be
//! attempted against the current session.

use std::sync::atomic::{AtomicU64, Ordering};

use tallgrass_protocol::ItemKind;

use crate::action::PlayerAction;
use crate::tracking::{BattleKind, BattleSession, BattleStatus};
use crate::types::{Combatant, PlayerRoster, Side};

/// Why an action was not attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Another action is in flight
    Locked,
    /// The session is not active
    NotActive(BattleStatus),
    /// PvP, waiting for the opponent
    NotYourTurn,
    /// No player Pokemon is out to act
    NoActor,
    /// The active Pokemon has fainted
    ActorFainted(String),
    UnknownMove(u64),
    NoPp(String),
    CaptureInTrainerBattle(ItemKind),
    CaptureInPvp(ItemKind),
    FleeFromTrainer,
    FleeFromPvp,
    SurrenderOutsidePvp,
    UnknownTarget(u64),
    TargetFainted(String),
    TargetActive(String),
    /// The PvP format does not allow switching
    SwitchNotAllowed,
}

impl Rejection {
    /// Silent rejections are dropped without telling the player
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Locked | Self::NotActive(_) | Self::NotYourTurn)
    }

    /// Log lines shown to the player
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Locked | Self::NotActive(_) | Self::NotYourTurn => Vec::new(),
            Self::NoActor => vec!["You don't have a Pokémon in battle!".to_string()],
            Self::ActorFainted(name) | Self::TargetFainted(name) => {
                vec![format!("{} has fainted and can't battle!", name)]
            }
            Self::UnknownMove(_) => vec!["That move isn't available.".to_string()],
            Self::NoPp(name) => vec![format!("There's no PP left for {}!", name)],
            Self::CaptureInTrainerBattle(item) => vec![
                format!("You used {}!", item),
                "You can't capture another trainer's Pokémon!".to_string(),
            ],
            Self::CaptureInPvp(item) => vec![format!("{} can't be used in a PvP battle!", item)],
            Self::FleeFromTrainer => vec!["You can't run from a trainer battle!".to_string()],
            Self::FleeFromPvp => vec!["You can't run from a PvP battle!".to_string()],
            Self::SurrenderOutsidePvp => vec!["There's no one to surrender to!".to_string()],
            Self::UnknownTarget(_) => vec!["That Pokémon isn't in your team.".to_string()],
            Self::TargetActive(name) => vec![format!("{} is already in battle!", name)],
            Self::SwitchNotAllowed => {
                vec!["Switching is only allowed in 2vs2 battles.".to_string()]
            }
        }
    }
}

/// Single-flight flag guarding player actions.
///
/// The low bit is the lock; the rest counts resets. A permit only releases
/// the gate it locked, so a permit outliving a [`ActionGate::reset`] cannot
/// unlock the gate for a later action.
#[derive(Debug, Default)]
pub struct ActionGate {
    state: AtomicU64,
}

const LOCKED: u64 = 1;

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate. Returns `None` if an action is already in flight.
    pub fn try_acquire(&self) -> Option<GatePermit<'_>> {
        let current = self.state.load(Ordering::Acquire);
        if current & LOCKED != 0 {
            return None;
        }
        self.state
            .compare_exchange(current, current | LOCKED, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GatePermit {
                gate: self,
                locked: current | LOCKED,
                armed: true,
            })
    }

    pub fn release(&self) {
        self.state.fetch_and(!LOCKED, Ordering::AcqRel);
    }

    /// Open the gate and disown every outstanding permit
    pub fn reset(&self) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                Some((state & !LOCKED).wrapping_add(2))
            });
    }

    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Acquire) & LOCKED != 0
    }
}

/// Held while an action is in flight; releases the gate on drop
#[derive(Debug)]
#[must_use = "dropping the permit releases the gate"]
pub struct GatePermit<'a> {
    gate: &'a ActionGate,
    /// Gate state as this permit locked it
    locked: u64,
    armed: bool,
}

impl GatePermit<'_> {
    /// Keep the gate locked past this permit. The gate is then released by
    /// [`ActionGate::release`], or stays locked if the battle ended.
    pub fn hand_off(mut self) {
        self.armed = false;
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        if self.armed {
            // No-op if the gate was reset since
            let _ = self.gate.state.compare_exchange(
                self.locked,
                self.locked & !LOCKED,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
    }
}

/// Decide whether `action` may be attempted against `session`
pub fn check(
    session: &BattleSession,
    roster: &PlayerRoster,
    action: &PlayerAction,
) -> Result<(), Rejection> {
    if !session.is_active() {
        return Err(Rejection::NotActive(session.status()));
    }
    if session.kind == BattleKind::Pvp && action.requires_turn() && !session.your_turn {
        return Err(Rejection::NotYourTurn);
    }

    match action {
        PlayerAction::Attack { move_id } => {
            let player = actor(session)?;
            match player.find_move(*move_id) {
                None if !player.moves.is_empty() => Err(Rejection::UnknownMove(*move_id)),
                Some(slot) if !slot.is_usable() => Err(Rejection::NoPp(slot.name.clone())),
                _ => Ok(()),
            }
        }
        PlayerAction::UseItem(item) => {
            actor(session)?;
            match session.kind {
                BattleKind::Trainer if item.is_capture() => {
                    Err(Rejection::CaptureInTrainerBattle(*item))
                }
                BattleKind::Pvp if item.is_capture() => Err(Rejection::CaptureInPvp(*item)),
                _ => Ok(()),
            }
        }
        PlayerAction::Switch { pokemon_id } => check_switch(session, roster, *pokemon_id),
        PlayerAction::Flee => match session.kind {
            BattleKind::Wild => Ok(()),
            BattleKind::Trainer => Err(Rejection::FleeFromTrainer),
            BattleKind::Pvp => Err(Rejection::FleeFromPvp),
        },
        PlayerAction::Surrender => match session.kind {
            BattleKind::Pvp => Ok(()),
            _ => Err(Rejection::SurrenderOutsidePvp),
        },
    }
}

/// The player Pokemon that would carry out an attack or item use
fn actor(session: &BattleSession) -> Result<&Combatant, Rejection> {
    let player = session.combatant(Side::Player).ok_or(Rejection::NoActor)?;
    if player.fainted {
        return Err(Rejection::ActorFainted(player.display_name.clone()));
    }
    Ok(player)
}

fn check_switch(
    session: &BattleSession,
    roster: &PlayerRoster,
    pokemon_id: u64,
) -> Result<(), Rejection> {
    let target = match session.pvp.as_ref() {
        Some(ctx) => {
            if !ctx.format.is_some_and(|f| f.allows_switch()) {
                return Err(Rejection::SwitchNotAllowed);
            }
            ctx.team.iter().find(|c| c.id == pokemon_id)
        }
        None => roster.get(pokemon_id),
    };
    let Some(target) = target else {
        return Err(Rejection::UnknownTarget(pokemon_id));
    };

    if session
        .combatant(Side::Player)
        .is_some_and(|active| active.id == target.id)
    {
        return Err(Rejection::TargetActive(target.display_name.clone()));
    }
    if target.fainted {
        return Err(Rejection::TargetFainted(target.display_name.clone()));
    }
    Ok(())
}
