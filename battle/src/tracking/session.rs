//! BattleSession - the state of one battle as shown to the player

use std::collections::VecDeque;
use std::fmt;

use tallgrass_protocol::BattleFormat;

use crate::types::{Combatant, OpponentRoster, Side};

/// What kind of opponent the battle is against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleKind {
    Wild,
    Trainer,
    Pvp,
}

impl BattleKind {
    /// Number of log lines kept on screen
    pub fn log_capacity(self) -> usize {
        match self {
            Self::Wild | Self::Trainer => 2,
            Self::Pvp => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wild => "wild",
            Self::Trainer => "trainer",
            Self::Pvp => "pvp",
        }
    }
}

impl fmt::Display for BattleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleStatus {
    #[default]
    Loading,
    Active,
    Ended,
    Error,
}

/// How a battle finished
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Won,
    Lost,
    Fled,
    Captured,
    Surrendered,
    /// PvP result. `you_won` is unknown until our username is known.
    PvpWinner {
        winner: String,
        you_won: Option<bool>,
    },
}

/// Shown when a capture succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureNotice {
    pub species: String,
    pub message: String,
}

/// Bounded message log; the oldest line is dropped first
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleLog {
    capacity: usize,
    entries: VecDeque<String>,
}

impl BattleLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.into());
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// PvP room details
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PvpContext {
    pub room_code: Option<String>,
    pub format: Option<BattleFormat>,
    /// Our own team in server order
    pub team: Vec<Combatant>,
    pub active_index: usize,
    /// Our username, learned from the server when it is our turn
    pub username: Option<String>,
    pub opponent_username: Option<String>,
    pub winner: Option<String>,
}

impl PvpContext {
    /// Server index of an owned Pokemon
    pub fn team_index(&self, pokemon_id: u64) -> Option<usize> {
        self.team.iter().position(|c| c.id == pokemon_id)
    }
}

/// One battle from the player's perspective.
///
/// Holds only what is displayed; the server owns the real battle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSession {
    // === Metadata ===
    pub battle_id: Option<u64>,
    pub kind: BattleKind,
    status: BattleStatus,

    // === Combatants ===
    pub player: Option<Combatant>,
    pub opponent: Option<OpponentRoster>,

    // === Presentation ===
    pub log: BattleLog,
    /// Effectiveness banner text while shown
    pub banner: Option<String>,
    pub capture: Option<CaptureNotice>,
    pub error: Option<String>,

    // === Turn ===
    /// Always true outside PvP
    pub your_turn: bool,
    pub pvp: Option<PvpContext>,

    // === Outcome ===
    pub outcome: Option<Outcome>,
}

impl BattleSession {
    pub fn new(kind: BattleKind) -> Self {
        Self {
            battle_id: None,
            kind,
            status: BattleStatus::Loading,
            player: None,
            opponent: None,
            log: BattleLog::new(kind.log_capacity()),
            banner: None,
            capture: None,
            error: None,
            your_turn: kind != BattleKind::Pvp,
            pvp: (kind == BattleKind::Pvp).then(PvpContext::default),
            outcome: None,
        }
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == BattleStatus::Active
    }

    pub fn is_ended(&self) -> bool {
        self.status == BattleStatus::Ended
    }

    /// Loading -> Active. Returns false if the session was not loading.
    pub fn activate(&mut self) -> bool {
        if self.status != BattleStatus::Loading {
            return false;
        }
        self.status = BattleStatus::Active;
        true
    }

    /// Active -> Ended. Ended is terminal until reset.
    pub fn end(&mut self, outcome: Outcome) -> bool {
        if matches!(self.status, BattleStatus::Ended | BattleStatus::Error) {
            return false;
        }
        self.status = BattleStatus::Ended;
        self.outcome = Some(outcome);
        true
    }

    /// Loading -> Error. Errors after activation are shown without leaving Active.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.status == BattleStatus::Loading {
            self.status = BattleStatus::Error;
        }
        self.error = Some(message);
    }

    /// Back to a fresh loading session of the same kind
    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }

    /// Active combatant of a side
    pub fn combatant(&self, side: Side) -> Option<&Combatant> {
        match side {
            Side::Player => self.player.as_ref(),
            Side::Opponent => self.opponent.as_ref().and_then(|o| o.active()),
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> Option<&mut Combatant> {
        match side {
            Side::Player => self.player.as_mut(),
            Side::Opponent => self.opponent.as_mut().and_then(|o| o.active_mut()),
        }
    }

    /// Display name of a side's active combatant
    pub fn name_of(&self, side: Side) -> &str {
        self.combatant(side)
            .map(|c| c.display_name.as_str())
            .unwrap_or("???")
    }

    pub fn trainer_name(&self) -> Option<&str> {
        self.opponent
            .as_ref()
            .and_then(|o| o.trainer.as_ref())
            .map(|t| t.name.as_str())
    }

    pub fn format(&self) -> Option<BattleFormat> {
        self.pvp.as_ref().and_then(|p| p.format)
    }
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new(BattleKind::Wild)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = BattleSession::new(BattleKind::Trainer);
        assert_eq!(session.status(), BattleStatus::Loading);
        assert_eq!(session.log.capacity(), 2);
        assert!(session.your_turn);
        assert!(session.pvp.is_none());

        let pvp = BattleSession::new(BattleKind::Pvp);
        assert_eq!(pvp.log.capacity(), 4);
        assert!(!pvp.your_turn);
        assert!(pvp.pvp.is_some());
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = BattleLog::new(2);
        log.push("one");
        log.push("two");
        log.push("three");

        assert_eq!(log.len(), 2);
        assert_eq!(log.iter().collect::<Vec<_>>(), vec!["two", "three"]);
        assert_eq!(log.latest(), Some("three"));
    }

    #[test]
    fn test_status_transitions() {
        let mut session = BattleSession::new(BattleKind::Wild);
        assert!(session.activate());
        assert!(!session.activate());

        assert!(session.end(Outcome::Won));
        assert!(session.is_ended());
        assert!(!session.end(Outcome::Lost));
        assert_eq!(session.outcome, Some(Outcome::Won));

        assert!(!session.activate());
    }

    #[test]
    fn test_fail_while_loading() {
        let mut session = BattleSession::new(BattleKind::Wild);
        session.fail("No Pokemon in team");
        assert_eq!(session.status(), BattleStatus::Error);
        assert_eq!(session.error.as_deref(), Some("No Pokemon in team"));
    }

    #[test]
    fn test_fail_while_active_keeps_status() {
        let mut session = BattleSession::new(BattleKind::Wild);
        session.activate();
        session.fail("Network error");
        assert_eq!(session.status(), BattleStatus::Active);
    }

    #[test]
    fn test_reset() {
        let mut session = BattleSession::new(BattleKind::Pvp);
        session.battle_id = Some(4);
        session.log.push("hello");
        session.activate();
        session.end(Outcome::Surrendered);

        session.reset();
        assert_eq!(session, BattleSession::new(BattleKind::Pvp));
    }

    #[test]
    fn test_combatant_by_side() {
        let mut session = BattleSession::new(BattleKind::Wild);
        session.player = Some(Combatant::new(7, "Squirtle", 50, 50));
        session.opponent = Some(OpponentRoster::single(Combatant::new(16, "Pidgey", 30, 30)));

        assert_eq!(session.name_of(Side::Player), "Squirtle");
        assert_eq!(session.name_of(Side::Opponent), "Pidgey");

        session.combatant_mut(Side::Opponent).unwrap().set_hp(10);
        assert_eq!(session.combatant(Side::Opponent).unwrap().current_hp, 10);
    }
}
