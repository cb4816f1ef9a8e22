//! Combatant state types

use tallgrass_protocol::{MoveSnapshot, PokemonSnapshot, RosterEntry};

/// Which side of the field a combatant fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Opponent => 1,
        }
    }
}

/// Presentation phase of a combatant, driving its sprite animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatantPhase {
    #[default]
    Idle,
    Attacking,
    Hit,
    Switching,
    Fainted,
}

/// A move known by a combatant
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveSlot {
    pub id: u64,
    pub name: String,
    pub current_pp: u32,
    pub max_pp: u32,
}

impl MoveSlot {
    pub fn new(id: u64, name: impl Into<String>, pp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            current_pp: pp,
            max_pp: pp,
        }
    }

    pub fn from_protocol(snapshot: &MoveSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name.clone(),
            current_pp: snapshot.current_pp(),
            max_pp: snapshot.max_pp(),
        }
    }

    /// A move with no PP left cannot be selected
    pub fn is_usable(&self) -> bool {
        self.current_pp > 0
    }
}

/// One Pokemon on the field, as displayed to the player
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    /// Identity reported by the server (owned id, or species id for NPCs)
    pub id: u64,

    /// Species name
    pub species: String,

    /// Nickname or species
    pub display_name: String,

    pub level: u32,

    // === HP ===
    /// Displayed HP, always within `0..=max_hp`
    pub current_hp: u32,

    pub max_hp: u32,

    /// Whether this combatant has fainted. Only set when HP resolves to 0.
    pub fainted: bool,

    pub phase: CombatantPhase,

    pub moves: Vec<MoveSlot>,
}

impl Combatant {
    pub fn new(id: u64, species: impl Into<String>, current_hp: u32, max_hp: u32) -> Self {
        let species = species.into();
        let current_hp = current_hp.min(max_hp);
        Self {
            id,
            display_name: species.clone(),
            species,
            level: 1,
            current_hp,
            max_hp,
            fainted: current_hp == 0,
            phase: if current_hp == 0 {
                CombatantPhase::Fainted
            } else {
                CombatantPhase::Idle
            },
            moves: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_moves(mut self, moves: Vec<MoveSlot>) -> Self {
        self.moves = moves;
        self
    }

    /// Create from a server snapshot
    pub fn from_protocol(snapshot: &PokemonSnapshot) -> Self {
        let max_hp = snapshot.max_hp();
        let mut combatant = Self::new(
            snapshot.identity().unwrap_or_default(),
            &snapshot.name,
            clamp_hp(snapshot.current_hp, max_hp),
            max_hp,
        )
        .with_level(snapshot.level.unwrap_or(1))
        .with_moves(snapshot.moves.iter().map(MoveSlot::from_protocol).collect());
        combatant.display_name = snapshot.display_name().to_string();
        combatant
    }

    /// Create from an entry of the player's ordered team
    pub fn from_roster_entry(entry: &RosterEntry) -> Self {
        let max_hp = entry.max_hp();
        let mut combatant = Self::new(
            entry.id,
            &entry.pokemon_name,
            clamp_hp(entry.current_hp, max_hp),
            max_hp,
        )
        .with_level(entry.level.unwrap_or(1))
        .with_moves(
            entry
                .moves_details
                .iter()
                .map(MoveSlot::from_protocol)
                .collect(),
        );
        if let Some(nickname) = entry.nickname.as_deref().filter(|n| !n.is_empty()) {
            combatant.display_name = nickname.to_string();
        }
        combatant
    }

    /// Whether two values describe the same Pokemon
    pub fn same_identity(&self, other: &Combatant) -> bool {
        self.id == other.id && self.species == other.species
    }

    /// Set the displayed HP without resolving fainting
    pub fn set_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }

    /// Set HP as the resolved value of an update; fainted follows HP
    pub fn settle_hp(&mut self, hp: u32) {
        self.set_hp(hp);
        self.fainted = self.current_hp == 0;
        if self.fainted {
            self.phase = CombatantPhase::Fainted;
        } else if self.phase == CombatantPhase::Fainted {
            self.phase = CombatantPhase::Idle;
        }
    }

    /// Restore the displayed HP bar to full, used when a combatant enters
    pub fn reset_to_full(&mut self) {
        self.settle_hp(self.max_hp);
    }

    /// Change presentation phase. A fainted combatant stays fainted.
    pub fn set_phase(&mut self, phase: CombatantPhase) {
        if !self.fainted {
            self.phase = phase;
        }
    }

    /// Take non-HP fields (moves, PP, level, max HP) from a newer value
    pub fn sync_details(&mut self, newer: &Combatant) {
        self.level = newer.level;
        self.max_hp = newer.max_hp;
        self.current_hp = self.current_hp.min(self.max_hp);
        if !newer.moves.is_empty() {
            self.moves = newer.moves.clone();
        }
    }

    /// Get HP as percentage (0-100)
    pub fn hp_percent(&self) -> u32 {
        if self.max_hp == 0 {
            return 0;
        }
        (self.current_hp * 100) / self.max_hp
    }

    pub fn can_act(&self) -> bool {
        !self.fainted
    }

    /// Moves that still have PP
    pub fn usable_moves(&self) -> impl Iterator<Item = &MoveSlot> {
        self.moves.iter().filter(|m| m.is_usable())
    }

    pub fn find_move(&self, move_id: u64) -> Option<&MoveSlot> {
        self.moves.iter().find(|m| m.id == move_id)
    }
}

fn clamp_hp(hp: i64, max_hp: u32) -> u32 {
    hp.clamp(0, max_hp as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_combatant() {
        let mon = Combatant::new(1, "Pidgey", 30, 30);
        assert_eq!(mon.display_name, "Pidgey");
        assert!(!mon.fainted);
        assert_eq!(mon.phase, CombatantPhase::Idle);
        assert_eq!(mon.hp_percent(), 100);
    }

    #[test]
    fn test_new_combatant_clamps() {
        let mon = Combatant::new(1, "Pidgey", 45, 30);
        assert_eq!(mon.current_hp, 30);

        let down = Combatant::new(1, "Pidgey", 0, 30);
        assert!(down.fainted);
        assert_eq!(down.phase, CombatantPhase::Fainted);
    }

    #[test]
    fn test_from_protocol_negative_hp() {
        let snapshot = PokemonSnapshot {
            id: Some(5),
            name: "Rattata".to_string(),
            current_hp: -4,
            max_hp: Some(20),
            ..Default::default()
        };
        let mon = Combatant::from_protocol(&snapshot);
        assert_eq!(mon.current_hp, 0);
        assert!(mon.fainted);
    }

    #[test]
    fn test_set_hp_does_not_faint() {
        let mut mon = Combatant::new(1, "Pidgey", 30, 30);
        mon.set_hp(0);
        assert_eq!(mon.current_hp, 0);
        assert!(!mon.fainted);

        mon.settle_hp(0);
        assert!(mon.fainted);
        assert_eq!(mon.phase, CombatantPhase::Fainted);
    }

    #[test]
    fn test_settle_hp_revives_phase() {
        let mut mon = Combatant::new(1, "Pidgey", 0, 30);
        mon.settle_hp(12);
        assert!(!mon.fainted);
        assert_eq!(mon.phase, CombatantPhase::Idle);
    }

    #[test]
    fn test_fainted_ignores_phase_changes() {
        let mut mon = Combatant::new(1, "Pidgey", 0, 30);
        mon.set_phase(CombatantPhase::Attacking);
        assert_eq!(mon.phase, CombatantPhase::Fainted);
    }

    #[test]
    fn test_usable_moves_skip_empty_pp() {
        let mon = Combatant::new(1, "Squirtle", 50, 50).with_moves(vec![
            MoveSlot::new(33, "Tackle", 35),
            MoveSlot {
                id: 55,
                name: "Water Gun".to_string(),
                current_pp: 0,
                max_pp: 25,
            },
        ]);

        let usable: Vec<_> = mon.usable_moves().map(|m| m.id).collect();
        assert_eq!(usable, vec![33]);
        assert!(mon.find_move(55).is_some());
    }

    #[test]
    fn test_roster_entry_nickname() {
        let entry = RosterEntry {
            id: 7,
            pokemon_name: "Squirtle".to_string(),
            nickname: Some("Shelly".to_string()),
            current_hp: 40,
            hp: Some(50),
            ..Default::default()
        };
        let mon = Combatant::from_roster_entry(&entry);
        assert_eq!(mon.display_name, "Shelly");
        assert_eq!(mon.species, "Squirtle");
        assert_eq!(mon.max_hp, 50);
    }
}
