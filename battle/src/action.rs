//! Player actions

use std::fmt;

use tallgrass_protocol::{ActionResponse, ItemKind, PvpActionResponse};

/// An action the player submits during a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerAction {
    Attack { move_id: u64 },
    UseItem(ItemKind),
    /// Switch to an owned Pokemon by id
    Switch { pokemon_id: u64 },
    /// Run from a wild battle
    Flee,
    /// Concede a PvP battle
    Surrender,
}

impl PlayerAction {
    /// Whether the action needs it to be our turn in PvP
    pub fn requires_turn(&self) -> bool {
        !matches!(self, Self::Surrender)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Attack { .. } => "attack",
            Self::UseItem(_) => "use_item",
            Self::Switch { .. } => "switch",
            Self::Flee => "flee",
            Self::Surrender => "surrender",
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack { move_id } => write!(f, "attack({})", move_id),
            Self::UseItem(item) => write!(f, "use_item({})", item.as_str()),
            Self::Switch { pokemon_id } => write!(f, "switch({})", pokemon_id),
            Self::Flee => f.write_str("flee"),
            Self::Surrender => f.write_str("surrender"),
        }
    }
}

/// Server reply to a player action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReply {
    Battle(ActionResponse),
    Pvp(PvpActionResponse),
}

impl ActionReply {
    pub fn message(&self) -> &str {
        match self {
            Self::Battle(response) => &response.message,
            Self::Pvp(response) => &response.message,
        }
    }
}
