use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// HTTP method a command is sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Bag items that can be used during a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Pokeball,
    UltraBall,
    Potion,
    SuperPotion,
    HyperPotion,
}

impl ItemKind {
    /// Wire name, as expected in `item_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pokeball => "pokeball",
            Self::UltraBall => "ultra_ball",
            Self::Potion => "potion",
            Self::SuperPotion => "super_potion",
            Self::HyperPotion => "hyper_potion",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "pokeball" => Some(Self::Pokeball),
            "ultra_ball" => Some(Self::UltraBall),
            "potion" => Some(Self::Potion),
            "super_potion" => Some(Self::SuperPotion),
            "hyper_potion" => Some(Self::HyperPotion),
            _ => None,
        }
    }

    /// Name shown in the battle log
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pokeball => "Poké Ball",
            Self::UltraBall => "Ultra Ball",
            Self::Potion => "Potion",
            Self::SuperPotion => "Super Potion",
            Self::HyperPotion => "Hyper Potion",
        }
    }

    /// Whether using this item is a capture attempt
    pub fn is_capture(&self) -> bool {
        matches!(self, Self::Pokeball | Self::UltraBall)
    }

    pub fn is_potion(&self) -> bool {
        matches!(self, Self::Potion | Self::SuperPotion | Self::HyperPotion)
    }

    /// HP restored by a potion, before capping at max HP
    pub fn heal_amount(&self) -> Option<u32> {
        match self {
            Self::Potion => Some(20),
            Self::SuperPotion => Some(50),
            Self::HyperPotion => Some(200),
            Self::Pokeball | Self::UltraBall => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// PvP room format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleFormat {
    #[serde(rename = "1vs1")]
    Single,
    #[serde(rename = "2vs2")]
    Double,
}

impl BattleFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "1vs1",
            Self::Double => "2vs2",
        }
    }

    /// Number of Pokemon each player brings
    pub fn team_size(&self) -> usize {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }

    /// Only 2vs2 rooms allow switching the active Pokemon
    pub fn allows_switch(&self) -> bool {
        matches!(self, Self::Double)
    }
}

/// Requests the client can send to the battle server
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    /// POST /auth/battles/start_wild_battle/
    StartWild,

    /// POST /auth/battles/start_trainer_battle/
    StartTrainer,

    /// POST /auth/battles/ID/attack/ {move_id}
    Attack { battle_id: u64, move_id: u64 },

    /// POST /auth/battles/ID/use_item/ {item_type}
    UseItem { battle_id: u64, item: ItemKind },

    /// POST /auth/battles/ID/switch_pokemon/ {pokemon_id}
    Switch { battle_id: u64, pokemon_id: u64 },

    /// POST /auth/battles/ID/flee/
    Flee { battle_id: u64 },

    /// GET /auth/battles/ID/
    BattleDetails { battle_id: u64 },

    /// POST /auth/pvp-battles/create_room/ {battle_format}
    PvpCreateRoom { format: BattleFormat },

    /// GET /auth/pvp-battles/available_rooms/
    PvpAvailableRooms,

    /// POST /auth/pvp-battles/join_room/ {room_code}
    PvpJoinRoom { room_code: String },

    /// POST /auth/pvp-battles/leave_room/ {room_code}
    PvpLeaveRoom { room_code: String },

    /// GET /auth/pvp-battles/ID/state/
    PvpState { battle_id: u64 },

    /// POST /auth/pvp-battles/ID/attack/ {move_id}
    PvpAttack { battle_id: u64, move_id: u64 },

    /// POST /auth/pvp-battles/ID/switch_pokemon/ {pokemon_index}
    PvpSwitch { battle_id: u64, pokemon_index: usize },

    /// POST /auth/pvp-battles/ID/use_item/ {item_type}
    PvpUseItem { battle_id: u64, item: ItemKind },

    /// POST /auth/pvp-battles/ID/surrender/
    PvpSurrender { battle_id: u64 },

    /// GET /auth/team-order/get_team_order/
    TeamOrder,

    /// GET /auth/bag/
    Bag,
}

impl BattleCommand {
    pub fn method(&self) -> Method {
        match self {
            Self::BattleDetails { .. }
            | Self::PvpAvailableRooms
            | Self::PvpState { .. }
            | Self::TeamOrder
            | Self::Bag => Method::Get,
            _ => Method::Post,
        }
    }

    /// Path relative to the API base URL
    pub fn path(&self) -> String {
        match self {
            Self::StartWild => "/auth/battles/start_wild_battle/".to_string(),
            Self::StartTrainer => "/auth/battles/start_trainer_battle/".to_string(),
            Self::Attack { battle_id, .. } => format!("/auth/battles/{}/attack/", battle_id),
            Self::UseItem { battle_id, .. } => format!("/auth/battles/{}/use_item/", battle_id),
            Self::Switch { battle_id, .. } => {
                format!("/auth/battles/{}/switch_pokemon/", battle_id)
            }
            Self::Flee { battle_id } => format!("/auth/battles/{}/flee/", battle_id),
            Self::BattleDetails { battle_id } => format!("/auth/battles/{}/", battle_id),
            Self::PvpCreateRoom { .. } => "/auth/pvp-battles/create_room/".to_string(),
            Self::PvpAvailableRooms => "/auth/pvp-battles/available_rooms/".to_string(),
            Self::PvpJoinRoom { .. } => "/auth/pvp-battles/join_room/".to_string(),
            Self::PvpLeaveRoom { .. } => "/auth/pvp-battles/leave_room/".to_string(),
            Self::PvpState { battle_id } => format!("/auth/pvp-battles/{}/state/", battle_id),
            Self::PvpAttack { battle_id, .. } => {
                format!("/auth/pvp-battles/{}/attack/", battle_id)
            }
            Self::PvpSwitch { battle_id, .. } => {
                format!("/auth/pvp-battles/{}/switch_pokemon/", battle_id)
            }
            Self::PvpUseItem { battle_id, .. } => {
                format!("/auth/pvp-battles/{}/use_item/", battle_id)
            }
            Self::PvpSurrender { battle_id } => {
                format!("/auth/pvp-battles/{}/surrender/", battle_id)
            }
            Self::TeamOrder => "/auth/team-order/get_team_order/".to_string(),
            Self::Bag => "/auth/bag/".to_string(),
        }
    }

    /// JSON body, if the command carries one
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::Attack { move_id, .. } | Self::PvpAttack { move_id, .. } => {
                Some(json!({ "move_id": move_id }))
            }
            Self::UseItem { item, .. } | Self::PvpUseItem { item, .. } => {
                Some(json!({ "item_type": item.as_str() }))
            }
            Self::Switch { pokemon_id, .. } => Some(json!({ "pokemon_id": pokemon_id })),
            Self::PvpSwitch { pokemon_index, .. } => {
                Some(json!({ "pokemon_index": pokemon_index }))
            }
            Self::PvpCreateRoom { format } => Some(json!({ "battle_format": format.as_str() })),
            Self::PvpJoinRoom { room_code } | Self::PvpLeaveRoom { room_code } => {
                Some(json!({ "room_code": room_code }))
            }
            _ => None,
        }
    }

    /// Whether this command changes battle state on the server
    pub fn is_battle_action(&self) -> bool {
        matches!(
            self,
            Self::Attack { .. }
                | Self::UseItem { .. }
                | Self::Switch { .. }
                | Self::Flee { .. }
                | Self::PvpAttack { .. }
                | Self::PvpSwitch { .. }
                | Self::PvpUseItem { .. }
                | Self::PvpSurrender { .. }
        )
    }
}
