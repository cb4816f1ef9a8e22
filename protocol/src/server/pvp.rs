use serde::{Deserialize, Serialize};

use super::pokemon::PokemonSnapshot;
use crate::client::BattleFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PvpPhase {
    #[default]
    Waiting,
    Active,
    Finished,
    #[serde(other)]
    Unknown,
}

/// Full PvP battle state, from the `state` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PvpState {
    pub battle_id: u64,
    #[serde(default)]
    pub room_code: Option<String>,
    #[serde(default)]
    pub battle_format: Option<BattleFormat>,
    #[serde(default)]
    pub state: PvpPhase,
    #[serde(default)]
    pub your_turn: bool,
    #[serde(default)]
    pub current_turn_username: Option<String>,
    #[serde(default)]
    pub your_team: Option<Vec<PokemonSnapshot>>,
    #[serde(default)]
    pub opponent_team: Option<Vec<PokemonSnapshot>>,
    #[serde(default)]
    pub your_current_pokemon_index: usize,
    #[serde(default)]
    pub opponent_current_pokemon_index: usize,
    #[serde(default)]
    pub player1_username: Option<String>,
    #[serde(default)]
    pub player2_username: Option<String>,
    #[serde(default)]
    pub winner_username: Option<String>,
}

impl PvpState {
    pub fn your_team(&self) -> &[PokemonSnapshot] {
        self.your_team.as_deref().unwrap_or_default()
    }

    pub fn opponent_team(&self) -> &[PokemonSnapshot] {
        self.opponent_team.as_deref().unwrap_or_default()
    }

    pub fn your_active(&self) -> Option<&PokemonSnapshot> {
        self.your_team().get(self.your_current_pokemon_index)
    }

    pub fn opponent_active(&self) -> Option<&PokemonSnapshot> {
        self.opponent_team()
            .get(self.opponent_current_pokemon_index)
    }
}

/// Response of `create_room` and `join_room`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub room_code: String,
    pub battle_id: u64,
    #[serde(default)]
    pub battle_format: Option<BattleFormat>,
    #[serde(default)]
    pub your_team: Vec<PokemonSnapshot>,
    #[serde(default)]
    pub opponent_username: Option<String>,
    #[serde(default)]
    pub your_turn: Option<bool>,
    #[serde(default)]
    pub battle_state: Option<PvpState>,
}

/// Response of PvP attack, switch_pokemon, use_item and surrender
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PvpActionResponse {
    pub message: String,
    pub damage: Option<u32>,
    pub healed: Option<u32>,
    pub your_turn: Option<bool>,
    pub battle_ended: bool,
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub battle_state: Option<PvpState>,
}

/// Entry of the public room listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomPreview {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub room_code: String,
    #[serde(default)]
    pub battle_format: Option<BattleFormat>,
    #[serde(default)]
    pub player1_username: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailableRooms {
    #[serde(default)]
    pub rooms: Vec<RoomPreview>,
    #[serde(default)]
    pub count: usize,
}

/// Body of endpoints that only answer with a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
