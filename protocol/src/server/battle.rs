use serde::{Deserialize, Serialize};

use super::pokemon::PokemonSnapshot;

/// Opposing trainer summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub team_size: Option<usize>,
    #[serde(default)]
    pub money_reward: Option<u32>,
    #[serde(default)]
    pub alive_pokemon: Option<usize>,
    #[serde(default)]
    pub total_pokemon: Option<usize>,
}

/// Response of `start_wild_battle` and `start_trainer_battle`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartBattleResponse {
    pub battle_id: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub trainer: Option<TrainerInfo>,
    #[serde(default)]
    pub wild_pokemon: Option<PokemonSnapshot>,
    #[serde(default)]
    pub opponent_pokemon: Option<PokemonSnapshot>,
    #[serde(default)]
    pub player_pokemon: Option<PokemonSnapshot>,
}

impl StartBattleResponse {
    pub fn opponent(&self) -> Option<&PokemonSnapshot> {
        self.wild_pokemon.as_ref().or(self.opponent_pokemon.as_ref())
    }
}

/// Authoritative battle snapshot attached to action responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    #[serde(default)]
    pub battle_id: Option<u64>,
    #[serde(default)]
    pub battle_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub player_pokemon: Option<PokemonSnapshot>,
    #[serde(default)]
    pub wild_pokemon: Option<PokemonSnapshot>,
    #[serde(default)]
    pub opponent_pokemon: Option<PokemonSnapshot>,
    #[serde(default)]
    pub trainer: Option<TrainerInfo>,
}

impl BattleState {
    pub fn opponent(&self) -> Option<&PokemonSnapshot> {
        self.wild_pokemon.as_ref().or(self.opponent_pokemon.as_ref())
    }
}

/// Response of attack, use_item, switch_pokemon and flee
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionResponse {
    pub message: String,
    pub battle_state: Option<BattleState>,
    pub effectiveness: Option<String>,
    pub enemy_attack_message: Option<String>,
    pub next_pokemon_message: Option<String>,
    pub battle_ended: bool,
    pub won: bool,
    pub lost: bool,
    pub fled: bool,
    pub captured: bool,
    pub wild_pokemon_name: Option<String>,
    pub player_pokemon_name: Option<String>,
    pub experience_gained: Option<u32>,
    pub money_gained: Option<u32>,
    pub leveled_up: bool,
    pub new_level: Option<u32>,
    pub evolved: bool,
    pub new_pokemon_name: Option<String>,
    pub new_location: Option<String>,
}

impl ActionResponse {
    /// Effectiveness text, ignoring blank values
    pub fn effectiveness(&self) -> Option<&str> {
        self.effectiveness.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn enemy_attack_message(&self) -> Option<&str> {
        self.enemy_attack_message
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn next_pokemon_message(&self) -> Option<&str> {
        self.next_pokemon_message
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Flat battle record returned by `GET /auth/battles/ID/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleDetails {
    pub id: u64,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub turn: Option<u32>,
    #[serde(default)]
    pub wild_pokemon_name: Option<String>,
    #[serde(default)]
    pub wild_level: Option<u32>,
    #[serde(default)]
    pub wild_current_hp: Option<i64>,
    #[serde(default)]
    pub wild_max_hp: Option<u32>,
    #[serde(default)]
    pub player_pokemon: Option<u64>,
    #[serde(default)]
    pub player_pokemon_name: Option<String>,
}

impl BattleDetails {
    /// Whether the server still considers the battle in progress
    pub fn is_active(&self) -> bool {
        self.state.as_deref().is_none_or(|s| s == "active")
    }
}
