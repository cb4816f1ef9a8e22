use serde::{Deserialize, Serialize};

/// A Pokemon as reported by the server.
///
/// Wild opponents and the player's Pokemon carry `id` and `name`. Trainer and
/// PvP team members carry `pokemon_id`, `pokemon_name` and, for owned
/// Pokemon, `player_pokemon_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PokemonSnapshot {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub pokemon_id: Option<u64>,
    #[serde(default)]
    pub player_pokemon_id: Option<u64>,
    #[serde(default, alias = "pokemon_name")]
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub current_hp: i64,
    #[serde(default)]
    pub max_hp: Option<u32>,
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub sprite_front: Option<String>,
    #[serde(default)]
    pub sprite_back: Option<String>,
    #[serde(default)]
    pub moves: Vec<MoveSnapshot>,
}

impl PokemonSnapshot {
    /// Stable identity: the owned-Pokemon id when present, else the species id
    pub fn identity(&self) -> Option<u64> {
        self.id.or(self.player_pokemon_id).or(self.pokemon_id)
    }

    /// Maximum HP, falling back to the `hp` stat
    pub fn max_hp(&self) -> u32 {
        self.max_hp
            .or(self.hp)
            .unwrap_or_else(|| self.current_hp.max(0) as u32)
    }

    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveSnapshot {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub move_type: Option<String>,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default)]
    pub accuracy: Option<u32>,
    #[serde(default)]
    pub pp: Option<u32>,
    #[serde(default)]
    pub current_pp: Option<u32>,
    #[serde(default)]
    pub max_pp: Option<u32>,
}

impl MoveSnapshot {
    pub fn current_pp(&self) -> u32 {
        self.current_pp.or(self.pp).unwrap_or(0)
    }

    pub fn max_pp(&self) -> u32 {
        self.max_pp.or(self.pp).unwrap_or_else(|| self.current_pp())
    }
}
