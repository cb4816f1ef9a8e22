use serde::{Deserialize, Serialize};

use super::pokemon::MoveSnapshot;
use crate::client::ItemKind;

/// One Pokemon of the player's ordered team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub pokemon_name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub current_hp: i64,
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub max_hp: Option<u32>,
    #[serde(default)]
    pub sprite_front: Option<String>,
    #[serde(default)]
    pub sprite_back: Option<String>,
    #[serde(default)]
    pub moves_details: Vec<MoveSnapshot>,
}

impl RosterEntry {
    pub fn max_hp(&self) -> u32 {
        self.max_hp
            .or(self.hp)
            .unwrap_or_else(|| self.current_hp.max(0) as u32)
    }
}

/// Response of `get_team_order`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamOrder {
    #[serde(default)]
    pub team: Vec<RosterEntry>,
    #[serde(default)]
    pub team_count: Option<usize>,
    #[serde(default)]
    pub max_team_size: Option<usize>,
}

/// Item counts of the player's bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bag {
    #[serde(default)]
    pub pokeballs: u32,
    #[serde(default)]
    pub ultra_balls: u32,
    #[serde(default)]
    pub potions: u32,
    #[serde(default)]
    pub super_potions: u32,
    #[serde(default)]
    pub hyper_potions: u32,
}

impl Bag {
    pub fn count(&self, item: ItemKind) -> u32 {
        match item {
            ItemKind::Pokeball => self.pokeballs,
            ItemKind::UltraBall => self.ultra_balls,
            ItemKind::Potion => self.potions,
            ItemKind::SuperPotion => self.super_potions,
            ItemKind::HyperPotion => self.hyper_potions,
        }
    }
}
