use async_trait::async_trait;
use tallgrass_protocol::{
    ActionResponse, AvailableRooms, Bag, BattleDetails, BattleFormat, ItemKind, MessageResponse,
    PvpActionResponse, PvpState, RoomResponse, StartBattleResponse, TeamOrder,
};

use crate::error::Result;

/// The battle server. Every call is one request.
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    async fn start_wild(&self) -> Result<StartBattleResponse>;

    async fn start_trainer(&self) -> Result<StartBattleResponse>;

    async fn attack(&self, battle_id: u64, move_id: u64) -> Result<ActionResponse>;

    async fn use_item(&self, battle_id: u64, item: ItemKind) -> Result<ActionResponse>;

    async fn switch_pokemon(&self, battle_id: u64, pokemon_id: u64) -> Result<ActionResponse>;

    async fn flee(&self, battle_id: u64) -> Result<ActionResponse>;

    async fn battle_details(&self, battle_id: u64) -> Result<BattleDetails>;

    async fn create_room(&self, format: BattleFormat) -> Result<RoomResponse>;

    async fn available_rooms(&self) -> Result<AvailableRooms>;

    async fn join_room(&self, room_code: &str) -> Result<RoomResponse>;

    async fn leave_room(&self, room_code: &str) -> Result<MessageResponse>;

    async fn pvp_state(&self, battle_id: u64) -> Result<PvpState>;

    async fn pvp_attack(&self, battle_id: u64, move_id: u64) -> Result<PvpActionResponse>;

    async fn pvp_switch(&self, battle_id: u64, pokemon_index: usize) -> Result<PvpActionResponse>;

    async fn pvp_use_item(&self, battle_id: u64, item: ItemKind) -> Result<PvpActionResponse>;

    async fn pvp_surrender(&self, battle_id: u64) -> Result<PvpActionResponse>;
}

/// Services outside the battle that the controller leans on
#[async_trait]
pub trait Collaborators: Send + Sync {
    /// The player's ordered team
    async fn team_order(&self) -> Result<TeamOrder>;

    async fn bag(&self) -> Result<Bag>;

    /// Called when the server rejects the session token
    fn session_expired(&self) {}
}
