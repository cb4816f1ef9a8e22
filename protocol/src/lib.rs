use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{BattleCommand, BattleFormat, ItemKind, Method};
pub use server::{
    ActionResponse, AvailableRooms, Bag, BattleDetails, BattleState, MessageResponse, MoveSnapshot,
    PokemonSnapshot, PvpActionResponse, PvpPhase, PvpState, RoomPreview, RoomResponse,
    RosterEntry, StartBattleResponse, TeamOrder, TrainerInfo, parse_bag, parse_error_message,
    parse_response,
};

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty response body")]
    EmptyBody,
}
