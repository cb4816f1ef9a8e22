
mod battle;
mod pokemon;
mod pvp;
mod roster;

pub use battle::{ActionResponse, BattleDetails, BattleState, StartBattleResponse, TrainerInfo};
pub use pokemon::{MoveSnapshot, PokemonSnapshot};
pub use pvp::{
    AvailableRooms, MessageResponse, PvpActionResponse, PvpPhase, PvpState, RoomPreview,
    RoomResponse,
};
pub use roster::{Bag, RosterEntry, TeamOrder};

use crate::ProtocolError;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a successful response body into a typed response
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ProtocolError::EmptyBody.into());
    }

    serde_json::from_str(body).map_err(|e| ProtocolError::InvalidFormat(e.to_string()).into())
}

/// Parse the bag endpoint, which returns a list holding the user's single bag
pub fn parse_bag(body: &str) -> Result<Bag> {
    let bags: Vec<Bag> = parse_response(body)?;
    bags.into_iter()
        .next()
        .ok_or_else(|| ProtocolError::MissingField("bag".to_string()).into())
}

/// Extract a human readable message from an error response body.
///
/// Looks at `error`, `detail`, `message` and `non_field_errors` in that
/// order, then at the first field carrying a string or list of strings.
pub fn parse_error_message(status: u16, body: &str) -> String {
    let fallback = || format!("Error {}", status);

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    for key in ["error", "detail", "message"] {
        if let Some(Value::String(s)) = map.get(key) {
            return s.clone();
        }
    }

    if let Some(s) = map.get("non_field_errors").and_then(first_string) {
        return s;
    }

    // Field validation errors: {"move_id": ["This field is required."]}
    map.values().find_map(first_string).unwrap_or_else(fallback)
}

fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    }
}
