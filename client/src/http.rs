use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tallgrass_protocol::{
    ActionResponse, AvailableRooms, Bag, BattleCommand, BattleDetails, BattleFormat, ItemKind,
    MessageResponse, Method, PvpActionResponse, PvpState, RoomResponse, StartBattleResponse,
    TeamOrder, parse_bag, parse_error_message, parse_response,
};

use crate::authority::{Collaborators, RemoteAuthority};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Talks to the battle server over HTTP
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAuthority {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a command and return the body of a successful response
    async fn send(&self, command: &BattleCommand) -> Result<String> {
        let path = command.path();
        let url = self.url(&path);

        let mut request = match command.method() {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Token {}", token));
        }
        if let Some(body) = command.body() {
            request = request.json(&body);
        }

        tracing::debug!(method = ?command.method(), path = %path, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path = %path, "Token rejected by server");
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            let message = parse_error_message(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), path = %path, message = %message, "Request rejected");
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn execute<T: DeserializeOwned>(&self, command: BattleCommand) -> Result<T> {
        let body = self.send(&command).await?;
        parse_response(&body).map_err(|e| {
            tracing::warn!(path = %command.path(), error = %e, "Malformed response");
            ClientError::Malformed(e.to_string())
        })
    }
}

#[async_trait]
impl RemoteAuthority for HttpAuthority {
    async fn start_wild(&self) -> Result<StartBattleResponse> {
        self.execute(BattleCommand::StartWild).await
    }

    async fn start_trainer(&self) -> Result<StartBattleResponse> {
        self.execute(BattleCommand::StartTrainer).await
    }

    async fn attack(&self, battle_id: u64, move_id: u64) -> Result<ActionResponse> {
        self.execute(BattleCommand::Attack { battle_id, move_id })
            .await
    }

    async fn use_item(&self, battle_id: u64, item: ItemKind) -> Result<ActionResponse> {
        self.execute(BattleCommand::UseItem { battle_id, item }).await
    }

    async fn switch_pokemon(&self, battle_id: u64, pokemon_id: u64) -> Result<ActionResponse> {
        self.execute(BattleCommand::Switch {
            battle_id,
            pokemon_id,
        })
        .await
    }

    async fn flee(&self, battle_id: u64) -> Result<ActionResponse> {
        self.execute(BattleCommand::Flee { battle_id }).await
    }

    async fn battle_details(&self, battle_id: u64) -> Result<BattleDetails> {
        self.execute(BattleCommand::BattleDetails { battle_id })
            .await
    }

    async fn create_room(&self, format: BattleFormat) -> Result<RoomResponse> {
        self.execute(BattleCommand::PvpCreateRoom { format }).await
    }

    async fn available_rooms(&self) -> Result<AvailableRooms> {
        self.execute(BattleCommand::PvpAvailableRooms).await
    }

    async fn join_room(&self, room_code: &str) -> Result<RoomResponse> {
        self.execute(BattleCommand::PvpJoinRoom {
            room_code: room_code.to_string(),
        })
        .await
    }

    async fn leave_room(&self, room_code: &str) -> Result<MessageResponse> {
        self.execute(BattleCommand::PvpLeaveRoom {
            room_code: room_code.to_string(),
        })
        .await
    }

    async fn pvp_state(&self, battle_id: u64) -> Result<PvpState> {
        self.execute(BattleCommand::PvpState { battle_id }).await
    }

    async fn pvp_attack(&self, battle_id: u64, move_id: u64) -> Result<PvpActionResponse> {
        self.execute(BattleCommand::PvpAttack { battle_id, move_id })
            .await
    }

    async fn pvp_switch(&self, battle_id: u64, pokemon_index: usize) -> Result<PvpActionResponse> {
        self.execute(BattleCommand::PvpSwitch {
            battle_id,
            pokemon_index,
        })
        .await
    }

    async fn pvp_use_item(&self, battle_id: u64, item: ItemKind) -> Result<PvpActionResponse> {
        self.execute(BattleCommand::PvpUseItem { battle_id, item })
            .await
    }

    async fn pvp_surrender(&self, battle_id: u64) -> Result<PvpActionResponse> {
        self.execute(BattleCommand::PvpSurrender { battle_id })
            .await
    }
}

#[async_trait]
impl Collaborators for HttpAuthority {
    async fn team_order(&self) -> Result<TeamOrder> {
        self.execute(BattleCommand::TeamOrder).await
    }

    async fn bag(&self) -> Result<Bag> {
        let body = self.send(&BattleCommand::Bag).await?;
        parse_bag(&body).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    fn session_expired(&self) {
        tracing::warn!("Session expired; a new login is required");
    }
}
