#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tallgrass_client::{
    BattleController, BattleHandler, BattleKind, BattleStatus, CaptureNotice, ClientConfig,
    ClientError, Collaborators, Combatant, CombatantPhase, Destination, ItemKind, Outcome,
    RemoteAuthority, Result, Side, Timings,
};
use tallgrass_protocol::{
    ActionResponse, AvailableRooms, Bag, BattleDetails, BattleFormat, MessageResponse,
    MoveSnapshot, PokemonSnapshot, PvpActionResponse, PvpState, RoomResponse, RosterEntry,
    StartBattleResponse, TeamOrder,
};

// === Fixtures ===

pub fn tackle() -> MoveSnapshot {
    MoveSnapshot {
        id: 33,
        name: "Tackle".to_string(),
        pp: Some(35),
        max_pp: Some(35),
        ..Default::default()
    }
}

/// An owned or wild Pokemon
pub fn snapshot(id: u64, name: &str, hp: i64, max_hp: u32) -> PokemonSnapshot {
    PokemonSnapshot {
        id: Some(id),
        name: name.to_string(),
        level: Some(5),
        current_hp: hp,
        max_hp: Some(max_hp),
        ..Default::default()
    }
}

/// A trainer's Pokemon, identified by species id only
pub fn npc(pokemon_id: u64, name: &str, hp: i64, max_hp: u32) -> PokemonSnapshot {
    PokemonSnapshot {
        pokemon_id: Some(pokemon_id),
        name: name.to_string(),
        level: Some(4),
        current_hp: hp,
        max_hp: Some(max_hp),
        ..Default::default()
    }
}

/// A PvP team member
pub fn owned(player_pokemon_id: u64, name: &str, hp: i64, max_hp: u32) -> PokemonSnapshot {
    PokemonSnapshot {
        player_pokemon_id: Some(player_pokemon_id),
        name: name.to_string(),
        level: Some(10),
        current_hp: hp,
        max_hp: Some(max_hp),
        moves: vec![tackle()],
        ..Default::default()
    }
}

pub fn squirtle(hp: i64) -> PokemonSnapshot {
    PokemonSnapshot {
        moves: vec![tackle()],
        ..snapshot(7, "Squirtle", hp, 50)
    }
}

pub fn team() -> TeamOrder {
    TeamOrder {
        team: vec![
            RosterEntry {
                id: 7,
                pokemon_name: "Squirtle".to_string(),
                level: Some(5),
                current_hp: 50,
                max_hp: Some(50),
                moves_details: vec![tackle()],
                ..Default::default()
            },
            RosterEntry {
                id: 8,
                pokemon_name: "Pikachu".to_string(),
                level: Some(6),
                current_hp: 35,
                max_hp: Some(35),
                moves_details: vec![tackle()],
                ..Default::default()
            },
        ],
        team_count: Some(2),
        max_team_size: Some(6),
    }
}

pub fn wild_start() -> StartBattleResponse {
    StartBattleResponse {
        battle_id: 41,
        message: "A wild Pidgey appeared!".to_string(),
        wild_pokemon: Some(snapshot(16, "Pidgey", 30, 30)),
        player_pokemon: Some(squirtle(50)),
        ..Default::default()
    }
}

pub fn attack() -> tallgrass_client::PlayerAction {
    tallgrass_client::PlayerAction::Attack { move_id: 33 }
}

pub fn config() -> ClientConfig {
    ClientConfig::default()
        .with_username("ash")
        .with_timings(Timings::default())
}

// === Remote authority ===

/// Scripted server. Every call is counted; replies are served in order.
#[derive(Default)]
pub struct FakeAuthority {
    pub starts: Mutex<VecDeque<Result<StartBattleResponse>>>,
    pub replies: Mutex<VecDeque<Result<ActionResponse>>>,
    pub pvp_replies: Mutex<VecDeque<Result<PvpActionResponse>>>,
    /// The last state is served again once the queue is down to one
    pub states: Mutex<VecDeque<Result<PvpState>>>,
    pub latency: Duration,
    /// Overrides `latency` for starting a battle
    pub start_latency: Option<Duration>,
    pub state_latency: Duration,
    calls: Mutex<HashMap<&'static str, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_start_latency(mut self, latency: Duration) -> Self {
        self.start_latency = Some(latency);
        self
    }

    pub fn with_state_latency(mut self, latency: Duration) -> Self {
        self.state_latency = latency;
        self
    }

    pub fn start(self, start: Result<StartBattleResponse>) -> Self {
        self.starts.lock().unwrap().push_back(start);
        self
    }

    pub fn reply(self, reply: Result<ActionResponse>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn pvp_reply(self, reply: Result<PvpActionResponse>) -> Self {
        self.pvp_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn state(self, state: Result<PvpState>) -> Self {
        self.states.lock().unwrap().push_back(state);
        self
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    /// Most battle actions ever running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn action<T>(&self, name: &'static str, queue: &Mutex<VecDeque<Result<T>>>) -> Result<T> {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let latency = match name {
            "start_wild" | "start_trainer" => self.start_latency.unwrap_or(self.latency),
            _ => self.latency,
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport(format!("no reply for {}", name))))
    }

    fn count(&self, name: &'static str) {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
    }
}

#[async_trait]
impl RemoteAuthority for FakeAuthority {
    async fn start_wild(&self) -> Result<StartBattleResponse> {
        self.action("start_wild", &self.starts).await
    }

    async fn start_trainer(&self) -> Result<StartBattleResponse> {
        self.action("start_trainer", &self.starts).await
    }

    async fn attack(&self, _battle_id: u64, _move_id: u64) -> Result<ActionResponse> {
        self.action("attack", &self.replies).await
    }

    async fn use_item(&self, _battle_id: u64, _item: ItemKind) -> Result<ActionResponse> {
        self.action("use_item", &self.replies).await
    }

    async fn switch_pokemon(&self, _battle_id: u64, _pokemon_id: u64) -> Result<ActionResponse> {
        self.action("switch_pokemon", &self.replies).await
    }

    async fn flee(&self, _battle_id: u64) -> Result<ActionResponse> {
        self.action("flee", &self.replies).await
    }

    async fn battle_details(&self, battle_id: u64) -> Result<BattleDetails> {
        self.count("battle_details");
        Ok(BattleDetails {
            id: battle_id,
            state: Some("active".to_string()),
            ..Default::default()
        })
    }

    async fn create_room(&self, format: BattleFormat) -> Result<RoomResponse> {
        self.count("create_room");
        Ok(RoomResponse {
            message: "Room created".to_string(),
            room_code: "ABC123".to_string(),
            battle_id: 9,
            battle_format: Some(format),
            ..Default::default()
        })
    }

    async fn available_rooms(&self) -> Result<AvailableRooms> {
        self.count("available_rooms");
        Ok(AvailableRooms::default())
    }

    async fn join_room(&self, room_code: &str) -> Result<RoomResponse> {
        self.count("join_room");
        Ok(RoomResponse {
            room_code: room_code.to_string(),
            battle_id: 9,
            battle_format: Some(BattleFormat::Single),
            opponent_username: Some("misty".to_string()),
            ..Default::default()
        })
    }

    async fn leave_room(&self, _room_code: &str) -> Result<MessageResponse> {
        self.count("leave_room");
        Ok(MessageResponse {
            message: "Left room".to_string(),
        })
    }

    async fn pvp_state(&self, _battle_id: u64) -> Result<PvpState> {
        self.count("pvp_state");
        if !self.state_latency.is_zero() {
            tokio::time::sleep(self.state_latency).await;
        }
        let mut states = self.states.lock().unwrap();
        if states.len() > 1 {
            states.pop_front().unwrap()
        } else {
            states
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ClientError::Transport("no state".to_string())))
        }
    }

    async fn pvp_attack(&self, _battle_id: u64, _move_id: u64) -> Result<PvpActionResponse> {
        self.action("pvp_attack", &self.pvp_replies).await
    }

    async fn pvp_switch(&self, _battle_id: u64, _pokemon_index: usize) -> Result<PvpActionResponse> {
        self.action("pvp_switch", &self.pvp_replies).await
    }

    async fn pvp_use_item(&self, _battle_id: u64, _item: ItemKind) -> Result<PvpActionResponse> {
        self.action("pvp_use_item", &self.pvp_replies).await
    }

    async fn pvp_surrender(&self, _battle_id: u64) -> Result<PvpActionResponse> {
        self.action("pvp_surrender", &self.pvp_replies).await
    }
}

// === Collaborators ===

pub struct FakeCollaborators {
    pub team: Mutex<Result<TeamOrder>>,
    pub team_latency: Mutex<Duration>,
    pub team_calls: AtomicUsize,
    pub bag_calls: AtomicUsize,
    pub expired: AtomicUsize,
}

impl FakeCollaborators {
    pub fn new() -> Self {
        Self {
            team: Mutex::new(Ok(team())),
            team_latency: Mutex::new(Duration::ZERO),
            team_calls: AtomicUsize::new(0),
            bag_calls: AtomicUsize::new(0),
            expired: AtomicUsize::new(0),
        }
    }

    /// Delay every later team fetch by `latency`
    pub fn set_team_latency(&self, latency: Duration) {
        *self.team_latency.lock().unwrap() = latency;
    }

    pub fn team_calls(&self) -> usize {
        self.team_calls.load(Ordering::SeqCst)
    }

    pub fn bag_calls(&self) -> usize {
        self.bag_calls.load(Ordering::SeqCst)
    }

    pub fn expired(&self) -> usize {
        self.expired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Collaborators for FakeCollaborators {
    async fn team_order(&self) -> Result<TeamOrder> {
        self.team_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.team_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.team.lock().unwrap().clone()
    }

    async fn bag(&self) -> Result<Bag> {
        self.bag_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Bag {
            pokeballs: 5,
            potions: 2,
            ..Default::default()
        })
    }

    fn session_expired(&self) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}

// === Handler ===

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Log(String),
    Phase(Side, CombatantPhase),
    Hp(Side, u32),
    Banner(Option<String>),
    /// Species revealed, and whether the gate was held at the time
    Reveal(String, bool),
    Swap(String),
    Status(BattleStatus),
    Turn(bool),
    Capture(String),
    End(Outcome),
    Navigate(Destination),
    Error(String),
}

/// Records every presentation event
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
    controller: Mutex<Option<BattleController>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note the gate state whenever an opponent is revealed
    pub fn watch(&self, controller: &BattleController) {
        *self.controller.lock().unwrap() = Some(controller.clone());
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Log(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn hp(&self, side: Side) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Hp(s, hp) if s == side => Some(hp),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn has(&self, event: &Event) -> bool {
        self.position(event).is_some()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl BattleHandler for Recorder {
    async fn on_log(&self, line: &str) {
        self.push(Event::Log(line.to_string()));
    }

    async fn on_phase(&self, side: Side, phase: CombatantPhase) {
        self.push(Event::Phase(side, phase));
    }

    async fn on_hp(&self, side: Side, hp: u32, _max_hp: u32) {
        self.push(Event::Hp(side, hp));
    }

    async fn on_banner(&self, text: Option<&str>) {
        self.push(Event::Banner(text.map(str::to_string)));
    }

    async fn on_reveal(&self, combatant: &Combatant) {
        let locked = self
            .controller
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|c| c.is_locked());
        self.push(Event::Reveal(combatant.species.clone(), locked));
    }

    async fn on_player_swap(&self, combatant: &Combatant) {
        self.push(Event::Swap(combatant.species.clone()));
    }

    async fn on_status(&self, status: BattleStatus) {
        self.push(Event::Status(status));
    }

    async fn on_turn(&self, your_turn: bool) {
        self.push(Event::Turn(your_turn));
    }

    async fn on_capture(&self, notice: &CaptureNotice) {
        self.push(Event::Capture(notice.species.clone()));
    }

    async fn on_battle_end(&self, outcome: &Outcome) {
        self.push(Event::End(outcome.clone()));
    }

    async fn on_navigate(&self, to: Destination) {
        self.push(Event::Navigate(to));
    }

    async fn on_error(&self, message: &str) {
        self.push(Event::Error(message.to_string()));
    }
}

pub struct Harness {
    pub controller: BattleController,
    pub authority: Arc<FakeAuthority>,
    pub collaborators: Arc<FakeCollaborators>,
    pub recorder: Arc<Recorder>,
}

pub fn harness(kind: BattleKind, authority: FakeAuthority) -> Harness {
    harness_with(kind, authority, config())
}

pub fn harness_with(kind: BattleKind, authority: FakeAuthority, config: ClientConfig) -> Harness {
    let authority = Arc::new(authority);
    let collaborators = Arc::new(FakeCollaborators::new());
    let recorder = Arc::new(Recorder::new());
    let controller = BattleController::new(
        kind,
        authority.clone(),
        collaborators.clone(),
        recorder.clone(),
        &config,
    );
    recorder.watch(&controller);
    Harness {
        controller,
        authority,
        collaborators,
        recorder,
    }
}
