use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tallgrass_battle::{
    ActionGate, ActionReply, BattleKind, BattleSession, BattleStatus, PlayerAction, PlayerRoster,
    Planner, Rejection, Side, Timings, check,
};
use tallgrass_protocol::{AvailableRooms, Bag, BattleDetails, BattleFormat, RoomResponse};

use crate::authority::{Collaborators, RemoteAuthority};
use crate::config::{ClientConfig, PollPolicy};
use crate::error::{ClientError, Result};
use crate::executor::Flow;
use crate::handler::BattleHandler;
use crate::http::HttpAuthority;
use crate::pvp::{PollState, PvpSynchronizer};
use crate::scope::TaskScope;

/// What became of a submitted action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Dropped without telling the player (busy, not active, not our turn)
    Ignored(Rejection),
    /// Refused locally; the reason was logged and nothing was sent
    Refused(Rejection),
    /// Played out; the gate is open again
    Completed,
    /// Played out and the battle is over
    Terminal,
    /// The view was reset or torn down while the action played
    Cancelled,
}

/// State shared by the controller, the executor and the PvP poller
pub(crate) struct Shared {
    session: Mutex<BattleSession>,
    roster: Mutex<PlayerRoster>,
    bag: Mutex<Option<Bag>>,
    pub(crate) gate: ActionGate,
    pub(crate) authority: Arc<dyn RemoteAuthority>,
    pub(crate) collaborators: Arc<dyn Collaborators>,
    pub(crate) handler: Arc<dyn BattleHandler>,
    pub(crate) timings: Timings,
    pub(crate) poll: PollPolicy,
    pub(crate) poll_state: PollState,
    /// Bumped whenever a side's HP animation is superseded
    pub(crate) hp_generation: [AtomicU64; 2],
    username: Option<String>,
    scope: Mutex<Arc<TaskScope>>,
    torn_down: AtomicBool,
}

impl Shared {
    pub(crate) fn session(&self) -> MutexGuard<'_, BattleSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn roster(&self) -> MutexGuard<'_, PlayerRoster> {
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn bag(&self) -> MutexGuard<'_, Option<Bag>> {
        self.bag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scope of the current view
    pub(crate) fn scope(&self) -> Arc<TaskScope> {
        self.scope
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.is_torn_down() {
            return Err(ClientError::TornDown);
        }
        Ok(())
    }

    /// Supersede any HP animation running for `side`
    pub(crate) fn supersede_hp(&self, side: Side) -> u64 {
        self.hp_generation[side.index()].fetch_add(1, Ordering::AcqRel) + 1
    }

    fn fresh_session(&self, kind: BattleKind) -> BattleSession {
        let mut session = BattleSession::new(kind);
        if let Some(ctx) = session.pvp.as_mut() {
            ctx.username = self.username.clone();
        }
        session
    }

    /// Report a failed request. Expired sessions go to the logout collaborator.
    pub(crate) async fn surface_error(&self, error: &ClientError) {
        if *error == ClientError::SessionExpired {
            self.collaborators.session_expired();
            return;
        }
        let message = error.user_message();
        self.session().error = Some(message.clone());
        self.handler.on_error(&message).await;
    }

    /// Initialization failed: the session moves to error
    async fn fail(&self, error: &ClientError) {
        tracing::error!(error = %error, "Battle failed to load");
        if *error == ClientError::SessionExpired {
            self.collaborators.session_expired();
        }
        let message = error.user_message();
        let status = {
            let mut session = self.session();
            session.fail(message.clone());
            session.status()
        };
        self.handler.on_status(status).await;
        self.handler.on_error(&message).await;
    }

    async fn dispatch(
        &self,
        kind: BattleKind,
        battle_id: u64,
        action: PlayerAction,
    ) -> Result<ActionReply> {
        let authority = &self.authority;
        if kind == BattleKind::Pvp {
            let response = match action {
                PlayerAction::Attack { move_id } => authority.pvp_attack(battle_id, move_id).await?,
                PlayerAction::UseItem(item) => authority.pvp_use_item(battle_id, item).await?,
                PlayerAction::Switch { pokemon_id } => {
                    let index = self
                        .session()
                        .pvp
                        .as_ref()
                        .and_then(|ctx| ctx.team_index(pokemon_id))
                        .ok_or_else(|| refusal(Rejection::UnknownTarget(pokemon_id)))?;
                    authority.pvp_switch(battle_id, index).await?
                }
                PlayerAction::Surrender => authority.pvp_surrender(battle_id).await?,
                PlayerAction::Flee => return Err(refusal(Rejection::FleeFromPvp)),
            };
            return Ok(ActionReply::Pvp(response));
        }

        let response = match action {
            PlayerAction::Attack { move_id } => authority.attack(battle_id, move_id).await?,
            PlayerAction::UseItem(item) => authority.use_item(battle_id, item).await?,
            PlayerAction::Switch { pokemon_id } => {
                authority.switch_pokemon(battle_id, pokemon_id).await?
            }
            PlayerAction::Flee => authority.flee(battle_id).await?,
            PlayerAction::Surrender => return Err(refusal(Rejection::SurrenderOutsidePvp)),
        };
        Ok(ActionReply::Battle(response))
    }
}

fn refusal(rejection: Rejection) -> ClientError {
    ClientError::Rejected {
        status: 400,
        message: rejection.lines().join(" "),
    }
}

/// Drives one battle view: loads the battle, serializes player actions
/// against the server and plays out each reply.
///
/// Cloning is cheap; all clones drive the same view.
#[derive(Clone)]
pub struct BattleController {
    shared: Arc<Shared>,
}

impl BattleController {
    pub fn new(
        kind: BattleKind,
        authority: Arc<dyn RemoteAuthority>,
        collaborators: Arc<dyn Collaborators>,
        handler: Arc<dyn BattleHandler>,
        config: &ClientConfig,
    ) -> Self {
        let mut session = BattleSession::new(kind);
        if let Some(ctx) = session.pvp.as_mut() {
            ctx.username = config.username.clone();
        }

        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                roster: Mutex::new(PlayerRoster::default()),
                bag: Mutex::new(None),
                gate: ActionGate::new(),
                authority,
                collaborators,
                handler,
                timings: config.timings.clone(),
                poll: config.poll.clone(),
                poll_state: PollState::new(),
                hp_generation: [AtomicU64::new(0), AtomicU64::new(0)],
                username: config.username.clone(),
                scope: Mutex::new(Arc::new(TaskScope::new())),
                torn_down: AtomicBool::new(false),
            }),
        }
    }

    /// Controller talking to the server over HTTP
    pub fn http(
        kind: BattleKind,
        handler: Arc<dyn BattleHandler>,
        config: &ClientConfig,
    ) -> Result<Self> {
        let http = Arc::new(HttpAuthority::new(config)?);
        Ok(Self::new(kind, http.clone(), http, handler, config))
    }

    /// Load the battle: the starting snapshot and the player's team.
    ///
    /// PvP sessions load from the first state snapshot instead; attach a
    /// battle id first with [`BattleController::attach_pvp`] or by creating
    /// or joining a room.
    pub async fn initialize(&self) -> Result<()> {
        let shared = &self.shared;
        shared.ensure_live()?;

        let kind = shared.session().kind;
        let start = match kind {
            BattleKind::Wild => shared.authority.start_wild(),
            BattleKind::Trainer => shared.authority.start_trainer(),
            BattleKind::Pvp => return self.pvp().refresh().await.map(|_| ()),
        };
        let (order, start, bag) = tokio::join!(
            shared.collaborators.team_order(),
            start,
            shared.collaborators.bag()
        );

        match bag {
            Ok(bag) => *shared.bag() = Some(bag),
            Err(e) => tracing::warn!(error = %e, "Bag fetch failed"),
        }
        let (order, start) = match order.and_then(|order| start.map(|start| (order, start))) {
            Ok(loaded) => loaded,
            Err(e) => {
                shared.fail(&e).await;
                return Err(e);
            }
        };

        let roster = PlayerRoster::from_protocol(&order);
        let loaded = {
            let mut session = shared.session();
            session
                .initialize_from_start(&start, &roster)
                .map(|_| session.clone())
        };
        let session = match loaded {
            Ok(session) => session,
            Err(e) => {
                let e = ClientError::Malformed(e.to_string());
                shared.fail(&e).await;
                return Err(e);
            }
        };
        *shared.roster() = roster;

        tracing::info!(
            battle_id = start.battle_id,
            kind = %kind,
            "Battle started"
        );
        let handler = &shared.handler;
        handler.on_status(session.status()).await;
        if let Some(player) = session.combatant(Side::Player) {
            handler.on_player_swap(player).await;
            handler.on_hp(Side::Player, player.current_hp, player.max_hp).await;
        }
        if let Some(opponent) = session.combatant(Side::Opponent) {
            handler.on_reveal(opponent).await;
            handler
                .on_hp(Side::Opponent, opponent.current_hp, opponent.max_hp)
                .await;
        }
        for line in session.log.iter() {
            handler.on_log(line).await;
        }
        Ok(())
    }

    /// Follow an existing PvP battle
    pub fn attach_pvp(&self, battle_id: u64) {
        let mut session = self.shared.session();
        session.battle_id = Some(battle_id);
    }

    pub async fn create_room(&self, format: BattleFormat) -> Result<RoomResponse> {
        self.shared.ensure_live()?;
        let room = self.shared.authority.create_room(format).await?;
        self.attach_room(&room);
        tracing::info!(room_code = %room.room_code, battle_id = room.battle_id, "Room created");
        Ok(room)
    }

    pub async fn join_room(&self, room_code: &str) -> Result<RoomResponse> {
        self.shared.ensure_live()?;
        let room = self.shared.authority.join_room(room_code).await?;
        self.attach_room(&room);
        tracing::info!(room_code = %room.room_code, battle_id = room.battle_id, "Room joined");
        Ok(room)
    }

    fn attach_room(&self, room: &RoomResponse) {
        let mut session = self.shared.session();
        session.battle_id = Some(room.battle_id);
        if let Some(ctx) = session.pvp.as_mut() {
            if !room.room_code.is_empty() {
                ctx.room_code = Some(room.room_code.clone());
            }
            if room.battle_format.is_some() {
                ctx.format = room.battle_format;
            }
            if room.opponent_username.is_some() {
                ctx.opponent_username = room.opponent_username.clone();
            }
        }
    }

    pub async fn available_rooms(&self) -> Result<AvailableRooms> {
        self.shared.ensure_live()?;
        self.shared.authority.available_rooms().await
    }

    pub async fn leave_room(&self, room_code: &str) -> Result<String> {
        self.shared.ensure_live()?;
        let response = self.shared.authority.leave_room(room_code).await?;
        self.reset();
        Ok(response.message)
    }

    /// Server-side summary of the current wild or trainer battle
    pub async fn battle_details(&self) -> Result<BattleDetails> {
        self.shared.ensure_live()?;
        let battle_id = self.shared.session().battle_id.ok_or(ClientError::NoBattle)?;
        self.shared.authority.battle_details(battle_id).await
    }

    /// Clear everything shown for the previous battle.
    ///
    /// Pending steps, timers and polling of the previous view are cancelled
    /// and the gate is opened.
    pub fn reset(&self) {
        let shared = &self.shared;
        if shared.is_torn_down() {
            return;
        }
        let previous = std::mem::replace(
            &mut *shared.scope.lock().unwrap_or_else(PoisonError::into_inner),
            Arc::new(TaskScope::new()),
        );
        previous.cancel();

        let kind = shared.session().kind;
        *shared.session() = shared.fresh_session(kind);
        *shared.roster() = PlayerRoster::default();
        *shared.bag() = None;
        shared.supersede_hp(Side::Player);
        shared.supersede_hp(Side::Opponent);
        shared.poll_state.reset();
        shared.gate.reset();
    }

    /// Attempt a player action.
    ///
    /// At most one action is in flight; a second submit while one plays out
    /// is ignored. Local rule violations are logged and nothing is sent.
    /// Request failures are reported, the gate is reopened and the session
    /// is left as it was.
    pub async fn submit(&self, action: PlayerAction) -> Result<Submission> {
        let shared = &self.shared;
        shared.ensure_live()?;
        let scope = shared.scope();

        let Some(permit) = shared.gate.try_acquire() else {
            tracing::debug!(action = %action, "Action in flight, ignoring");
            return Ok(Submission::Ignored(Rejection::Locked));
        };

        let checked = {
            let session = shared.session();
            let roster = shared.roster();
            check(&session, &roster, &action).map(|_| {
                let opening = Planner::new(&session, &roster, &shared.timings).opening(&action);
                (session.kind, session.battle_id, opening)
            })
        };
        let (kind, battle_id, opening) = match checked {
            Ok(checked) => checked,
            Err(rejection) if rejection.is_silent() => {
                tracing::debug!(action = %action, reason = ?rejection, "Action ignored");
                return Ok(Submission::Ignored(rejection));
            }
            Err(rejection) => {
                tracing::warn!(action = %action, reason = ?rejection, "Action refused");
                for line in rejection.lines() {
                    shared.log(&line).await;
                }
                return Ok(Submission::Refused(rejection));
            }
        };
        let battle_id = battle_id.ok_or(ClientError::NoBattle)?;

        tracing::debug!(battle_id = battle_id, action = %action, "Submitting action");
        let (reply, opened) = tokio::join!(
            shared.dispatch(kind, battle_id, action),
            shared.run(opening, &scope)
        );
        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(battle_id = battle_id, action = %action, error = %e, "Action failed");
                if !scope.is_cancelled() {
                    shared.surface_error(&e).await;
                }
                return Err(e);
            }
        };
        if opened == Flow::Cancelled || scope.is_cancelled() {
            return Ok(Submission::Cancelled);
        }

        let sequence = {
            let session = shared.session();
            let roster = shared.roster();
            Planner::new(&session, &roster, &shared.timings).resolve(&action, &reply)
        };
        tracing::debug!(battle_id = battle_id, steps = sequence.len(), "Playing out reply");

        // From here the sequence decides when the gate opens
        permit.hand_off();
        Ok(match shared.run(sequence, &scope).await {
            Flow::Completed => Submission::Completed,
            Flow::Terminal => Submission::Terminal,
            Flow::Cancelled => Submission::Cancelled,
        })
    }

    /// Copy of the session as currently displayed
    pub fn snapshot(&self) -> BattleSession {
        self.shared.session().clone()
    }

    pub fn roster(&self) -> PlayerRoster {
        self.shared.roster().clone()
    }

    pub fn bag(&self) -> Option<Bag> {
        self.shared.bag().clone()
    }

    pub fn status(&self) -> BattleStatus {
        self.shared.session().status()
    }

    /// Whether an action is in flight
    pub fn is_locked(&self) -> bool {
        self.shared.gate.is_locked()
    }

    pub fn pvp(&self) -> PvpSynchronizer {
        PvpSynchronizer::new(self.shared.clone())
    }

    /// The view is gone: cancel everything it scheduled. Final.
    pub fn teardown(&self) {
        let shared = &self.shared;
        if shared.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        shared.poll_state.stop();
        shared.scope().cancel();
        tracing::debug!("Battle view torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.is_torn_down()
    }
}
