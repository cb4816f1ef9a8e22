//! PvP state polling

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tallgrass_battle::{BattleStatus, Destination, Side};
use tallgrass_protocol::PvpState;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use crate::controller::Shared;
use crate::error::{ClientError, Result};

/// What a poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// State fetched and applied
    Fetched,
    /// The view is hidden; nothing was sent
    Hidden,
    /// A fetch is already running
    InFlight,
    /// The last fetch was too recent
    CoolingDown,
    /// An action is playing out; periodic polls wait for it
    Busy,
    /// Polling stopped, the battle is over
    Stopped,
    /// The view was reset while the request was out; the state was dropped
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// Interval tick or an explicit poll
    Tick,
    /// The view became visible again
    Visible,
    /// Follow-up to our own action, while the gate is still held
    Resync,
}

/// Poll bookkeeping shared with the controller
#[derive(Debug)]
pub(crate) struct PollState {
    in_flight: AtomicBool,
    last_fetch: Mutex<Option<Instant>>,
    visible: watch::Sender<bool>,
    stopped: AtomicBool,
    running: AtomicBool,
}

impl PollState {
    pub fn new() -> Self {
        let (visible, _) = watch::channel(true);
        Self {
            in_flight: AtomicBool::new(false),
            last_fetch: Mutex::new(None),
            visible,
            stopped: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Forget the previous battle; the poll loop died with its scope
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::Release);
        self.running.store(false, Ordering::Release);
        *self.last_fetch.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.in_flight })
    }

    /// Claim the current cooldown window. Returns false if a fetch already
    /// went out within it.
    fn claim_window(&self, cooldown: std::time::Duration) -> bool {
        let mut last = self.last_fetch.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if last.is_some_and(|at| now.duration_since(at) < cooldown) {
            return false;
        }
        *last = Some(now);
        true
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Shared {
    /// Fetch and apply the PvP state, subject to visibility, the cooldown
    /// floor and the in-flight flag
    pub(crate) async fn fetch_pvp(self: &Arc<Self>, trigger: Trigger) -> Result<PollOutcome> {
        self.ensure_live()?;
        let poll = &self.poll_state;
        if poll.is_stopped() {
            return Ok(PollOutcome::Stopped);
        }
        if self.session().is_ended() {
            poll.stop();
            return Ok(PollOutcome::Stopped);
        }
        if !poll.is_visible() {
            return Ok(PollOutcome::Hidden);
        }
        if trigger == Trigger::Tick && self.gate.is_locked() {
            return Ok(PollOutcome::Busy);
        }
        let battle_id = self.session().battle_id.ok_or(ClientError::NoBattle)?;

        let Some(_flight) = poll.begin() else {
            return Ok(PollOutcome::InFlight);
        };
        if !poll.claim_window(self.poll.cooldown) {
            return Ok(PollOutcome::CoolingDown);
        }

        let scope = self.scope();
        tracing::debug!(battle_id = battle_id, trigger = ?trigger, "Fetching PvP state");
        let state = match self.authority.pvp_state(battle_id).await {
            Ok(state) => state,
            Err(ClientError::SessionExpired) => {
                poll.stop();
                self.collaborators.session_expired();
                return Err(ClientError::SessionExpired);
            }
            Err(e) => {
                tracing::error!(battle_id = battle_id, error = %e, "PvP state fetch failed");
                return Err(e);
            }
        };
        if scope.is_cancelled() {
            return Ok(PollOutcome::Discarded);
        }

        self.apply_pvp(state).await;
        Ok(PollOutcome::Fetched)
    }

    pub(crate) async fn resync(self: &Arc<Self>) -> Result<PollOutcome> {
        self.fetch_pvp(Trigger::Resync).await
    }

    async fn apply_pvp(self: &Arc<Self>, state: PvpState) {
        let (update, was_turn, session) = {
            let mut session = self.session();
            let was_turn = session.your_turn;
            let update = session.apply_pvp_state(&state);
            (update, was_turn, session.clone())
        };
        let handler = &self.handler;

        if update.activated {
            tracing::info!(battle_id = state.battle_id, "PvP battle active");
            handler.on_status(BattleStatus::Active).await;
            if let Some(player) = session.combatant(Side::Player) {
                handler.on_player_swap(player).await;
            }
            if let Some(opponent) = session.combatant(Side::Opponent) {
                handler.on_reveal(opponent).await;
            }
        }
        for side in [Side::Player, Side::Opponent] {
            if let Some(combatant) = session.combatant(side) {
                handler.on_hp(side, combatant.current_hp, combatant.max_hp).await;
            }
        }
        for event in &update.events {
            handler.on_log(event).await;
        }
        if session.your_turn != was_turn {
            handler.on_turn(session.your_turn).await;
        }

        if let Some(winner) = update.winner {
            tracing::info!(battle_id = state.battle_id, winner = %winner, "PvP battle over");
            self.poll_state.stop();
            handler.on_status(BattleStatus::Ended).await;
            if let Some(outcome) = &session.outcome {
                handler.on_battle_end(outcome).await;
            }
            self.navigate(
                Destination::Dashboard,
                self.timings.battle_grace,
                &self.scope(),
            );
        }
    }
}

/// Keeps a PvP session in step with the server.
///
/// Polls on [`PollPolicy::interval`](crate::PollPolicy), never more often
/// than the cooldown, and not at all while the view is hidden. Regaining
/// visibility fetches at once. Polling stops when a winner is recorded.
#[derive(Clone)]
pub struct PvpSynchronizer {
    shared: Arc<Shared>,
}

impl PvpSynchronizer {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Fetch the state now, unless hidden, cooling down, already fetching
    /// or an action is playing out
    pub async fn poll(&self) -> Result<PollOutcome> {
        self.shared.fetch_pvp(Trigger::Tick).await
    }

    /// Like [`PvpSynchronizer::poll`], but also while an action plays out
    pub async fn refresh(&self) -> Result<PollOutcome> {
        self.shared.fetch_pvp(Trigger::Resync).await
    }

    pub fn set_visible(&self, visible: bool) {
        self.shared.poll_state.visible.send_if_modified(|current| {
            if *current == visible {
                return false;
            }
            *current = visible;
            true
        });
    }

    pub fn is_visible(&self) -> bool {
        self.shared.poll_state.is_visible()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.poll_state.is_stopped()
    }

    /// Start the poll loop. It lives until stopped, torn down or reset.
    pub fn start(&self) {
        let shared = &self.shared;
        if shared.is_torn_down() {
            return;
        }
        shared.poll_state.stopped.store(false, Ordering::Release);
        if shared.poll_state.running.swap(true, Ordering::AcqRel) {
            return;
        }

        let weak = Arc::downgrade(shared);
        let interval = shared.poll.interval;
        let mut visible = shared.poll_state.visible.subscribe();
        let scope = shared.scope();
        let loop_scope = scope.clone();

        scope.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let trigger = tokio::select! {
                    biased;
                    _ = loop_scope.cancelled() => break,
                    changed = visible.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if !*visible.borrow_and_update() {
                            continue;
                        }
                        Trigger::Visible
                    }
                    _ = ticker.tick() => Trigger::Tick,
                };

                let Some(shared) = weak.upgrade() else {
                    break;
                };
                match shared.fetch_pvp(trigger).await {
                    Ok(PollOutcome::Stopped) => break,
                    Ok(outcome) => tracing::trace!(outcome = ?outcome, "PvP poll"),
                    Err(ClientError::SessionExpired | ClientError::TornDown) => break,
                    Err(e) => tracing::warn!(error = %e, "PvP poll failed"),
                }
            }

            if let Some(shared) = weak.upgrade() {
                shared.poll_state.running.store(false, Ordering::Release);
            }
        });
    }

    /// Stop polling after the current fetch
    pub fn stop(&self) {
        self.shared.poll_state.stop();
    }
}
