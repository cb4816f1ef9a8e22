//! Plays out planned sequences against the clock

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use futures_util::future::join_all;
use tallgrass_battle::{
    BattleKind, BattleStatus, CombatantPhase, Destination, HpChange, HpTween, Outcome,
    PlayerRoster, Sequence, Side, Step,
};

use crate::controller::Shared;
use crate::scope::TaskScope;

/// How a sequence run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Completed,
    /// The battle ended during the sequence
    Terminal,
    Cancelled,
}

impl Shared {
    /// Run every step in order. Stops early if `scope` is cancelled.
    pub(crate) async fn run(self: &Arc<Self>, sequence: Sequence, scope: &Arc<TaskScope>) -> Flow {
        let terminal = sequence.is_terminal();

        for step in sequence {
            if scope.is_cancelled() {
                return Flow::Cancelled;
            }
            tracing::trace!(step = ?step, "Running step");
            if !self.step(step, scope).await {
                return Flow::Cancelled;
            }
        }

        if terminal { Flow::Terminal } else { Flow::Completed }
    }

    /// Returns false if the scope was cancelled during the step
    async fn step(self: &Arc<Self>, step: Step, scope: &Arc<TaskScope>) -> bool {
        match step {
            Step::Log(line) => self.log(&line).await,
            Step::Wait(duration) => return scope.sleep(duration).await,
            Step::Cue {
                side,
                phase,
                duration,
            } => return self.cue(side, phase, duration, scope).await,
            Step::Interpolate(changes) => return self.animate(changes, scope).await,
            Step::Banner { text, duration } => self.banner(text, duration, scope).await,
            Step::Reveal {
                mut combatant,
                remaining,
            } => {
                combatant.reset_to_full();
                self.supersede_hp(Side::Opponent);
                {
                    let mut session = self.session();
                    if let Some(roster) = session.opponent.as_mut() {
                        roster.advance_to(combatant.clone());
                        roster.set_remaining(remaining);
                    }
                }
                tracing::debug!(species = %combatant.species, remaining = ?remaining, "Opponent revealed");
                self.handler.on_reveal(&combatant).await;
                self.handler
                    .on_hp(Side::Opponent, combatant.current_hp, combatant.max_hp)
                    .await;
            }
            Step::SwapPlayer(combatant) => {
                self.supersede_hp(Side::Player);
                self.session().player = Some(combatant.clone());
                self.handler.on_player_swap(&combatant).await;
                self.handler
                    .on_hp(Side::Player, combatant.current_hp, combatant.max_hp)
                    .await;
            }
            Step::SyncDetails { side, combatant } => {
                if let Some(current) = self.session().combatant_mut(side) {
                    current.sync_details(&combatant);
                }
            }
            Step::YourTurn(your_turn) => {
                self.session().your_turn = your_turn;
                self.handler.on_turn(your_turn).await;
            }
            Step::EndBattle(outcome) => self.end_battle(outcome).await,
            Step::Capture(notice) => {
                let ended = {
                    let mut session = self.session();
                    session.capture = Some(notice.clone());
                    session.end(Outcome::Captured)
                };
                tracing::info!(species = %notice.species, "Pokemon captured");
                self.handler.on_capture(&notice).await;
                if ended {
                    self.handler.on_status(BattleStatus::Ended).await;
                    self.handler.on_battle_end(&Outcome::Captured).await;
                }
            }
            Step::RefreshRoster { announcements } => {
                match scope.guard(self.collaborators.team_order()).await {
                    Some(Ok(order)) => {
                        *self.roster() = PlayerRoster::from_protocol(&order);
                        for line in announcements {
                            self.log(&line).await;
                        }
                    }
                    Some(Err(e)) => tracing::warn!(error = %e, "Team refresh failed"),
                    None => return false,
                }
            }
            Step::RefreshBag => match scope.guard(self.collaborators.bag()).await {
                Some(Ok(bag)) => *self.bag() = Some(bag),
                Some(Err(e)) => tracing::warn!(error = %e, "Bag refresh failed"),
                None => return false,
            },
            Step::Resync => match scope.guard(self.resync()).await {
                Some(Ok(_)) => {}
                Some(Err(e)) => tracing::warn!(error = %e, "PvP resync failed"),
                None => return false,
            },
            Step::Navigate { to, after } => self.navigate(to, after, scope),
            Step::Release => self.gate.release(),
        }
        !scope.is_cancelled()
    }

    /// Append a line to the log and show it
    pub(crate) async fn log(&self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.session().log.push(line);
        self.handler.on_log(line).await;
    }

    async fn cue(
        &self,
        side: Side,
        phase: CombatantPhase,
        duration: Duration,
        scope: &TaskScope,
    ) -> bool {
        let Some(shown) = self.set_phase(side, phase) else {
            return true;
        };
        self.handler.on_phase(side, shown).await;

        if !scope.sleep(duration).await {
            return false;
        }

        if let Some(shown) = self.set_phase(side, CombatantPhase::Idle) {
            self.handler.on_phase(side, shown).await;
        }
        true
    }

    /// Returns the phase actually shown; a fainted combatant stays fainted
    fn set_phase(&self, side: Side, phase: CombatantPhase) -> Option<CombatantPhase> {
        let mut session = self.session();
        let combatant = session.combatant_mut(side)?;
        combatant.set_phase(phase);
        Some(combatant.phase)
    }

    /// Run HP tweens concurrently and wait for all of them
    async fn animate(&self, changes: Vec<HpChange>, scope: &TaskScope) -> bool {
        let tweens = changes.into_iter().map(|change| self.tween(change, scope));
        join_all(tweens).await.into_iter().all(|finished| finished)
    }

    /// Move one side's displayed HP to the target, one value per cadence.
    ///
    /// A newer animation of the same side supersedes this one, which then
    /// stops without settling.
    async fn tween(&self, change: HpChange, scope: &TaskScope) -> bool {
        let side = change.side;
        let generation = self.supersede_hp(side);
        let Some((from, max_hp)) = self
            .session()
            .combatant(side)
            .map(|c| (c.current_hp, c.max_hp))
        else {
            return true;
        };

        for hp in HpTween::new(from, change.to, max_hp, self.timings.hp_steps) {
            if !scope.sleep(self.timings.hp_cadence).await {
                return false;
            }
            if self.hp_generation[side.index()].load(Ordering::Acquire) != generation {
                return true;
            }
            if let Some(combatant) = self.session().combatant_mut(side) {
                combatant.set_hp(hp);
            }
            self.handler.on_hp(side, hp, max_hp).await;
        }

        let fainted = {
            let mut session = self.session();
            match session.combatant_mut(side) {
                Some(combatant) => {
                    combatant.settle_hp(change.to);
                    combatant.fainted
                }
                None => false,
            }
        };
        if fainted {
            tracing::debug!(side = ?side, "Combatant fainted");
            self.handler.on_phase(side, CombatantPhase::Fainted).await;
        }
        true
    }

    async fn banner(self: &Arc<Self>, text: String, duration: Duration, scope: &Arc<TaskScope>) {
        self.session().banner = Some(text.clone());
        self.handler.on_banner(Some(&text)).await;

        let shared = self.clone();
        scope.spawn(async move {
            tokio::time::sleep(duration).await;
            let cleared = {
                let mut session = shared.session();
                if session.banner.as_deref() == Some(text.as_str()) {
                    session.banner = None;
                    true
                } else {
                    false
                }
            };
            if cleared {
                shared.handler.on_banner(None).await;
            }
        });
    }

    async fn end_battle(&self, outcome: Outcome) {
        let (ended, kind) = {
            let mut session = self.session();
            (session.end(outcome.clone()), session.kind)
        };
        if kind == BattleKind::Pvp {
            self.poll_state.stop();
        }
        if !ended {
            return;
        }
        tracing::info!(outcome = ?outcome, "Battle ended");
        self.handler.on_status(BattleStatus::Ended).await;
        self.handler.on_battle_end(&outcome).await;
    }

    /// Leave the battle screen after `after`, unless the view goes first
    pub(crate) fn navigate(self: &Arc<Self>, to: Destination, after: Duration, scope: &TaskScope) {
        let handler = self.handler.clone();
        scope.spawn(async move {
            tokio::time::sleep(after).await;
            handler.on_navigate(to).await;
        });
    }
}
