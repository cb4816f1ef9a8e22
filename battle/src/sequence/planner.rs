//! Planning of action sequences

use tallgrass_protocol::{ActionResponse, BattleState, PvpActionResponse};

use super::resolver::{self, Advance};
use super::{Destination, HpChange, Sequence, Step};
use crate::action::{ActionReply, PlayerAction};
use crate::timings::Timings;
use crate::tracking::{BattleKind, BattleSession, Outcome};
use crate::types::{Combatant, CombatantPhase, PlayerRoster, Side};

/// Builds the steps that play out a player action.
///
/// The opening runs while the request is in flight. Once the server answers,
/// [`Planner::resolve`] orders the rest:
///
/// 1. HP changes the reply reveals, run together
/// 2. opponent roster advance if the opponent fainted
/// 3. the server's result message, then the effectiveness banner
/// 4. the counter-attack, which owns the player's HP change
/// 5. a forced switch if the player's Pokemon fainted
/// 6. the end of battle, or releasing the gate
pub struct Planner<'a> {
    session: &'a BattleSession,
    roster: &'a PlayerRoster,
    timings: &'a Timings,
}

impl<'a> Planner<'a> {
    pub fn new(session: &'a BattleSession, roster: &'a PlayerRoster, timings: &'a Timings) -> Self {
        Self {
            session,
            roster,
            timings,
        }
    }

    /// Steps played while the request is in flight
    pub fn opening(&self, action: &PlayerAction) -> Sequence {
        let mut seq = Sequence::new();
        match action {
            PlayerAction::Attack { move_id } => {
                let move_name = self
                    .session
                    .player
                    .as_ref()
                    .and_then(|p| p.find_move(*move_id))
                    .map_or("an attack", |m| m.name.as_str());
                seq.log(format!(
                    "{} used {}!",
                    self.session.name_of(Side::Player),
                    move_name
                ));
                seq.cue(Side::Player, CombatantPhase::Attacking, self.timings.attacker_cue);
                seq.cue(Side::Opponent, CombatantPhase::Hit, self.timings.defender_cue);
            }
            PlayerAction::UseItem(item) => seq.log(format!("You used {}!", item)),
            PlayerAction::Switch { .. } | PlayerAction::Flee | PlayerAction::Surrender => {}
        }
        seq
    }

    /// Steps played once the server has answered
    pub fn resolve(&self, action: &PlayerAction, reply: &ActionReply) -> Sequence {
        match reply {
            ActionReply::Battle(response) => match action {
                PlayerAction::Flee => self.flee(response),
                _ if response.captured => {
                    let mut seq = Sequence::new();
                    resolver::capture(&mut seq, self.session, response, self.timings);
                    seq.finish()
                }
                _ => self.battle_turn(action, response),
            },
            ActionReply::Pvp(response) => self.pvp_turn(action, response),
        }
    }

    fn battle_turn(&self, action: &PlayerAction, response: &ActionResponse) -> Sequence {
        let t = self.timings;
        let mut seq = Sequence::new();
        let (Some(current_player), Some(current_opponent)) = (
            self.session.player.as_ref(),
            self.session.combatant(Side::Opponent),
        ) else {
            seq.log(response.message.clone());
            return seq.finish();
        };

        let state = response.battle_state.as_ref();
        let won = response.battle_ended && response.won;
        let lost = response.battle_ended && response.lost;
        let switching = matches!(action, PlayerAction::Switch { .. });

        let mut player = current_player.clone();
        if let PlayerAction::Switch { pokemon_id } = action {
            if let Some(incoming) = self.incoming(*pokemon_id, state) {
                seq.cue(Side::Player, CombatantPhase::Switching, t.switch_cue);
                seq.push(Step::SwapPlayer(incoming.clone()));
                player = incoming;
            }
            seq.wait(t.switch_result_delay);
            seq.log(response.message.clone());
        }

        let next_player = state
            .and_then(|s| s.player_pokemon.as_ref())
            .map(Combatant::from_protocol);
        let next_opponent = state
            .and_then(|s| s.opponent())
            .map(Combatant::from_protocol);

        let opponent_replaced =
            self.opponent_replaced(current_opponent, next_opponent.as_ref(), state);
        let player_replaced = next_player
            .as_ref()
            .filter(|next| !next.same_identity(&player))
            .cloned();

        let opponent_target = if won || opponent_replaced {
            0
        } else {
            next_opponent
                .as_ref()
                .map_or(current_opponent.current_hp, |o| o.current_hp)
        };
        let opponent_faints = opponent_target == 0 && !current_opponent.fainted;
        let player_target = match (&player_replaced, &next_player) {
            (Some(_), _) => 0,
            (None, Some(next)) => next.current_hp,
            (None, None) => player.current_hp,
        };
        let counter = response
            .enemy_attack_message()
            .filter(|_| !opponent_faints);
        let defer_player = counter.is_some() || opponent_replaced;

        // A potion's heal shows before the counter-attack lands
        let healed = match action {
            PlayerAction::UseItem(item) if defer_player => item
                .heal_amount()
                .map(|heal| player.current_hp.saturating_add(heal).min(player.max_hp))
                .filter(|hp| *hp != player.current_hp),
            _ => None,
        };
        let shown_player_hp = healed.unwrap_or(player.current_hp);

        let mut changes = Vec::new();
        if opponent_target != current_opponent.current_hp {
            changes.push(HpChange::new(Side::Opponent, opponent_target));
        }
        if !defer_player && player_target != player.current_hp {
            changes.push(HpChange::new(Side::Player, player_target));
        } else if let Some(hp) = healed {
            changes.push(HpChange::new(Side::Player, hp));
        }
        seq.interpolate(changes);

        let mut force_win = false;
        if opponent_faints {
            force_win = match self.session.kind {
                BattleKind::Trainer => {
                    let candidates: Vec<Combatant> = next_opponent
                        .iter()
                        .filter(|_| opponent_replaced && !won)
                        .cloned()
                        .collect();
                    let remaining = state
                        .and_then(|s| s.trainer.as_ref())
                        .and_then(|trainer| trainer.alive_pokemon);
                    resolver::advance_opponent(
                        &mut seq,
                        self.session,
                        &candidates,
                        remaining,
                        response.next_pokemon_message(),
                        t,
                    ) == Advance::Exhausted
                }
                _ => true,
            };
        }

        if !switching {
            seq.wait(t.result_delay);
            seq.log(response.message.clone());
        }

        if let Some(text) = response.effectiveness() {
            seq.push(Step::Banner {
                text: text.to_string(),
                duration: t.banner,
            });
        }

        if won || force_win {
            self.victory(&mut seq, response, &player);
            return seq.finish();
        }

        // The new opponent struck on entry
        if opponent_replaced && counter.is_none() && player_target != shown_player_hp {
            seq.interpolate(vec![HpChange::new(Side::Player, player_target)]);
        }

        if let Some(counter) = counter {
            seq.wait(if switching {
                t.switch_counter_delay
            } else {
                t.counter_delay
            });
            seq.log(counter);
            seq.cue(Side::Opponent, CombatantPhase::Attacking, t.attacker_cue);
            seq.cue(Side::Player, CombatantPhase::Hit, t.defender_cue);
            if player_target != shown_player_hp {
                seq.interpolate(vec![HpChange::new(Side::Player, player_target)]);
            }
        }

        match (&player_replaced, next_player) {
            (Some(incoming), _) => {
                resolver::forced_player_switch(&mut seq, &player.display_name, incoming, t);
            }
            (None, Some(next)) => seq.push(Step::SyncDetails {
                side: Side::Player,
                combatant: next,
            }),
            (None, None) => {}
        }

        if lost {
            self.defeat(&mut seq, response);
        } else if self.session.kind == BattleKind::Wild
            && matches!(action, PlayerAction::UseItem(_))
        {
            seq.push(Step::RefreshBag);
        }
        seq.finish()
    }

    fn flee(&self, response: &ActionResponse) -> Sequence {
        let mut seq = Sequence::new();
        seq.log(response.message.clone());
        if response.fled || response.battle_ended {
            seq.push(Step::EndBattle(Outcome::Fled));
            seq.push(Step::Navigate {
                to: Destination::Map,
                after: self.timings.flee_grace,
            });
        }
        seq.finish()
    }

    fn pvp_turn(&self, action: &PlayerAction, response: &PvpActionResponse) -> Sequence {
        let t = self.timings;
        let mut seq = Sequence::new();
        let ctx = self.session.pvp.as_ref();

        if let PlayerAction::Surrender = action {
            if response.message.is_empty() {
                seq.log("You surrendered!");
            } else {
                seq.log(response.message.clone());
            }
            seq.push(Step::YourTurn(false));
            seq.push(Step::EndBattle(Outcome::Surrendered));
            seq.push(Step::Navigate {
                to: Destination::Dashboard,
                after: t.surrender_grace,
            });
            return seq.finish();
        }

        let mut player = self.session.player.clone();
        if let PlayerAction::Switch { pokemon_id } = action {
            if let Some(incoming) = ctx.and_then(|c| c.team.iter().find(|m| m.id == *pokemon_id)) {
                seq.cue(Side::Player, CombatantPhase::Switching, t.switch_cue);
                seq.push(Step::SwapPlayer(incoming.clone()));
                player = Some(incoming.clone());
            }
        }

        let state = response.battle_state.as_ref();
        let mut changes = Vec::new();
        let sides = [
            (
                Side::Opponent,
                self.session.combatant(Side::Opponent),
                state.and_then(|s| s.opponent_active()),
            ),
            (
                Side::Player,
                player.as_ref(),
                state.and_then(|s| s.your_active()),
            ),
        ];
        for (side, current, next) in sides {
            if let (Some(current), Some(next)) = (current, next) {
                let next = Combatant::from_protocol(next);
                if next.same_identity(current) && next.current_hp != current.current_hp {
                    changes.push(HpChange::new(side, next.current_hp));
                }
            }
        }
        seq.interpolate(changes);
        seq.log(response.message.clone());
        seq.push(Step::YourTurn(response.your_turn.unwrap_or(false)));

        if response.battle_ended {
            let username = ctx.and_then(|c| c.username.clone());
            let winner = response
                .winner
                .clone()
                .or_else(|| state.and_then(|s| s.winner_username.clone()));
            // Only the acting player's move can end the battle
            let you_won = match (&winner, &username) {
                (Some(winner), Some(username)) => winner == username,
                _ => true,
            };
            let winner = winner.or(username).unwrap_or_else(|| "You".to_string());

            seq.push(Step::EndBattle(Outcome::PvpWinner {
                winner: winner.clone(),
                you_won: Some(you_won),
            }));
            seq.log(format!("{} won the battle!", winner));
            seq.push(Step::Navigate {
                to: Destination::Dashboard,
                after: t.battle_grace,
            });
            return seq.finish();
        }

        seq.wait(t.resync_delay);
        seq.push(Step::Resync);
        seq.finish()
    }

    fn victory(&self, seq: &mut Sequence, response: &ActionResponse, player: &Combatant) {
        let t = self.timings;
        let player_name = response
            .player_pokemon_name
            .clone()
            .unwrap_or_else(|| player.display_name.clone());

        seq.wait(t.end_delay);
        seq.push(Step::EndBattle(Outcome::Won));
        match self.session.trainer_name() {
            Some(trainer) => {
                seq.log(format!("{} was defeated!", trainer));
                let reward = self
                    .session
                    .opponent
                    .as_ref()
                    .and_then(|o| o.reward())
                    .or(response.money_gained);
                if let Some(reward) = reward {
                    seq.log(format!("You earned ${}!", reward));
                }
                if let Some(exp) = response.experience_gained {
                    seq.log(format!("{} gained {} experience points.", player_name, exp));
                }
            }
            None => {
                seq.log(format!(
                    "{} was defeated!",
                    self.session.name_of(Side::Opponent)
                ));
                if let Some(exp) = response.experience_gained {
                    seq.log(format!("{} gained {} experience points.", player_name, exp));
                }
                if let Some(money) = response.money_gained {
                    seq.log(format!("You earned ${}!", money));
                }
            }
        }

        let mut announcements = Vec::new();
        if response.leveled_up {
            if let Some(level) = response.new_level {
                announcements.push(format!("{} grew to level {}!", player_name, level));
            }
            if let Some(evolved) = response.new_pokemon_name.as_ref().filter(|_| response.evolved) {
                announcements.push(format!("{} evolved into {}!", player_name, evolved));
            }
        }
        seq.wait(t.refresh_delay);
        seq.push(Step::RefreshRoster { announcements });
        seq.push(Step::Navigate {
            to: Destination::Map,
            after: t.battle_grace,
        });
    }

    fn defeat(&self, seq: &mut Sequence, response: &ActionResponse) {
        let t = self.timings;
        seq.wait(t.end_delay);
        seq.push(Step::EndBattle(Outcome::Lost));
        seq.log("You lost the battle!");
        if let Some(town) = &response.new_location {
            seq.log(format!("You hurried back to {}.", town));
        }
        seq.wait(t.defeat_delay);
        seq.interpolate(vec![HpChange::new(Side::Player, 0)]);
        seq.push(Step::Navigate {
            to: Destination::Map,
            after: t.battle_grace,
        });
    }

    /// The Pokemon a voluntary switch brings in
    fn incoming(&self, pokemon_id: u64, state: Option<&BattleState>) -> Option<Combatant> {
        self.roster.get(pokemon_id).cloned().or_else(|| {
            state
                .and_then(|s| s.player_pokemon.as_ref())
                .map(Combatant::from_protocol)
                .filter(|c| c.id == pokemon_id)
        })
    }

    /// Whether the trainer's active Pokemon was replaced during the turn
    fn opponent_replaced(
        &self,
        current: &Combatant,
        next: Option<&Combatant>,
        state: Option<&BattleState>,
    ) -> bool {
        if self.session.kind != BattleKind::Trainer {
            return false;
        }
        let Some(next) = next else {
            return false;
        };
        if !next.same_identity(current) {
            return true;
        }
        // Same species sent out again
        let alive = state
            .and_then(|s| s.trainer.as_ref())
            .and_then(|trainer| trainer.alive_pokemon);
        let known = self.session.opponent.as_ref().and_then(|o| o.remaining());
        matches!((alive, known), (Some(alive), Some(known)) if alive < known)
    }
}
