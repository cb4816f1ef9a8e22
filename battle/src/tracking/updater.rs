//! Update logic applying server snapshots to a battle session

use tallgrass_protocol::{PvpPhase, PvpState, StartBattleResponse};
use thiserror::Error;

use super::session::{BattleSession, BattleStatus, Outcome, PvpContext};
use crate::types::{Combatant, OpponentRoster, PlayerRoster, Side, TrainerProfile};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Missing {0} Pokemon in battle snapshot")]
    MissingSnapshot(&'static str),

    #[error("No Pokemon available in team")]
    EmptyRoster,
}

/// What a PvP snapshot changed, as seen by the player
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PvpUpdate {
    /// Log lines describing observed changes, already appended to the log
    pub events: Vec<String>,
    /// The session went from loading to active
    pub activated: bool,
    /// It became our turn
    pub turn_gained: bool,
    /// The battle ended with this winner
    pub winner: Option<String>,
}

impl BattleSession {
    /// Initialize from a wild or trainer start response.
    ///
    /// The player's combatant is matched against the roster by id; when the
    /// snapshot carries no id the lead roster entry is used.
    pub fn initialize_from_start(
        &mut self,
        response: &StartBattleResponse,
        roster: &PlayerRoster,
    ) -> Result<(), SessionError> {
        let opponent = response
            .opponent()
            .map(Combatant::from_protocol)
            .ok_or(SessionError::MissingSnapshot("opponent"))?;

        let player = match response.player_pokemon.as_ref() {
            Some(snapshot) => {
                let mut player = Combatant::from_protocol(snapshot);
                let entry = match snapshot.identity() {
                    Some(id) => roster.get(id),
                    None => roster.resolve(0).map(|(entry, _)| entry),
                };
                if let Some(entry) = entry {
                    player.id = entry.id;
                    player.display_name = entry.display_name.clone();
                    if player.moves.is_empty() {
                        player.moves = entry.moves.clone();
                    }
                }
                player
            }
            None => roster
                .resolve(0)
                .map(|(entry, _)| entry.clone())
                .ok_or(SessionError::EmptyRoster)?,
        };

        self.opponent = Some(match &response.trainer {
            Some(info) => OpponentRoster::trainer(TrainerProfile::from_protocol(info), opponent),
            None => OpponentRoster::single(opponent),
        });
        self.player = Some(player);
        self.battle_id = Some(response.battle_id);
        if !response.message.is_empty() {
            self.log.push(response.message.clone());
        }
        self.activate();
        Ok(())
    }

    /// Apply a PvP state snapshot, returning the changes it revealed
    pub fn apply_pvp_state(&mut self, state: &PvpState) -> PvpUpdate {
        let mut update = PvpUpdate::default();

        self.battle_id.get_or_insert(state.battle_id);
        let ctx = self.pvp.get_or_insert_with(PvpContext::default);
        update_context(ctx, state);

        // === Player ===
        let team: Vec<Combatant> = state.your_team().iter().map(Combatant::from_protocol).collect();
        if let Some(next) = team.get(state.your_current_pokemon_index) {
            match self.player.as_mut().filter(|current| current.same_identity(next)) {
                Some(current) => {
                    if next.current_hp < current.current_hp {
                        update.events.push(format!(
                            "{} took {} damage!",
                            current.display_name,
                            current.current_hp - next.current_hp
                        ));
                    }
                    current.sync_details(next);
                    current.settle_hp(next.current_hp);
                }
                None => self.player = Some(next.clone()),
            }
        }
        if let Some(ctx) = self.pvp.as_mut() {
            ctx.team = team;
            ctx.active_index = state.your_current_pokemon_index;
        }

        // === Opponent ===
        let opponents: Vec<Combatant> = state
            .opponent_team()
            .iter()
            .map(Combatant::from_protocol)
            .collect();
        if let Some(next) = opponents.get(state.opponent_current_pokemon_index).cloned() {
            let previous = self.combatant(Side::Opponent).cloned();
            match previous {
                Some(previous) if previous.same_identity(&next) => {
                    if next.current_hp < previous.current_hp {
                        update.events.push(format!(
                            "{} took {} damage!",
                            previous.display_name,
                            previous.current_hp - next.current_hp
                        ));
                    }
                }
                Some(_) => {
                    update
                        .events
                        .push(format!("Opponent sent out {}!", next.display_name));
                }
                None => {}
            }
            match self.opponent.as_mut() {
                Some(roster) => roster.replace_team(opponents, state.opponent_current_pokemon_index),
                None => {
                    self.opponent = Some(OpponentRoster::from_team(
                        opponents,
                        state.opponent_current_pokemon_index,
                    ))
                }
            }
        }

        // === Lifecycle ===
        if state.state == PvpPhase::Active && self.status() == BattleStatus::Loading {
            update.activated = self.activate();
        }

        if self.is_active() && state.your_turn && !self.your_turn {
            update.turn_gained = true;
            update.events.push("It's your turn!".to_string());
        }
        self.your_turn = state.your_turn;

        if let Some(winner) = state.winner_username.as_ref().filter(|w| !w.is_empty()) {
            let you_won = self
                .pvp
                .as_ref()
                .and_then(|ctx| ctx.username.as_ref())
                .map(|name| name == winner);
            if let Some(ctx) = self.pvp.as_mut() {
                ctx.winner = Some(winner.clone());
            }
            if self.end(Outcome::PvpWinner {
                winner: winner.clone(),
                you_won,
            }) {
                self.your_turn = false;
                update.events.push(format!("{} won the battle!", winner));
                update.winner = Some(winner.clone());
            }
        }

        for event in &update.events {
            self.log.push(event.clone());
        }
        update
    }
}

fn update_context(ctx: &mut PvpContext, state: &PvpState) {
    if let Some(code) = &state.room_code {
        ctx.room_code = Some(code.clone());
    }
    if let Some(format) = state.battle_format {
        ctx.format = Some(format);
    }
    if state.your_turn {
        if let Some(name) = &state.current_turn_username {
            ctx.username = Some(name.clone());
        }
    }
    if let Some(me) = ctx.username.as_deref() {
        ctx.opponent_username = [&state.player1_username, &state.player2_username]
            .into_iter()
            .flatten()
            .find(|name| name.as_str() != me)
            .cloned()
            .or(ctx.opponent_username.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::BattleKind;
    use tallgrass_protocol::{BattleFormat, PokemonSnapshot, TrainerInfo};

    fn snapshot(id: u64, name: &str, hp: i64, max: u32) -> PokemonSnapshot {
        PokemonSnapshot {
            id: Some(id),
            name: name.to_string(),
            current_hp: hp,
            max_hp: Some(max),
            ..Default::default()
        }
    }

    fn pvp_state(player_hp: i64, opponent_hp: i64, your_turn: bool) -> PvpState {
        PvpState {
            battle_id: 9,
            room_code: Some("AB12CD".to_string()),
            battle_format: Some(BattleFormat::Single),
            state: PvpPhase::Active,
            your_turn,
            current_turn_username: Some(if your_turn { "ash" } else { "gary" }.to_string()),
            your_team: Some(vec![snapshot(70, "Charmander", player_hp, 39)]),
            opponent_team: Some(vec![snapshot(80, "Bulbasaur", opponent_hp, 45)]),
            player1_username: Some("ash".to_string()),
            player2_username: Some("gary".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_initialize_wild() {
        let mut session = BattleSession::new(BattleKind::Wild);
        let roster = PlayerRoster::new(vec![Combatant::new(7, "Squirtle", 50, 50)]);
        let response = StartBattleResponse {
            battle_id: 41,
            message: "A wild Pidgey appeared!".to_string(),
            wild_pokemon: Some(snapshot(16, "Pidgey", 30, 30)),
            player_pokemon: Some(snapshot(7, "Squirtle", 50, 50)),
            ..Default::default()
        };

        session.initialize_from_start(&response, &roster).unwrap();

        assert!(session.is_active());
        assert_eq!(session.battle_id, Some(41));
        assert_eq!(session.name_of(Side::Opponent), "Pidgey");
        assert_eq!(session.log.latest(), Some("A wild Pidgey appeared!"));
    }

    #[test]
    fn test_initialize_missing_opponent() {
        let mut session = BattleSession::new(BattleKind::Wild);
        let response = StartBattleResponse {
            battle_id: 1,
            player_pokemon: Some(snapshot(7, "Squirtle", 50, 50)),
            ..Default::default()
        };

        let result = session.initialize_from_start(&response, &PlayerRoster::default());
        assert_eq!(result, Err(SessionError::MissingSnapshot("opponent")));
        assert_eq!(session.status(), BattleStatus::Loading);
    }

    #[test]
    fn test_initialize_player_falls_back_to_lead() {
        let mut session = BattleSession::new(BattleKind::Trainer);
        let roster = PlayerRoster::new(vec![Combatant::new(7, "Squirtle", 50, 50)]);
        let mut player = snapshot(0, "Squirtle", 44, 50);
        player.id = None;
        let response = StartBattleResponse {
            battle_id: 3,
            trainer: Some(TrainerInfo {
                name: "Youngster Joey".to_string(),
                money_reward: Some(120),
                team_size: Some(2),
                ..Default::default()
            }),
            opponent_pokemon: Some(snapshot(19, "Rattata", 22, 22)),
            player_pokemon: Some(player),
            ..Default::default()
        };

        session.initialize_from_start(&response, &roster).unwrap();

        let player = session.player.as_ref().unwrap();
        assert_eq!(player.id, 7);
        assert_eq!(player.current_hp, 44);
        assert_eq!(session.trainer_name(), Some("Youngster Joey"));
        assert_eq!(session.opponent.as_ref().unwrap().reward(), Some(120));
    }

    #[test]
    fn test_pvp_waiting_stays_loading() {
        let mut session = BattleSession::new(BattleKind::Pvp);
        let mut state = pvp_state(39, 45, false);
        state.state = PvpPhase::Waiting;
        state.opponent_team = None;

        let update = session.apply_pvp_state(&state);

        assert!(!update.activated);
        assert_eq!(session.status(), BattleStatus::Loading);
        assert!(session.opponent.is_none());
    }

    #[test]
    fn test_pvp_activation_and_damage_events() {
        let mut session = BattleSession::new(BattleKind::Pvp);
        let update = session.apply_pvp_state(&pvp_state(39, 45, true));
        assert!(update.activated);
        assert!(update.turn_gained);
        assert_eq!(session.pvp.as_ref().unwrap().username.as_deref(), Some("ash"));
        assert_eq!(
            session.pvp.as_ref().unwrap().opponent_username.as_deref(),
            Some("gary")
        );

        let update = session.apply_pvp_state(&pvp_state(39, 30, false));
        assert_eq!(update.events, vec!["Bulbasaur took 15 damage!".to_string()]);

        let update = session.apply_pvp_state(&pvp_state(29, 30, true));
        assert_eq!(
            update.events,
            vec![
                "Charmander took 10 damage!".to_string(),
                "It's your turn!".to_string()
            ]
        );
        assert_eq!(session.log.latest(), Some("It's your turn!"));
    }

    #[test]
    fn test_pvp_opponent_switch_event() {
        let mut session = BattleSession::new(BattleKind::Pvp);
        session.apply_pvp_state(&pvp_state(39, 45, true));

        let mut state = pvp_state(39, 45, false);
        state.opponent_team = Some(vec![
            snapshot(80, "Bulbasaur", 45, 45),
            snapshot(81, "Pidgey", 30, 30),
        ]);
        state.opponent_current_pokemon_index = 1;

        let update = session.apply_pvp_state(&state);
        assert_eq!(update.events, vec!["Opponent sent out Pidgey!".to_string()]);
        assert_eq!(session.name_of(Side::Opponent), "Pidgey");
    }

    #[test]
    fn test_pvp_winner_ends_once() {
        let mut session = BattleSession::new(BattleKind::Pvp);
        session.apply_pvp_state(&pvp_state(39, 45, true));

        let mut state = pvp_state(39, 0, false);
        state.state = PvpPhase::Finished;
        state.winner_username = Some("ash".to_string());

        let update = session.apply_pvp_state(&state);
        assert_eq!(update.winner.as_deref(), Some("ash"));
        assert_eq!(
            session.outcome,
            Some(Outcome::PvpWinner {
                winner: "ash".to_string(),
                you_won: Some(true)
            })
        );
        assert!(session.combatant(Side::Opponent).unwrap().fainted);

        let update = session.apply_pvp_state(&state);
        assert!(update.winner.is_none());
        assert!(update.events.is_empty());
    }
}
