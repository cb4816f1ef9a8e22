//! Faint, switch and capture resolution

use tallgrass_protocol::ActionResponse;

use super::{Destination, HpChange, Sequence, Step};
use crate::timings::Timings;
use crate::tracking::{BattleSession, CaptureNotice};
use crate::types::{Combatant, CombatantPhase, Side};

/// Result of advancing the opponent's roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new opponent entered
    Revealed,
    /// No opponent is left to send out
    Exhausted,
}

/// Announce the fainted opponent and bring in the first candidate able to
/// fight. Fainted candidates are announced and skipped.
pub fn advance_opponent(
    seq: &mut Sequence,
    session: &BattleSession,
    candidates: &[Combatant],
    remaining: Option<usize>,
    intro: Option<&str>,
    timings: &Timings,
) -> Advance {
    seq.log(format!("{} fainted!", session.name_of(Side::Opponent)));

    for candidate in candidates {
        if candidate.fainted {
            seq.log(format!("{} is unable to battle!", candidate.display_name));
            continue;
        }

        seq.wait(timings.reveal_delay);
        seq.push(Step::Reveal {
            combatant: candidate.clone(),
            remaining,
        });
        seq.wait(timings.reveal_entrance);

        let intro = match (intro, session.trainer_name()) {
            (Some(intro), _) => intro.to_string(),
            (None, Some(trainer)) => format!("{} sends out {}!", trainer, candidate.display_name),
            (None, None) => format!("{} appeared!", candidate.display_name),
        };
        seq.log(intro);

        // Entered damaged: settle the bar from full
        if candidate.current_hp < candidate.max_hp {
            seq.interpolate(vec![HpChange::new(Side::Opponent, candidate.current_hp)]);
        }
        return Advance::Revealed;
    }

    Advance::Exhausted
}

/// The player's active Pokemon fainted and the server already chose the next
pub fn forced_player_switch(
    seq: &mut Sequence,
    outgoing: &str,
    incoming: &Combatant,
    timings: &Timings,
) {
    seq.log(format!("{} fainted!", outgoing));
    seq.wait(timings.switch_cue);
    seq.push(Step::SwapPlayer(incoming.clone()));
    seq.cue(Side::Player, CombatantPhase::Switching, timings.switch_cue);
    seq.log(format!("Go, {}!", incoming.display_name));
}

/// Successful capture: terminal, with no win or loss narrative
pub fn capture(
    seq: &mut Sequence,
    session: &BattleSession,
    response: &ActionResponse,
    timings: &Timings,
) {
    let species = response
        .wild_pokemon_name
        .clone()
        .unwrap_or_else(|| session.name_of(Side::Opponent).to_string());

    seq.wait(timings.result_delay);
    seq.push(Step::Capture(CaptureNotice {
        species,
        message: response.message.clone(),
    }));
    seq.log(response.message.clone());
    seq.push(Step::RefreshBag);
    seq.push(Step::Navigate {
        to: Destination::Map,
        after: timings.capture_grace,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::BattleKind;
    use crate::types::{OpponentRoster, TrainerProfile};

    fn trainer_session() -> BattleSession {
        let mut session = BattleSession::new(BattleKind::Trainer);
        session.player = Some(Combatant::new(7, "Squirtle", 50, 50));
        session.opponent = Some(OpponentRoster::trainer(
            TrainerProfile {
                name: "Youngster Joey".to_string(),
                reward: Some(120),
                team_size: Some(3),
            },
            Combatant::new(19, "Rattata", 0, 22),
        ));
        session.activate();
        session
    }

    #[test]
    fn test_advance_reveals_first_able() {
        let session = trainer_session();
        let mut seq = Sequence::new();
        let candidates = [
            Combatant::new(16, "Pidgey", 0, 30),
            Combatant::new(21, "Spearow", 18, 30),
        ];

        let advance = advance_opponent(
            &mut seq,
            &session,
            &candidates,
            Some(1),
            None,
            &Timings::instant(),
        );

        assert_eq!(advance, Advance::Revealed);
        assert_eq!(
            seq.logs().collect::<Vec<_>>(),
            vec![
                "Rattata fainted!",
                "Pidgey is unable to battle!",
                "Youngster Joey sends out Spearow!"
            ]
        );
        let reveal = seq
            .position(|s| matches!(s, Step::Reveal { .. }))
            .unwrap();
        let settle = seq
            .position(|s| matches!(s, Step::Interpolate(_)))
            .unwrap();
        assert!(reveal < settle);
    }

    #[test]
    fn test_advance_exhausted() {
        let session = trainer_session();
        let mut seq = Sequence::new();

        let advance = advance_opponent(&mut seq, &session, &[], Some(0), None, &Timings::instant());

        assert_eq!(advance, Advance::Exhausted);
        assert!(seq.position(|s| matches!(s, Step::Reveal { .. })).is_none());
    }

    #[test]
    fn test_advance_uses_server_intro() {
        let session = trainer_session();
        let mut seq = Sequence::new();
        let candidates = [Combatant::new(16, "Pidgey", 30, 30)];

        advance_opponent(
            &mut seq,
            &session,
            &candidates,
            None,
            Some("Joey's Pidgey is ready!"),
            &Timings::instant(),
        );

        assert_eq!(seq.logs().last(), Some("Joey's Pidgey is ready!"));
        // Full HP: no settle step
        assert!(seq.position(|s| matches!(s, Step::Interpolate(_))).is_none());
    }

    #[test]
    fn test_capture_is_terminal() {
        let mut session = BattleSession::new(BattleKind::Wild);
        session.opponent = Some(OpponentRoster::single(Combatant::new(16, "Pidgey", 5, 30)));
        let response = ActionResponse {
            message: "Gotcha! Pidgey was caught!".to_string(),
            captured: true,
            battle_ended: true,
            ..Default::default()
        };
        let mut seq = Sequence::new();

        capture(&mut seq, &session, &response, &Timings::instant());
        let seq = seq.finish();

        assert!(seq.is_terminal());
        assert!(seq.steps().contains(&Step::Capture(CaptureNotice {
            species: "Pidgey".to_string(),
            message: "Gotcha! Pidgey was caught!".to_string(),
        })));
        assert!(!seq.steps().contains(&Step::Release));
    }
}
