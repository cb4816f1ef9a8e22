//! Rosters for both sides of a battle

use tallgrass_protocol::{TeamOrder, TrainerInfo};

use super::combatant::Combatant;

/// The opposing trainer, if any
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainerProfile {
    pub name: String,
    pub reward: Option<u32>,
    pub team_size: Option<usize>,
}

impl TrainerProfile {
    pub fn from_protocol(info: &TrainerInfo) -> Self {
        Self {
            name: info.name.clone(),
            reward: info.money_reward,
            team_size: info.team_size.or(info.total_pokemon),
        }
    }
}

/// Ordered opposing Pokemon with the active one marked.
///
/// Wild battles hold a single member. Trainer rosters grow as the server
/// reveals each next Pokemon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpponentRoster {
    pub trainer: Option<TrainerProfile>,
    members: Vec<Combatant>,
    active: usize,
    /// Unfainted count as last reported by the server
    remaining: Option<usize>,
}

impl OpponentRoster {
    /// A lone wild Pokemon
    pub fn single(combatant: Combatant) -> Self {
        Self {
            trainer: None,
            members: vec![combatant],
            active: 0,
            remaining: None,
        }
    }

    /// A trainer's roster, with only the lead revealed
    pub fn trainer(profile: TrainerProfile, lead: Combatant) -> Self {
        let remaining = profile.team_size;
        Self {
            trainer: Some(profile),
            members: vec![lead],
            active: 0,
            remaining,
        }
    }

    /// A fully known team, as in PvP
    pub fn from_team(members: Vec<Combatant>, active: usize) -> Self {
        let active = active.min(members.len().saturating_sub(1));
        Self {
            trainer: None,
            members,
            active,
            remaining: None,
        }
    }

    pub fn active(&self) -> Option<&Combatant> {
        self.members.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut Combatant> {
        self.members.get_mut(self.active)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn set_remaining(&mut self, remaining: Option<usize>) {
        if remaining.is_some() {
            self.remaining = remaining;
        }
    }

    /// Money reward of the trainer, if known
    pub fn reward(&self) -> Option<u32> {
        self.trainer.as_ref().and_then(|t| t.reward)
    }

    /// Make `next` the active member, adding it if not yet known
    pub fn advance_to(&mut self, next: Combatant) {
        match self.members.iter().position(|m| m.same_identity(&next) && !m.fainted) {
            Some(index) => {
                self.members[index] = next;
                self.active = index;
            }
            None => {
                self.members.push(next);
                self.active = self.members.len() - 1;
            }
        }
    }

    /// Replace the whole team, keeping it in server order
    pub fn replace_team(&mut self, members: Vec<Combatant>, active: usize) {
        self.active = active.min(members.len().saturating_sub(1));
        self.members = members;
    }

    /// Whether any member other than the active one can still fight
    pub fn has_reserve(&self) -> bool {
        if let Some(remaining) = self.remaining {
            let active_alive = self.active().is_some_and(|m| !m.fainted);
            return remaining > usize::from(active_alive);
        }
        self.members
            .iter()
            .enumerate()
            .any(|(i, m)| i != self.active && !m.fainted)
    }
}

/// The player's ordered team, at most six entries
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerRoster {
    entries: Vec<Combatant>,
}

/// How a roster lookup matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterMatch {
    Exact,
    /// No entry had the id; the lead entry was used instead
    Fallback,
}

impl PlayerRoster {
    pub const MAX_SIZE: usize = 6;

    pub fn new(mut entries: Vec<Combatant>) -> Self {
        entries.truncate(Self::MAX_SIZE);
        Self { entries }
    }

    pub fn from_protocol(order: &TeamOrder) -> Self {
        Self::new(
            order
                .team
                .iter()
                .map(Combatant::from_roster_entry)
                .collect(),
        )
    }

    pub fn get(&self, id: u64) -> Option<&Combatant> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// Find the entry for `id`, falling back to the lead entry
    pub fn resolve(&self, id: u64) -> Option<(&Combatant, RosterMatch)> {
        match self.get(id) {
            Some(entry) => Some((entry, RosterMatch::Exact)),
            None => self.entries.first().map(|e| (e, RosterMatch::Fallback)),
        }
    }

    /// Entries the player could switch to
    pub fn switch_candidates(&self, active_id: u64) -> impl Iterator<Item = &Combatant> {
        self.entries
            .iter()
            .filter(move |c| c.id != active_id && !c.fainted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(team_size: usize) -> TrainerProfile {
        TrainerProfile {
            name: "Youngster Joey".to_string(),
            reward: Some(120),
            team_size: Some(team_size),
        }
    }

    #[test]
    fn test_single_roster() {
        let roster = OpponentRoster::single(Combatant::new(16, "Pidgey", 30, 30));
        assert_eq!(roster.active().unwrap().species, "Pidgey");
        assert!(!roster.has_reserve());
        assert!(roster.reward().is_none());
    }

    #[test]
    fn test_trainer_advance() {
        let mut roster = OpponentRoster::trainer(profile(2), Combatant::new(19, "Rattata", 22, 22));
        assert!(roster.has_reserve());

        roster.active_mut().unwrap().settle_hp(0);
        roster.set_remaining(Some(1));
        roster.advance_to(Combatant::new(16, "Pidgey", 30, 30));

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.active_index(), 1);
        assert_eq!(roster.active().unwrap().species, "Pidgey");
        assert!(roster.members()[0].fainted);
        assert!(!roster.has_reserve());
    }

    #[test]
    fn test_same_species_twice_is_a_new_member() {
        let mut roster = OpponentRoster::trainer(profile(2), Combatant::new(19, "Rattata", 22, 22));
        roster.active_mut().unwrap().settle_hp(0);
        roster.advance_to(Combatant::new(19, "Rattata", 25, 25));

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.active().unwrap().current_hp, 25);
    }

    #[test]
    fn test_team_reserve_without_count() {
        let mut roster = OpponentRoster::from_team(
            vec![
                Combatant::new(1, "Bulbasaur", 45, 45),
                Combatant::new(2, "Charmander", 0, 39),
            ],
            0,
        );
        assert!(!roster.has_reserve());

        roster.replace_team(
            vec![
                Combatant::new(1, "Bulbasaur", 0, 45),
                Combatant::new(2, "Charmander", 39, 39),
            ],
            1,
        );
        assert_eq!(roster.active().unwrap().species, "Charmander");
    }

    #[test]
    fn test_player_roster_truncates() {
        let entries = (0..8).map(|i| Combatant::new(i, "Magikarp", 20, 20)).collect();
        let roster = PlayerRoster::new(entries);
        assert_eq!(roster.len(), PlayerRoster::MAX_SIZE);
    }

    #[test]
    fn test_resolve_fallback() {
        let roster = PlayerRoster::new(vec![
            Combatant::new(7, "Squirtle", 50, 50),
            Combatant::new(8, "Pidgey", 0, 30),
        ]);

        let (entry, matched) = roster.resolve(8).unwrap();
        assert_eq!(entry.species, "Pidgey");
        assert_eq!(matched, RosterMatch::Exact);

        let (entry, matched) = roster.resolve(99).unwrap();
        assert_eq!(entry.species, "Squirtle");
        assert_eq!(matched, RosterMatch::Fallback);

        assert!(PlayerRoster::default().resolve(1).is_none());
    }

    #[test]
    fn test_switch_candidates() {
        let roster = PlayerRoster::new(vec![
            Combatant::new(7, "Squirtle", 50, 50),
            Combatant::new(8, "Pidgey", 0, 30),
            Combatant::new(9, "Oddish", 20, 45),
        ]);
        let ids: Vec<_> = roster.switch_candidates(7).map(|c| c.id).collect();
        assert_eq!(ids, vec![9]);
    }
}
