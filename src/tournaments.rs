// This file is part of knockout.
//
// knockout is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// knockout is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::rngs::ThreadRng;

use crate::{
    Id,
    error::BracketError,
    participant::Participant,
    seeding::{Seeding, Shuffled},
    store::TournamentStore,
    tournament::Tournament,
};

/// Loads, changes and saves tournaments. Nothing is saved when a change fails.
pub struct Tournaments<S> {
    store: S,
    seeding: Box<dyn Seeding>,
}

impl<S: TournamentStore> Tournaments<S> {
    /// Seeds brackets with a uniform shuffle.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            seeding: Box::new(Shuffled::<ThreadRng>::default()),
        }
    }

    #[must_use]
    pub fn with_seeding(store: S, seeding: Box<dyn Seeding>) -> Self {
        Self { store, seeding }
    }

    /// # Errors
    ///
    /// If the store can't be loaded.
    pub fn list(&self) -> anyhow::Result<Vec<Tournament>> {
        self.store.load()
    }

    /// # Errors
    ///
    /// If the store can't be loaded or the tournament doesn't exist.
    pub fn get(&self, id: Id) -> anyhow::Result<Tournament> {
        self.store
            .load()?
            .into_iter()
            .find(|tournament| tournament.id == id)
            .ok_or_else(|| BracketError::TournamentNotFound(id).into())
    }

    /// # Errors
    ///
    /// If the store can't be loaded or saved.
    pub fn create(
        &mut self,
        name: &str,
        description: &str,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Tournament> {
        let tournament = Tournament::new(name, description, start_date, end_date);

        let mut tournaments = self.store.load()?;
        tournaments.push(tournament.clone());
        self.store.save(&tournaments)?;

        info!("{} create_tournament {name}", tournament.id);
        Ok(tournament)
    }

    /// Changes the name, description and dates of a tournament.
    ///
    /// # Errors
    ///
    /// If the store can't be loaded or saved, or the tournament doesn't exist.
    pub fn update(
        &mut self,
        id: Id,
        name: Option<&str>,
        description: Option<&str>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Tournament> {
        self.modify(id, |tournament, _| {
            if let Some(name) = name {
                tournament.name = name.to_string();
            }
            if let Some(description) = description {
                tournament.description = description.to_string();
            }
            if let Some(start_date) = start_date {
                tournament.start_date = start_date;
            }
            if end_date.is_some() {
                tournament.end_date = end_date;
            }

            info!("{} update_tournament", tournament.id);
            Ok(())
        })
    }

    /// Returns whether the tournament existed.
    ///
    /// # Errors
    ///
    /// If the store can't be loaded or saved.
    pub fn delete(&mut self, id: Id) -> anyhow::Result<bool> {
        let mut tournaments = self.store.load()?;
        let count = tournaments.len();
        tournaments.retain(|tournament| tournament.id != id);

        if tournaments.len() == count {
            return Ok(false);
        }

        self.store.save(&tournaments)?;
        info!("{id} delete_tournament");
        Ok(true)
    }

    /// Adds a tournament that was made elsewhere, replacing any with the same
    /// id.
    ///
    /// # Errors
    ///
    /// If the store can't be loaded or saved.
    pub fn import(&mut self, tournament: Tournament) -> anyhow::Result<()> {
        let mut tournaments = self.store.load()?;
        let id = tournament.id;

        if let Some(existing) = tournaments.iter_mut().find(|existing| existing.id == id) {
            *existing = tournament;
        } else {
            tournaments.push(tournament);
        }

        self.store.save(&tournaments)?;
        info!("{id} import_tournament");
        Ok(())
    }

    /// Regenerates the bracket if there already was one.
    ///
    /// # Errors
    ///
    /// If the tournament doesn't exist or the name is taken.
    pub fn add_participant(
        &mut self,
        id: Id,
        participant: Participant,
    ) -> anyhow::Result<Tournament> {
        self.modify(id, |tournament, seeding| {
            info!("{id} add_participant {}", participant.name);
            tournament.add_participant(participant)?;

            if !tournament.matches.is_empty() {
                debug!("{id} regenerating the bracket");
                tournament.generate_bracket(seeding)?;
            }
            Ok(())
        })
    }

    /// Regenerates the bracket if there already was one, or clears it when too
    /// few participants remain.
    ///
    /// # Errors
    ///
    /// If the tournament or participant doesn't exist.
    pub fn remove_participant(
        &mut self,
        id: Id,
        participant_id: Id,
    ) -> anyhow::Result<Tournament> {
        self.modify(id, |tournament, seeding| {
            let participant = tournament.remove_participant(participant_id)?;
            info!("{id} remove_participant {}", participant.name);

            if !tournament.matches.is_empty() {
                if tournament.participants.len() < 2 {
                    debug!("{id} clearing the bracket");
                    tournament.clear_bracket();
                } else {
                    debug!("{id} regenerating the bracket");
                    tournament.generate_bracket(seeding)?;
                }
            }
            Ok(())
        })
    }

    /// # Errors
    ///
    /// If the tournament doesn't exist or has fewer than 2 participants.
    pub fn generate_bracket(&mut self, id: Id) -> anyhow::Result<Tournament> {
        self.modify(id, |tournament, seeding| {
            tournament.generate_bracket(seeding)?;
            info!(
                "{id} generate_bracket {} participants {} rounds",
                tournament.participants.len(),
                tournament.rounds
            );
            Ok(())
        })
    }

    /// # Errors
    ///
    /// If the tournament doesn't exist or the result is rejected.
    pub fn update_match_result(
        &mut self,
        id: Id,
        match_id: Id,
        score1: i32,
        score2: i32,
    ) -> anyhow::Result<Tournament> {
        self.modify(id, |tournament, _| {
            tournament.update_match_result(match_id, score1, score2)?;
            info!("{id} update_match_result {match_id} {score1}-{score2}");
            Ok(())
        })
    }

    /// # Errors
    ///
    /// If the tournament doesn't exist or the match can't start.
    pub fn start_match(&mut self, id: Id, match_id: Id) -> anyhow::Result<Tournament> {
        self.modify(id, |tournament, _| {
            tournament.start_match(match_id)?;
            info!("{id} start_match {match_id}");
            Ok(())
        })
    }

    fn modify<F>(&mut self, id: Id, change: F) -> anyhow::Result<Tournament>
    where
        F: FnOnce(&mut Tournament, &mut dyn Seeding) -> Result<(), BracketError>,
    {
        let mut tournaments = self.store.load()?;
        let tournament = tournaments
            .iter_mut()
            .find(|tournament| tournament.id == id)
            .ok_or(BracketError::TournamentNotFound(id))?;

        change(tournament, self.seeding.as_mut())?;
        tournament.updated_at = Utc::now();
        let tournament = tournament.clone();

        self.store.save(&tournaments)?;
        Ok(tournament)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{seeding::Registration, status::MatchStatus, store::Memory};

    fn tournaments() -> Tournaments<Memory> {
        Tournaments::with_seeding(Memory::default(), Box::new(Registration))
    }

    fn with_players(
        tournaments: &mut Tournaments<Memory>,
        names: &[&str],
    ) -> anyhow::Result<Tournament> {
        let mut tournament = tournaments.create("Cup", "", Utc::now(), None)?;
        for name in names {
            tournament =
                tournaments.add_participant(tournament.id, Participant::new(name, None)?)?;
        }
        Ok(tournament)
    }

    fn error(result: anyhow::Result<Tournament>) -> Option<BracketError> {
        result.err()?.downcast::<BracketError>().ok()
    }

    #[test]
    fn create_list_delete() -> anyhow::Result<()> {
        let mut tournaments = tournaments();
        let cup = tournaments.create("Cup", "Spring", Utc::now(), None)?;
        tournaments.create("Shield", "", Utc::now(), None)?;

        assert_eq!(tournaments.list()?.len(), 2);
        assert_eq!(tournaments.get(cup.id)?.name, "Cup");

        assert!(tournaments.delete(cup.id)?);
        assert!(!tournaments.delete(cup.id)?);
        assert_eq!(tournaments.list()?.len(), 1);
        assert_eq!(
            tournaments
                .get(cup.id)
                .err()
                .and_then(|err| err.downcast::<BracketError>().ok()),
            Some(BracketError::TournamentNotFound(cup.id))
        );
        Ok(())
    }

    #[test]
    fn update_changes_details() -> anyhow::Result<()> {
        let mut tournaments = tournaments();
        let cup = tournaments.create("Cup", "Spring", Utc::now(), None)?;

        let updated = tournaments.update(cup.id, Some("Trophy"), None, None, None)?;
        assert_eq!(updated.name, "Trophy");
        assert_eq!(updated.description, "Spring");
        assert_eq!(tournaments.get(cup.id)?, updated);
        Ok(())
    }

    #[test]
    fn unknown_tournaments() {
        let mut tournaments = tournaments();
        let id = Uuid::new_v4();

        assert_eq!(
            error(tournaments.generate_bracket(id)),
            Some(BracketError::TournamentNotFound(id))
        );
        assert_eq!(
            error(tournaments.start_match(id, Uuid::new_v4())),
            Some(BracketError::TournamentNotFound(id))
        );
    }

    #[test]
    fn adding_regenerates_the_bracket() -> anyhow::Result<()> {
        let mut tournaments = tournaments();
        let tournament = with_players(&mut tournaments, &["a", "b", "c", "d"])?;
        assert!(tournament.matches.is_empty());

        let tournament = tournaments.generate_bracket(tournament.id)?;
        assert_eq!(tournament.rounds, 2);

        let tournament =
            tournaments.add_participant(tournament.id, Participant::new("e", None)?)?;
        assert_eq!(tournament.rounds, 3);
        assert_eq!(tournament.matches.len(), 7);
        Ok(())
    }

    #[test]
    fn removing_clears_small_brackets() -> anyhow::Result<()> {
        let mut tournaments = tournaments();
        let tournament = with_players(&mut tournaments, &["a", "b", "c"])?;
        let tournament = tournaments.generate_bracket(tournament.id)?;
        assert_eq!(tournament.matches.len(), 3);

        let first = tournament.participants[0].id;
        let tournament = tournaments.remove_participant(tournament.id, first)?;
        assert_eq!(tournament.rounds, 1);
        assert_eq!(tournament.matches.len(), 1);

        let second = tournament.participants[0].id;
        let tournament = tournaments.remove_participant(tournament.id, second)?;
        assert_eq!(tournament.rounds, 0);
        assert!(tournament.matches.is_empty());
        Ok(())
    }

    #[test]
    fn failures_save_nothing() -> anyhow::Result<()> {
        let mut tournaments = tournaments();
        let tournament = with_players(&mut tournaments, &["a", "b"])?;
        let tournament = tournaments.generate_bracket(tournament.id)?;
        let final_match = tournament.matches[0].id;

        assert_eq!(
            error(tournaments.update_match_result(tournament.id, final_match, 1, 1)),
            Some(BracketError::TiedScore)
        );
        assert_eq!(
            error(tournaments.add_participant(tournament.id, Participant::new("A", None)?)),
            Some(BracketError::DuplicateParticipantName("A".to_string()))
        );
        assert_eq!(tournaments.get(tournament.id)?, tournament);
        Ok(())
    }

    #[test]
    fn results_are_saved() -> anyhow::Result<()> {
        let mut tournaments = tournaments();
        let tournament = with_players(&mut tournaments, &["a", "b"])?;
        let tournament = tournaments.generate_bracket(tournament.id)?;
        let final_match = tournament.matches[0].id;

        tournaments.start_match(tournament.id, final_match)?;
        tournaments.update_match_result(tournament.id, final_match, 0, 3)?;

        let saved = tournaments.get(tournament.id)?;
        assert_eq!(saved.matches[0].status, MatchStatus::Completed);
        assert_eq!(saved.winner().map(|winner| winner.name.as_str()), Some("b"));
        Ok(())
    }

    #[test]
    fn import_replaces() -> anyhow::Result<()> {
        let mut tournaments = tournaments();
        let mut tournament = tournaments.create("Cup", "", Utc::now(), None)?;

        tournament.name = "Renamed".to_string();
        tournaments.import(tournament.clone())?;
        tournaments.import(Tournament::new("Other", "", Utc::now(), None))?;

        let all = tournaments.list()?;
        assert_eq!(all.len(), 2);
        assert_eq!(tournaments.get(tournament.id)?.name, "Renamed");
        Ok(())
    }
}
