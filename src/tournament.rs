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

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Id,
    bracket::{self, matches_in_round, rounds_for},
    error::BracketError,
    matches::Match,
    participant::Participant,
    propagate,
    seeding::Seeding,
    status::MatchStatus,
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentKind {
    #[default]
    SingleElimination,
}

impl fmt::Display for TournamentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleElimination => write!(f, "single-elimination"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", try_from = "TournamentRecord")]
pub struct Tournament {
    pub id: Id,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TournamentKind,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub participants: Vec<Participant>,
    /// Sorted by round, then match number.
    pub matches: Vec<Match>,
    /// `ceil(log2(participants))` when the bracket was generated.
    pub rounds: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    #[must_use]
    pub fn new(
        name: &str,
        description: &str,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            kind: TournamentKind::SingleElimination,
            start_date,
            end_date,
            participants: Vec::new(),
            matches: Vec::new(),
            rounds: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// # Errors
    ///
    /// If someone already has the name, ignoring case.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), BracketError> {
        if self
            .participants
            .iter()
            .any(|existing| existing.same_name(&participant.name))
        {
            return Err(BracketError::DuplicateParticipantName(participant.name));
        }

        self.participants.push(participant);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Leaves the matches alone, regenerate the bracket afterwards if needed.
    ///
    /// # Errors
    ///
    /// If the participant isn't in the tournament.
    pub fn remove_participant(&mut self, id: Id) -> Result<Participant, BracketError> {
        let index = self
            .participants
            .iter()
            .position(|participant| participant.id == id)
            .ok_or(BracketError::ParticipantNotFound(id))?;

        let participant = self.participants.remove(index);
        self.updated_at = Utc::now();
        Ok(participant)
    }

    /// Throws away any existing matches and builds a new bracket.
    ///
    /// # Errors
    ///
    /// If there are fewer than 2 participants, the old bracket is kept.
    pub fn generate_bracket(&mut self, seeding: &mut dyn Seeding) -> Result<(), BracketError> {
        let bracket = bracket::generate(self.id, &self.participants, seeding)?;

        self.rounds = bracket.rounds;
        self.matches = bracket.matches;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn clear_bracket(&mut self) {
        self.rounds = 0;
        self.matches.clear();
        self.updated_at = Utc::now();
    }

    /// # Errors
    ///
    /// See [`propagate::apply_result`].
    pub fn update_match_result(
        &mut self,
        match_id: Id,
        score1: i32,
        score2: i32,
    ) -> Result<(), BracketError> {
        propagate::apply_result(self, match_id, score1, score2)
    }

    /// # Errors
    ///
    /// If the match doesn't exist, isn't pending or is missing a participant.
    pub fn start_match(&mut self, match_id: Id) -> Result<(), BracketError> {
        let now = Utc::now();
        self.matches
            .iter_mut()
            .find(|game| game.id == match_id)
            .ok_or(BracketError::MatchNotFound(match_id))?
            .start(now)?;

        self.updated_at = now;
        Ok(())
    }

    #[must_use]
    pub fn find_match(&self, id: Id) -> Option<&Match> {
        self.matches.iter().find(|game| game.id == id)
    }

    #[must_use]
    pub fn participant(&self, id: Id) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.id == id)
    }

    #[must_use]
    pub fn matches_by_round(&self, round: u32) -> Vec<&Match> {
        let mut matches: Vec<&Match> = self
            .matches
            .iter()
            .filter(|game| game.round == round)
            .collect();

        matches.sort_unstable_by_key(|game| game.match_number);
        matches
    }

    /// Whoever won the final, once it's been played.
    #[must_use]
    pub fn winner(&self) -> Option<&Participant> {
        if self.rounds == 0 {
            return None;
        }

        let final_match = self
            .matches
            .iter()
            .find(|game| game.round == self.rounds && game.status == MatchStatus::Completed)?;

        self.participant(final_match.winner_id?)
    }
}

/// The stored shape of a tournament, checked before it becomes a [`Tournament`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct TournamentRecord {
    id: Id,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    kind: TournamentKind,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    participants: Vec<Participant>,
    matches: Vec<Match>,
    rounds: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TournamentRecord> for Tournament {
    type Error = BracketError;

    fn try_from(mut record: TournamentRecord) -> Result<Self, Self::Error> {
        if let Some(reason) = check_record(&record) {
            return Err(BracketError::Deserialization(format!(
                "tournament {}: {reason}",
                record.id
            )));
        }

        record
            .matches
            .sort_unstable_by_key(|game| (game.round, game.match_number));

        Ok(Self {
            id: record.id,
            name: record.name,
            description: record.description,
            kind: record.kind,
            start_date: record.start_date,
            end_date: record.end_date,
            participants: record.participants,
            matches: record.matches,
            rounds: record.rounds,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn check_record(record: &TournamentRecord) -> Option<String> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for participant in &record.participants {
        if !ids.insert(participant.id) {
            return Some(format!("participant {} appears twice", participant.id));
        }
        if !names.insert(participant.name.to_lowercase()) {
            return Some(format!("the name '{}' is taken twice", participant.name));
        }
    }

    for game in &record.matches {
        if game.tournament_id != record.id {
            return Some(format!("match {} belongs to another tournament", game.id));
        }

        let references = [
            game.participant1_id,
            game.participant2_id,
            game.winner_id,
            game.loser_id,
        ];
        if let Some(unknown) = references.into_iter().flatten().find(|id| !ids.contains(id)) {
            return Some(format!("match {} refers to unknown participant {unknown}", game.id));
        }
    }

    if record.matches.is_empty() {
        return None;
    }

    check_shape(record.rounds, &record.matches)
}

/// Round `r` holds matches `1..=2^(rounds - r)` and everyone plays at most
/// once a round.
fn check_shape(rounds: u32, matches: &[Match]) -> Option<String> {
    if rounds == 0 {
        return Some("there are matches but no rounds".to_string());
    }
    if rounds != rounds_for(matches.len() + 1) {
        return Some(format!(
            "{} matches can't fill {rounds} rounds",
            matches.len()
        ));
    }

    let mut by_round: HashMap<u32, Vec<&Match>> = HashMap::new();
    for game in matches {
        if game.round > rounds {
            return Some(format!("match {} is past the final", game.id));
        }
        by_round.entry(game.round).or_default().push(game);
    }

    for round in 1..=rounds {
        let games = by_round.remove(&round).unwrap_or_default();

        let mut numbers: Vec<u32> = games.iter().map(|game| game.match_number).collect();
        numbers.sort_unstable();
        let expected: Vec<u32> = (1..=matches_in_round(rounds, round)).collect();
        if numbers != expected {
            return Some(format!("round {round} isn't numbered 1 to {}", expected.len()));
        }

        if round > 1
            && let Some(game) = games.iter().find(|game| game.is_bye())
        {
            return Some(format!("match {} is a bye after the first round", game.id));
        }

        let mut seen = HashSet::new();
        for id in games
            .iter()
            .flat_map(|game| [game.participant1_id, game.participant2_id])
            .flatten()
        {
            if !seen.insert(id) {
                return Some(format!("participant {id} plays twice in round {round}"));
            }
        }
    }

    None
}
