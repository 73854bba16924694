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
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Id, error::BracketError, status::MatchStatus};

/// A validated pair of scores.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// 0-0 clears the match. It is never a real result.
    Reset,
    Scored { score1: u32, score2: u32 },
}

impl Outcome {
    /// # Errors
    ///
    /// If a score is negative or the scores are equal and not 0-0.
    pub fn new(score1: i32, score2: i32) -> Result<Self, BracketError> {
        if score1 < 0 || score2 < 0 {
            return Err(BracketError::NegativeScore);
        }
        if score1 == 0 && score2 == 0 {
            return Ok(Self::Reset);
        }
        if score1 == score2 {
            return Err(BracketError::TiedScore);
        }

        Ok(Self::Scored {
            score1: score1.unsigned_abs(),
            score2: score2.unsigned_abs(),
        })
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", try_from = "MatchRecord")]
pub struct Match {
    pub id: Id,
    pub tournament_id: Id,
    /// Starts at 1. The final is round `rounds`.
    pub round: u32,
    /// Starts at 1 within the round. Match `m` feeds match `ceil(m / 2)` of the
    /// next round.
    pub match_number: u32,
    pub participant1_id: Option<Id>,
    pub participant2_id: Option<Id>,
    /// `None` for both scores is the "no result" state.
    pub score1: Option<u32>,
    pub score2: Option<u32>,
    pub winner_id: Option<Id>,
    pub loser_id: Option<Id>,
    pub status: MatchStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Match {
    #[must_use]
    pub fn new(tournament_id: Id, round: u32, match_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            participant1_id: None,
            participant2_id: None,
            score1: None,
            score2: None,
            winner_id: None,
            loser_id: None,
            status: MatchStatus::Pending,
            start_time: None,
            end_time: None,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.participant1_id.is_some() && self.participant2_id.is_some()
    }

    /// A lone participant who advanced without playing.
    #[must_use]
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Completed
            && self.winner_id.is_some()
            && (self.participant1_id.is_none() != self.participant2_id.is_none())
    }

    /// Validates a result against this match without changing it.
    ///
    /// # Errors
    ///
    /// If the scores are invalid or the match is missing a participant.
    pub fn check_result(&self, score1: i32, score2: i32) -> Result<Outcome, BracketError> {
        let outcome = Outcome::new(score1, score2)?;
        if !self.is_ready() {
            return Err(BracketError::MatchNotReady(self.id));
        }

        Ok(outcome)
    }

    /// Records a result on this match alone, nothing is advanced.
    ///
    /// # Errors
    ///
    /// If [`Match::check_result`] fails, in which case the match is untouched.
    pub fn update_result(
        &mut self,
        score1: i32,
        score2: i32,
        now: DateTime<Utc>,
    ) -> Result<Outcome, BracketError> {
        let outcome = self.check_result(score1, score2)?;
        self.apply(outcome, now);
        Ok(outcome)
    }

    /// Sets the scores, winner, loser and status together.
    pub fn apply(&mut self, outcome: Outcome, now: DateTime<Utc>) {
        match outcome {
            Outcome::Reset => self.reset(),
            Outcome::Scored { score1, score2 } => {
                let (winner, loser) = if score1 > score2 {
                    (self.participant1_id, self.participant2_id)
                } else {
                    (self.participant2_id, self.participant1_id)
                };

                self.score1 = Some(score1);
                self.score2 = Some(score2);
                self.winner_id = winner;
                self.loser_id = loser;
                self.status = MatchStatus::Completed;
                self.end_time = Some(now);
            }
        }
    }

    pub fn complete_bye(&mut self, now: DateTime<Utc>) {
        self.score1 = None;
        self.score2 = None;
        self.winner_id = self.participant1_id.or(self.participant2_id);
        self.loser_id = None;
        self.status = MatchStatus::Completed;
        self.end_time = Some(now);
    }

    pub fn reset(&mut self) {
        self.score1 = None;
        self.score2 = None;
        self.winner_id = None;
        self.loser_id = None;
        self.status = MatchStatus::Pending;
        self.start_time = None;
        self.end_time = None;
    }

    /// # Errors
    ///
    /// If the match isn't pending or is missing a participant.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), BracketError> {
        if self.status != MatchStatus::Pending {
            return Err(BracketError::MatchAlreadyStarted(self.id));
        }
        if !self.is_ready() {
            return Err(BracketError::MatchNotReady(self.id));
        }

        self.status = MatchStatus::InProgress;
        self.start_time = Some(now);
        Ok(())
    }

    /// Empties whichever slot holds `id`.
    pub fn remove_participant(&mut self, id: Id) -> bool {
        if self.participant1_id == Some(id) {
            self.participant1_id = None;
            true
        } else if self.participant2_id == Some(id) {
            self.participant2_id = None;
            true
        } else {
            false
        }
    }
}

/// The stored shape of a match, checked before it becomes a [`Match`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct MatchRecord {
    id: Id,
    tournament_id: Id,
    round: u32,
    match_number: u32,
    participant1_id: Option<Id>,
    participant2_id: Option<Id>,
    score1: Option<u32>,
    score2: Option<u32>,
    winner_id: Option<Id>,
    loser_id: Option<Id>,
    status: MatchStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    // Written by older versions with a double elimination mode.
    #[serde(default)]
    is_losers_bracket: bool,
    #[serde(default)]
    is_championship: bool,
}

impl TryFrom<MatchRecord> for Match {
    type Error = BracketError;

    fn try_from(record: MatchRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| {
            Err(BracketError::Deserialization(format!(
                "match {}: {reason}",
                record.id
            )))
        };

        if record.is_losers_bracket || record.is_championship {
            return invalid("double elimination matches aren't supported");
        }
        if record.round == 0 || record.match_number == 0 {
            return invalid("round and match number start at 1");
        }

        let (score1, score2) = match (record.score1, record.score2) {
            (None, None) | (Some(0), Some(0)) => (None, None),
            (Some(score1), Some(score2)) if score1 != score2 => (Some(score1), Some(score2)),
            _ => return invalid("the scores must both be missing, 0-0 or unequal"),
        };

        let slots = [record.participant1_id, record.participant2_id];
        if record.participant1_id.is_some() && record.participant1_id == record.participant2_id {
            return invalid("a participant can't play themselves");
        }
        if let Some(winner) = record.winner_id
            && !slots.contains(&Some(winner))
        {
            return invalid("the winner isn't in the match");
        }
        if let Some(loser) = record.loser_id
            && (!slots.contains(&Some(loser)) || record.winner_id == Some(loser))
        {
            return invalid("the loser isn't the other participant");
        }

        let completed = record.status == MatchStatus::Completed;
        if completed != record.winner_id.is_some() {
            return invalid("a match is completed exactly when it has a winner");
        }

        let ready = record.participant1_id.is_some() && record.participant2_id.is_some();
        if let (Some(score1), Some(score2)) = (score1, score2) {
            let expected = if score1 > score2 { slots[0] } else { slots[1] };
            if !ready || record.winner_id != expected {
                return invalid("the winner doesn't match the scores");
            }
        } else if completed && ready {
            return invalid("a completed match with two participants needs scores");
        }

        Ok(Self {
            id: record.id,
            tournament_id: record.tournament_id,
            round: record.round,
            match_number: record.match_number,
            participant1_id: record.participant1_id,
            participant2_id: record.participant2_id,
            score1,
            score2,
            winner_id: record.winner_id,
            loser_id: record.loser_id,
            status: record.status,
            start_time: record.start_time,
            end_time: record.end_time,
        })
    }
}
