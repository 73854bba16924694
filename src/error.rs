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

use thiserror::Error;

use crate::Id;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BracketError {
    #[error("bracket: the match after round {round} match {match_number} is missing")]
    BracketConsistencyFault { round: u32, match_number: u32 },
    #[error("decode: {0}")]
    Deserialization(String),
    #[error("participant: a participant named '{0}' already exists")]
    DuplicateParticipantName(String),
    #[error("participant: the name can't be empty")]
    EmptyParticipantName,
    #[error("bracket: at least 2 participants are needed, there are {0}")]
    InsufficientParticipants(usize),
    #[error("start: match {0} has already started")]
    MatchAlreadyStarted(Id),
    #[error("match: {0} not found")]
    MatchNotFound(Id),
    #[error("match: {0} needs two participants, a bye can't be played or reset")]
    MatchNotReady(Id),
    #[error("result: scores can't be negative")]
    NegativeScore,
    #[error("participant: {0} not found")]
    ParticipantNotFound(Id),
    #[error("result: scores can't be equal, except 0-0 to reset")]
    TiedScore,
    #[error("tournament: {0} not found")]
    TournamentNotFound(Id),
}
