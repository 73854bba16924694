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

use chrono::Utc;
use log::debug;

use crate::{
    Id, error::BracketError, matches::Match, participant::Participant, propagate,
    seeding::Seeding,
};

#[derive(Clone, Debug, Default)]
pub struct Bracket {
    pub rounds: u32,
    /// Sorted by round, then match number.
    pub matches: Vec<Match>,
}

/// `ceil(log2(participants))`, 0 for fewer than 2 participants.
#[must_use]
pub fn rounds_for(participants: usize) -> u32 {
    participants.next_power_of_two().trailing_zeros()
}

/// How many matches round `round` of a `rounds` round bracket has.
#[must_use]
pub fn matches_in_round(rounds: u32, round: u32) -> u32 {
    1 << rounds.saturating_sub(round)
}

/// Builds every match of a fresh bracket.
///
/// The seeding order fills `2^rounds` positions. Match `m` of the first round
/// pairs position `m - 1` with position `2^rounds - m`, so the positions past
/// the last participant are byes and they land on the first seeds. A lone
/// participant wins their match without a score and is advanced straight away.
///
/// # Errors
///
/// If there are fewer than 2 participants.
pub fn generate(
    tournament_id: Id,
    participants: &[Participant],
    seeding: &mut dyn Seeding,
) -> Result<Bracket, BracketError> {
    let count = participants.len();
    if count < 2 {
        return Err(BracketError::InsufficientParticipants(count));
    }

    let slots = count.next_power_of_two();
    let rounds = rounds_for(count);
    let now = Utc::now();

    let mut order: Vec<Id> = participants.iter().map(|participant| participant.id).collect();
    seeding.seed(&mut order);

    let mut matches = Vec::with_capacity(slots - 1);
    for (position, match_number) in (1..=matches_in_round(rounds, 1)).enumerate() {
        let mut game = Match::new(tournament_id, 1, match_number);
        game.participant1_id = order.get(position).copied();
        game.participant2_id = order.get(slots - 1 - position).copied();

        if !game.is_ready() {
            game.complete_bye(now);
        }
        matches.push(game);
    }

    for round in 2..=rounds {
        for match_number in 1..=matches_in_round(rounds, round) {
            matches.push(Match::new(tournament_id, round, match_number));
        }
    }

    matches.sort_unstable_by_key(|game| (game.round, game.match_number));

    let byes: Vec<usize> = matches
        .iter()
        .enumerate()
        .filter(|(_, game)| game.is_bye())
        .map(|(index, _)| index)
        .collect();

    for &index in &byes {
        propagate::advance_winner(&mut matches, rounds, index)?;
    }

    debug!(
        "generated {} matches over {rounds} rounds for {count} participants with {} byes",
        matches.len(),
        byes.len()
    );

    Ok(Bracket { rounds, matches })
}
