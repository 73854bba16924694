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

//! Moves winners forward through the bracket and takes them back out again
//! when the result that put them there changes.

use chrono::Utc;
use log::{debug, trace};

use crate::{
    Id, error::BracketError, matches::Match, status::MatchStatus, tournament::Tournament,
};

/// Which side of the next match a winner lands on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// Odd matches feed the first slot, even matches the second.
    #[must_use]
    pub fn fed_by(match_number: u32) -> Self {
        if match_number % 2 == 1 {
            Self::First
        } else {
            Self::Second
        }
    }
}

/// Records a result and carries the change through the rest of the bracket.
///
/// A winner who is replaced, or whose result is reset with 0-0, is taken out of
/// every later match they reached first. Any of those matches that had been
/// played are reset, and so are the matches their winners went on to, up to
/// the final. Only then is the new winner placed.
///
/// # Errors
///
/// If the match doesn't exist, the scores are invalid, the match is missing a
/// participant or the bracket is missing a match after this one. The tournament
/// is left untouched on error.
pub fn apply_result(
    tournament: &mut Tournament,
    match_id: Id,
    score1: i32,
    score2: i32,
) -> Result<(), BracketError> {
    let index = tournament
        .matches
        .iter()
        .position(|game| game.id == match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;

    let game = tournament
        .matches
        .get(index)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    let outcome = game.check_result(score1, score2)?;
    let chain = parent_chain(&tournament.matches, tournament.rounds, index)?;
    let previous = game.winner_id;

    let now = Utc::now();
    let matches = tournament.matches.as_mut_slice();
    let Some(game) = matches.get_mut(index) else {
        return Err(BracketError::MatchNotFound(match_id));
    };
    game.apply(outcome, now);
    let current = game.winner_id;

    debug!(
        "round {} match {}: {outcome:?}",
        game.round, game.match_number
    );

    if previous != current {
        if let Some(previous) = previous {
            unadvance(matches, &chain, 0, previous);
        }
        if let Some(current) = current {
            advance(matches, &chain, 0, current);
        }
    }

    tournament.updated_at = now;
    Ok(())
}

/// Places the winner of `matches[index]` in the next round.
///
/// # Errors
///
/// If a match after this one is missing.
pub(crate) fn advance_winner(
    matches: &mut [Match],
    rounds: u32,
    index: usize,
) -> Result<(), BracketError> {
    let chain = parent_chain(matches, rounds, index)?;
    if let Some(winner) = matches.get(index).and_then(|game| game.winner_id) {
        advance(matches, &chain, 0, winner);
    }

    Ok(())
}

/// The index of a match followed by the index of every match it feeds, ending
/// with the final.
///
/// # Errors
///
/// If any of those matches is missing.
pub fn parent_chain(
    matches: &[Match],
    rounds: u32,
    index: usize,
) -> Result<Vec<usize>, BracketError> {
    let Some(game) = matches.get(index) else {
        return Err(BracketError::BracketConsistencyFault {
            round: 0,
            match_number: 0,
        });
    };

    let mut chain = vec![index];
    let (mut round, mut match_number) = (game.round, game.match_number);

    while round < rounds {
        let next_number = match_number.div_ceil(2);
        let Some(next) = matches
            .iter()
            .position(|game| game.round == round + 1 && game.match_number == next_number)
        else {
            return Err(BracketError::BracketConsistencyFault {
                round,
                match_number,
            });
        };

        chain.push(next);
        round += 1;
        match_number = next_number;
    }

    Ok(chain)
}

/// Puts `winner` into the match after `chain[level]`.
fn advance(matches: &mut [Match], chain: &[usize], level: usize, winner: Id) {
    let (Some(&source), Some(&target)) = (chain.get(level), chain.get(level + 1)) else {
        return;
    };
    let Some((round, match_number)) = matches
        .get(source)
        .map(|game| (game.round, game.match_number))
    else {
        return;
    };

    let slot = Slot::fed_by(match_number);
    let occupant = matches.get(target).and_then(|game| match slot {
        Slot::First => game.participant1_id,
        Slot::Second => game.participant2_id,
    });
    let displace = occupant.is_some_and(|occupant| {
        slot == Slot::First && occupant != winner && won_by_bye(matches, round, occupant)
    });

    let Some(next) = matches.get_mut(target) else {
        return;
    };
    if place(next, slot, winner, displace) {
        trace!(
            "placed {winner} in round {} match {}",
            next.round, next.match_number
        );
        invalidate(matches, chain, level + 1);
    }
}

/// Takes `participant` back out of the match after `chain[level]`.
fn unadvance(matches: &mut [Match], chain: &[usize], level: usize, participant: Id) {
    let Some(&target) = chain.get(level + 1) else {
        return;
    };
    let Some(next) = matches.get_mut(target) else {
        return;
    };

    if next.remove_participant(participant) {
        trace!(
            "removed {participant} from round {} match {}",
            next.round, next.match_number
        );
        invalidate(matches, chain, level + 1);
    }
}

/// The participants of `chain[level]` changed, so its result no longer holds.
fn invalidate(matches: &mut [Match], chain: &[usize], level: usize) {
    let Some(&index) = chain.get(level) else {
        return;
    };
    let Some(game) = matches.get_mut(index) else {
        return;
    };

    match game.status {
        MatchStatus::Completed => {
            let stale = game.winner_id;
            debug!(
                "resetting round {} match {}",
                game.round, game.match_number
            );
            game.reset();

            if let Some(stale) = stale {
                unadvance(matches, chain, level, stale);
            }
        }
        MatchStatus::InProgress => {
            game.status = MatchStatus::Pending;
            game.start_time = None;
        }
        MatchStatus::Pending => {}
    }
}

/// Returns whether the match changed.
///
/// A bye winner sitting in the first slot moves over to the second slot when
/// the winner of the odd match arrives, as long as the second slot is free.
fn place(next: &mut Match, slot: Slot, winner: Id, displace: bool) -> bool {
    match slot {
        Slot::First => {
            if next.participant1_id == Some(winner) {
                return false;
            }
            if displace && next.participant2_id.is_none() {
                next.participant2_id = next.participant1_id;
            }
            next.participant1_id = Some(winner);
        }
        Slot::Second => {
            if next.participant2_id == Some(winner) {
                return false;
            }
            next.participant2_id = Some(winner);
        }
    }

    true
}

fn won_by_bye(matches: &[Match], round: u32, participant: Id) -> bool {
    matches
        .iter()
        .any(|game| game.round == round && game.is_bye() && game.winner_id == Some(participant))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{participant::Participant, seeding::Registration};

    fn tournament(count: usize) -> anyhow::Result<Tournament> {
        let mut tournament = Tournament::new("Test", "", Utc::now(), None);
        for i in 1..=count {
            tournament.add_participant(Participant::new(&format!("Player {i}"), None)?)?;
        }
        tournament.generate_bracket(&mut Registration)?;
        Ok(tournament)
    }

    fn find(tournament: &Tournament, round: u32, match_number: u32) -> anyhow::Result<Match> {
        tournament
            .matches
            .iter()
            .find(|game| game.round == round && game.match_number == match_number)
            .cloned()
            .ok_or_else(|| anyhow::Error::msg(format!("no match {round}.{match_number}")))
    }

    #[test]
    fn slots_follow_parity() {
        assert_eq!(Slot::fed_by(1), Slot::First);
        assert_eq!(Slot::fed_by(2), Slot::Second);
        assert_eq!(Slot::fed_by(7), Slot::First);
        assert_eq!(Slot::fed_by(8), Slot::Second);
    }

    #[test]
    fn chains_run_to_the_final() -> anyhow::Result<()> {
        let tournament = tournament(8)?;
        let chain = parent_chain(&tournament.matches, tournament.rounds, 3)?;
        let path: Vec<(u32, u32)> = chain
            .iter()
            .filter_map(|&index| tournament.matches.get(index))
            .map(|game| (game.round, game.match_number))
            .collect();

        assert_eq!(path, vec![(1, 4), (2, 2), (3, 1)]);
        Ok(())
    }

    #[test]
    fn a_missing_match_is_a_fault_and_nothing_changes() -> anyhow::Result<()> {
        let mut tournament = tournament(4)?;
        let first = find(&tournament, 1, 1)?;
        tournament
            .matches
            .retain(|game| !(game.round == 2 && game.match_number == 1));
        let before = tournament.clone();

        assert_eq!(
            apply_result(&mut tournament, first.id, 2, 1),
            Err(BracketError::BracketConsistencyFault {
                round: 1,
                match_number: 1
            })
        );
        assert_eq!(tournament, before);
        Ok(())
    }

    #[test]
    fn unknown_matches() -> anyhow::Result<()> {
        let mut tournament = tournament(4)?;
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            apply_result(&mut tournament, id, 2, 1),
            Err(BracketError::MatchNotFound(id))
        );
        Ok(())
    }

    #[test]
    fn bye_winners_make_way_for_the_odd_match() -> anyhow::Result<()> {
        // An older layout put the bye from match 2 in the first slot.
        let mut tournament = tournament(4)?;
        let (one, two) = (find(&tournament, 1, 1)?, find(&tournament, 1, 2)?);
        let lone = two.participant1_id;

        for game in &mut tournament.matches {
            if game.id == two.id {
                game.participant2_id = None;
                game.complete_bye(Utc::now());
            } else if game.round == 2 {
                game.participant1_id = lone;
            }
        }

        apply_result(&mut tournament, one.id, 3, 0)?;

        let next = find(&tournament, 2, 1)?;
        assert_eq!(next.participant1_id, one.participant1_id);
        assert_eq!(next.participant2_id, lone);
        Ok(())
    }

    #[test]
    fn in_progress_matches_go_back_to_pending() -> anyhow::Result<()> {
        let mut tournament = tournament(4)?;
        let (one, two) = (find(&tournament, 1, 1)?, find(&tournament, 1, 2)?);
        apply_result(&mut tournament, one.id, 2, 1)?;
        apply_result(&mut tournament, two.id, 2, 1)?;
        let final_match = find(&tournament, 2, 1)?;
        tournament.start_match(final_match.id)?;

        apply_result(&mut tournament, one.id, 0, 0)?;

        let final_match = find(&tournament, 2, 1)?;
        assert_eq!(final_match.status, MatchStatus::Pending);
        assert_eq!(final_match.start_time, None);
        assert_eq!(final_match.participant1_id, None);
        assert_eq!(final_match.participant2_id, two.participant1_id);
        Ok(())
    }

    #[test]
    fn same_winner_new_score_changes_nothing_downstream() -> anyhow::Result<()> {
        let mut tournament = tournament(4)?;
        let (one, two) = (find(&tournament, 1, 1)?, find(&tournament, 1, 2)?);
        apply_result(&mut tournament, one.id, 2, 1)?;
        apply_result(&mut tournament, two.id, 2, 1)?;
        let final_match = find(&tournament, 2, 1)?;
        apply_result(&mut tournament, final_match.id, 5, 3)?;

        apply_result(&mut tournament, one.id, 7, 0)?;

        let after = find(&tournament, 2, 1)?;
        assert_eq!(after.status, MatchStatus::Completed);
        assert_eq!(after.score1, Some(5));
        assert_eq!(after.winner_id, one.participant1_id);
        assert_eq!(find(&tournament, 1, 1)?.score1, Some(7));
        Ok(())
    }
}
