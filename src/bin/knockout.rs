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

use std::{fs, io::Write as _, path::PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use knockout::{
    COPYRIGHT, Id, LONG_VERSION, TOURNAMENTS_FILE,
    matches::Match,
    participant::Participant,
    round::RoundName,
    seeding::Shuffled,
    store::RonFile,
    tournament::Tournament,
    tournaments::Tournaments,
    utils,
};
use log::debug;
use rand::{SeedableRng, rngs::StdRng};

/// Knockout
///
/// Runs single elimination tournaments: seeds the bracket, gives byes to fill
/// it out and moves winners along as results come in.
#[derive(Parser, Debug)]
#[command(long_version = LONG_VERSION, about = "Single elimination tournament brackets")]
struct Args {
    /// Where to keep the tournaments [default: the data directory]
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Whether to log on the debug level
    #[arg(long)]
    debug: bool,

    /// Whether the application is being run by systemd
    #[arg(long)]
    systemd: bool,

    /// Build the manpage
    #[arg(long)]
    man: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a tournament
    New {
        name: String,

        #[arg(default_value = "", long)]
        description: String,

        /// YYYY-MM-DD or RFC 3339 [default: now]
        #[arg(long, value_parser = parse_date)]
        start: Option<DateTime<Utc>>,

        /// YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_date)]
        end: Option<DateTime<Utc>>,
    },

    /// List every tournament
    List,

    /// Show a tournament's bracket
    Show { tournament: Id },

    /// Delete a tournament
    Delete { tournament: Id },

    /// Add a participant, regenerating the bracket if there is one
    Add {
        tournament: Id,
        name: String,

        #[arg(long)]
        image: Option<String>,
    },

    /// Remove a participant, regenerating the bracket if there is one
    Remove { tournament: Id, participant: Id },

    /// Seed the participants into a new bracket
    Generate {
        tournament: Id,

        /// Seed the shuffle for a repeatable bracket
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Start a match
    Start {
        tournament: Id,

        #[arg(value_name = "MATCH")]
        match_id: Id,
    },

    /// Record a result, 0 0 resets the match
    Result {
        tournament: Id,

        #[arg(value_name = "MATCH")]
        match_id: Id,

        #[arg(allow_negative_numbers = true)]
        score1: i32,

        #[arg(allow_negative_numbers = true)]
        score2: i32,
    },

    /// Write a tournament as JSON
    Export {
        tournament: Id,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Read a tournament from a JSON file, replacing one with the same id
    Import { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    utils::init_logger(args.debug, args.systemd);

    if args.man {
        let mut buffer: Vec<u8> = Vec::default();
        let cmd = Args::command().name("knockout").long_version(None);
        let man = clap_mangen::Man::new(cmd).date("2026-10-18");

        man.render(&mut buffer)?;
        write!(buffer, "{COPYRIGHT}")?;

        fs::write("knockout.1", buffer)?;
        return Ok(());
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let folder = args.data_dir.unwrap_or_else(utils::data_folder);
    utils::create_data_folder(&folder)?;
    let path = folder.join(TOURNAMENTS_FILE);
    debug!("data file: {}", path.display());

    let mut tournaments = match command {
        Command::Generate {
            seed: Some(seed), ..
        } => Tournaments::with_seeding(
            RonFile::new(path),
            Box::new(Shuffled(StdRng::seed_from_u64(seed))),
        ),
        _ => Tournaments::new(RonFile::new(path)),
    };

    match command {
        Command::New {
            name,
            description,
            start,
            end,
        } => {
            let start = start.unwrap_or_else(Utc::now);
            let tournament = tournaments.create(&name, &description, start, end)?;
            println!("{}", tournament.id);
        }
        Command::List => {
            for tournament in tournaments.list()? {
                println!(
                    "{} {} ({} participants, {})",
                    tournament.id,
                    tournament.name,
                    tournament.participants.len(),
                    tournament.start_date.format("%Y-%m-%d"),
                );
            }
        }
        Command::Show { tournament } => show(&tournaments.get(tournament)?),
        Command::Delete { tournament } => {
            if !tournaments.delete(tournament)? {
                return Err(anyhow::Error::msg(format!(
                    "delete: tournament {tournament} doesn't exist"
                )));
            }
        }
        Command::Add {
            tournament,
            name,
            image,
        } => {
            let participant = Participant::new(&name, image)?;
            let id = participant.id;
            tournaments.add_participant(tournament, participant)?;
            println!("{id}");
        }
        Command::Remove {
            tournament,
            participant,
        } => {
            tournaments.remove_participant(tournament, participant)?;
        }
        Command::Generate { tournament, .. } => {
            show(&tournaments.generate_bracket(tournament)?);
        }
        Command::Start {
            tournament,
            match_id,
        } => {
            tournaments.start_match(tournament, match_id)?;
        }
        Command::Result {
            tournament,
            match_id,
            score1,
            score2,
        } => {
            show(&tournaments.update_match_result(tournament, match_id, score1, score2)?);
        }
        Command::Export { tournament, output } => {
            let json = serde_json::to_string_pretty(&tournaments.get(tournament)?)?;
            match output {
                Some(output) => fs::write(output, json)?,
                None => println!("{json}"),
            }
        }
        Command::Import { file } => {
            let json = fs::read_to_string(&file)?;
            let tournament: Tournament = serde_json::from_str(&json)
                .map_err(|err| anyhow::Error::msg(format!("JSON: {}: {err}", file.display())))?;
            let id = tournament.id;
            tournaments.import(tournament)?;
            println!("{id}");
        }
    }

    Ok(())
}

fn parse_date(date: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Ok(day.and_time(NaiveTime::MIN).and_utc());
    }

    Ok(DateTime::parse_from_rfc3339(date)?.with_timezone(&Utc))
}

fn show(tournament: &Tournament) {
    println!("{} ({}) {}", tournament.name, tournament.kind, tournament.id);
    if !tournament.description.is_empty() {
        println!("{}", tournament.description);
    }

    println!();
    for participant in &tournament.participants {
        println!("  {} {participant}", participant.id);
    }

    for round in 1..=tournament.rounds {
        println!();
        println!("{}", RoundName::new(round, tournament.rounds));
        for game in tournament.matches_by_round(round) {
            println!("  {}", describe(tournament, game));
        }
    }

    if let Some(winner) = tournament.winner() {
        println!();
        println!("Champion: {winner}");
    }
}

fn describe(tournament: &Tournament, game: &Match) -> String {
    let name = |slot: Option<Id>| {
        slot.and_then(|id| tournament.participant(id))
            .map_or_else(|| "-".to_string(), |participant| participant.name.clone())
    };

    let score = match (game.score1, game.score2) {
        (Some(score1), Some(score2)) => format!("{score1}-{score2}"),
        _ if game.is_bye() => "bye".to_string(),
        _ => "vs".to_string(),
    };

    format!(
        "{}. {} {score} {} [{}] {}",
        game.match_number,
        name(game.participant1_id),
        name(game.participant2_id),
        game.status,
        game.id,
    )
}
