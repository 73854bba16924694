#[cfg(feature = "bench")]
use std::time::Duration;

#[cfg(feature = "bench")]
use chrono::Utc;
#[cfg(feature = "bench")]
use criterion::{Criterion, criterion_group, criterion_main};
#[cfg(feature = "bench")]
use rand::{SeedableRng, rngs::StdRng};

#[cfg(feature = "bench")]
use knockout::{participant::Participant, seeding::Shuffled, tournament::Tournament};

#[cfg(feature = "bench")]
fn tournament(count: usize) -> Tournament {
    let mut tournament = Tournament::new("Bench", "", Utc::now(), None);
    for i in 0..count {
        let participant = Participant::new(&format!("p{i}"), None).unwrap();
        tournament.add_participant(participant).unwrap();
    }
    tournament
}

#[cfg(feature = "bench")]
fn generate_bracket(c: &mut Criterion) {
    let mut tournament = tournament(1_000);
    let mut seeding = Shuffled(StdRng::seed_from_u64(0));

    c.bench_function("generate_bracket_1000", move |b| {
        b.iter(|| tournament.generate_bracket(&mut seeding).unwrap());
    });
}

#[cfg(feature = "bench")]
fn play_out(c: &mut Criterion) {
    let mut seeded = tournament(1_000);
    seeded
        .generate_bracket(&mut Shuffled(StdRng::seed_from_u64(0)))
        .unwrap();

    c.bench_function("play_out_1000", move |b| {
        b.iter(|| {
            let mut tournament = seeded.clone();
            for round in 1..=tournament.rounds {
                let ready: Vec<_> = tournament
                    .matches_by_round(round)
                    .into_iter()
                    .filter(|game| game.is_ready())
                    .map(|game| game.id)
                    .collect();

                for id in ready {
                    tournament.update_match_result(id, 2, 1).unwrap();
                }
            }
            // Flip a first round match so the change runs all the way to the final.
            let last = tournament.matches_by_round(1).last().unwrap().id;
            tournament.update_match_result(last, 0, 3).unwrap();
        });
    });
}

#[cfg(feature = "bench")]
criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = generate_bracket, play_out
}

#[cfg(feature = "bench")]
criterion_main!(benches);

#[cfg(not(feature = "bench"))]
fn main() {
    eprintln!("You must pass `--features=bench`");
}
