use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cardbox_core::model::Card;
use cardbox_core::random::rng_from_seed;
use cardbox_core::scheduler::{Answer, Scheduler};

fn make_card(wins: u32, losses: u32, repetitions: u32, interval: i64) -> Card {
    let mut card = Card::new("bench", "prompt", "answer");
    card.total_wins = wins;
    card.total_losses = losses;
    card.repetitions = repetitions;
    card.interval = interval;
    card.refresh_score();
    card
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_update");
    let scheduler = Scheduler::default();
    let now = Utc::now();

    group.bench_function("first_success", |b| {
        let card = make_card(0, 0, 0, 0);
        let mut rng = rng_from_seed(Some(1));
        b.iter(|| scheduler.update(black_box(&card), Answer::correct(), 20, now, &mut rng))
    });

    group.bench_function("grown", |b| {
        let card = make_card(6, 2, 4, 300);
        let mut rng = rng_from_seed(Some(2));
        b.iter(|| scheduler.update(black_box(&card), Answer::correct(), 20, now, &mut rng))
    });

    group.bench_function("weak_failure", |b| {
        let card = make_card(1, 8, 0, 0);
        let mut rng = rng_from_seed(Some(3));
        b.iter(|| scheduler.update(black_box(&card), Answer::incorrect(), 90, now, &mut rng))
    });

    group.finish();
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
