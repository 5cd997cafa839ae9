use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nback::core::pool::{default_pool, select};
use nback::core::sequence::{balance_plan, generate, Slot};
use nback::core::{GameState, SimpleRng};
use nback::engine::{apply_cascade, check_achievements, PlayerRewards, UnlockedAchievements};
use nback::types::{GameSettings, StimulusFilter, CORRECT_FEEDBACK_MS, TICK_MS};

fn settings() -> GameSettings {
    GameSettings {
        n_level: 3,
        stimulus: StimulusFilter::Any,
        game_length: 60,
        speed_ms: 1000,
        ..GameSettings::default()
    }
}

fn bench_generate(c: &mut Criterion) {
    let pool = default_pool();
    let settings = settings();
    let mut rng = SimpleRng::new(12345);

    c.bench_function("generate_60_turns", |b| {
        b.iter(|| generate(black_box(&settings), &pool, &mut rng))
    });
}

fn bench_balance(c: &mut Criterion) {
    c.bench_function("balance_worst_case_plan", |b| {
        b.iter(|| {
            let mut plan: Vec<Slot> = (0..60)
                .map(|i| if i < 20 { Slot::Match } else { Slot::NonMatch })
                .collect();
            balance_plan(black_box(&mut plan))
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut state = GameState::new(settings(), &default_pool(), 12345).unwrap();
    state.start();

    c.bench_function("session_tick_16ms", |b| {
        b.iter(|| {
            if state.game_over() {
                state.restart();
            }
            state.tick(black_box(TICK_MS));
        })
    });
}

fn bench_full_session(c: &mut Criterion) {
    let pool = default_pool();

    c.bench_function("full_session_perfect_play", |b| {
        b.iter(|| {
            let mut state = GameState::new(settings(), &pool, 7).unwrap();
            state.start();
            while !state.game_over() {
                if state.awaiting_response() {
                    let truth = state.sequence().is_match(state.position());
                    state.respond(truth);
                    state.tick(CORRECT_FEEDBACK_MS);
                } else {
                    state.tick(1000);
                }
            }
            state.stats()
        })
    });
}

fn bench_settlement(c: &mut Criterion) {
    let mut state = GameState::new(settings(), &default_pool(), 3).unwrap();
    state.start();
    state.tick(600_000);
    let stats = state.stats().unwrap();
    let unlocked = UnlockedAchievements::new();

    c.bench_function("cascade_and_achievements", |b| {
        b.iter(|| {
            let totals = apply_cascade(black_box(PlayerRewards::default()), 1234, 1);
            (totals, check_achievements(black_box(&stats), &unlocked))
        })
    });
}

fn bench_select(c: &mut Criterion) {
    let pool = default_pool();
    let mut rng = SimpleRng::new(1);

    c.bench_function("select_random_kind", |b| {
        b.iter(|| select(&pool, black_box(StimulusFilter::Random), &mut rng))
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_balance,
    bench_tick,
    bench_full_session,
    bench_settlement,
    bench_select
);
criterion_main!(benches);
