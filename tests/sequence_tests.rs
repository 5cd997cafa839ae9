//! Sequence generator properties over many seeds

use nback::core::pool::{default_pool, select};
use nback::core::sequence::{generate, longest_run, match_target, Slot};
use nback::core::SimpleRng;
use nback::types::{
    GameSettings, Stimulus, StimulusFilter, StimulusKind, MAX_BALANCE_PASSES, MAX_PLAN_STREAK,
};

fn settings(n_level: u32, game_length: usize, stimulus: StimulusFilter) -> GameSettings {
    GameSettings {
        n_level,
        stimulus,
        game_length,
        ..GameSettings::default()
    }
}

#[test]
fn test_length_and_plan_consistency() {
    let pool = default_pool();
    for seed in 1..200u32 {
        let n = seed % 4 + 1;
        let length = n as usize + 5 + (seed as usize % 30);
        let s = settings(n, length, StimulusFilter::Any);
        let mut rng = SimpleRng::new(seed);
        let seq = generate(&s, &pool, &mut rng);

        assert_eq!(seq.len(), length, "seed {seed}");
        let n = n as usize;
        for i in 0..length {
            match seq.slot(i) {
                Some(Slot::Lead) => assert!(i < n),
                Some(Slot::Match) => assert!(seq.items()[i].same_as(&seq.items()[i - n])),
                Some(Slot::NonMatch) => assert!(!seq.items()[i].same_as(&seq.items()[i - n])),
                None => panic!("missing slot {i}"),
            }
        }
        assert_eq!(seq.match_count(), match_target(length - n), "seed {seed}");
    }
}

#[test]
fn test_runs_stay_short_unless_unsettled() {
    let pool = default_pool();
    for seed in 1..200u32 {
        let s = settings(2, 40, StimulusFilter::Only(StimulusKind::Number));
        let mut rng = SimpleRng::new(seed);
        let session_pool = select(&pool, s.stimulus, &mut rng);
        let seq = generate(&s, &session_pool, &mut rng);

        let run = longest_run(&seq.slots()[2..]);
        let balance = seq.balance();
        if balance.settled {
            assert!(run <= MAX_PLAN_STREAK, "seed {seed}: run {run}");
        } else {
            assert!(run > MAX_PLAN_STREAK, "seed {seed}: run {run}");
            assert!(
                balance.passes == MAX_BALANCE_PASSES || balance.swaps == 0,
                "seed {seed}: gave up early with {balance:?}"
            );
        }
    }
}

#[test]
fn test_duplicate_values_behave_as_one_stimulus() {
    let pool = vec![
        Stimulus::new(1, StimulusKind::Letter, "A"),
        Stimulus::new(2, StimulusKind::Letter, "A"),
        Stimulus::new(3, StimulusKind::Letter, "B"),
    ];
    let s = settings(2, 30, StimulusFilter::Any);
    for seed in 1..50u32 {
        let mut rng = SimpleRng::new(seed);
        let seq = generate(&s, &pool, &mut rng);
        for i in 2..seq.len() {
            let repeats = seq.items()[i].value == seq.items()[i - 2].value;
            assert_eq!(seq.is_match(i), repeats, "seed {seed} pos {i}");
            assert_eq!(seq.slot(i) == Some(Slot::Match), repeats, "seed {seed} pos {i}");
        }
    }

    let mut rng = SimpleRng::new(1);
    assert!(generate(&s, &pool[..2], &mut rng).is_empty());
}

#[test]
fn test_filtered_sequences_use_one_kind() {
    let pool = default_pool();
    for kind in [StimulusKind::Color, StimulusKind::Emoji, StimulusKind::Word] {
        let s = settings(2, 20, StimulusFilter::Only(kind));
        let mut rng = SimpleRng::new(4);
        let session_pool = select(&pool, s.stimulus, &mut rng);
        let seq = generate(&s, &session_pool, &mut rng);
        assert!(seq.items().iter().all(|item| item.kind == kind));
    }
}
