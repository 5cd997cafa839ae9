//! Stimulus pool - built-in stimuli and per-session selection
//!
//! A session snapshots its pool when it is created. Selection applies the
//! settings' [`StimulusFilter`], drops stimuli that repeat a kind and value, and for
//! [`StimulusFilter::Random`] picks one kind that can actually run a game.

use crate::rng::RandomSource;
use crate::types::{Stimulus, StimulusFilter, StimulusKind};

/// Minimum number of distinct stimuli a session needs
pub const MIN_DISTINCT_STIMULI: usize = 2;

const LETTERS: [&str; 8] = ["C", "H", "K", "L", "Q", "R", "S", "T"];
const NUMBERS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];
const COLORS: [(&str, &str); 6] = [
    ("#e53935", "Red"),
    ("#1e88e5", "Blue"),
    ("#43a047", "Green"),
    ("#fdd835", "Yellow"),
    ("#8e24aa", "Purple"),
    ("#fb8c00", "Orange"),
];
const SHAPES: [(&str, &str); 6] = [
    ("●", "Circle"),
    ("■", "Square"),
    ("▲", "Triangle"),
    ("◆", "Diamond"),
    ("★", "Star"),
    ("✚", "Cross"),
];
const EMOJI: [&str; 6] = ["🐶", "🐱", "🦊", "🐸", "🐼", "🐵"];
const WORDS: [&str; 6] = ["apple", "river", "stone", "cloud", "tiger", "piano"];

/// The stimuli shipped with the trainer, ids assigned in declaration order.
pub fn default_pool() -> Vec<Stimulus> {
    let plain = LETTERS
        .iter()
        .map(|v| (StimulusKind::Letter, *v, None))
        .chain(NUMBERS.iter().map(|v| (StimulusKind::Number, *v, None)))
        .chain(COLORS.iter().map(|(v, n)| (StimulusKind::Color, *v, Some(*n))))
        .chain(SHAPES.iter().map(|(v, n)| (StimulusKind::Shape, *v, Some(*n))))
        .chain(EMOJI.iter().map(|v| (StimulusKind::Emoji, *v, None)))
        .chain(WORDS.iter().map(|v| (StimulusKind::Word, *v, None)));

    plain
        .enumerate()
        .map(|(i, (kind, value, name))| {
            let stimulus = Stimulus::new(i as u32 + 1, kind, value);
            match name {
                Some(name) => stimulus.with_name(name),
                None => stimulus,
            }
        })
        .collect()
}

/// Number of stimuli in `pool` that can be told apart by kind and value
pub fn distinct_count(pool: &[Stimulus]) -> usize {
    dedup_stimuli(pool).len()
}

/// Keep the first of each kind/value pair, preserving order
pub fn dedup_stimuli(pool: &[Stimulus]) -> Vec<Stimulus> {
    let mut out: Vec<Stimulus> = Vec::with_capacity(pool.len());
    for stimulus in pool {
        if !out.iter().any(|kept| kept.same_as(stimulus)) {
            out.push(stimulus.clone());
        }
    }
    out
}

/// Kinds that have enough distinct stimuli to run a game on their own
pub fn playable_kinds(pool: &[Stimulus]) -> Vec<StimulusKind> {
    let unique = dedup_stimuli(pool);
    StimulusKind::ALL
        .into_iter()
        .filter(|kind| unique.iter().filter(|s| s.kind == *kind).count() >= MIN_DISTINCT_STIMULI)
        .collect()
}

/// Apply `filter` to `pool`.
///
/// The result may hold fewer than [`MIN_DISTINCT_STIMULI`] entries; session
/// construction is where that is rejected.
pub fn select<R: RandomSource>(
    pool: &[Stimulus],
    filter: StimulusFilter,
    rng: &mut R,
) -> Vec<Stimulus> {
    let unique = dedup_stimuli(pool);
    match filter {
        StimulusFilter::Any => unique,
        StimulusFilter::Only(kind) => unique.into_iter().filter(|s| s.kind == kind).collect(),
        StimulusFilter::Random => {
            let kinds = playable_kinds(&unique);
            if kinds.is_empty() {
                return unique;
            }
            let kind = kinds[rng.next_index(kinds.len())];
            tracing::debug!(kind = kind.as_str(), "picked random stimulus kind");
            unique.into_iter().filter(|s| s.kind == kind).collect()
        }
    }
}
