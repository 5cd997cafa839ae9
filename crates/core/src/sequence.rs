//! Sequence module - n-back stimulus sequence generation
//!
//! A sequence is built in three steps:
//!
//! 1. **Lead-in**: the first `n` positions are drawn without repeats, so nothing in
//!    the lead-in can accidentally line up as a match.
//! 2. **Plan**: every later position is assigned match / non-match up front. About a
//!    third are matches (at least one), the assignment is shuffled, then balanced so
//!    no run of more than [`MAX_PLAN_STREAK`] identical assignments survives.
//! 3. **Fill**: match positions copy the stimulus `n` back; non-match positions draw
//!    anything else (and, at `n == 1`, anything but the previous stimulus).
//!
//! Balancing is best effort. It stops after [`MAX_BALANCE_PASSES`] passes and
//! reports whether the plan ended up settled.

use crate::pool::{dedup_stimuli, MIN_DISTINCT_STIMULI};
use crate::rng::RandomSource;
use crate::types::{
    GameSettings, Stimulus, MATCH_RATIO_DIVISOR, MAX_BALANCE_PASSES, MAX_PLAN_STREAK,
};

/// Role of a position within the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// One of the first `n` positions; nothing to compare against yet
    Lead,
    /// Same stimulus as `n` positions back
    Match,
    /// Different stimulus from `n` positions back
    NonMatch,
}

/// Result of a balancing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceOutcome {
    pub passes: usize,
    pub swaps: usize,
    /// No run longer than `MAX_PLAN_STREAK` remains
    pub settled: bool,
}

/// A generated session sequence. Immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    n: usize,
    items: Vec<Stimulus>,
    slots: Vec<Slot>,
    balance: BalanceOutcome,
}

impl Sequence {
    fn empty(n: usize) -> Self {
        Self {
            n,
            ..Self::default()
        }
    }

    /// Rebuild a sequence from stored stimuli, e.g. to replay a past session.
    ///
    /// Slots are derived from the stimuli themselves.
    pub fn from_items(n: usize, items: Vec<Stimulus>) -> Self {
        let slots: Vec<Slot> = (0..items.len())
            .map(|i| {
                if i < n {
                    Slot::Lead
                } else if items[i].same_as(&items[i - n]) {
                    Slot::Match
                } else {
                    Slot::NonMatch
                }
            })
            .collect();
        let settled = slots.len() <= n || longest_run(&slots[n..]) <= MAX_PLAN_STREAK;

        Self {
            n,
            items,
            slots,
            balance: BalanceOutcome {
                passes: 0,
                swaps: 0,
                settled,
            },
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Stimulus> {
        self.items.get(index)
    }

    /// Stimulus shown on a 1-based turn number
    pub fn for_turn(&self, turn: usize) -> Option<&Stimulus> {
        turn.checked_sub(1).and_then(|index| self.items.get(index))
    }

    pub fn items(&self) -> &[Stimulus] {
        &self.items
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    pub fn balance(&self) -> BalanceOutcome {
        self.balance
    }

    /// Ground truth: does position `index` repeat the stimulus `n` back?
    pub fn is_match(&self, index: usize) -> bool {
        if index < self.n {
            return false;
        }
        match (self.items.get(index), self.items.get(index - self.n)) {
            (Some(current), Some(target)) => current.same_as(target),
            _ => false,
        }
    }

    pub fn match_count(&self) -> usize {
        (self.n..self.len()).filter(|&i| self.is_match(i)).count()
    }
}

/// Number of matches to plan for `remaining` scorable positions.
///
/// One in [`MATCH_RATIO_DIVISOR`], rounded to nearest, never zero when there is
/// anything to plan.
pub fn match_target(remaining: usize) -> usize {
    if remaining == 0 {
        return 0;
    }
    let rounded = (remaining + MATCH_RATIO_DIVISOR / 2) / MATCH_RATIO_DIVISOR;
    rounded.clamp(1, remaining)
}

/// Length of the longest run of identical slots
pub fn longest_run(plan: &[Slot]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut prev: Option<Slot> = None;
    for &slot in plan {
        if prev == Some(slot) {
            current += 1;
        } else {
            current = 1;
            prev = Some(slot);
        }
        longest = longest.max(current);
    }
    longest
}

/// Break up runs longer than [`MAX_PLAN_STREAK`].
///
/// Each pass slides a window of `MAX_PLAN_STREAK + 1` slots over the plan. When
/// the whole window is identical, its last slot is swapped with the last differing
/// slot after it (scanning back from the end), or failing that with the nearest
/// differing slot before it. Stops after a pass with no swaps or after
/// [`MAX_BALANCE_PASSES`] passes.
pub fn balance_plan(plan: &mut [Slot]) -> BalanceOutcome {
    let window = MAX_PLAN_STREAK + 1;
    let len = plan.len();
    let mut outcome = BalanceOutcome::default();

    if len >= window {
        for _ in 0..MAX_BALANCE_PASSES {
            outcome.passes += 1;
            let mut swapped = false;

            for start in 0..=(len - window) {
                let end = start + window - 1;
                let value = plan[start];
                if !plan[start..=end].iter().all(|&s| s == value) {
                    continue;
                }

                let later = (end + 1..len).rev().find(|&j| plan[j] != value);
                let earlier = (0..start).rev().find(|&j| plan[j] != value);
                if let Some(j) = later.or(earlier) {
                    plan.swap(end, j);
                    outcome.swaps += 1;
                    swapped = true;
                }
            }

            if !swapped {
                break;
            }
        }
    }

    outcome.settled = longest_run(plan) <= MAX_PLAN_STREAK;
    outcome
}

/// Build the shuffled, balanced match plan for `remaining` positions.
pub fn plan_slots<R: RandomSource>(remaining: usize, rng: &mut R) -> (Vec<Slot>, BalanceOutcome) {
    let matches = match_target(remaining);
    let mut plan: Vec<Slot> = (0..remaining)
        .map(|i| if i < matches { Slot::Match } else { Slot::NonMatch })
        .collect();
    rng.shuffle(&mut plan);
    let outcome = balance_plan(&mut plan);
    (plan, outcome)
}

fn pick<'a, R: RandomSource>(
    eligible: &[&'a Stimulus],
    fallback: &'a [Stimulus],
    rng: &mut R,
) -> &'a Stimulus {
    if eligible.is_empty() {
        &fallback[rng.next_index(fallback.len())]
    } else {
        eligible[rng.next_index(eligible.len())]
    }
}

/// Generate the stimulus sequence for one session.
///
/// Returns an empty sequence when the pool has fewer than two distinct stimuli;
/// such a pool cannot run a game.
pub fn generate<R: RandomSource>(
    settings: &GameSettings,
    pool: &[Stimulus],
    rng: &mut R,
) -> Sequence {
    let n = settings.n();
    let len = settings.game_length;
    let unique = dedup_stimuli(pool);

    if unique.len() < MIN_DISTINCT_STIMULI || len == 0 || n == 0 {
        tracing::warn!(
            distinct = unique.len(),
            game_length = len,
            n_level = n,
            "cannot build a sequence"
        );
        return Sequence::empty(n);
    }

    let lead = n.min(len);
    let mut items: Vec<Stimulus> = Vec::with_capacity(len);
    let mut slots: Vec<Slot> = Vec::with_capacity(len);

    for _ in 0..lead {
        let eligible: Vec<&Stimulus> = unique
            .iter()
            .filter(|s| !items.iter().any(|chosen| chosen.same_as(s)))
            .collect();
        let chosen = pick(&eligible, &unique, rng).clone();
        items.push(chosen);
        slots.push(Slot::Lead);
    }

    let (plan, balance) = plan_slots(len - lead, rng);

    for (offset, slot) in plan.iter().enumerate() {
        let i = lead + offset;
        let target = &items[i - n];
        let chosen = match slot {
            Slot::Match => target.clone(),
            _ => {
                let previous = &items[i - 1];
                let eligible: Vec<&Stimulus> = unique
                    .iter()
                    .filter(|s| !s.same_as(target) && (n != 1 || !s.same_as(previous)))
                    .collect();
                pick(&eligible, &unique, rng).clone()
            }
        };
        items.push(chosen);
        slots.push(*slot);
    }

    tracing::debug!(
        length = items.len(),
        n_level = n,
        matches = plan.iter().filter(|s| **s == Slot::Match).count(),
        balance_passes = balance.passes,
        settled = balance.settled,
        "generated sequence"
    );

    Sequence {
        n,
        items,
        slots,
        balance,
    }
}
