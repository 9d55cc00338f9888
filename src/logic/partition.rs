//! Randomized court-partition search: split active players into groups of
//! four and each group into two partnerships, minimizing repeats.

use crate::logic::shared::SchedulingState;
use crate::models::PlayerId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Two partnerships facing each other.
pub type Pairing = ([PlayerId; 2], [PlayerId; 2]);

/// Weights for scoring a pairing against the history.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PairingWeights {
    pub partner: u32,
    pub opponent: u32,
    /// Square each opponent count so clusters of repeats cost more.
    pub squared_opponents: bool,
}

impl PairingWeights {
    /// `partner * 2 + opponent`.
    pub const STANDARD: PairingWeights = PairingWeights {
        partner: 2,
        opponent: 1,
        squared_opponents: false,
    };

    /// Only partner repeats count.
    pub const PARTNERS_ONLY: PairingWeights = PairingWeights {
        partner: 1,
        opponent: 0,
        squared_opponents: false,
    };

    /// `partner * 100 + sum(opponent^2)`.
    pub const CLUB: PairingWeights = PairingWeights {
        partner: 100,
        opponent: 1,
        squared_opponents: true,
    };
}

/// The three ways to split four players into two partnerships.
pub fn splits(group: [PlayerId; 4]) -> [Pairing; 3] {
    let [a, b, c, d] = group;
    [([a, b], [c, d]), ([a, c], [b, d]), ([a, d], [b, c])]
}

/// Cost of a pairing given the history.
pub fn pairing_cost(pairing: &Pairing, state: &SchedulingState, weights: PairingWeights) -> u32 {
    let (t1, t2) = pairing;
    let partners = state.partner_count(t1[0], t1[1]) + state.partner_count(t2[0], t2[1]);
    let opponents: u32 = t1
        .iter()
        .flat_map(|&a| t2.iter().map(move |&b| (a, b)))
        .map(|(a, b)| {
            let n = state.opponent_count(a, b);
            if weights.squared_opponents {
                n * n
            } else {
                n
            }
        })
        .sum();
    partners * weights.partner + opponents * weights.opponent
}

/// Cheapest of the three splits; the first one wins ties.
pub fn best_split(group: [PlayerId; 4], state: &SchedulingState, weights: PairingWeights) -> (Pairing, u32) {
    let [first, second, third] = splits(group);
    let mut best = (first, pairing_cost(&first, state, weights));
    for pairing in [second, third] {
        let cost = pairing_cost(&pairing, state, weights);
        if cost < best.1 {
            best = (pairing, cost);
        }
    }
    best
}

/// Cheaper of the two splits pairing each `a` player with a `b` player. The
/// aligned split (`a[0] + b[0]` vs `a[1] + b[1]`) wins ties.
pub fn best_cross_split(
    a: [PlayerId; 2],
    b: [PlayerId; 2],
    state: &SchedulingState,
    weights: PairingWeights,
) -> (Pairing, u32) {
    let aligned: Pairing = ([a[0], b[0]], [a[1], b[1]]);
    let crossed: Pairing = ([a[0], b[1]], [a[1], b[0]]);
    let aligned_cost = pairing_cost(&aligned, state, weights);
    let crossed_cost = pairing_cost(&crossed, state, weights);
    if crossed_cost < aligned_cost {
        (crossed, crossed_cost)
    } else {
        (aligned, aligned_cost)
    }
}

/// Shuffle attempts allowed for a partition over `num_courts` courts.
pub fn attempt_budget(num_courts: usize) -> usize {
    match num_courts {
        0..=2 => 500,
        3..=4 => 2500,
        _ => 5000,
    }
}

/// Partition `active` into `num_courts` groups of four and split each group,
/// keeping the cheapest assignment found. Stops early on a zero-cost assignment.
pub fn search_court_partition<R: Rng + ?Sized>(
    active: &[PlayerId],
    num_courts: usize,
    state: &SchedulingState,
    weights: PairingWeights,
    rng: &mut R,
) -> Vec<Pairing> {
    let needed = num_courts * 4;
    if num_courts == 0 || active.len() < needed {
        return Vec::new();
    }

    let mut pool = active.to_vec();
    let mut best: Option<(Vec<Pairing>, u32)> = None;
    for _ in 0..attempt_budget(num_courts) {
        pool.shuffle(rng);
        let mut pairings = Vec::with_capacity(num_courts);
        let mut total = 0;
        for chunk in pool[..needed].chunks_exact(4) {
            let (pairing, cost) = best_split([chunk[0], chunk[1], chunk[2], chunk[3]], state, weights);
            pairings.push(pairing);
            total += cost;
        }
        if best.as_ref().map_or(true, |(_, c)| total < *c) {
            best = Some((pairings, total));
            if total == 0 {
                break;
            }
        }
    }
    best.map(|(pairings, _)| pairings).unwrap_or_default()
}
