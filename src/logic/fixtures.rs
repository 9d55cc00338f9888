//! Round-robin fixture generation (circle method) for club formats.

/// Round-robin fixtures for `entities`, one list per round.
///
/// An odd entity count gets a bye; fixtures against the bye are dropped. The
/// first entity stays in place while the rest rotate. Rounds beyond one full
/// cycle repeat the cycle: round `k` (0-based) uses fixture set `k % cycle`.
pub fn round_robin<T: Clone>(entities: &[T], total_rounds: usize) -> Vec<Vec<(T, T)>> {
    let mut slots: Vec<Option<T>> = entities.iter().cloned().map(Some).collect();
    if slots.len() % 2 != 0 {
        slots.push(None);
    }
    let n = slots.len();
    if n == 0 || total_rounds == 0 {
        return Vec::new();
    }

    let cycle = n - 1;
    let mut rounds: Vec<Vec<(T, T)>> = Vec::with_capacity(total_rounds);
    for _ in 0..total_rounds.min(cycle) {
        let fixtures = (0..n / 2)
            .filter_map(|i| match (&slots[i], &slots[n - 1 - i]) {
                (Some(home), Some(away)) => Some((home.clone(), away.clone())),
                _ => None,
            })
            .collect();
        rounds.push(fixtures);
        if let Some(last) = slots.pop() {
            slots.insert(1, last);
        }
    }

    let cycle_len = rounds.len();
    for r in cycle_len..total_rounds {
        let repeat = rounds[r % cycle_len].clone();
        rounds.push(repeat);
    }
    rounds
}

/// Rounds needed for every club to meet every other club once.
pub fn default_club_rounds(club_count: usize) -> usize {
    if club_count < 2 {
        0
    } else if club_count % 2 == 0 {
        club_count - 1
    } else {
        club_count
    }
}
