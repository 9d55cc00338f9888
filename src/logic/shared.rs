//! Fairness primitives shared by every format: pair keys, scheduling state
//! replayed from history, sit-out selection and id generation.

use crate::models::{Court, CourtId, Match, Player, PlayerId, Round, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Canonical key for an unordered pair: (a, b) and (b, a) map to the same key.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PairKey(Uuid, Uuid);

impl PairKey {
    pub fn members(&self) -> (Uuid, Uuid) {
        (self.0, self.1)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}

/// Key for two players partnering (or opposing) each other.
pub fn partner_key(a: Uuid, b: Uuid) -> PairKey {
    if a <= b {
        PairKey(a, b)
    } else {
        PairKey(b, a)
    }
}

/// Key for two teams meeting each other.
pub fn team_key(a: Uuid, b: Uuid) -> PairKey {
    partner_key(a, b)
}

/// Counters used by the pairing heuristics, rebuilt from the rounds played so far.
#[derive(Clone, Debug, Default)]
pub struct SchedulingState {
    pub games_played: HashMap<Uuid, u32>,
    pub partner_counts: HashMap<PairKey, u32>,
    pub opponent_counts: HashMap<PairKey, u32>,
    pub court_counts: HashMap<(PlayerId, CourtId), u32>,
    /// Absent means the player never sat out.
    pub last_sit_out_round: HashMap<Uuid, usize>,
}

impl SchedulingState {
    /// Replay `rounds` in order. Every player in `players` starts at zero games.
    pub fn seed_from_rounds(rounds: &[Round], players: &[Player]) -> Self {
        let mut state = SchedulingState::default();
        for p in players {
            state.games_played.insert(p.id, 0);
        }
        for round in rounds {
            state.record_sit_outs(&round.sit_outs, round.round_number);
            for m in &round.matches {
                state.record_match(m);
            }
        }
        state
    }

    /// Replay `rounds` at team level: games and meetings per team, and the
    /// last round each team sat out.
    pub fn seed_teams_from_rounds(rounds: &[Round], teams: &[Team]) -> Self {
        let mut state = SchedulingState::default();
        for t in teams {
            state.games_played.insert(t.id, 0);
        }
        for round in rounds {
            for t in teams.iter().filter(|t| round.sit_outs.contains(&t.player1_id)) {
                state.last_sit_out_round.insert(t.id, round.round_number);
            }
            for m in &round.matches {
                let home = teams.iter().find(|t| t.is_side(&m.team1));
                let away = teams.iter().find(|t| t.is_side(&m.team2));
                if let (Some(home), Some(away)) = (home, away) {
                    state.record_team_match(home.id, away.id);
                }
            }
        }
        state
    }

    /// Count one meeting of two fixed teams.
    pub fn record_team_match(&mut self, a: Uuid, b: Uuid) {
        *self.opponent_counts.entry(team_key(a, b)).or_insert(0) += 1;
        *self.games_played.entry(a).or_insert(0) += 1;
        *self.games_played.entry(b).or_insert(0) += 1;
    }

    /// Count one match: partners, opponents, games played and court use.
    pub fn record_match(&mut self, m: &Match) {
        self.record_pairing(&m.team1, &m.team2);
        for pid in m.players() {
            *self.court_counts.entry((pid, m.court_id)).or_insert(0) += 1;
        }
    }

    /// Count partners, opponents and games played for one pairing.
    pub fn record_pairing(&mut self, team1: &[PlayerId; 2], team2: &[PlayerId; 2]) {
        *self.partner_counts.entry(partner_key(team1[0], team1[1])).or_insert(0) += 1;
        *self.partner_counts.entry(partner_key(team2[0], team2[1])).or_insert(0) += 1;
        for &a in team1 {
            for &b in team2 {
                *self.opponent_counts.entry(partner_key(a, b)).or_insert(0) += 1;
            }
        }
        for &pid in team1.iter().chain(team2.iter()) {
            *self.games_played.entry(pid).or_insert(0) += 1;
        }
    }

    pub fn record_sit_outs(&mut self, ids: &[Uuid], round_number: usize) {
        for &id in ids {
            self.last_sit_out_round.insert(id, round_number);
        }
    }

    pub fn games(&self, id: Uuid) -> u32 {
        self.games_played.get(&id).copied().unwrap_or(0)
    }

    pub fn partner_count(&self, a: Uuid, b: Uuid) -> u32 {
        self.partner_counts.get(&partner_key(a, b)).copied().unwrap_or(0)
    }

    pub fn opponent_count(&self, a: Uuid, b: Uuid) -> u32 {
        self.opponent_counts.get(&partner_key(a, b)).copied().unwrap_or(0)
    }

    pub fn total_opponent_incidences(&self) -> u32 {
        self.opponent_counts.values().sum()
    }
}

/// Outcome of [`select_sit_outs`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SitOutSelection {
    /// In selection order.
    pub sit_out_ids: Vec<Uuid>,
    /// Remaining ids, in pool order.
    pub active_ids: Vec<Uuid>,
}

/// Pick exactly `count` ids to sit out: most games played first, then whoever
/// sat out longest ago (never before counts as longest). Ties are broken by a
/// prior shuffle.
pub fn select_sit_outs<R: Rng + ?Sized>(
    pool: &[Uuid],
    count: usize,
    games_played: &HashMap<Uuid, u32>,
    last_sit_out_round: Option<&HashMap<Uuid, usize>>,
    rng: &mut R,
) -> SitOutSelection {
    if count == 0 {
        return SitOutSelection {
            sit_out_ids: Vec::new(),
            active_ids: pool.to_vec(),
        };
    }
    let mut sorted = pool.to_vec();
    sorted.shuffle(rng);
    sorted.sort_by(|a, b| {
        let games_a = games_played.get(a).copied().unwrap_or(0);
        let games_b = games_played.get(b).copied().unwrap_or(0);
        games_b.cmp(&games_a).then_with(|| match last_sit_out_round {
            // None (never sat out) orders before any round number.
            Some(last) => last.get(a).cmp(&last.get(b)),
            None => std::cmp::Ordering::Equal,
        })
    });
    sorted.truncate(count);
    let sitting: HashSet<Uuid> = sorted.iter().copied().collect();
    let active_ids = pool.iter().copied().filter(|id| !sitting.contains(id)).collect();
    SitOutSelection {
        sit_out_ids: sorted,
        active_ids,
    }
}

/// Fresh UUID drawn from the injected RNG, so schedules are reproducible by seed.
pub fn new_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Players that may be scheduled: available and not explicitly excluded.
pub fn schedulable_players(players: &[Player], exclude: &[PlayerId]) -> Vec<Player> {
    players
        .iter()
        .filter(|p| p.is_available() && !exclude.contains(&p.id))
        .cloned()
        .collect()
}

/// Build a match on `court`.
pub fn make_match<R: Rng + ?Sized>(
    court: &Court,
    team1: [PlayerId; 2],
    team2: [PlayerId; 2],
    rng: &mut R,
) -> Match {
    Match::new(new_id(rng), court.id, team1, team2)
}

/// Build a round with a fresh id.
pub fn make_round<R: Rng + ?Sized>(
    round_number: usize,
    matches: Vec<Match>,
    sit_outs: Vec<PlayerId>,
    rng: &mut R,
) -> Round {
    Round {
        id: new_id(rng),
        round_number,
        matches,
        sit_outs,
    }
}

/// Round number following the last existing round.
pub fn next_round_number(existing: &[Round]) -> usize {
    existing.last().map(|r| r.round_number + 1).unwrap_or(1)
}
