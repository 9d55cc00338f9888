//! Americano and Mixed Americano: partners rotate every round and the whole
//! schedule is generated in one pass.

use crate::logic::partition::{
    attempt_budget, best_cross_split, search_court_partition, splits, Pairing, PairingWeights,
};
use crate::logic::shared::{
    make_match, make_round, next_round_number, schedulable_players, select_sit_outs,
    SchedulingState,
};
use crate::logic::standings::{calculate_roster_standings, player_competitors};
use crate::logic::validation::{common_validate_setup, group_validate_setup, group_validate_warnings};
use crate::models::{
    Competitor, Group, Player, PlayerId, Round, StandingsEntry, Tournament, TournamentConfig,
    TournamentFormat,
};
use crate::strategy::{ScheduleOptions, ScheduleResult, TournamentStrategy};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Search nodes allowed when planning a balanced schedule.
const PLAN_NODE_BUDGET: usize = 20_000;
/// Candidate court assignments tried per round before backtracking.
const PLAN_BRANCHING: usize = 8;

/// A round decided but not yet turned into matches.
struct PlannedRound {
    pairings: Vec<Pairing>,
    sit_outs: Vec<PlayerId>,
}

fn build_rounds<R: Rng + ?Sized>(
    planned: Vec<PlannedRound>,
    config: &TournamentConfig,
    start_round: usize,
    rng: &mut R,
) -> Vec<Round> {
    let courts = config.available_courts();
    planned
        .into_iter()
        .enumerate()
        .map(|(i, plan)| {
            let matches = plan
                .pairings
                .into_iter()
                .zip(courts.iter())
                .map(|((team1, team2), court)| make_match(court, team1, team2, rng))
                .collect();
            make_round(start_round + i, matches, plan.sit_outs, rng)
        })
        .collect()
}

/// Every way to split `active` into `num_courts` unordered groups of four.
/// Only small fields are enumerated; larger ones return nothing.
fn groupings(active: &[PlayerId], num_courts: usize) -> Vec<Vec<[PlayerId; 4]>> {
    match (num_courts, active) {
        (1, &[a, b, c, d]) => vec![vec![[a, b, c, d]]],
        (2, _) if active.len() == 8 => {
            let first = active[0];
            let rest = &active[1..];
            let mut out = Vec::with_capacity(35);
            for i in 0..rest.len() {
                for j in i + 1..rest.len() {
                    for k in j + 1..rest.len() {
                        let others: Vec<PlayerId> = (0..rest.len())
                            .filter(|&x| x != i && x != j && x != k)
                            .map(|x| rest[x])
                            .collect();
                        out.push(vec![
                            [first, rest[i], rest[j], rest[k]],
                            [others[0], others[1], others[2], others[3]],
                        ]);
                    }
                }
            }
            out
        }
        _ => Vec::new(),
    }
}

/// Depth-first search over whole rounds: no partner repeats, every opponent
/// count kept under `opponent_cap`. Gives up after [`PLAN_NODE_BUDGET`] nodes.
struct BalancedPlanner<'a, R: ?Sized> {
    pool: &'a [PlayerId],
    num_courts: usize,
    sit_out_count: usize,
    opponent_cap: u32,
    nodes: usize,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> BalancedPlanner<'_, R> {
    fn plan(
        &mut self,
        state: &SchedulingState,
        round_number: usize,
        remaining: usize,
        out: &mut Vec<PlannedRound>,
    ) -> bool {
        if remaining == 0 {
            return true;
        }
        self.nodes += 1;
        if self.nodes > PLAN_NODE_BUDGET {
            return false;
        }

        let selection = select_sit_outs(
            self.pool,
            self.sit_out_count,
            &state.games_played,
            Some(&state.last_sit_out_round),
            self.rng,
        );
        let candidates = self.candidates(&selection.active_ids, state);
        for pairings in candidates.into_iter().take(PLAN_BRANCHING) {
            let mut next = state.clone();
            next.record_sit_outs(&selection.sit_out_ids, round_number);
            for (team1, team2) in &pairings {
                next.record_pairing(team1, team2);
            }
            out.push(PlannedRound {
                pairings,
                sit_outs: selection.sit_out_ids.clone(),
            });
            if self.plan(&next, round_number + 1, remaining - 1, out) {
                return true;
            }
            out.pop();
            if self.nodes > PLAN_NODE_BUDGET {
                return false;
            }
        }
        false
    }

    /// Admissible court assignments for one round, cheapest first (random among equals).
    fn candidates(&mut self, active: &[PlayerId], state: &SchedulingState) -> Vec<Vec<Pairing>> {
        let mut found: Vec<(u32, Vec<Pairing>)> = Vec::new();
        for groups in groupings(active, self.num_courts) {
            let mut combos: Vec<(u32, Vec<Pairing>)> = vec![(0, Vec::new())];
            for group in groups {
                let options: Vec<(Pairing, u32)> = splits(group)
                    .into_iter()
                    .filter_map(|p| self.admissible_cost(&p, state).map(|c| (p, c)))
                    .collect();
                let mut extended = Vec::with_capacity(combos.len() * options.len());
                for (cost, pairings) in &combos {
                    for (pairing, c) in &options {
                        let mut next = pairings.clone();
                        next.push(*pairing);
                        extended.push((cost + c, next));
                    }
                }
                combos = extended;
            }
            found.extend(combos);
        }
        found.shuffle(self.rng);
        found.sort_by_key(|(cost, _)| *cost);
        found.into_iter().map(|(_, pairings)| pairings).collect()
    }

    /// Opponent cost of a split, or None if it repeats a partnership or
    /// pushes an opponent count to the cap.
    fn admissible_cost(&self, pairing: &Pairing, state: &SchedulingState) -> Option<u32> {
        let (t1, t2) = pairing;
        if state.partner_count(t1[0], t1[1]) > 0 || state.partner_count(t2[0], t2[1]) > 0 {
            return None;
        }
        let mut cost = 0;
        for &a in t1 {
            for &b in t2 {
                let n = state.opponent_count(a, b);
                if n + 1 > self.opponent_cap {
                    return None;
                }
                cost += n;
            }
        }
        Some(cost)
    }
}

/// Plan `count` rounds with the bounded backtracking search. Only attempted
/// for one or two courts; returns None when the budget runs out.
fn plan_balanced<R: Rng + ?Sized>(
    pool: &[PlayerId],
    num_courts: usize,
    count: usize,
    state: &SchedulingState,
    start_round: usize,
    rng: &mut R,
) -> Option<Vec<PlannedRound>> {
    if num_courts > 2 || pool.len() < 4 {
        return None;
    }
    let pairs = (pool.len() * (pool.len() - 1) / 2) as u32;
    let incidences = state.total_opponent_incidences() + (count * num_courts * 4) as u32;
    let opponent_cap = incidences.div_ceil(pairs).max(1);

    let sit_out_count = pool.len() - num_courts * 4;
    let mut planner = BalancedPlanner {
        pool,
        num_courts,
        sit_out_count,
        opponent_cap,
        nodes: 0,
        rng,
    };
    let mut out = Vec::with_capacity(count);
    if planner.plan(state, start_round, count, &mut out) {
        log::debug!("Balanced plan for {} round(s) found after {} node(s)", count, planner.nodes);
        Some(out)
    } else {
        log::debug!("Balanced plan exhausted after {} node(s); using partition search", planner.nodes);
        None
    }
}

/// Round-by-round plan: sit-outs then the randomized partition search.
fn plan_greedy<R: Rng + ?Sized>(
    pool: &[PlayerId],
    num_courts: usize,
    count: usize,
    state: &mut SchedulingState,
    start_round: usize,
    rng: &mut R,
) -> Vec<PlannedRound> {
    let sit_out_count = pool.len() - num_courts * 4;
    let mut out = Vec::with_capacity(count);
    for r in 0..count {
        let selection = select_sit_outs(
            pool,
            sit_out_count,
            &state.games_played,
            Some(&state.last_sit_out_round),
            rng,
        );
        let pairings = search_court_partition(
            &selection.active_ids,
            num_courts,
            state,
            PairingWeights::STANDARD,
            rng,
        );
        state.record_sit_outs(&selection.sit_out_ids, start_round + r);
        for (team1, team2) in &pairings {
            state.record_pairing(team1, team2);
        }
        out.push(PlannedRound {
            pairings,
            sit_outs: selection.sit_out_ids,
        });
    }
    out
}

fn generate_americano_rounds<R: Rng + ?Sized>(
    players: &[Player],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let pool: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let num_courts = config.available_courts().len().min(pool.len() / 4);
    if num_courts == 0 {
        return ScheduleResult::not_ready("Not enough players for a match (need at least 4)");
    }

    let mut warnings = Vec::new();
    let sit_out_count = pool.len() - num_courts * 4;
    if sit_out_count > 0 && existing_rounds.is_empty() {
        warnings.push(format!("{} player(s) will sit out each round", sit_out_count));
    }

    let mut state = SchedulingState::seed_from_rounds(existing_rounds, players);
    let start_round = next_round_number(existing_rounds);
    let planned = match plan_balanced(&pool, num_courts, count, &state, start_round, rng) {
        Some(planned) => planned,
        None => plan_greedy(&pool, num_courts, count, &mut state, start_round, rng),
    };

    ScheduleResult {
        rounds: build_rounds(planned, config, start_round, rng),
        warnings,
    }
}

/// Classic Americano: everyone partners everyone, all rounds upfront.
#[derive(Clone, Copy, Debug, Default)]
pub struct Americano;

impl TournamentStrategy for Americano {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::Americano
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        common_validate_setup(players, config)
    }

    fn generate_schedule(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let players = schedulable_players(players, options.exclude_player_ids);
        let total_rounds = config.max_rounds.unwrap_or(players.len().saturating_sub(1));
        generate_americano_rounds(&players, config, &[], total_rounds, rng)
    }

    fn generate_additional_rounds(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        existing_rounds: &[Round],
        count: usize,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let players = schedulable_players(players, options.exclude_player_ids);
        generate_americano_rounds(&players, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        calculate_roster_standings(tournament)
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        player_competitors(&tournament.players)
    }
}

/// Split the active players of each group into court quartets (two from
/// each group) and pick, per court, the cheaper of the two cross-group splits.
fn search_mixed_partition<R: Rng + ?Sized>(
    active_a: &[PlayerId],
    active_b: &[PlayerId],
    num_courts: usize,
    state: &SchedulingState,
    rng: &mut R,
) -> Vec<Pairing> {
    let mut pool_a = active_a.to_vec();
    let mut pool_b = active_b.to_vec();
    let mut best: Option<(Vec<Pairing>, u32)> = None;
    for _ in 0..attempt_budget(num_courts) {
        pool_a.shuffle(rng);
        pool_b.shuffle(rng);
        let mut pairings = Vec::with_capacity(num_courts);
        let mut total = 0;
        for i in 0..num_courts {
            let (pairing, cost) = best_cross_split(
                [pool_a[i * 2], pool_a[i * 2 + 1]],
                [pool_b[i * 2], pool_b[i * 2 + 1]],
                state,
                PairingWeights::STANDARD,
            );
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

fn generate_mixed_rounds<R: Rng + ?Sized>(
    players: &[Player],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let group_a: Vec<PlayerId> = players.iter().filter(|p| p.group == Some(Group::A)).map(|p| p.id).collect();
    let group_b: Vec<PlayerId> = players.iter().filter(|p| p.group == Some(Group::B)).map(|p| p.id).collect();
    let num_courts = config
        .available_courts()
        .len()
        .min(group_a.len().min(group_b.len()) / 2);
    if num_courts == 0 {
        return ScheduleResult::not_ready("Not enough players for a match (need at least 2 per group)");
    }

    let mut warnings = Vec::new();
    let sit_out_a = group_a.len() - num_courts * 2;
    let sit_out_b = group_b.len() - num_courts * 2;
    if sit_out_a + sit_out_b > 0 && existing_rounds.is_empty() {
        warnings.push(format!("{} player(s) will sit out each round", sit_out_a + sit_out_b));
    }

    let mut state = SchedulingState::seed_from_rounds(existing_rounds, players);
    let start_round = next_round_number(existing_rounds);
    let mut planned = Vec::with_capacity(count);
    for r in 0..count {
        let sel_a = select_sit_outs(&group_a, sit_out_a, &state.games_played, Some(&state.last_sit_out_round), rng);
        let sel_b = select_sit_outs(&group_b, sit_out_b, &state.games_played, Some(&state.last_sit_out_round), rng);
        let pairings = search_mixed_partition(&sel_a.active_ids, &sel_b.active_ids, num_courts, &state, rng);

        let mut sit_outs = sel_a.sit_out_ids;
        sit_outs.extend(sel_b.sit_out_ids);
        state.record_sit_outs(&sit_outs, start_round + r);
        for (team1, team2) in &pairings {
            state.record_pairing(team1, team2);
        }
        planned.push(PlannedRound { pairings, sit_outs });
    }

    ScheduleResult {
        rounds: build_rounds(planned, config, start_round, rng),
        warnings,
    }
}

/// Americano where every partnership pairs one player from group A with one from group B.
#[derive(Clone, Copy, Debug, Default)]
pub struct MixedAmericano;

impl TournamentStrategy for MixedAmericano {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::MixedAmericano
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        group_validate_setup(players, config, false)
    }

    fn validate_warnings(&self, players: &[Player], _config: &TournamentConfig) -> Vec<String> {
        group_validate_warnings(players)
    }

    fn generate_schedule(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let players = schedulable_players(players, options.exclude_player_ids);
        let total_rounds = config.max_rounds.unwrap_or(players.len().saturating_sub(1));
        generate_mixed_rounds(&players, config, &[], total_rounds, rng)
    }

    fn generate_additional_rounds(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        existing_rounds: &[Round],
        count: usize,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let players = schedulable_players(players, options.exclude_player_ids);
        generate_mixed_rounds(&players, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        calculate_roster_standings(tournament)
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        player_competitors(&tournament.players)
    }
}
