//! Mexicano and Mixicano: round 1 is random, every later round is seeded
//! from the standings so far.

use crate::logic::partition::{best_cross_split, best_split, PairingWeights};
use crate::logic::shared::{
    make_match, make_round, next_round_number, schedulable_players, select_sit_outs,
    SchedulingState,
};
use crate::logic::standings::{calculate_individual_standings, individual_competitors, standings_for_players};
use crate::logic::validation::{common_validate_setup, group_validate_setup, group_validate_warnings};
use crate::models::{
    Competitor, Group, Match, Player, PlayerId, Round, StandingsEntry, Tournament, TournamentConfig,
    TournamentFormat,
};
use crate::strategy::{ScheduleOptions, ScheduleResult, TournamentStrategy};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::HashMap;

/// Standings over the history plus the rounds generated so far in this call.
fn standings_so_far(players: &[Player], existing: &[Round], generated: &[Round]) -> Vec<StandingsEntry> {
    let all: Vec<Round> = existing.iter().chain(generated.iter()).cloned().collect();
    standings_for_players(players, &all)
}

fn generate_mexicano_rounds<R: Rng + ?Sized>(
    players: &[Player],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let pool: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let courts = config.available_courts();
    let num_courts = courts.len().min(pool.len() / 4);
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
    let mut rounds: Vec<Round> = Vec::with_capacity(count);

    for r in 0..count {
        let round_number = start_round + r;
        let selection = select_sit_outs(
            &pool,
            sit_out_count,
            &state.games_played,
            Some(&state.last_sit_out_round),
            rng,
        );
        let mut order = selection.active_ids.clone();
        let first_round = existing_rounds.is_empty() && rounds.is_empty();
        if first_round {
            order.shuffle(rng);
        } else {
            let standings = standings_so_far(players, existing_rounds, &rounds);
            let rank: HashMap<PlayerId, usize> = standings.iter().map(|s| (s.player_id, s.rank)).collect();
            // Shuffle first so tied ranks land in random blocks.
            order.shuffle(rng);
            order.sort_by_key(|id| rank.get(id).copied().unwrap_or(usize::MAX));
        }

        let mut matches: Vec<Match> = Vec::with_capacity(num_courts);
        for (block, court) in order.chunks_exact(4).zip(courts.iter()) {
            let group = [block[0], block[1], block[2], block[3]];
            let (team1, team2) = if first_round {
                best_split(group, &state, PairingWeights::PARTNERS_ONLY).0
            } else {
                ([group[0], group[3]], [group[1], group[2]])
            };
            matches.push(make_match(court, team1, team2, rng));
        }

        state.record_sit_outs(&selection.sit_out_ids, round_number);
        for m in &matches {
            state.record_match(m);
        }
        rounds.push(make_round(round_number, matches, selection.sit_out_ids, rng));
    }

    ScheduleResult { rounds, warnings }
}

/// Mexicano: blocks of four by rank, 1st + 4th vs 2nd + 3rd.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mexicano;

impl TournamentStrategy for Mexicano {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::Mexicano
    }

    fn is_dynamic(&self) -> bool {
        true
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
        generate_mexicano_rounds(&players, config, &[], 1, rng)
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
        generate_mexicano_rounds(&players, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        calculate_individual_standings(tournament)
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        individual_competitors(tournament)
    }
}

fn generate_mixicano_rounds<R: Rng + ?Sized>(
    players: &[Player],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let group_a: Vec<PlayerId> = players.iter().filter(|p| p.group == Some(Group::A)).map(|p| p.id).collect();
    let group_b: Vec<PlayerId> = players.iter().filter(|p| p.group == Some(Group::B)).map(|p| p.id).collect();
    let courts = config.available_courts();
    let num_courts = courts.len().min(group_a.len().min(group_b.len()) / 2);
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
    let mut rounds: Vec<Round> = Vec::with_capacity(count);

    for r in 0..count {
        let round_number = start_round + r;
        let sel_a = select_sit_outs(&group_a, sit_out_a, &state.games_played, Some(&state.last_sit_out_round), rng);
        let sel_b = select_sit_outs(&group_b, sit_out_b, &state.games_played, Some(&state.last_sit_out_round), rng);
        let mut order_a = sel_a.active_ids.clone();
        let mut order_b = sel_b.active_ids.clone();

        let first_round = existing_rounds.is_empty() && rounds.is_empty();
        if first_round {
            order_a.shuffle(rng);
            order_b.shuffle(rng);
        } else {
            let standings = standings_so_far(players, existing_rounds, &rounds);
            let position: HashMap<PlayerId, usize> =
                standings.iter().enumerate().map(|(i, s)| (s.player_id, i)).collect();
            order_a.sort_by_key(|id| position.get(id).copied().unwrap_or(usize::MAX));
            order_b.sort_by_key(|id| position.get(id).copied().unwrap_or(usize::MAX));
        }

        let mut matches: Vec<Match> = Vec::with_capacity(num_courts);
        for (i, court) in courts.iter().take(num_courts).enumerate() {
            let a = [order_a[i * 2], order_a[i * 2 + 1]];
            let b = [order_b[i * 2], order_b[i * 2 + 1]];
            let (team1, team2) = if first_round {
                best_cross_split(a, b, &state, PairingWeights::PARTNERS_ONLY).0
            } else {
                // Top A + top B vs next A + next B.
                ([a[0], b[0]], [a[1], b[1]])
            };
            matches.push(make_match(court, team1, team2, rng));
        }

        let mut sit_outs = sel_a.sit_out_ids;
        sit_outs.extend(sel_b.sit_out_ids);
        state.record_sit_outs(&sit_outs, round_number);
        for m in &matches {
            state.record_match(m);
        }
        rounds.push(make_round(round_number, matches, sit_outs, rng));
    }

    ScheduleResult { rounds, warnings }
}

/// Mexicano with one partner from each group: top A + top B vs next A + next B.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mixicano;

impl TournamentStrategy for Mixicano {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::Mixicano
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        group_validate_setup(players, config, true)
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
        generate_mixicano_rounds(&players, config, &[], 1, rng)
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
        generate_mixicano_rounds(&players, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        calculate_individual_standings(tournament)
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        individual_competitors(tournament)
    }
}
