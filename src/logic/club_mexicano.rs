//! Club Mexicano: individuals. Partners are re-formed inside each club every
//! round; after round 1 pairs from facing clubs are matched by summed points.

use crate::logic::club::{club_fixtures, fixtures_for_round, ClubFixture};
use crate::logic::partition::{pairing_cost, Pairing, PairingWeights};
use crate::logic::shared::{
    make_match, make_round, next_round_number, schedulable_players, select_sit_outs,
    SchedulingState,
};
use crate::logic::standings::{calculate_individual_standings, individual_competitors, standings_for_players};
use crate::logic::validation::{club_validate_setup, club_validate_warnings};
use crate::models::{
    Club, ClubId, Competitor, Court, Match, Player, PlayerId, Round, StandingsEntry, Tournament,
    TournamentConfig, TournamentFormat,
};
use crate::strategy::{ScheduleOptions, ScheduleResult, TournamentStrategy};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::{HashMap, HashSet};

fn pair_attempts(num_courts: usize) -> usize {
    if num_courts <= 2 {
        100
    } else {
        200
    }
}

/// Round 1: random intra-club pairs, facing pairs chosen to spread opponents.
fn assign_random<R: Rng + ?Sized>(
    home: &[PlayerId],
    away: &[PlayerId],
    num_courts: usize,
    state: &SchedulingState,
    rng: &mut R,
) -> Vec<Pairing> {
    let (mut home, mut away) = (home.to_vec(), away.to_vec());
    let mut best: Option<(Vec<Pairing>, u32)> = None;
    for _ in 0..pair_attempts(num_courts) {
        home.shuffle(rng);
        away.shuffle(rng);
        let courts: Vec<Pairing> = home
            .chunks_exact(2)
            .zip(away.chunks_exact(2))
            .take(num_courts)
            .map(|(a, b)| ([a[0], a[1]], [b[0], b[1]]))
            .collect();
        let cost: u32 = courts.iter().map(|p| pairing_cost(p, state, PairingWeights::CLUB)).sum();
        if best.as_ref().map_or(true, |(_, c)| cost < *c) {
            best = Some((courts, cost));
            if cost == 0 {
                break;
            }
        }
    }
    best.map(|(courts, _)| courts).unwrap_or_default()
}

/// Later rounds: intra-club pairs minimizing partner repeats, then the
/// strongest pair of one club meets the strongest pair of the other.
fn assign_by_points<R: Rng + ?Sized>(
    home: &[PlayerId],
    away: &[PlayerId],
    num_courts: usize,
    state: &SchedulingState,
    points: &HashMap<PlayerId, i32>,
    rng: &mut R,
) -> Vec<Pairing> {
    let (mut home, mut away) = (home.to_vec(), away.to_vec());
    let mut best: Option<(Vec<[PlayerId; 2]>, Vec<[PlayerId; 2]>, u32)> = None;
    for _ in 0..pair_attempts(num_courts) {
        home.shuffle(rng);
        away.shuffle(rng);
        let pairs_home: Vec<[PlayerId; 2]> = home.chunks_exact(2).take(num_courts).map(|c| [c[0], c[1]]).collect();
        let pairs_away: Vec<[PlayerId; 2]> = away.chunks_exact(2).take(num_courts).map(|c| [c[0], c[1]]).collect();
        let repeats: u32 = pairs_home
            .iter()
            .chain(pairs_away.iter())
            .map(|p| state.partner_count(p[0], p[1]))
            .sum();
        if best.as_ref().map_or(true, |(_, _, c)| repeats < *c) {
            best = Some((pairs_home, pairs_away, repeats));
            if repeats == 0 {
                break;
            }
        }
    }
    let Some((mut pairs_home, mut pairs_away, _)) = best else {
        return Vec::new();
    };

    let strength = |p: &[PlayerId; 2]| points.get(&p[0]).copied().unwrap_or(0) + points.get(&p[1]).copied().unwrap_or(0);
    pairs_home.sort_by_key(|p| std::cmp::Reverse(strength(p)));
    pairs_away.sort_by_key(|p| std::cmp::Reverse(strength(p)));
    pairs_home.into_iter().zip(pairs_away).collect()
}

fn club_members(players: &[Player], club: ClubId) -> Vec<PlayerId> {
    players.iter().filter(|p| p.club_id == Some(club)).map(|p| p.id).collect()
}

#[allow(clippy::too_many_arguments)]
fn build_round<R: Rng + ?Sized>(
    clubs: &[Club],
    players: &[Player],
    courts: &[&Court],
    fixtures: &[ClubFixture],
    round_number: usize,
    state: &mut SchedulingState,
    points: Option<&HashMap<PlayerId, i32>>,
    rng: &mut R,
) -> Round {
    let mut sit_outs: Vec<PlayerId> = Vec::new();
    let playing: HashSet<_> = fixtures.iter().flat_map(|&(a, b)| [a, b]).collect();
    for club in clubs.iter().filter(|c| !playing.contains(&c.id)) {
        sit_outs.extend(club_members(players, club.id));
    }

    let mut matches: Vec<Match> = Vec::new();
    for &(home_club, away_club) in fixtures {
        let home = club_members(players, home_club);
        let away = club_members(players, away_club);
        let num_courts = (home.len() / 2).min(away.len() / 2).min(courts.len() - matches.len());
        if num_courts == 0 {
            sit_outs.extend(home.iter().chain(away.iter()));
            continue;
        }

        let sel_home = select_sit_outs(&home, home.len() - num_courts * 2, &state.games_played, Some(&state.last_sit_out_round), rng);
        let sel_away = select_sit_outs(&away, away.len() - num_courts * 2, &state.games_played, Some(&state.last_sit_out_round), rng);
        let pairings = match points {
            None => assign_random(&sel_home.active_ids, &sel_away.active_ids, num_courts, state, rng),
            Some(points) => assign_by_points(&sel_home.active_ids, &sel_away.active_ids, num_courts, state, points, rng),
        };
        for (team1, team2) in pairings {
            let court = courts[matches.len()];
            let m = make_match(court, team1, team2, rng);
            state.record_match(&m);
            matches.push(m);
        }
        sit_outs.extend(sel_home.sit_out_ids);
        sit_outs.extend(sel_away.sit_out_ids);
    }

    state.record_sit_outs(&sit_outs, round_number);
    make_round(round_number, matches, sit_outs, rng)
}

fn generate_club_mexicano_rounds<R: Rng + ?Sized>(
    players: &[Player],
    clubs: &[Club],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let fixtures = club_fixtures(clubs, config.max_rounds);
    let courts = config.available_courts();
    let mut state = SchedulingState::seed_from_rounds(existing_rounds, players);
    let start_round = next_round_number(existing_rounds);
    let mut rounds: Vec<Round> = Vec::with_capacity(count);

    for r in 0..count {
        let round_number = start_round + r;
        let history: Vec<Round> = existing_rounds.iter().chain(rounds.iter()).cloned().collect();
        let points: Option<HashMap<PlayerId, i32>> = if history.is_empty() {
            None
        } else {
            Some(
                standings_for_players(players, &history)
                    .into_iter()
                    .map(|s| (s.player_id, s.total_points))
                    .collect(),
            )
        };
        let round = build_round(
            clubs,
            players,
            &courts,
            fixtures_for_round(&fixtures, round_number),
            round_number,
            &mut state,
            points.as_ref(),
            rng,
        );
        rounds.push(round);
    }

    ScheduleResult {
        rounds,
        warnings: Vec::new(),
    }
}

/// Club Mexicano strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClubMexicano;

impl TournamentStrategy for ClubMexicano {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::ClubMexicano
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        club_validate_setup(players, config)
    }

    fn validate_warnings(&self, players: &[Player], _config: &TournamentConfig) -> Vec<String> {
        club_validate_warnings(players)
    }

    fn generate_schedule(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let clubs: &[Club] = options.tournament.map(|t| t.clubs.as_slice()).unwrap_or_default();
        if clubs.len() < 2 {
            return ScheduleResult::not_ready("Not enough clubs configured");
        }
        let players = schedulable_players(players, options.exclude_player_ids);
        generate_club_mexicano_rounds(&players, clubs, config, &[], 1, rng)
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
        let clubs: &[Club] = options.tournament.map(|t| t.clubs.as_slice()).unwrap_or_default();
        let players = schedulable_players(players, options.exclude_player_ids);
        if players.len() < 4 || clubs.len() < 2 {
            return ScheduleResult::not_ready("Not enough active players or clubs");
        }
        generate_club_mexicano_rounds(&players, clubs, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        calculate_individual_standings(tournament)
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        individual_competitors(tournament)
    }
}
