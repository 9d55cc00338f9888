//! Team Americano and Team Mexicano: fixed partnerships, standings per team.

use crate::logic::shared::{
    make_match, make_round, next_round_number, schedulable_players, select_sit_outs, team_key,
    SchedulingState,
};
use crate::logic::standings::{calculate_competitor_standings, calculate_team_standings, team_competitors};
use crate::logic::validation::team_validate_setup;
use crate::models::{
    Competitor, Court, Match, Player, PlayerId, Round, StandingsEntry, Team, TeamId, Tournament,
    TournamentConfig, TournamentFormat,
};
use crate::strategy::{ScheduleOptions, ScheduleResult, TournamentStrategy};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::HashMap;

/// Teams from the tournament whose two players are both schedulable.
pub(crate) fn schedulable_teams(options: &ScheduleOptions<'_>, players: &[Player]) -> Vec<Team> {
    let ids: Vec<PlayerId> = schedulable_players(players, options.exclude_player_ids)
        .iter()
        .map(|p| p.id)
        .collect();
    options
        .tournament
        .map(|t| t.teams.as_slice())
        .unwrap_or_default()
        .iter()
        .filter(|t| ids.contains(&t.player1_id) && ids.contains(&t.player2_id))
        .cloned()
        .collect()
}

/// Match with each team's players as a side.
pub(crate) fn team_match<R: Rng + ?Sized>(court: &Court, home: &Team, away: &Team, rng: &mut R) -> Match {
    make_match(court, home.player_ids(), away.player_ids(), rng)
}

/// Player ids of the teams listed in `sitting`, in team order.
pub(crate) fn sit_out_players(teams: &[Team], sitting: &[TeamId]) -> Vec<PlayerId> {
    teams
        .iter()
        .filter(|t| sitting.contains(&t.id))
        .flat_map(|t| t.player_ids())
        .collect()
}

/// Team standings over `rounds` for `teams` only.
pub(crate) fn standings_for_teams(teams: &[Team], players: &[Player], rounds: &[Round]) -> Vec<StandingsEntry> {
    let name_of = |id: PlayerId| {
        players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "?".to_string())
    };
    let competitors: Vec<Competitor> = teams
        .iter()
        .map(|t| Competitor {
            id: t.id,
            name: t
                .name
                .clone()
                .unwrap_or_else(|| format!("{} & {}", name_of(t.player1_id), name_of(t.player2_id))),
            player_ids: t.player_ids().to_vec(),
        })
        .collect();
    calculate_competitor_standings(rounds, &competitors, |side| {
        teams.iter().position(|t| t.is_side(side)).into_iter().collect()
    })
}

fn generate_team_americano_rounds<R: Rng + ?Sized>(
    teams: &[Team],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let courts = config.available_courts();
    let num_courts = courts.len().min(teams.len() / 2);
    if num_courts == 0 {
        return ScheduleResult::not_ready("Not enough teams for a match (need at least 2)");
    }

    let mut warnings = Vec::new();
    let sit_out_count = teams.len() - num_courts * 2;
    if sit_out_count > 0 && existing_rounds.is_empty() {
        warnings.push(format!("{} team(s) will sit out each round", sit_out_count));
    }

    let team_ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    let by_id: HashMap<TeamId, &Team> = teams.iter().map(|t| (t.id, t)).collect();
    let mut state = SchedulingState::seed_teams_from_rounds(existing_rounds, teams);
    let start_round = next_round_number(existing_rounds);
    let attempts = if team_ids.len() - sit_out_count <= 8 { 500 } else { 2000 };
    let mut rounds = Vec::with_capacity(count);

    for r in 0..count {
        let round_number = start_round + r;
        let selection = select_sit_outs(
            &team_ids,
            sit_out_count,
            &state.games_played,
            Some(&state.last_sit_out_round),
            rng,
        );

        let mut pool = selection.active_ids.clone();
        let mut best: Option<(Vec<(TeamId, TeamId)>, u32)> = None;
        for _ in 0..attempts {
            pool.shuffle(rng);
            let fixtures: Vec<(TeamId, TeamId)> = pool.chunks_exact(2).take(num_courts).map(|c| (c[0], c[1])).collect();
            let cost: u32 = fixtures
                .iter()
                .map(|&(a, b)| {
                    let n = state.opponent_counts.get(&team_key(a, b)).copied().unwrap_or(0);
                    n * n
                })
                .sum();
            if best.as_ref().map_or(true, |(_, c)| cost < *c) {
                best = Some((fixtures, cost));
                if cost == 0 {
                    break;
                }
            }
        }

        let mut matches = Vec::with_capacity(num_courts);
        for ((home, away), court) in best.map(|(f, _)| f).unwrap_or_default().into_iter().zip(courts.iter()) {
            if let (Some(h), Some(a)) = (by_id.get(&home), by_id.get(&away)) {
                matches.push(team_match(court, h, a, rng));
                state.record_team_match(home, away);
            }
        }
        state.record_sit_outs(&selection.sit_out_ids, round_number);
        let sit_outs = sit_out_players(teams, &selection.sit_out_ids);
        rounds.push(make_round(round_number, matches, sit_outs, rng));
    }

    ScheduleResult { rounds, warnings }
}

/// Fixed teams, everyone meets everyone, all rounds upfront.
#[derive(Clone, Copy, Debug, Default)]
pub struct TeamAmericano;

impl TournamentStrategy for TeamAmericano {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::TeamAmericano
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn has_fixed_partners(&self) -> bool {
        true
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        team_validate_setup(players, config, "Team Americano")
    }

    fn generate_schedule(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let teams = schedulable_teams(options, players);
        if teams.len() < 2 {
            return ScheduleResult::not_ready("No teams configured");
        }
        let teams_per_round = (config.available_courts().len().min(teams.len() / 2) * 2).max(1);
        let default_rounds = ((teams.len() - 1) * teams.len()).div_ceil(teams_per_round).max(1);
        let total_rounds = config.max_rounds.unwrap_or(default_rounds);
        generate_team_americano_rounds(&teams, config, &[], total_rounds, rng)
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
        let teams = schedulable_teams(options, players);
        if teams.len() < 2 {
            return ScheduleResult::not_ready("No teams configured");
        }
        generate_team_americano_rounds(&teams, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        calculate_team_standings(tournament, &self.get_competitors(tournament))
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        team_competitors(tournament, false)
    }
}

fn generate_team_mexicano_rounds<R: Rng + ?Sized>(
    teams: &[Team],
    players: &[Player],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let courts = config.available_courts();
    let num_courts = courts.len().min(teams.len() / 2);
    if num_courts == 0 {
        return ScheduleResult::not_ready("Not enough teams for a match (need at least 2)");
    }

    let mut warnings = Vec::new();
    let sit_out_count = teams.len() - num_courts * 2;
    if sit_out_count > 0 && existing_rounds.is_empty() {
        warnings.push(format!("{} team(s) will sit out each round", sit_out_count));
    }

    let team_ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    let mut state = SchedulingState::seed_teams_from_rounds(existing_rounds, teams);
    let start_round = next_round_number(existing_rounds);
    let mut rounds: Vec<Round> = Vec::with_capacity(count);

    for r in 0..count {
        let round_number = start_round + r;
        let selection = select_sit_outs(
            &team_ids,
            sit_out_count,
            &state.games_played,
            Some(&state.last_sit_out_round),
            rng,
        );
        let mut order: Vec<&Team> = teams.iter().filter(|t| selection.active_ids.contains(&t.id)).collect();
        if existing_rounds.is_empty() && rounds.is_empty() {
            order.shuffle(rng);
        } else {
            let history: Vec<Round> = existing_rounds.iter().chain(rounds.iter()).cloned().collect();
            let standings = standings_for_teams(teams, players, &history);
            let position: HashMap<TeamId, usize> =
                standings.iter().enumerate().map(|(i, s)| (s.player_id, i)).collect();
            order.sort_by_key(|t| position.get(&t.id).copied().unwrap_or(usize::MAX));
        }

        let mut matches = Vec::with_capacity(num_courts);
        for (pair, court) in order.chunks_exact(2).zip(courts.iter()) {
            matches.push(team_match(court, pair[0], pair[1], rng));
            state.record_team_match(pair[0].id, pair[1].id);
        }
        state.record_sit_outs(&selection.sit_out_ids, round_number);
        let sit_outs = sit_out_players(teams, &selection.sit_out_ids);
        rounds.push(make_round(round_number, matches, sit_outs, rng));
    }

    ScheduleResult { rounds, warnings }
}

/// Fixed teams re-matched by team standings: 1st vs 2nd, 3rd vs 4th, ...
#[derive(Clone, Copy, Debug, Default)]
pub struct TeamMexicano;

impl TournamentStrategy for TeamMexicano {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::TeamMexicano
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn has_fixed_partners(&self) -> bool {
        true
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        team_validate_setup(players, config, "Team Mexicano")
    }

    fn generate_schedule(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let teams = schedulable_teams(options, players);
        if teams.len() < 2 {
            return ScheduleResult::not_ready("No teams configured");
        }
        generate_team_mexicano_rounds(&teams, players, config, &[], 1, rng)
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
        let teams = schedulable_teams(options, players);
        if teams.len() < 2 {
            return ScheduleResult::not_ready("Not enough active teams for a match (need at least 2)");
        }
        generate_team_mexicano_rounds(&teams, players, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        calculate_team_standings(tournament, &self.get_competitors(tournament))
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        team_competitors(tournament, true)
    }
}
