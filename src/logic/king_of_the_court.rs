//! King of the Court: a ladder of courts. Winners move up one court, losers
//! move down one, and higher courts pay a bonus per game played on them.

use crate::logic::partition::{best_split, PairingWeights};
use crate::logic::shared::{
    make_match, make_round, next_round_number, schedulable_players, select_sit_outs,
    SchedulingState,
};
use crate::logic::standings::{calculate_standings_with_bonus, individual_competitors, player_competitors};
use crate::logic::validation::{king_of_the_court_validate_setup, king_of_the_court_validate_warnings};
use crate::models::{
    Competitor, Court, CourtId, Match, Player, PlayerId, Round, Side, StandingsEntry, Tournament,
    TournamentConfig, TournamentFormat,
};
use crate::strategy::{ScheduleOptions, ScheduleResult, TournamentStrategy};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::{HashMap, HashSet};

/// Bonus per available court: the explicit `bonus`, else `courts - 1 - index`
/// so the king court pays the most and the lowest court nothing.
pub fn court_bonuses(config: &TournamentConfig) -> HashMap<CourtId, i32> {
    let courts = config.available_courts();
    let n = courts.len() as i32;
    courts
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, c.bonus.unwrap_or(n - 1 - i as i32)))
        .collect()
}

/// Individual standings including court bonuses.
pub fn king_of_the_court_standings(players: &[Player], rounds: &[Round], config: &TournamentConfig) -> Vec<StandingsEntry> {
    let competitors = player_competitors(players);
    let index: HashMap<PlayerId, usize> = competitors.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
    calculate_standings_with_bonus(
        rounds,
        &competitors,
        |side| side.iter().filter_map(|pid| index.get(pid).copied()).collect(),
        &court_bonuses(config),
    )
}

/// Position of each player in the standings; unknown players sort last.
struct Ladder(HashMap<PlayerId, usize>);

impl Ladder {
    fn from_standings(standings: &[StandingsEntry]) -> Self {
        Ladder(standings.iter().enumerate().map(|(i, s)| (s.player_id, i)).collect())
    }

    fn position(&self, id: &PlayerId) -> usize {
        self.0.get(id).copied().unwrap_or(usize::MAX)
    }

    fn sort(&self, ids: &mut [PlayerId]) {
        ids.sort_by_key(|id| self.position(id));
    }
}

/// Winners and losers of one match. Draws are split by standings; an
/// unscored match returns its sides unchanged.
fn winners_and_losers(m: &Match, ladder: &Ladder) -> ([PlayerId; 2], [PlayerId; 2]) {
    let Some(score) = m.score else {
        return (m.team1, m.team2);
    };
    match score.winner() {
        Some(Side::One) => (m.team1, m.team2),
        Some(Side::Two) => (m.team2, m.team1),
        None => {
            let mut all = m.players();
            ladder.sort(&mut all);
            ([all[0], all[1]], [all[2], all[3]])
        }
    }
}

/// Court groups for the next round from the previous round's results.
/// `courts[0]` is the king court.
fn promotion_groups(prev: &Round, courts: &[&Court], ladder: &Ladder, round_players: &HashSet<PlayerId>) -> Vec<Vec<PlayerId>> {
    let num_courts = courts.len();
    let court_index: HashMap<CourtId, usize> = courts.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
    let mut groups: Vec<Vec<PlayerId>> = vec![Vec::new(); num_courts];

    let mut results: Vec<(usize, [PlayerId; 2], [PlayerId; 2], bool)> = prev
        .matches
        .iter()
        .filter_map(|m| {
            let ci = *court_index.get(&m.court_id)?;
            let (winners, losers) = winners_and_losers(m, ladder);
            Some((ci, winners, losers, m.score.is_some()))
        })
        .collect();
    results.sort_by_key(|r| r.0);

    for (ci, winners, losers, scored) in results {
        let (up, down) = if scored {
            (ci.saturating_sub(1), (ci + 1).min(num_courts - 1))
        } else {
            (ci, ci)
        };
        groups[up].extend(winners.iter().filter(|id| round_players.contains(id)));
        groups[down].extend(losers.iter().filter(|id| round_players.contains(id)));
    }

    let assigned: HashSet<PlayerId> = groups.iter().flatten().copied().collect();
    let mut unplaced: Vec<PlayerId> = round_players.iter().copied().filter(|id| !assigned.contains(id)).collect();
    ladder.sort(&mut unplaced);
    // Worst-ranked first, into the lowest court with room.
    for id in unplaced.into_iter().rev() {
        let target = (0..num_courts).rev().find(|&ci| groups[ci].len() < 4).unwrap_or(num_courts - 1);
        groups[target].push(id);
    }

    if groups.iter().any(|g| g.len() != 4) {
        log::debug!("Ladder groups uneven, regrouping {} players by standings", round_players.len());
        let mut all: Vec<PlayerId> = groups.into_iter().flatten().collect();
        ladder.sort(&mut all);
        groups = all.chunks(4).take(num_courts).map(|c| c.to_vec()).collect();
    }
    groups
}

fn generate_king_of_the_court_rounds<R: Rng + ?Sized>(
    players: &[Player],
    config: &TournamentConfig,
    existing_rounds: &[Round],
    count: usize,
    rng: &mut R,
) -> ScheduleResult {
    let pool: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    let available = config.available_courts();
    let num_courts = available.len().min(pool.len() / 4);
    if num_courts == 0 {
        return ScheduleResult::not_ready("Not enough players for a match (need at least 4)");
    }
    let courts = &available[..num_courts];

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

        let mut matches: Vec<Match> = Vec::with_capacity(num_courts);
        let history: Vec<Round> = existing_rounds.iter().chain(rounds.iter()).cloned().collect();
        match history.last() {
            None => {
                let mut order = selection.active_ids.clone();
                order.shuffle(rng);
                for (block, court) in order.chunks_exact(4).zip(courts.iter()) {
                    let group = [block[0], block[1], block[2], block[3]];
                    let ((team1, team2), _) = best_split(group, &state, PairingWeights::PARTNERS_ONLY);
                    matches.push(make_match(court, team1, team2, rng));
                }
            }
            Some(prev) => {
                let ladder = Ladder::from_standings(&king_of_the_court_standings(players, &history, config));
                let round_players: HashSet<PlayerId> = selection.active_ids.iter().copied().collect();
                let groups = promotion_groups(prev, courts, &ladder, &round_players);
                for (mut group, court) in groups.into_iter().zip(courts.iter()) {
                    if group.len() != 4 {
                        continue;
                    }
                    ladder.sort(&mut group);
                    matches.push(make_match(court, [group[0], group[3]], [group[1], group[2]], rng));
                }
            }
        }

        state.record_sit_outs(&selection.sit_out_ids, round_number);
        for m in &matches {
            state.record_match(m);
        }
        rounds.push(make_round(round_number, matches, selection.sit_out_ids, rng));
    }

    ScheduleResult { rounds, warnings }
}

/// King of the Court strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct KingOfTheCourt;

impl TournamentStrategy for KingOfTheCourt {
    fn format(&self) -> TournamentFormat {
        TournamentFormat::KingOfTheCourt
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn validate_setup(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        king_of_the_court_validate_setup(players, config)
    }

    fn validate_warnings(&self, players: &[Player], config: &TournamentConfig) -> Vec<String> {
        king_of_the_court_validate_warnings(players, config)
    }

    fn generate_schedule(
        &self,
        players: &[Player],
        config: &TournamentConfig,
        options: &ScheduleOptions<'_>,
        rng: &mut dyn RngCore,
    ) -> ScheduleResult {
        let players = schedulable_players(players, options.exclude_player_ids);
        generate_king_of_the_court_rounds(&players, config, &[], 1, rng)
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
        generate_king_of_the_court_rounds(&players, config, existing_rounds, count, rng)
    }

    fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
        king_of_the_court_standings(&tournament.active_players(), &tournament.rounds, &tournament.config)
    }

    fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
        individual_competitors(tournament)
    }
}
