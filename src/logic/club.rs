//! Club formats with fixed teams. Clubs meet round-robin; inside a fixture
//! each club's teams are lined up by [`MatchMode`] and matched slot by slot.

use crate::logic::fixtures::{default_club_rounds, round_robin};
use crate::logic::shared::{make_round, next_round_number, schedulable_players, SchedulingState};
use crate::logic::standings::{calculate_team_standings, team_competitors};
use crate::logic::team::{schedulable_teams, sit_out_players, standings_for_teams, team_match};
use crate::logic::validation::{club_validate_setup, club_validate_warnings};
use crate::models::{
    Club, ClubId, Competitor, Court, MatchMode, Player, Round, StandingsEntry, Team, TeamId,
    Tournament, TournamentConfig, TournamentFormat,
};
use crate::strategy::{ScheduleOptions, ScheduleResult, TournamentStrategy};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::{HashMap, HashSet};

/// Two clubs meeting in one round.
pub type ClubFixture = (ClubId, ClubId);

/// Fixture lists per round: `max_rounds` or one full round-robin cycle.
pub fn club_fixtures(clubs: &[Club], max_rounds: Option<usize>) -> Vec<Vec<ClubFixture>> {
    let ids: Vec<ClubId> = clubs.iter().map(|c| c.id).collect();
    let total = max_rounds.unwrap_or_else(|| default_club_rounds(ids.len())).max(1);
    round_robin(&ids, total)
}

/// Fixtures played in `round_number` (1-based), cycling through the list.
pub fn fixtures_for_round(fixtures: &[Vec<ClubFixture>], round_number: usize) -> &[ClubFixture] {
    if fixtures.is_empty() {
        return &[];
    }
    &fixtures[round_number.saturating_sub(1) % fixtures.len()]
}

/// Teams whose two players both belong to `club`, in creation order.
pub fn club_teams<'a>(teams: &'a [Team], players: &[Player], club: ClubId) -> Vec<&'a Team> {
    let members: HashSet<_> = players
        .iter()
        .filter(|p| p.club_id == Some(club))
        .map(|p| p.id)
        .collect();
    teams
        .iter()
        .filter(|t| members.contains(&t.player1_id) && members.contains(&t.player2_id))
        .collect()
}

fn order_teams<R: Rng + ?Sized>(teams: &mut [&Team], mode: MatchMode, points: &HashMap<TeamId, i32>, rng: &mut R) {
    match mode {
        MatchMode::Random => teams.shuffle(rng),
        MatchMode::Standings => {
            teams.sort_by_key(|t| std::cmp::Reverse(points.get(&t.id).copied().unwrap_or(0)))
        }
        MatchMode::Slots => {}
    }
}

/// Line up both clubs' teams per `mode` and pair them slot by slot.
/// The longer side's surplus is left out.
pub fn match_fixture_pairs<'a, R: Rng + ?Sized>(
    mut home: Vec<&'a Team>,
    mut away: Vec<&'a Team>,
    mode: MatchMode,
    points: &HashMap<TeamId, i32>,
    rng: &mut R,
) -> Vec<(&'a Team, &'a Team)> {
    order_teams(&mut home, mode, points, rng);
    order_teams(&mut away, mode, points, rng);
    home.into_iter().zip(away).collect()
}

/// Everything a club round needs besides the fixtures.
pub(crate) struct ClubRoundInput<'a> {
    pub clubs: &'a [Club],
    pub teams: &'a [Team],
    pub players: &'a [Player],
    pub courts: &'a [&'a Court],
    pub mode: MatchMode,
    pub points: &'a HashMap<TeamId, i32>,
}

/// One round: clubs without a fixture sit out, fixtures fill courts in order,
/// teams left without an opponent or a court sit out.
pub(crate) fn build_club_round<R: Rng + ?Sized>(
    input: &ClubRoundInput<'_>,
    fixtures: &[ClubFixture],
    round_number: usize,
    state: &mut SchedulingState,
    rng: &mut R,
) -> Round {
    let mut sitting: Vec<TeamId> = Vec::new();
    let playing: HashSet<ClubId> = fixtures.iter().flat_map(|&(a, b)| [a, b]).collect();
    for club in input.clubs.iter().filter(|c| !playing.contains(&c.id)) {
        sitting.extend(club_teams(input.teams, input.players, club.id).iter().map(|t| t.id));
    }

    let mut matches = Vec::new();
    let mut free_courts = input.courts.iter();
    for &(home_club, away_club) in fixtures {
        let home = club_teams(input.teams, input.players, home_club);
        let away = club_teams(input.teams, input.players, away_club);
        let mut placed: HashSet<TeamId> = HashSet::new();
        for (t1, t2) in match_fixture_pairs(home.clone(), away.clone(), input.mode, input.points, rng) {
            let Some(court) = free_courts.next() else { break };
            matches.push(team_match(court, t1, t2, rng));
            state.record_team_match(t1.id, t2.id);
            placed.insert(t1.id);
            placed.insert(t2.id);
        }
        sitting.extend(home.iter().chain(away.iter()).map(|t| t.id).filter(|id| !placed.contains(id)));
    }

    state.record_sit_outs(&sitting, round_number);
    let sit_outs = sit_out_players(input.teams, &sitting);
    make_round(round_number, matches, sit_outs, rng)
}

/// `count` club rounds after `existing_rounds`; `None` means the full
/// fixture schedule.
fn generate_club_team_rounds<R: Rng + ?Sized>(
    players: &[Player],
    config: &TournamentConfig,
    options: &ScheduleOptions<'_>,
    existing_rounds: &[Round],
    count: Option<usize>,
    mode: MatchMode,
    rng: &mut R,
) -> ScheduleResult {
    let players = schedulable_players(players, options.exclude_player_ids);
    let teams = schedulable_teams(options, &players);
    let clubs: &[Club] = options.tournament.map(|t| t.clubs.as_slice()).unwrap_or_default();
    if clubs.len() < 2 || teams.len() < 2 {
        return ScheduleResult::not_ready(if existing_rounds.is_empty() {
            "Not enough clubs or teams configured"
        } else {
            "Not enough active teams"
        });
    }

    let fixtures = club_fixtures(clubs, config.max_rounds);
    let count = count.unwrap_or(fixtures.len());
    let courts = config.available_courts();
    let mut state = SchedulingState::seed_teams_from_rounds(existing_rounds, &teams);
    let start_round = next_round_number(existing_rounds);
    let mut rounds: Vec<Round> = Vec::with_capacity(count);

    for r in 0..count {
        let round_number = start_round + r;
        let points: HashMap<TeamId, i32> = if mode == MatchMode::Standings {
            let history: Vec<Round> = existing_rounds.iter().chain(rounds.iter()).cloned().collect();
            standings_for_teams(&teams, &players, &history)
                .into_iter()
                .map(|s| (s.player_id, s.total_points))
                .collect()
        } else {
            HashMap::new()
        };
        let input = ClubRoundInput {
            clubs,
            teams: &teams,
            players: &players,
            courts: &courts,
            mode,
            points: &points,
        };
        let round = build_club_round(&input, fixtures_for_round(&fixtures, round_number), round_number, &mut state, rng);
        rounds.push(round);
    }

    ScheduleResult {
        rounds,
        warnings: Vec::new(),
    }
}

/// Shared trait plumbing for the fixed-team club formats.
macro_rules! club_team_strategy {
    ($name:ident, $format:expr, dynamic: $dynamic:expr, mode: |$config:ident| $mode:expr) => {
        impl TournamentStrategy for $name {
            fn format(&self) -> TournamentFormat {
                $format
            }

            fn is_dynamic(&self) -> bool {
                $dynamic
            }

            fn has_fixed_partners(&self) -> bool {
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
                let $config = config;
                let count = if $dynamic { Some(1) } else { None };
                generate_club_team_rounds(players, config, options, &[], count, $mode, rng)
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
                let $config = config;
                generate_club_team_rounds(players, config, options, existing_rounds, Some(count), $mode, rng)
            }

            fn calculate_standings(&self, tournament: &Tournament) -> Vec<StandingsEntry> {
                calculate_team_standings(tournament, &self.get_competitors(tournament))
            }

            fn get_competitors(&self, tournament: &Tournament) -> Vec<Competitor> {
                team_competitors(tournament, true)
            }
        }
    };
}

/// Static schedule; pair #1 of one club always meets pair #1 of the other.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClubRanked;

club_team_strategy!(ClubRanked, TournamentFormat::ClubRanked, dynamic: false, mode: |_config| MatchMode::Slots);

/// One round at a time, teams matched at random within each fixture.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClubAmericano;

club_team_strategy!(ClubAmericano, TournamentFormat::ClubAmericano, dynamic: true, mode: |_config| MatchMode::Random);

/// Static schedule with the configured match mode (random by default).
#[derive(Clone, Copy, Debug, Default)]
pub struct ClubTeamAmericano;

club_team_strategy!(
    ClubTeamAmericano,
    TournamentFormat::ClubTeamAmericano,
    dynamic: false,
    mode: |config| config.match_mode.unwrap_or_default()
);

/// One round at a time, best team meets best team.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClubTeamMexicano;

club_team_strategy!(ClubTeamMexicano, TournamentFormat::ClubTeamMexicano, dynamic: true, mode: |_config| MatchMode::Standings);

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fixtures_cycle_past_one_round_robin() {
        let clubs: Vec<Club> = (0..4).map(|i| Club::new(format!("C{i}"))).collect();
        let fixtures = club_fixtures(&clubs, Some(5));
        assert_eq!(fixtures.len(), 5);
        assert_eq!(fixtures_for_round(&fixtures, 4), fixtures[0].as_slice());
        assert_eq!(fixtures_for_round(&fixtures, 8), fixtures_for_round(&fixtures, 3));
    }

    #[test]
    fn slots_keep_creation_order() {
        let teams: Vec<Team> = (0..4)
            .map(|_| Team::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()))
            .collect();
        let mut rng = StdRng::seed_from_u64(3);
        let pairs = match_fixture_pairs(
            vec![&teams[0], &teams[1]],
            vec![&teams[2], &teams[3]],
            MatchMode::Slots,
            &HashMap::new(),
            &mut rng,
        );
        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].0.id, pairs[0].1.id), (teams[0].id, teams[2].id));
        assert_eq!((pairs[1].0.id, pairs[1].1.id), (teams[1].id, teams[3].id));
    }

    #[test]
    fn standings_mode_puts_best_against_best() {
        let teams: Vec<Team> = (0..4)
            .map(|_| Team::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()))
            .collect();
        let points: HashMap<TeamId, i32> =
            [(teams[0].id, 5), (teams[1].id, 30), (teams[2].id, 12), (teams[3].id, 9)].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(3);
        let pairs = match_fixture_pairs(
            vec![&teams[0], &teams[1]],
            vec![&teams[2], &teams[3]],
            MatchMode::Standings,
            &points,
            &mut rng,
        );
        assert_eq!((pairs[0].0.id, pairs[0].1.id), (teams[1].id, teams[2].id));
        assert_eq!((pairs[1].0.id, pairs[1].1.id), (teams[0].id, teams[3].id));
    }
}
